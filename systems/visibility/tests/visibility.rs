use glam::Vec2;
use gridchase_core::{CellCoord, CellPoint};
use gridchase_map::TileMap;
use gridchase_system_visibility::{Sentry, Sweep, VisibilityField};

#[test]
fn cone_facing_east_leaves_the_west_hidden() {
    let map = TileMap::new(9, 9);
    let mut field = VisibilityField::for_map(&map);
    let sentry = Sentry::standard(CellPoint::new(4.5, 4.5), 0.0);

    let _ = field.recompute(&map, [sentry.sweep()]);

    assert!(field.is_visible(CellCoord::new(4, 4)));
    assert!(field.is_visible(CellCoord::new(7, 4)));
    assert!(!field.is_visible(CellCoord::new(2, 4)));
    assert!(!field.is_visible(CellCoord::new(4, 1)));
}

#[test]
fn no_sources_leave_everything_hidden() {
    let map = TileMap::new(5, 5);
    let mut field = VisibilityField::for_map(&map);
    let _ = field.recompute(&map, [Sweep::full(Vec2::new(2.5, 2.5), 4)]);

    assert_eq!(field.recompute(&map, Vec::new()), 0);
    assert!(field.grid().cells().iter().all(|visible| !visible));
}

#[test]
fn sources_combine_without_reset() {
    let map = TileMap::from_layout(
        "
        ...#...
        ",
    )
    .expect("valid layout");
    let west = Sweep::full(Vec2::new(0.5, 0.5), 10);
    let east = Sweep::full(Vec2::new(6.5, 0.5), 10);

    let mut field = VisibilityField::for_map(&map);
    let visible = field.recompute(&map, [west, east]);

    assert_eq!(visible, 6);
    assert!(!field.is_visible(CellCoord::new(3, 0)));

    field.reset();
    field.cast(&map, &west);
    assert_eq!(field.visible_count(), 3);
    field.cast(&map, &east);
    assert_eq!(field.visible_count(), 6);
}

#[test]
fn walls_cast_shadows() {
    let map = TileMap::from_layout(
        "
        .......
        .......
        ...#...
        .......
        .......
        ",
    )
    .expect("valid layout");
    let mut field = VisibilityField::for_map(&map);

    let _ = field.recompute(&map, [Sweep::full(Vec2::new(3.5, 0.5), 10)]);

    assert!(field.is_visible(CellCoord::new(3, 1)));
    assert!(!field.is_visible(CellCoord::new(3, 2)));
    assert!(!field.is_visible(CellCoord::new(3, 3)));
    assert!(field.is_visible(CellCoord::new(0, 4)));
}
