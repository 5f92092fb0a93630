//! Plain-text rendering of the world.

use gridchase_core::{CellCoord, Role};
use gridchase_world::{query, World};

const FOG_GLYPH: char = ' ';
const SENTRY_GLYPH: char = 'S';

/// Draws one character per cell and one line per row.
///
/// Actors are drawn on the cell they last rested on; sentries on the cell
/// under their eye. Once any sentry exists, open cells outside its view are
/// drawn as fog while walls stay visible.
pub(crate) fn render(world: &World) -> String {
    let map = query::map(world);
    let visibility = query::visibility(world);
    let fogged = query::sentries(world).next().is_some();
    let (width, height) = (map.width(), map.height());

    let mut glyphs: Vec<Vec<char>> = (0..height)
        .map(|row| {
            (0..width)
                .map(|column| {
                    let cell = CellCoord::new(column, row);
                    match map.tile(cell) {
                        Some(tile) if tile.is_solid() => '#',
                        _ if fogged && !visibility.is_visible(cell) => FOG_GLYPH,
                        Some(tile) if tile.has_pellet() => 'o',
                        _ => '.',
                    }
                })
                .collect()
        })
        .collect();

    for (_, sentry) in query::sentries(world) {
        let eye = sentry.position();
        if eye.x >= 0.0 && eye.y >= 0.0 {
            put(&mut glyphs, eye.x as usize, eye.y as usize, SENTRY_GLYPH);
        }
    }

    for actor in query::actor_view(world).iter() {
        put(
            &mut glyphs,
            actor.cell.column() as usize,
            actor.cell.row() as usize,
            role_glyph(actor.role),
        );
    }

    let mut text = String::with_capacity((width as usize + 1) * height as usize);
    for row in glyphs {
        text.extend(row);
        text.push('\n');
    }
    text
}

fn put(glyphs: &mut [Vec<char>], column: usize, row: usize, glyph: char) {
    if let Some(slot) = glyphs.get_mut(row).and_then(|line| line.get_mut(column)) {
        *slot = glyph;
    }
}

fn role_glyph(role: Role) -> char {
    match role {
        Role::Pursuer => 'P',
        Role::Hunter => 'H',
        Role::Evader => 'E',
        Role::Directed => 'D',
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use gridchase_core::{CellPoint, Command};
    use gridchase_map::TileMap;
    use gridchase_world::apply;

    use super::*;

    #[test]
    fn renders_tiles_and_actors() {
        let map = TileMap::from_layout("..#\no..").expect("valid layout");
        let mut world = World::new(map);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnActor {
                role: Role::Evader,
                cell: CellCoord::new(1, 1),
                speed: 1.0,
            },
            &mut events,
        );

        assert_eq!(render(&world), "..#\noE.\n");
    }

    #[test]
    fn unseen_cells_are_fogged() {
        let mut world = World::new(TileMap::from_layout(".....").expect("valid layout"));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceSentry {
                position: CellPoint::new(0.5, 0.5),
                heading: 0.0,
                fov: 10.0,
                radius: 2,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Tick { dt: Duration::ZERO },
            &mut events,
        );

        assert_eq!(render(&world), "S.   \n");
    }
}
