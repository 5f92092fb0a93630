//! A* search and destination relocation used by [`crate::TileMap`].

use std::collections::VecDeque;

use gridchase_core::{CellCoord, Grid, Neighborhood, Path, Topology};

use crate::{neighbors_of, TileMap};

/// Finds a shortest path from `start` to `goal` with unit step cost.
///
/// The open set is a plain vector scanned for the lowest f-score; ties keep
/// the entry inserted first so results are deterministic. A neighbour is
/// relaxed only when its tentative g-score strictly improves on the recorded
/// one. `goal` must be open; `start` is only ever expanded, never entered.
pub(crate) fn find_path(map: &TileMap, start: CellCoord, goal: CellCoord) -> Option<Path> {
    let (width, height) = (map.width(), map.height());
    let mut came_from: Grid<Option<CellCoord>> = Grid::new(width, height, None);
    let mut g_score = Grid::new(width, height, u32::MAX);
    let mut f_score = Grid::new(width, height, u32::MAX);
    let mut queued = Grid::new(width, height, false);
    let mut open = vec![start];

    g_score.set(start, 0);
    f_score.set(start, map.distance(start, goal));
    queued.set(start, true);

    let mut expanded = 0_usize;
    while let Some(position) = lowest_f_score(&open, &f_score) {
        let current = open.remove(position);
        queued.set(current, false);

        if current == goal {
            tracing::trace!(?start, ?goal, expanded, "path found");
            return Some(reconstruct(&came_from, start, goal));
        }

        expanded += 1;
        let tentative = g_score[current].saturating_add(1);
        for neighbor in map.neighbors(current) {
            if map.is_solid(neighbor) || tentative >= g_score[neighbor] {
                continue;
            }

            came_from.set(neighbor, Some(current));
            g_score.set(neighbor, tentative);
            f_score.set(neighbor, tentative.saturating_add(map.distance(neighbor, goal)));
            if !queued[neighbor] {
                queued.set(neighbor, true);
                open.push(neighbor);
            }
        }
    }

    tracing::trace!(?start, ?goal, expanded, "open set exhausted");
    None
}

/// Nearest open cell to `origin`, searching outwards over the four cardinal
/// neighbours and never wrapping across map edges.
pub(crate) fn nearest_open(map: &TileMap, origin: CellCoord) -> Option<CellCoord> {
    if !map.contains(origin) {
        return None;
    }
    if !map.is_solid(origin) {
        return Some(origin);
    }

    let (width, height) = (map.width(), map.height());
    let mut visited = Grid::new(width, height, false);
    visited.set(origin, true);
    let mut queue = VecDeque::from([origin]);

    while let Some(cell) = queue.pop_front() {
        for neighbor in neighbors_of(
            cell,
            width,
            height,
            Topology::Bounded,
            Neighborhood::Cardinal,
        ) {
            if visited[neighbor] {
                continue;
            }
            visited.set(neighbor, true);

            if !map.is_solid(neighbor) {
                return Some(neighbor);
            }
            queue.push_back(neighbor);
        }
    }

    None
}

fn lowest_f_score(open: &[CellCoord], f_score: &Grid<u32>) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (position, cell) in open.iter().enumerate() {
        let score = f_score[*cell];
        match best {
            Some((_, best_score)) if score >= best_score => {}
            _ => best = Some((position, score)),
        }
    }
    best.map(|(position, _)| position)
}

fn reconstruct(came_from: &Grid<Option<CellCoord>>, start: CellCoord, goal: CellCoord) -> Path {
    let mut cells = Vec::new();
    let mut current = goal;
    while current != start {
        cells.push(current);
        match came_from[current] {
            Some(previous) => current = previous,
            None => break,
        }
    }
    cells.reverse();
    Path::from(cells)
}
