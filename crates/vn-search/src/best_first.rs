//! Weighted best-first search (A* family).
//!
//! # Priority
//!
//! `f = (1 - ω)·g + ω·h`, where `g` is the accumulated Euclidean step cost
//! in index space and `h` the straight-line index distance to the goal.
//! `ω = 0` is Dijkstra, `ω = 0.5` is classic A* (scaled), and `ω → 1` is
//! greedy best-first.
//!
//! # Tie-breaking
//!
//! Equal `f` pops the most recently pushed entry first.  Together with the
//! fixed neighbour order this makes every search deterministic.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};

use vn_core::{CancelToken, CellIndex, SpaceConstraints, Vec3};
use vn_occupancy::OccupancyGraph;

use crate::{PathSearch, SearchError, SearchOutcome, SearchResult};

// ── BestFirst ─────────────────────────────────────────────────────────────────

/// Weighted best-first search over one occupancy level.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BestFirst {
    omega:    f32,
    diagonal: bool,
}

impl BestFirst {
    /// `omega` must lie in `[0, 1]`.  `diagonal` switches from 6- to
    /// 26-connected adjacency.
    pub fn new(omega: f32, diagonal: bool) -> SearchResult<Self> {
        if !(0.0..=1.0).contains(&omega) {
            return Err(SearchError::InvalidHeuristicWeight(omega));
        }
        Ok(Self { omega, diagonal })
    }

    pub fn omega(&self) -> f32 {
        self.omega
    }

    pub fn diagonal(&self) -> bool {
        self.diagonal
    }

    /// Run the search and report how many cells were expanded.
    pub fn search(
        &self,
        graph:       &OccupancyGraph,
        start:       Vec3,
        goal:        Vec3,
        level:       usize,
        constraints: &SpaceConstraints,
        cancel:      &CancelToken,
    ) -> (SearchOutcome, SearchStats) {
        let mut stats = SearchStats::default();
        if !constraints.contains(start) || !constraints.contains(goal) {
            return (SearchOutcome::NoPath, stats);
        }

        let from = graph.cell_index(start, level);
        let to = graph.cell_index(goal, level);
        let center = |c: CellIndex| graph.cell_center(c, level);
        let passable = |c: CellIndex| constraints.contains(center(c)) && !graph.is_occupied(c, level);
        let h = |c: CellIndex| c.distance(to);

        let mut nodes: Vec<Node> = vec![Node { cell: from, g: 0.0, parent: None }];
        let mut best_g: FxHashMap<CellIndex, f32> = FxHashMap::default();
        let mut closed: FxHashSet<CellIndex> = FxHashSet::default();
        let mut open = BinaryHeap::new();
        let mut seq = 0u64;

        best_g.insert(from, 0.0);
        open.push(Open { f: self.omega * h(from), seq, node: 0 });

        loop {
            if cancel.is_cancelled() {
                return (SearchOutcome::Cancelled, stats);
            }
            let Some(Open { node, .. }) = open.pop() else {
                return (SearchOutcome::NoPath, stats);
            };
            let Node { cell, g, .. } = nodes[node];
            if !closed.insert(cell) {
                continue;
            }
            if cell == to {
                let path = walk_back(&nodes, node).map(center).collect();
                return (SearchOutcome::Found(path), stats);
            }
            stats.expanded += 1;

            for next in self.adjacent(cell) {
                if cancel.is_cancelled() {
                    return (SearchOutcome::Cancelled, stats);
                }
                if closed.contains(&next) || !passable(next) {
                    continue;
                }
                let next_g = g + cell.distance(next);
                if best_g.get(&next).is_some_and(|&known| known <= next_g) {
                    continue;
                }
                best_g.insert(next, next_g);

                nodes.push(Node { cell: next, g: next_g, parent: Some(node) });
                seq += 1;
                open.push(Open {
                    f:    (1.0 - self.omega) * next_g + self.omega * h(next),
                    seq,
                    node: nodes.len() - 1,
                });
            }
        }
    }

    fn adjacent(&self, cell: CellIndex) -> Box<dyn Iterator<Item = CellIndex>> {
        if self.diagonal {
            Box::new(cell.neighbourhood().filter(move |&n| n != cell))
        } else {
            Box::new(cell.axis_neighbours())
        }
    }
}

impl Default for BestFirst {
    /// Plain A*, 6-connected.
    fn default() -> Self {
        Self { omega: 0.5, diagonal: false }
    }
}

impl PathSearch for BestFirst {
    fn find_path(
        &self,
        graph:       &OccupancyGraph,
        start:       Vec3,
        goal:        Vec3,
        level:       usize,
        constraints: &SpaceConstraints,
        cancel:      &CancelToken,
    ) -> SearchOutcome {
        self.search(graph, start, goal, level, constraints, cancel).0
    }
}

/// Counters collected by [`BestFirst::search`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Cells popped, closed and expanded (the goal excluded).
    pub expanded: usize,
}

// ── Internals ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone)]
struct Node {
    cell:   CellIndex,
    g:      f32,
    parent: Option<usize>,
}

struct Open {
    f:    f32,
    seq:  u64,
    node: usize,
}

// BinaryHeap is a max-heap: smallest f wins, then the newest entry.
impl Ord for Open {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.total_cmp(&self.f).then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Open {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Open {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Open {}

/// Cells from the start to `node`, in travel order.
fn walk_back(nodes: &[Node], node: usize) -> impl Iterator<Item = CellIndex> {
    let mut cells = Vec::new();
    let mut cursor = Some(node);
    while let Some(i) = cursor {
        cells.push(nodes[i].cell);
        cursor = nodes[i].parent;
    }
    cells.into_iter().rev()
}
