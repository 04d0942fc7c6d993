//! Connectivity search - can two tiles be linked?
//!
//! Two tiles with the same pair key connect when an orthogonal path joins
//! them that
//!
//! - only crosses empty cells or the one-cell virtual frame around the grid,
//! - changes direction at most [`MAX_TURNS`] times (three straight runs).
//!
//! The search is a breadth-first walk over `(position, direction)` states.
//! States are bucketed by the number of turns used: a straight step stays in
//! the current bucket, a bend moves to the next one, and buckets are drained
//! in order. The first time the target is reached the path therefore uses
//! the fewest turns possible. Ties are broken by direction order (East,
//! South, West, North) and FIFO order within a bucket, so results are
//! deterministic.

use std::collections::VecDeque;

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::types::{Direction, Position, MAX_TURNS};

const LAYERS: usize = MAX_TURNS as usize + 1;

/// A connecting path from one tile to another, both ends included.
///
/// Holds at least two positions and at most three straight runs. Positions
/// on the virtual frame lie outside `[0, width) x [0, height)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path(Vec<Position>);

impl Path {
    pub fn points(&self) -> &[Position] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn start(&self) -> Position {
        self.0[0]
    }

    pub fn end(&self) -> Position {
        self.0[self.0.len() - 1]
    }

    /// Number of direction changes along the path
    pub fn turns(&self) -> usize {
        self.corners().len().saturating_sub(2)
    }

    /// Start, every bend, and end: the polyline a renderer needs
    pub fn corners(&self) -> ArrayVec<Position, 4> {
        let mut out = ArrayVec::new();
        out.push(self.start());
        for w in self.0.windows(3) {
            let before = (w[1].x - w[0].x, w[1].y - w[0].y);
            let after = (w[2].x - w[1].x, w[2].y - w[1].y);
            if before != after {
                out.push(w[1]);
            }
        }
        out.push(self.end());
        out
    }

    /// The same path walked from the other end
    pub fn reversed(&self) -> Path {
        Path(self.0.iter().rev().copied().collect())
    }
}

#[derive(Debug, Clone, Copy)]
struct Node {
    pos: Position,
    dir: Direction,
    parent: Option<u32>,
}

/// Scratch state for one search
struct PathSearch<'a> {
    board: &'a Board,
    frame_width: usize,
    /// Fewest turns seen per (position, direction); u8::MAX = unvisited
    best: Vec<u8>,
    nodes: Vec<Node>,
    layers: [VecDeque<u32>; LAYERS],
}

impl<'a> PathSearch<'a> {
    fn new(board: &'a Board) -> Self {
        let frame_width = board.width() + 2;
        let frame_height = board.height() + 2;
        Self {
            board,
            frame_width,
            best: vec![u8::MAX; frame_width * frame_height * 4],
            nodes: Vec::new(),
            layers: Default::default(),
        }
    }

    #[inline]
    fn state_index(&self, pos: Position, dir: Direction) -> usize {
        let fx = (pos.x + 1) as usize;
        let fy = (pos.y + 1) as usize;
        (fy * self.frame_width + fx) * 4 + dir.index()
    }

    /// Record a state unless it was already reached with `turns` or fewer
    fn push(&mut self, pos: Position, dir: Direction, turns: u8, parent: Option<u32>) {
        let key = self.state_index(pos, dir);
        if self.best[key] <= turns {
            return;
        }
        self.best[key] = turns;
        let id = self.nodes.len() as u32;
        self.nodes.push(Node { pos, dir, parent });
        self.layers[turns as usize].push_back(id);
    }

    fn run(mut self, from: Position, to: Position) -> Option<Path> {
        for dir in Direction::ALL {
            self.push(from, dir, 0, None);
        }

        for turns in 0..LAYERS {
            while let Some(id) = self.layers[turns].pop_front() {
                let node = self.nodes[id as usize];
                let next = node.pos.step(node.dir);

                if !self.board.in_frame_bounds(next) {
                    continue;
                }
                if next == to {
                    return Some(self.trace(id, to));
                }
                if self.board.is_occupied(next) {
                    continue;
                }

                for dir in Direction::ALL {
                    // Doubling back is never part of a fewest-turn path.
                    if dir == node.dir.opposite() {
                        continue;
                    }
                    let next_turns = if dir == node.dir { turns } else { turns + 1 };
                    if next_turns >= LAYERS {
                        continue;
                    }
                    self.push(next, dir, next_turns as u8, Some(id));
                }
            }
        }

        None
    }

    fn trace(&self, last: u32, to: Position) -> Path {
        let mut points = vec![to];
        let mut cursor = Some(last);
        while let Some(id) = cursor {
            let node = self.nodes[id as usize];
            points.push(node.pos);
            cursor = node.parent;
        }
        points.reverse();
        Path(points)
    }
}

/// Find a path linking the tiles at `a` and `b`.
///
/// Returns `None` when `a == b`, either cell is empty or out of range, the
/// tiles have different pair keys, or no path within the turn budget exists.
pub fn connect(board: &Board, a: Position, b: Position) -> Option<Path> {
    if a == b {
        return None;
    }
    let (first, second) = (board.get(a)?, board.get(b)?);
    if !first.matches(second) {
        return None;
    }
    PathSearch::new(board).run(a, b)
}
