//! 8-connected grid mazes parsed from text.
//!
//! ```text
//! S..#
//! .#.#
//! ...G
//! ```
//!
//! `.` or ` ` is an empty cell, `#` or `█` a wall, `S` the start and `G` the
//! goal.

use std::hash::Hash;
use std::hash::Hasher;

use derive_more::Display;
use nonmax::NonMaxU32;
use thiserror::Error;

use crate::space::Edge;
use crate::space::Node;

const MAX_ELEMENTS_DISPLAYED: usize = 40;

pub(crate) type CoordIntrinsic = u32;
pub type Coord = NonMaxU32;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
#[display("({x},{y})")]
pub struct Maze2DState {
    pub(crate) x: Coord,
    pub(crate) y: Coord,
}

impl Maze2DState {
    pub fn new(x: CoordIntrinsic, y: CoordIntrinsic) -> Option<Maze2DState> {
        Some(Maze2DState {
            x: Coord::new(x)?,
            y: Coord::new(y)?,
        })
    }
    pub fn new_from_usize(x: usize, y: usize) -> Option<Maze2DState> {
        let x = CoordIntrinsic::try_from(x).ok()?;
        let y = CoordIntrinsic::try_from(y).ok()?;
        Self::new(x, y)
    }
    pub fn x(&self) -> CoordIntrinsic {
        self.x.get()
    }
    pub fn y(&self) -> CoordIntrinsic {
        self.y.get()
    }
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, PartialOrd, Hash)]
pub enum Maze2DAction {
    #[display("↑")]
    Up = 0, // y++
    #[display("↓")]
    Down = 1, // y--
    #[display("←")]
    Left = 2, // x--
    #[display("→")]
    Right = 3, // x++
    #[display("↖")]
    LeftUp = 4, // x--, y++
    #[display("↗")]
    RightUp = 5, // x++, y++
    #[display("↙")]
    LeftDown = 6, // x--, y--
    #[display("↘")]
    RightDown = 7, // x++, y--
}

impl Maze2DAction {
    #[inline(always)]
    pub fn cost(&self) -> Maze2DCost {
        if *self <= Maze2DAction::Right {
            ORTHOGONAL_COST
        } else {
            DIAGONAL_COST
        }
    }
}

pub type Maze2DCost = CoordIntrinsic;

pub const ORTHOGONAL_COST: Maze2DCost = 100u32;
pub const DIAGONAL_COST: Maze2DCost = 141u32; // 1.414213562373095

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Maze2DCell {
    #[display("░")]
    Empty,
    #[display("█")]
    Wall,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Maze2DParseError {
    #[error("Empty input")]
    EmptyInput,
    #[error("Invalid character '{ch}' found at ({x},{y})")]
    InvalidCharacter { ch: char, x: usize, y: usize },
    #[error("Row {y} has {found} cells, expected {expected}")]
    RaggedRow {
        y: usize,
        expected: usize,
        found: usize,
    },
    #[error("Maze of {x}x{y} cells is too large")]
    TooLarge { x: usize, y: usize },
    #[error("Missing start 'S'")]
    MissingStart,
    #[error("Missing goal 'G'")]
    MissingGoal,
    #[error("Found a second '{ch}' at ({x},{y})")]
    Repeated { ch: char, x: usize, y: usize },
}

/// A rectangular maze with a single start and goal.
#[derive(Clone, PartialEq, Eq)]
pub struct Maze2D {
    map: Vec<Vec<Maze2DCell>>,
    start: Maze2DState,
    goal: Maze2DState,
}

impl Maze2D {
    /// (width, height)
    pub fn dimensions(&self) -> (usize, usize) {
        let y = self.map.len();
        let x = self.map.first().map_or(0, Vec::len);
        (x, y)
    }

    #[inline(always)]
    fn at(&self, state: &Maze2DState) -> Option<Maze2DCell> {
        self.map
            .get(state.y() as usize)?
            .get(state.x() as usize)
            .copied()
    }

    pub fn is_open(&self, state: &Maze2DState) -> bool {
        self.at(state) == Some(Maze2DCell::Empty)
    }

    pub fn start(&self) -> Maze2DNode<'_> {
        Maze2DNode {
            maze: self,
            state: self.start,
        }
    }
    pub fn goal(&self) -> Maze2DNode<'_> {
        Maze2DNode {
            maze: self,
            state: self.goal,
        }
    }
    /// The node at an open cell.
    pub fn node(&self, state: Maze2DState) -> Option<Maze2DNode<'_>> {
        self.is_open(&state).then_some(Maze2DNode { maze: self, state })
    }

    /// A random maze, starting on the top-left corner and ending on the
    /// bottom-right one. The goal might not be reachable.
    pub fn random<R: rand::Rng>(
        r: &mut R,
        x: usize,
        y: usize,
        wall_probability: f64,
    ) -> Result<Self, Maze2DParseError> {
        if x == 0 || y == 0 {
            return Err(Maze2DParseError::EmptyInput);
        }
        let (Some(start), Some(goal)) = (
            Maze2DState::new(0, 0),
            Maze2DState::new_from_usize(x - 1, y - 1),
        ) else {
            return Err(Maze2DParseError::TooLarge { x, y });
        };

        let map = (0..y)
            .map(|_| {
                (0..x)
                    .map(|_| {
                        if r.random_bool(wall_probability) {
                            Maze2DCell::Wall
                        } else {
                            Maze2DCell::Empty
                        }
                    })
                    .collect()
            })
            .collect();
        let mut maze = Self { map, start, goal };
        maze.map[0][0] = Maze2DCell::Empty;
        maze.map[y - 1][x - 1] = Maze2DCell::Empty;
        Ok(maze)
    }

    /// Gets the open neighbours of a given position.
    fn neighbours(&self, state: &Maze2DState) -> Vec<(Maze2DState, Maze2DAction)> {
        let mut v = Vec::<(Maze2DState, Maze2DAction)>::with_capacity(8);

        let prev = CoordIntrinsic::MAX;
        let same = 0 as CoordIntrinsic;
        let next = 1 as CoordIntrinsic;

        for (dx, dy, action) in [
            // Left
            (prev, prev, Maze2DAction::LeftDown),
            (prev, same, Maze2DAction::Left),
            (prev, next, Maze2DAction::LeftUp),
            // Center
            (same, prev, Maze2DAction::Down),
            // (same, same),
            (same, next, Maze2DAction::Up),
            // Right
            (next, prev, Maze2DAction::RightDown),
            (next, same, Maze2DAction::Right),
            (next, next, Maze2DAction::RightUp),
        ] {
            let new_x = state.x().wrapping_add(dx);
            let new_y = state.y().wrapping_add(dy);
            // Wrapped coordinates land outside of the map.
            if let Some(s) = Maze2DState::new(new_x, new_y)
                && self.is_open(&s)
            {
                v.push((s, action));
            }
        }
        v
    }
}

impl TryFrom<&str> for Maze2D {
    type Error = Maze2DParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let lines: Vec<&str> = s.lines().filter(|l| !l.trim().is_empty()).collect();
        let Some(first) = lines.first() else {
            return Err(Maze2DParseError::EmptyInput);
        };

        let max_x = first.chars().count();
        let max_y = lines.len();
        if Maze2DState::new_from_usize(max_x, max_y).is_none() {
            return Err(Maze2DParseError::TooLarge { x: max_x, y: max_y });
        }

        let mut map = Vec::with_capacity(max_y);
        let mut start = None;
        let mut goal = None;
        for (y, line) in lines.iter().enumerate() {
            let mut row = Vec::with_capacity(max_x);
            for (x, ch) in line.chars().enumerate() {
                let cell = match ch {
                    ' ' | '.' => Maze2DCell::Empty,
                    '#' | '█' => Maze2DCell::Wall,
                    'S' | 'G' => {
                        let slot = if ch == 'S' { &mut start } else { &mut goal };
                        if slot.is_some() {
                            return Err(Maze2DParseError::Repeated { ch, x, y });
                        }
                        *slot = Maze2DState::new_from_usize(x, y);
                        Maze2DCell::Empty
                    }
                    ch => return Err(Maze2DParseError::InvalidCharacter { ch, x, y }),
                };
                row.push(cell);
            }
            if row.len() != max_x {
                return Err(Maze2DParseError::RaggedRow {
                    y,
                    expected: max_x,
                    found: row.len(),
                });
            }
            map.push(row);
        }

        Ok(Self {
            map,
            start: start.ok_or(Maze2DParseError::MissingStart)?,
            goal: goal.ok_or(Maze2DParseError::MissingGoal)?,
        })
    }
}

impl std::fmt::Display for Maze2D {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let d = self.dimensions();
        writeln!(
            f,
            "Maze2D({}x{}) (s:{}, g:{}):",
            d.0, d.1, self.start, self.goal
        )?;
        for (y, line) in self.map.iter().enumerate().take(MAX_ELEMENTS_DISPLAYED) {
            for (x, cell) in line.iter().enumerate().take(MAX_ELEMENTS_DISPLAYED) {
                let here = Maze2DState::new_from_usize(x, y);
                if here == Some(self.start) {
                    write!(f, "S")?;
                } else if here == Some(self.goal) {
                    write!(f, "G")?;
                } else {
                    write!(f, "{cell}")?;
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for Maze2D {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Maze2D{:?}", self.dimensions())
    }
}

/// An open cell of a maze.
#[derive(Clone, Copy)]
pub struct Maze2DNode<'m> {
    maze: &'m Maze2D,
    state: Maze2DState,
}

impl Maze2DNode<'_> {
    pub fn state(&self) -> Maze2DState {
        self.state
    }
}

impl std::fmt::Debug for Maze2DNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.state)
    }
}

impl PartialEq for Maze2DNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.maze, other.maze) && self.state == other.state
    }
}
impl Eq for Maze2DNode<'_> {}
impl Hash for Maze2DNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.state.hash(state);
    }
}

impl<'m> Node for Maze2DNode<'m> {
    type Edge = Maze2DEdge<'m>;

    fn edges(&self) -> Vec<Maze2DEdge<'m>> {
        self.maze
            .neighbours(&self.state)
            .into_iter()
            .map(|(to, action)| Maze2DEdge {
                maze: self.maze,
                from: self.state,
                to,
                action,
            })
            .collect()
    }
}

/// A move between neighbouring open cells.
#[derive(Clone, Copy)]
pub struct Maze2DEdge<'m> {
    maze: &'m Maze2D,
    from: Maze2DState,
    to: Maze2DState,
    action: Maze2DAction,
}

impl Maze2DEdge<'_> {
    pub fn action(&self) -> Maze2DAction {
        self.action
    }
    pub fn cost(&self) -> Maze2DCost {
        self.action.cost()
    }
}

impl std::fmt::Debug for Maze2DEdge<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}{}", self.from, self.action, self.to)
    }
}

impl PartialEq for Maze2DEdge<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.maze, other.maze)
            && (self.from, self.to, self.action) == (other.from, other.to, other.action)
    }
}
impl Eq for Maze2DEdge<'_> {}
impl Hash for Maze2DEdge<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.from, self.to, self.action).hash(state);
    }
}

impl<'m> Edge for Maze2DEdge<'m> {
    type Node = Maze2DNode<'m>;

    fn from(&self) -> Maze2DNode<'m> {
        Maze2DNode {
            maze: self.maze,
            state: self.from,
        }
    }
    fn to(&self) -> Maze2DNode<'m> {
        Maze2DNode {
            maze: self.maze,
            state: self.to,
        }
    }
}

#[inline(always)]
fn deltas(a: &Maze2DState, b: &Maze2DState) -> (Maze2DCost, Maze2DCost) {
    (a.x().abs_diff(b.x()), a.y().abs_diff(b.y()))
}

/// The distance of maximising useful diagonals.
///
/// Exact on mazes without walls, so it never overestimates and it is
/// consistent.
#[inline(always)]
pub fn diagonal_heuristic(a: &Maze2DState, b: &Maze2DState) -> Maze2DCost {
    let (delta_x, delta_y) = deltas(a, b);
    let (delta_min, delta_max) = (delta_x.min(delta_y), delta_x.max(delta_y));

    let diagonal_cost = delta_min.saturating_mul(DIAGONAL_COST);
    let orthogonal_cost = (delta_max - delta_min).saturating_mul(ORTHOGONAL_COST);
    orthogonal_cost.saturating_add(diagonal_cost)
}
