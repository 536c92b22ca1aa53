use crate::error::{GridWorldError, Result};
use crate::mdps::mdp::{Mdp, Transition, Transitions};
use crate::mdps::mdp_simulator::pick_next;
use crate::{Continous, Discrete};
use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Probability of moving in the intended direction.
pub const INTENDED_PROBABILITY: Continous = 0.8;

/// Probability of drifting to each of the two perpendicular directions.
pub const DRIFT_PROBABILITY: Continous = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    #[serde(rename = "G")]
    Green,
    #[serde(rename = "R")]
    Red,
    #[serde(rename = "W")]
    Wall,
    #[serde(rename = "Wh")]
    White,
}

impl CellKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            CellKind::Green => "G",
            CellKind::Red => "R",
            CellKind::Wall => "W",
            CellKind::White => "Wh",
        }
    }
}

impl FromStr for CellKind {
    type Err = GridWorldError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "G" => Ok(CellKind::Green),
            "R" => Ok(CellKind::Red),
            "W" => Ok(CellKind::Wall),
            "Wh" => Ok(CellKind::White),
            other => Err(GridWorldError::UnknownCellSymbol(other.to_string())),
        }
    }
}

/// Scalar reward attached to each cell kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardMap {
    pub green: Continous,
    pub red: Continous,
    pub wall: Continous,
    pub white: Continous,
}

impl Default for RewardMap {
    fn default() -> Self {
        Self {
            green: 1.,
            red: -1.,
            wall: 0.,
            white: -0.04,
        }
    }
}

impl RewardMap {
    pub fn reward(&self, kind: CellKind) -> Continous {
        match kind {
            CellKind::Green => self.green,
            CellKind::Red => self.red,
            CellKind::Wall => self.wall,
            CellKind::White => self.white,
        }
    }

    pub fn rewards_for(&self, grid: &[Vec<CellKind>]) -> Vec<Vec<Continous>> {
        grid.iter()
            .map(|row| row.iter().map(|&cell| self.reward(cell)).collect())
            .collect()
    }
}

/// Grid coordinates. Signed so that neighbours of border cells can be expressed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct State {
    pub row: Discrete,
    pub col: Discrete,
}

impl State {
    pub const fn new(row: Discrete, col: Discrete) -> Self {
        Self { row, col }
    }

    pub fn offset(&self, (dr, dc): (Discrete, Discrete)) -> Self {
        Self::new(self.row + dr, self.col + dc)
    }

    /// Matrix index. Only meaningful for in-bounds states.
    pub fn index(&self) -> [usize; 2] {
        [self.row as usize, self.col as usize]
    }
}

impl From<(Discrete, Discrete)> for State {
    fn from((row, col): (Discrete, Discrete)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    /// Every action, in the order used to break ties between equally good actions.
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    pub fn displacement(&self) -> (Discrete, Discrete) {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }

    pub fn arrow(&self) -> char {
        match self {
            Action::Up => '↑',
            Action::Down => '↓',
            Action::Left => '←',
            Action::Right => '→',
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Up => "UP",
            Action::Down => "DOWN",
            Action::Left => "LEFT",
            Action::Right => "RIGHT",
        };
        f.write_str(name)
    }
}

/// Immutable grid geometry, reward table and the noisy-compass transition model.
#[derive(Debug, Clone)]
pub struct Environment {
    grid: Array2<CellKind>,
    rewards: Array2<Continous>,
    initial_state: State,
    terminals: Vec<CellKind>,
}

impl Environment {
    pub fn new(
        grid: Vec<Vec<CellKind>>,
        rewards: Vec<Vec<Continous>>,
        initial_state: State,
    ) -> Result<Self> {
        let height = grid.len();
        let width = grid.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(GridWorldError::EmptyGrid);
        }

        if let Some((row, r)) = grid.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(GridWorldError::RaggedGrid {
                row,
                expected: width,
                found: r.len(),
            });
        }

        let reward_cols = rewards
            .iter()
            .map(Vec::len)
            .find(|&n| n != width)
            .unwrap_or(width);
        if rewards.len() != height || reward_cols != width {
            return Err(GridWorldError::RewardShapeMismatch {
                rows: height,
                cols: width,
                found_rows: rewards.len(),
                found_cols: reward_cols,
            });
        }

        let grid = Array2::from_shape_fn((height, width), |(r, c)| grid[r][c]);
        let rewards = Array2::from_shape_fn((height, width), |(r, c)| rewards[r][c]);

        let env = Self {
            grid,
            rewards,
            initial_state,
            terminals: vec![],
        };
        if !env.is_within_bounds(&initial_state) {
            return Err(GridWorldError::InitialStateOutOfBounds(initial_state));
        }

        Ok(env)
    }

    pub fn from_kinds(
        grid: Vec<Vec<CellKind>>,
        reward_map: &RewardMap,
        initial_state: State,
    ) -> Result<Self> {
        let rewards = reward_map.rewards_for(&grid);
        Self::new(grid, rewards, initial_state)
    }

    /// Marks every valid cell of the given kinds as absorbing.
    pub fn with_terminals(mut self, kinds: &[CellKind]) -> Self {
        self.terminals = kinds
            .iter()
            .copied()
            .filter(|&k| k != CellKind::Wall)
            .collect();
        self
    }

    pub fn height(&self) -> usize {
        self.grid.nrows()
    }

    pub fn width(&self) -> usize {
        self.grid.ncols()
    }

    pub fn initial_state(&self) -> State {
        self.initial_state
    }

    pub fn grid(&self) -> &Array2<CellKind> {
        &self.grid
    }

    pub fn rewards(&self) -> &Array2<Continous> {
        &self.rewards
    }

    pub fn terminals(&self) -> &[CellKind] {
        &self.terminals
    }

    pub fn cell(&self, state: &State) -> Option<CellKind> {
        if self.is_within_bounds(state) {
            Some(self.grid[state.index()])
        } else {
            None
        }
    }

    pub fn is_within_bounds(&self, state: &State) -> bool {
        0 <= state.row
            && (state.row as usize) < self.height()
            && 0 <= state.col
            && (state.col as usize) < self.width()
    }

    /// Out-of-bounds states are not walls.
    pub fn is_wall(&self, state: &State) -> bool {
        self.cell(state) == Some(CellKind::Wall)
    }

    pub fn is_valid_state(&self, state: &State) -> bool {
        self.is_within_bounds(state) && !self.is_wall(state)
    }

    pub fn is_terminal(&self, state: &State) -> bool {
        self.cell(state)
            .is_some_and(|k| k != CellKind::Wall && self.terminals.contains(&k))
    }

    /// Panics on out-of-bounds states; callers check validity first.
    pub fn get_reward(&self, state: &State) -> Continous {
        self.rewards[state.index()]
    }

    /// Distribution over next states when `action` is attempted from `state`.
    ///
    /// The intended move happens with probability 0.8; each of the two
    /// perpendicular moves with 0.1. Moves into walls or off the grid leave
    /// the agent where it is, and outcomes landing on the same state are merged.
    pub fn state_transformer(&self, state: &State, action: Action) -> Transitions {
        let (dr, dc) = action.displacement();
        let candidates = [
            ((dr, dc), INTENDED_PROBABILITY),
            ((dc, dr), DRIFT_PROBABILITY),
            ((-dc, -dr), DRIFT_PROBABILITY),
        ];

        let mut model: Transitions = Vec::with_capacity(candidates.len());
        for (displacement, probability) in candidates {
            let next = state.offset(displacement);
            let next_state = if self.is_valid_state(&next) {
                next
            } else {
                *state
            };

            match model.iter_mut().find(|t| t.next_state == next_state) {
                Some(t) => t.probability += probability,
                None => model.push(Transition {
                    next_state,
                    probability,
                }),
            }
        }

        model
    }

    /// Samples a single move. Used for simulation only; the solvers work on
    /// the full distribution.
    pub fn step<R: Rng + ?Sized>(
        &self,
        state: &State,
        action: Action,
        rng: &mut R,
    ) -> Result<(State, Continous)> {
        if !self.is_valid_state(state) {
            return Err(GridWorldError::InvalidState(*state));
        }

        let model = self.state_transformer(state, action);
        let next_state = pick_next(rng, &model)?;

        Ok((next_state, self.get_reward(&next_state)))
    }
}

impl Mdp for Environment {
    fn height(&self) -> usize {
        Environment::height(self)
    }

    fn width(&self) -> usize {
        Environment::width(self)
    }

    fn is_valid_state(&self, s: &State) -> bool {
        Environment::is_valid_state(self, s)
    }

    fn is_terminal(&self, s: &State) -> bool {
        Environment::is_terminal(self, s)
    }

    fn get_reward(&self, s: &State) -> Continous {
        Environment::get_reward(self, s)
    }

    fn state_transformer(&self, s: &State, a: Action) -> Transitions {
        Environment::state_transformer(self, s, a)
    }
}
