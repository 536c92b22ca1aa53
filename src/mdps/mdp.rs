use crate::envs::grid_world::{Action, State};
use crate::Continous;
use itertools::iproduct;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub next_state: State,
    pub probability: Continous,
}

/// Sparse next-state distribution with distinct `next_state`s.
pub type Transitions = Vec<Transition>;

/// Markov Decision Process over a rectangular grid - Sutton & Barto 2018.
pub trait Mdp {
    fn height(&self) -> usize;

    fn width(&self) -> usize;

    fn is_valid_state(&self, s: &State) -> bool;

    fn is_terminal(&self, s: &State) -> bool;

    fn get_reward(&self, s: &State) -> Continous;

    fn state_transformer(&self, s: &State, a: Action) -> Transitions;

    /// All cells in row-major order, valid or not.
    fn states(&self) -> Vec<State> {
        iproduct!(0..self.height(), 0..self.width())
            .map(|(r, c)| State::new(r as i32, c as i32))
            .collect()
    }
}
