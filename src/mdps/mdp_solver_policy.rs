use super::solvers::SolveResult;
use crate::envs::grid_world::{Action, State};

pub trait Policy {
    fn action(&self, s: &State) -> Option<Action>;
}

/// Follows the policy matrix of a finished solve.
pub struct MdpSolverPolicy<'a> {
    pub result: &'a SolveResult,
}

impl<'a> MdpSolverPolicy<'a> {
    pub fn new(result: &'a SolveResult) -> Self {
        Self { result }
    }
}

impl Policy for MdpSolverPolicy<'_> {
    fn action(&self, s: &State) -> Option<Action> {
        if s.row < 0 || s.col < 0 {
            return None;
        }

        self.result.policy.get(s.index()).copied().flatten()
    }
}
