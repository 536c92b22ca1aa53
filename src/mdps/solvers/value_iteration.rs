use super::common::{best_action, check_gamma, greedy_policy, sweep};
use super::{Algorithm, MdpSolver, PolicyGrid, SolveResult, Utilities};
use crate::error::{GridWorldError, Result};
use crate::mdps::history::UtilityHistory;
use crate::mdps::mdp::Mdp;
use crate::Continous;
use tracing::{debug, info, trace, warn};

/// Bellman-optimality sweeps until the utilities stop moving, then greedy
/// policy extraction - Russell & Norvig, 17.2.
///
/// There is no iteration cap: with `gamma` close to 1 convergence can take
/// arbitrarily long.
#[derive(Debug, Clone)]
pub struct ValueIteration {
    gamma: Continous,
    epsilon: Continous,
}

impl ValueIteration {
    /// `epsilon` is the maximum error allowed in the utility of any state.
    pub fn new(gamma: Continous, epsilon: Continous) -> Result<Self> {
        check_gamma(gamma)?;
        if epsilon.is_nan() || epsilon <= 0. {
            return Err(GridWorldError::InvalidEpsilon(epsilon));
        }
        if gamma >= 0.999 {
            warn!(gamma, "Discount factor is close to 1, value iteration may take very long");
        }

        Ok(Self { gamma, epsilon })
    }

    pub fn gamma(&self) -> Continous {
        self.gamma
    }

    pub fn epsilon(&self) -> Continous {
        self.epsilon
    }

    pub fn threshold(&self) -> Continous {
        self.epsilon * (1. - self.gamma) / self.gamma
    }

    /// Returns the converged utilities, the number of sweeps and the change
    /// of the last sweep.
    pub fn solve_utilities(
        &self,
        env: &dyn Mdp,
        mut history: Option<&mut UtilityHistory>,
    ) -> (Utilities, usize, Continous) {
        let mut utilities = Utilities::zeros((env.height(), env.width()));
        let threshold = self.threshold();
        let mut iterations = 0;

        loop {
            let (next, delta) = sweep(env, &utilities, &mut history, |s| {
                env.get_reward(s) + self.gamma * best_action(env, &utilities, s).1
            });
            utilities = next;
            iterations += 1;
            trace!(iterations, delta, "Value iteration sweep");

            if delta <= threshold {
                info!(iterations, delta, threshold, "Value iteration converged");
                return (utilities, iterations, delta);
            }
        }
    }

    pub fn solve_optimal_policy(&self, utilities: &Utilities, env: &dyn Mdp) -> PolicyGrid {
        greedy_policy(env, utilities)
    }
}

impl MdpSolver for ValueIteration {
    fn algorithm(&self) -> Algorithm {
        Algorithm::ValueIteration
    }

    fn solve_with_history(
        &self,
        env: &dyn Mdp,
        history: Option<&mut UtilityHistory>,
    ) -> SolveResult {
        debug!(gamma = self.gamma, epsilon = self.epsilon, "Solving with value iteration");
        let (utilities, iterations, delta) = self.solve_utilities(env, history);
        let policy = self.solve_optimal_policy(&utilities, env);

        SolveResult {
            utilities,
            policy,
            iterations,
            algorithm: self.algorithm(),
            delta,
        }
    }
}
