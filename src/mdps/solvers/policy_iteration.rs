use super::common::{best_action, check_gamma, expected_utility, is_decision_state, sweep};
use super::{Algorithm, MdpSolver, PolicyGrid, SolveResult, Utilities};
use crate::envs::grid_world::Action;
use crate::error::{GridWorldError, Result};
use crate::mdps::history::UtilityHistory;
use crate::mdps::mdp::Mdp;
use crate::Continous;
use rand::prelude::*;
use tracing::{debug, info, trace};

/// Alternates approximate policy evaluation and greedy policy improvement
/// until no state changes its action.
///
/// Evaluation runs a fixed budget of `k` sweeps per round instead of solving
/// the linear system exactly. A small `k` can stop on a policy that is only
/// approximately optimal.
#[derive(Debug, Clone)]
pub struct PolicyIteration {
    gamma: Continous,
    k: usize,
    seed: u64,
}

impl PolicyIteration {
    pub fn new(gamma: Continous, k: usize, seed: u64) -> Result<Self> {
        check_gamma(gamma)?;
        if k == 0 {
            return Err(GridWorldError::InvalidEvaluationSweeps);
        }

        Ok(Self { gamma, k, seed })
    }

    pub fn gamma(&self) -> Continous {
        self.gamma
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Independent uniform action for every valid, non-terminal state, drawn
    /// in row-major order.
    pub fn random_policy<R: Rng + ?Sized>(&self, env: &dyn Mdp, rng: &mut R) -> PolicyGrid {
        let mut policy = PolicyGrid::from_elem((env.height(), env.width()), None);
        for s in env.states() {
            if is_decision_state(env, &s) {
                policy[s.index()] = Some(Action::ALL[rng.gen_range(0..Action::ALL.len())]);
            }
        }

        policy
    }

    /// Exactly `k` sweeps of the Bellman expectation update for the fixed
    /// `policy`. Returns the utilities, the sweep count and the change of the
    /// last sweep.
    pub fn policy_evaluation(
        &self,
        policy: &PolicyGrid,
        utilities: Utilities,
        env: &dyn Mdp,
        history: &mut Option<&mut UtilityHistory>,
    ) -> (Utilities, usize, Continous) {
        let mut utilities = utilities;
        let mut delta = 0.;

        for iteration in 1..=self.k {
            let (next, d) = sweep(env, &utilities, history, |s| {
                let eu = policy[s.index()].map_or(0., |a| expected_utility(env, &utilities, s, a));
                env.get_reward(s) + self.gamma * eu
            });
            utilities = next;
            delta = d;
            trace!(iteration, delta, "Policy evaluation sweep");
        }

        (utilities, self.k, delta)
    }

    /// Greedy re-selection against `utilities`. Returns whether any state
    /// changed its action.
    pub fn policy_improvement(
        &self,
        policy: &mut PolicyGrid,
        utilities: &Utilities,
        env: &dyn Mdp,
    ) -> bool {
        let mut changed = false;
        for s in env.states() {
            if !is_decision_state(env, &s) {
                continue;
            }

            let (best, _) = best_action(env, utilities, &s);
            let current = &mut policy[s.index()];
            if *current != Some(best) {
                *current = Some(best);
                changed = true;
            }
        }

        changed
    }
}

impl MdpSolver for PolicyIteration {
    fn algorithm(&self) -> Algorithm {
        Algorithm::PolicyIteration
    }

    fn solve_with_history(
        &self,
        env: &dyn Mdp,
        mut history: Option<&mut UtilityHistory>,
    ) -> SolveResult {
        debug!(gamma = self.gamma, k = self.k, seed = self.seed, "Solving with policy iteration");

        let rng = &mut StdRng::seed_from_u64(self.seed);
        let mut policy = self.random_policy(env, rng);
        let mut utilities = Utilities::zeros((env.height(), env.width()));

        let mut rounds = 0;
        loop {
            let (evaluated, iterations, delta) =
                self.policy_evaluation(&policy, utilities, env, &mut history);
            utilities = evaluated;
            rounds += 1;

            let changed = self.policy_improvement(&mut policy, &utilities, env);
            debug!(rounds, delta, changed, "Policy iteration round");

            if !changed {
                info!(rounds, total_sweeps = rounds * iterations, "Policy iteration converged");
                return SolveResult {
                    utilities,
                    policy,
                    iterations,
                    algorithm: self.algorithm(),
                    delta,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::grid_world::{CellKind, Environment, RewardMap, State};
    use crate::mdps::solvers::value_iteration::ValueIteration;
    use float_eq::*;
    use rstest::*;

    use CellKind::{Green as G, Red as R, Wall as W, White as Wh};

    fn six_by_six_env() -> Environment {
        let grid = vec![
            vec![G, W, G, Wh, Wh, G],
            vec![Wh, R, Wh, G, W, R],
            vec![Wh, Wh, R, Wh, G, Wh],
            vec![Wh, Wh, Wh, R, Wh, G],
            vec![Wh, W, W, W, R, Wh],
            vec![Wh, Wh, Wh, Wh, Wh, Wh],
        ];
        Environment::from_kinds(grid, &RewardMap::default(), State::new(5, 0)).unwrap()
    }

    #[test]
    fn rejects_zero_sweeps() {
        assert!(matches!(
            PolicyIteration::new(0.9, 0, 1),
            Err(GridWorldError::InvalidEvaluationSweeps)
        ));
        assert!(matches!(
            PolicyIteration::new(1.5, 10, 1),
            Err(GridWorldError::InvalidGamma(_))
        ));
    }

    #[test]
    fn random_policy_covers_only_valid_states() {
        let env = six_by_six_env();
        let pi = PolicyIteration::new(0.9, 10, 1).unwrap();

        let policy = pi.random_policy(&env, &mut StdRng::seed_from_u64(1));

        for s in env.states() {
            assert_eq!(policy[s.index()].is_some(), env.is_valid_state(&s), "{s}");
        }
    }

    #[test]
    fn evaluation_runs_exactly_k_sweeps() {
        let env = six_by_six_env();
        let pi = PolicyIteration::new(0.9, 7, 1).unwrap();
        let policy = pi.random_policy(&env, &mut StdRng::seed_from_u64(3));
        let mut history = UtilityHistory::new();

        let (_, iterations, _) = pi.policy_evaluation(
            &policy,
            Utilities::zeros((6, 6)),
            &env,
            &mut Some(&mut history),
        );

        assert_eq!(iterations, 7);
        assert!(history.iter().all(|(_, series)| series.len() == 7));
    }

    #[test]
    fn evaluation_uses_the_policy_action() {
        // Always walking into the left border: the agent never leaves (0, 0).
        let env = Environment::new(vec![vec![Wh, G]], vec![vec![-0.04, 1.]], State::new(0, 0)).unwrap();
        let pi = PolicyIteration::new(0.5, 200, 1).unwrap();
        let policy = ndarray::array![[Some(Action::Left), Some(Action::Left)]];

        let (u, _, _) = pi.policy_evaluation(&policy, Utilities::zeros((1, 2)), &env, &mut None);

        assert_float_eq!(u[[0, 0]], -0.04 / (1. - 0.5), abs <= 1e-9);
    }

    #[test]
    fn improvement_never_lowers_expected_utility() {
        let env = six_by_six_env();
        let pi = PolicyIteration::new(0.9, 5, 11).unwrap();
        let before = pi.random_policy(&env, &mut StdRng::seed_from_u64(11));
        let (u, _, _) =
            pi.policy_evaluation(&before, Utilities::zeros((6, 6)), &env, &mut None);

        let mut after = before.clone();
        pi.policy_improvement(&mut after, &u, &env);

        for s in env.states() {
            if let (Some(old), Some(new)) = (before[s.index()], after[s.index()]) {
                assert!(
                    expected_utility(&env, &u, &s, new) >= expected_utility(&env, &u, &s, old),
                    "{s}"
                );
            }
        }
    }

    #[test]
    fn improvement_reports_stability() {
        let env = six_by_six_env();
        let pi = PolicyIteration::new(0.9, 5, 1).unwrap();
        let u = Utilities::zeros((6, 6));

        let mut policy = pi.random_policy(&env, &mut StdRng::seed_from_u64(1));
        pi.policy_improvement(&mut policy, &u, &env);

        assert!(!pi.policy_improvement(&mut policy, &u, &env));
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(50)]
    fn terminates_for_any_k(#[case] k: usize) {
        let env = six_by_six_env();
        let pi = PolicyIteration::new(0.9, k, 5).unwrap();

        let result = pi.solve(&env);

        assert_eq!(result.iterations, k);
        assert_eq!(result.algorithm, Algorithm::PolicyIteration);
        let mut policy = result.policy.clone();
        assert!(!pi.policy_improvement(&mut policy, &result.utilities, &env));
    }

    #[test]
    fn same_seed_is_bit_identical() {
        let env = six_by_six_env();
        let pi = PolicyIteration::new(0.99, 20, 42).unwrap();

        assert_eq!(pi.solve(&env), pi.solve(&env));
        assert_eq!(pi.solve(&env), PolicyIteration::new(0.99, 20, 42).unwrap().solve(&env));
    }

    #[test]
    fn agrees_with_value_iteration() {
        let env = six_by_six_env();
        let vi = ValueIteration::new(0.9, 1e-6).unwrap().solve(&env);
        let pi = PolicyIteration::new(0.9, 500, 7).unwrap().solve(&env);

        assert_float_eq!(
            pi.utilities.iter().copied().collect::<Vec<_>>(),
            vi.utilities.iter().copied().collect::<Vec<_>>(),
            abs_all <= 1e-3
        );
    }

    #[test]
    fn terminal_green_scenario() {
        let env = Environment::new(vec![vec![Wh, G]], vec![vec![-0.04, 1.]], State::new(0, 0))
            .unwrap()
            .with_terminals(&[G]);
        let result = PolicyIteration::new(0.9, 100, 1).unwrap().solve(&env);

        assert_eq!(result.utilities[[0, 1]], 1.0);
        assert_float_eq!(result.utilities[[0, 0]], 0.68 / 0.82, abs <= 1e-6);
        assert_eq!(result.policy[[0, 0]], Some(Action::Right));
        assert_eq!(result.policy[[0, 1]], None);
    }
}
