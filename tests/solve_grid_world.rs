extern crate float_eq;
extern crate gridworld_mdp;
mod common;

use common::*;
use float_eq::*;
use gridworld_mdp::config::Config;
use gridworld_mdp::mdps::mdp_simulator::simulate_episode;
use gridworld_mdp::mdps::mdp_solver_policy::{MdpSolverPolicy, Policy};
use gridworld_mdp::mdps::solvers::policy_iteration::PolicyIteration;
use gridworld_mdp::mdps::solvers::value_iteration::ValueIteration;
use gridworld_mdp::mdps::solvers::Algorithm;
use gridworld_mdp::*;
use rand::prelude::*;
use rstest::*;

fn solver(algorithm: Algorithm, gamma: f64) -> Box<dyn MdpSolver> {
    match algorithm {
        Algorithm::ValueIteration => Box::new(ValueIteration::new(gamma, 1e-6).unwrap()),
        Algorithm::PolicyIteration => Box::new(PolicyIteration::new(gamma, 300, 1).unwrap()),
    }
}

#[rstest]
#[case(Algorithm::ValueIteration)]
#[case(Algorithm::PolicyIteration)]
fn output_contract(#[case] algorithm: Algorithm) {
    let env = six_by_six_env();
    let result = solver(algorithm, 0.9).solve(&env);

    assert_eq!(result.algorithm, algorithm);
    assert_eq!(result.utilities.dim(), (6, 6));
    assert_eq!(result.policy.dim(), (6, 6));
    for r in 0..6 {
        for c in 0..6 {
            let s = State::new(r, c);
            assert_eq!(result.policy[s.index()].is_some(), env.is_valid_state(&s), "{s}");
        }
    }
}

#[rstest]
#[case(Algorithm::ValueIteration)]
#[case(Algorithm::PolicyIteration)]
fn terminal_green_two_cells(#[case] algorithm: Algorithm) {
    let env = two_cell_env().with_terminals(&[CellKind::Green]);
    let result = solver(algorithm, 0.9).solve(&env);

    assert_eq!(result.utilities[[0, 1]], 1.0);
    assert!(result.utilities[[0, 0]] > 0.);
    assert!(result.utilities[[0, 0]] < 1.);
    assert_eq!(result.policy[[0, 0]], Some(Action::Right));
}

#[test]
fn solvers_agree_on_six_by_six_grid() {
    let env = six_by_six_env();
    let vi = solver(Algorithm::ValueIteration, 0.9).solve(&env);
    let pi = solver(Algorithm::PolicyIteration, 0.9).solve(&env);

    for s in valid_states(&env) {
        assert_float_eq!(pi.utilities[s.index()], vi.utilities[s.index()], abs <= 1e-3);
    }
}

#[test]
fn optimal_policy_heads_for_green() {
    let env = six_by_six_env();
    let result = solver(Algorithm::ValueIteration, 0.9).solve(&env);

    // Green corner with a wall to its right: pushing into the border never leaves it.
    assert_eq!(result.policy[[0, 0]], Some(Action::Up));
    // White cell just under a green one.
    assert_eq!(result.policy[[1, 0]], Some(Action::Up));
}

#[test]
fn solved_policy_drives_simulation() {
    let env = six_by_six_env();
    let result = solver(Algorithm::ValueIteration, 0.9).solve(&env);
    let policy = MdpSolverPolicy::new(&result);

    assert_eq!(policy.action(&State::new(0, 1)), None);
    assert_eq!(policy.action(&State::new(-1, 0)), None);
    assert_eq!(policy.action(&State::new(1, 0)), Some(Action::Up));

    let rng = &mut StdRng::seed_from_u64(5);
    let ep = simulate_episode(&env, &policy, env.initial_state(), 30, rng).unwrap();
    assert_eq!(ep.len(), 31);
    assert!(ep.iter().all(|e| env.is_valid_state(&e.s)));
}

#[test]
fn default_config_end_to_end() {
    let config = Config::default();
    let env = config.build_environment().unwrap();
    let mut history = gridworld_mdp::mdps::history::UtilityHistory::new();

    let result = config
        .solver
        .build_solver()
        .unwrap()
        .solve_with_history(&env, Some(&mut history));

    assert_eq!(result.algorithm, Algorithm::PolicyIteration);
    assert_eq!(result.iterations, 300);
    assert_eq!(history.len(), valid_states(&env).len());
}
