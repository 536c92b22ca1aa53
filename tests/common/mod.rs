use gridworld_mdp::*;

use CellKind::{Green as G, Red as R, Wall as W, White as Wh};

#[allow(dead_code)]
pub fn six_by_six_env() -> Environment {
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

#[allow(dead_code)]
pub fn two_cell_env() -> Environment {
    Environment::new(vec![vec![Wh, G]], vec![vec![-0.04, 1.]], State::new(0, 0)).unwrap()
}

#[allow(dead_code)]
pub fn valid_states(env: &Environment) -> Vec<State> {
    (0..env.height() as i32)
        .flat_map(|r| (0..env.width() as i32).map(move |c| State::new(r, c)))
        .filter(|s| env.is_valid_state(s))
        .collect()
}
