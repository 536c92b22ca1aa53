use super::{PolicyGrid, Utilities};
use crate::envs::grid_world::{Action, State};
use crate::mdps::history::UtilityHistory;
use crate::mdps::mdp::Mdp;
use crate::error::{GridWorldError, Result};
use crate::Continous;

pub fn check_gamma(gamma: Continous) -> Result<()> {
    if gamma.is_nan() || gamma <= 0. || gamma >= 1. {
        return Err(GridWorldError::InvalidGamma(gamma));
    }

    Ok(())
}

/// Expected utility of the successor state when `a` is attempted from `s`.
pub fn expected_utility(env: &dyn Mdp, utilities: &Utilities, s: &State, a: Action) -> Continous {
    env.state_transformer(s, a)
        .iter()
        .map(|t| utilities[t.next_state.index()] * t.probability)
        .sum()
}

/// Greedy action and its expected utility. The first action in
/// [`Action::ALL`] reaching the maximum wins.
pub fn best_action(env: &dyn Mdp, utilities: &Utilities, s: &State) -> (Action, Continous) {
    let mut best = (Action::ALL[0], expected_utility(env, utilities, s, Action::ALL[0]));
    for a in Action::ALL.into_iter().skip(1) {
        let eu = expected_utility(env, utilities, s, a);
        if eu > best.1 {
            best = (a, eu);
        }
    }

    best
}

/// Greedy policy for every valid, non-terminal state.
pub fn greedy_policy(env: &dyn Mdp, utilities: &Utilities) -> PolicyGrid {
    let mut policy = PolicyGrid::from_elem((env.height(), env.width()), None);
    for s in env.states() {
        if is_decision_state(env, &s) {
            policy[s.index()] = Some(best_action(env, utilities, &s).0);
        }
    }

    policy
}

pub fn is_decision_state(env: &dyn Mdp, s: &State) -> bool {
    env.is_valid_state(s) && !env.is_terminal(s)
}

/// One synchronous sweep. `backup` computes the new utility of a valid,
/// non-terminal state from the previous utilities; terminal states are
/// pinned to their reward. Returns the new utilities and the largest change.
pub fn sweep<F>(
    env: &dyn Mdp,
    utilities: &Utilities,
    history: &mut Option<&mut UtilityHistory>,
    mut backup: F,
) -> (Utilities, Continous)
where
    F: FnMut(&State) -> Continous,
{
    let mut next = utilities.clone();
    let mut delta: Continous = 0.;

    for s in env.states() {
        if !env.is_valid_state(&s) {
            continue;
        }

        let u = if env.is_terminal(&s) {
            env.get_reward(&s)
        } else {
            backup(&s)
        };

        delta = delta.max((u - utilities[s.index()]).abs());
        next[s.index()] = u;

        if let Some(h) = history.as_deref_mut() {
            h.record(s, u);
        }
    }

    (next, delta)
}
