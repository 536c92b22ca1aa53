use super::mdp::Transition;
use super::mdp_solver_policy::Policy;
use crate::envs::grid_world::{Environment, State};
use crate::error::{GridWorldError, Result};
use crate::Continous;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EpisodeEvent {
    pub s: State,
    pub r: Continous,
}

pub trait Weighted<S> {
    fn s(&self) -> S;

    fn p(&self) -> Continous;
}

impl Weighted<State> for Transition {
    fn s(&self) -> State {
        self.next_state
    }

    fn p(&self) -> Continous {
        self.probability
    }
}

pub fn pick_next<T, S, R>(rng: &mut R, ts: &[T]) -> Result<S>
where
    T: Weighted<S>,
    R: Rng + ?Sized,
{
    let dist = WeightedIndex::new(ts.iter().map(|item| item.p()))?;
    Ok(ts[dist.sample(rng)].s())
}

/// Rolls out `policy` from `start` until a terminal cell, a cell without an
/// action, or `max_steps` moves.
pub fn simulate_episode<P, R>(
    env: &Environment,
    policy: &P,
    start: State,
    max_steps: usize,
    rng: &mut R,
) -> Result<Vec<EpisodeEvent>>
where
    P: Policy + ?Sized,
    R: Rng + ?Sized,
{
    if !env.is_valid_state(&start) {
        return Err(GridWorldError::InvalidState(start));
    }

    let mut ep = vec![EpisodeEvent {
        s: start,
        r: env.get_reward(&start),
    }];

    let mut s = start;
    for _ in 0..max_steps {
        if env.is_terminal(&s) {
            break;
        }
        let Some(a) = policy.action(&s) else {
            break;
        };

        let (next, r) = env.step(&s, a, rng)?;
        ep.push(EpisodeEvent { s: next, r });
        s = next;
    }

    tracing::debug!(start = %start, steps = ep.len() - 1, "Simulated episode");
    Ok(ep)
}
