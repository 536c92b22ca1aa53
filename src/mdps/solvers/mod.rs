pub mod common;
pub mod policy_iteration;
pub mod value_iteration;

use super::history::UtilityHistory;
use super::mdp::Mdp;
use crate::envs::grid_world::Action;
use crate::error::{GridWorldError, Result};
use crate::Continous;
use ndarray::Array2;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type Utilities = Array2<Continous>;

/// `None` for walls and terminal cells.
pub type PolicyGrid = Array2<Option<Action>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    #[serde(alias = "vi")]
    ValueIteration,
    #[serde(alias = "pi")]
    PolicyIteration,
}

impl Algorithm {
    pub fn tag(&self) -> &'static str {
        match self {
            Algorithm::ValueIteration => "value_iteration",
            Algorithm::PolicyIteration => "policy_iteration",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Algorithm {
    type Err = GridWorldError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "value_iteration" | "vi" => Ok(Algorithm::ValueIteration),
            "policy_iteration" | "pi" => Ok(Algorithm::PolicyIteration),
            other => Err(GridWorldError::UnknownAlgorithm(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveResult {
    #[serde(serialize_with = "serialize_rows")]
    pub utilities: Utilities,
    #[serde(serialize_with = "serialize_rows")]
    pub policy: PolicyGrid,
    /// Sweeps until convergence (value iteration) or sweeps of the final
    /// evaluation round (policy iteration).
    pub iterations: usize,
    pub algorithm: Algorithm,
    /// Largest utility change of the last sweep.
    pub delta: Continous,
}

pub trait MdpSolver {
    fn algorithm(&self) -> Algorithm;

    fn solve_with_history(
        &self,
        env: &dyn Mdp,
        history: Option<&mut UtilityHistory>,
    ) -> SolveResult;

    fn solve(&self, env: &dyn Mdp) -> SolveResult {
        self.solve_with_history(env, None)
    }
}

fn serialize_rows<T, S>(m: &Array2<T>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: Serialize + Clone,
    S: Serializer,
{
    let mut seq = serializer.serialize_seq(Some(m.nrows()))?;
    for row in m.outer_iter() {
        seq.serialize_element(&row.to_vec())?;
    }
    seq.end()
}
