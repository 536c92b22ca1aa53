use crate::envs::grid_world::State;
use crate::Continous;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// Utility of every visited state after each sweep, for convergence plots.
///
/// Solvers only write to it when one is handed to
/// [`MdpSolver::solve_with_history`](super::solvers::MdpSolver::solve_with_history).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UtilityHistory {
    series: BTreeMap<State, Vec<Continous>>,
}

impl UtilityHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, s: State, u: Continous) {
        self.series.entry(s).or_default().push(u);
    }

    pub fn series(&self, s: &State) -> Option<&[Continous]> {
        self.series.get(s).map(Vec::as_slice)
    }

    /// Number of states with a recorded series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&State, &[Continous])> {
        self.series.iter().map(|(s, v)| (s, v.as_slice()))
    }
}

impl Serialize for UtilityHistory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.series.len()))?;
        for (s, values) in &self.series {
            map.serialize_entry(&s.to_string(), values)?;
        }
        map.end()
    }
}
