use super::grid_world::CellKind;
use crate::error::{GridWorldError, Result};
use crate::Continous;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

const PROBABILITY_TOLERANCE: Continous = 1e-9;

/// Chance of each cell kind when generating a random grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellProbabilities {
    pub green: Continous,
    pub red: Continous,
    pub wall: Continous,
    pub white: Continous,
}

impl Default for CellProbabilities {
    fn default() -> Self {
        Self {
            green: 0.166,
            red: 0.166,
            wall: 0.168,
            white: 0.5,
        }
    }
}

impl CellProbabilities {
    fn weighted(&self) -> [(CellKind, Continous); 4] {
        [
            (CellKind::Green, self.green),
            (CellKind::Red, self.red),
            (CellKind::Wall, self.wall),
            (CellKind::White, self.white),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct GridGenerator {
    kinds: [CellKind; 4],
    dist: WeightedIndex<Continous>,
}

impl GridGenerator {
    pub fn new(probabilities: CellProbabilities) -> Result<Self> {
        let weighted = probabilities.weighted();
        let total: Continous = weighted.iter().map(|(_, p)| p).sum();
        if weighted.iter().any(|(_, p)| p.is_nan() || *p < 0.)
            || (total - 1.).abs() > PROBABILITY_TOLERANCE
        {
            return Err(GridWorldError::InvalidCellProbabilities(total));
        }

        let dist = WeightedIndex::new(weighted.iter().map(|(_, p)| *p))?;
        Ok(Self {
            kinds: weighted.map(|(k, _)| k),
            dist,
        })
    }

    /// Every cell is drawn independently, row by row.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        height: usize,
        width: usize,
        rng: &mut R,
    ) -> Vec<Vec<CellKind>> {
        (0..height)
            .map(|_| {
                (0..width)
                    .map(|_| self.kinds[self.dist.sample(rng)])
                    .collect()
            })
            .collect()
    }
}
