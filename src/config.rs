use crate::envs::custom_grid::{CellProbabilities, GridGenerator};
use crate::envs::grid_world::{CellKind, Environment, RewardMap, State};
use crate::error::{GridWorldError, Result};
use crate::mdps::solvers::policy_iteration::PolicyIteration;
use crate::mdps::solvers::value_iteration::ValueIteration;
use crate::mdps::solvers::{Algorithm, MdpSolver};
use crate::{Continous, Discrete};
use rand::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default = "default_grid")]
    pub grid: Vec<Vec<CellKind>>,
    #[serde(default = "default_initial_state")]
    pub initial_state: (Discrete, Discrete),
    #[serde(default)]
    pub terminals: Vec<CellKind>,
    #[serde(default)]
    pub rewards: RewardMap,
    /// When present, replaces `grid` with a generated one.
    #[serde(default)]
    pub random: Option<RandomGridConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RandomGridConfig {
    #[serde(default = "default_random_side")]
    pub height: usize,
    #[serde(default = "default_random_side")]
    pub width: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(flatten)]
    pub probabilities: CellProbabilities,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SolverConfig {
    #[serde(default = "default_algorithm")]
    pub algorithm: Algorithm,
    #[serde(default = "default_gamma")]
    pub gamma: Continous,
    #[serde(default = "default_epsilon")]
    pub epsilon: Continous,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_grid() -> Vec<Vec<CellKind>> {
    use CellKind::{Green as G, Red as R, Wall as W, White as Wh};

    vec![
        vec![G, W, G, Wh, Wh, G],
        vec![Wh, R, Wh, G, W, R],
        vec![Wh, Wh, R, Wh, G, Wh],
        vec![Wh, Wh, Wh, R, Wh, G],
        vec![Wh, W, W, W, R, Wh],
        vec![Wh, Wh, Wh, Wh, Wh, Wh],
    ]
}

fn default_initial_state() -> (Discrete, Discrete) {
    (5, 0)
}

fn default_random_side() -> usize {
    6
}

fn default_seed() -> u64 {
    1
}

fn default_algorithm() -> Algorithm {
    Algorithm::PolicyIteration
}

fn default_gamma() -> Continous {
    0.99
}

fn default_epsilon() -> Continous {
    0.1
}

fn default_k() -> usize {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            grid: default_grid(),
            initial_state: default_initial_state(),
            terminals: vec![],
            rewards: RewardMap::default(),
            random: None,
        }
    }
}

impl Default for RandomGridConfig {
    fn default() -> Self {
        Self {
            height: default_random_side(),
            width: default_random_side(),
            seed: default_seed(),
            probabilities: CellProbabilities::default(),
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            gamma: default_gamma(),
            epsilon: default_epsilon(),
            k: default_k(),
            seed: default_seed(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| GridWorldError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn build_environment(&self) -> Result<Environment> {
        self.environment.build()
    }
}

impl EnvironmentConfig {
    pub fn build(&self) -> Result<Environment> {
        let grid = match &self.random {
            Some(random) => {
                let generator = GridGenerator::new(random.probabilities)?;
                let rng = &mut StdRng::seed_from_u64(random.seed);
                info!(
                    height = random.height,
                    width = random.width,
                    seed = random.seed,
                    "Generating random grid"
                );
                generator.generate(random.height, random.width, rng)
            }
            None => self.grid.clone(),
        };

        let initial_state = State::from(self.initial_state);
        Ok(Environment::from_kinds(grid, &self.rewards, initial_state)?
            .with_terminals(&self.terminals))
    }
}

impl SolverConfig {
    pub fn build_solver(&self) -> Result<Box<dyn MdpSolver>> {
        Ok(match self.algorithm {
            Algorithm::ValueIteration => Box::new(ValueIteration::new(self.gamma, self.epsilon)?),
            Algorithm::PolicyIteration => {
                Box::new(PolicyIteration::new(self.gamma, self.k, self.seed)?)
            }
        })
    }
}
