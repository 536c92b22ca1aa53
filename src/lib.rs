extern crate rand;
extern crate serde;
extern crate serde_json;

pub mod config;
pub mod envs;
pub mod error;
pub mod mdps;
pub mod report;

pub use envs::grid_world::{Action, CellKind, Environment, RewardMap, State};
pub use error::{GridWorldError, Result};
pub use mdps::solvers::{MdpSolver, SolveResult};

pub type Discrete = i32;
pub type Continous = f64;
