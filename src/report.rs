//! Plain-text rendering and JSON export of solver output.

use crate::envs::grid_world::{CellKind, Environment, State};
use crate::error::{GridWorldError, Result};
use crate::mdps::history::UtilityHistory;
use crate::mdps::solvers::SolveResult;
use itertools::Itertools;
use serde::Serialize;
use std::fs;
use std::path::Path;

const WALL: &str = "#";

/// Utilities to three decimals, one grid row per line.
pub fn render_utilities(result: &SolveResult, env: &Environment) -> String {
    result
        .utilities
        .outer_iter()
        .enumerate()
        .map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(|(c, u)| {
                    if is_wall(env, r, c) {
                        format!("{WALL:>7}")
                    } else {
                        format!("{u:>7.3}")
                    }
                })
                .join(" ")
        })
        .join("\n")
}

/// Policy arrows; `#` for walls and `.` for cells without an action.
pub fn render_policy(result: &SolveResult, env: &Environment) -> String {
    result
        .policy
        .outer_iter()
        .enumerate()
        .map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(|(c, a)| match a {
                    Some(a) => a.arrow().to_string(),
                    None if is_wall(env, r, c) => WALL.to_string(),
                    None => ".".to_string(),
                })
                .join(" ")
        })
        .join("\n")
}

fn is_wall(env: &Environment, r: usize, c: usize) -> bool {
    env.cell(&State::new(r as i32, c as i32)) == Some(CellKind::Wall)
}

pub fn write_json<P: AsRef<Path>>(result: &SolveResult, path: P) -> Result<()> {
    write_pretty(result, path.as_ref())
}

pub fn write_history_json<P: AsRef<Path>>(history: &UtilityHistory, path: P) -> Result<()> {
    write_pretty(history, path.as_ref())
}

fn write_pretty<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|source| GridWorldError::Io {
        path: path.display().to_string(),
        source,
    })
}
