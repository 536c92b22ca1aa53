use clap::Parser;
use gridworld_mdp::config::Config;
use gridworld_mdp::mdps::history::UtilityHistory;
use gridworld_mdp::mdps::mdp_simulator::simulate_episode;
use gridworld_mdp::mdps::mdp_solver_policy::MdpSolverPolicy;
use gridworld_mdp::mdps::solvers::Algorithm;
use gridworld_mdp::report;
use rand::prelude::*;
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Solve the grid-world MDP with value or policy iteration.
#[derive(Parser)]
#[command(name = "gridworld-mdp", version)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// value_iteration (vi) or policy_iteration (pi).
    #[arg(short, long)]
    algorithm: Option<Algorithm>,

    #[arg(short, long)]
    gamma: Option<f64>,

    /// Seed for the initial policy and for simulated episodes.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write the solve result as JSON.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Record per-sweep utilities and write them as JSON.
    #[arg(long)]
    history: Option<PathBuf>,

    /// Episodes to simulate from the initial state with the solved policy.
    #[arg(long, default_value_t = 0)]
    episodes: usize,

    #[arg(long, default_value_t = 100)]
    max_steps: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(algorithm) = cli.algorithm {
        config.solver.algorithm = algorithm;
    }
    if let Some(gamma) = cli.gamma {
        config.solver.gamma = gamma;
    }
    if let Some(seed) = cli.seed {
        config.solver.seed = seed;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let env = config.build_environment()?;
    let solver = config.solver.build_solver()?;

    let mut history = cli.history.as_ref().map(|_| UtilityHistory::new());
    let result = solver.solve_with_history(&env, history.as_mut());

    println!(
        "{} converged: {} iterations, last delta {:e}",
        result.algorithm, result.iterations, result.delta
    );
    println!("\nUtilities\n{}", report::render_utilities(&result, &env));
    println!("\nPolicy\n{}", report::render_policy(&result, &env));

    if let Some(path) = &cli.json {
        report::write_json(&result, path)?;
        tracing::info!(path = %path.display(), "Wrote result");
    }
    if let (Some(path), Some(history)) = (&cli.history, &history) {
        report::write_history_json(history, path)?;
        tracing::info!(path = %path.display(), states = history.len(), "Wrote utility history");
    }

    if cli.episodes > 0 {
        let policy = MdpSolverPolicy::new(&result);
        let rng = &mut StdRng::seed_from_u64(config.solver.seed);
        let start = env.initial_state();

        println!();
        for i in 0..cli.episodes {
            let ep = simulate_episode(&env, &policy, start, cli.max_steps, rng)?;
            let ret: f64 = ep.iter().skip(1).map(|e| e.r).sum();
            println!(
                "Episode {}: {} steps, return {:.3}, ended at {}",
                i + 1,
                ep.len() - 1,
                ret,
                ep.last().map_or(start, |e| e.s)
            );
        }
    }

    Ok(())
}
