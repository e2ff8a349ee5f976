use clap::Parser;
use std::process;

use common::Config;
use grounder::{BlockGrounder, Grounder, RecursiveGrounder};
use lifting::LiftedSolver;
use logkb::FactBase;
use rlp::flow::{max_flow, NETWORK};
use rlp::RlpError;
use solver::{DenseSimplex, LpSolver, SolverOptions};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse command line arguments
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level())),
        )
        .init();

    if let Err(e) = run(&config) {
        error!("{e}");
        process::exit(1);
    }
}

/// Solves the bundled max flow network with the configured strategies.
fn run(config: &Config) -> Result<(), RlpError> {
    let mut kb = FactBase::new();
    kb.load(NETWORK)?;

    let grounder: Box<dyn Grounder + '_> = if config.is_recursive() {
        Box::new(RecursiveGrounder::new(&kb))
    } else {
        Box::new(BlockGrounder::new(&kb))
    };

    let simplex = DenseSimplex::new(SolverOptions {
        max_iterations: config.max_iterations,
        tolerance: config.tolerance,
    });
    let solver: Box<dyn LpSolver> = if config.lifting_enabled() {
        Box::new(LiftedSolver::new(simplex))
    } else {
        Box::new(simplex)
    };

    let mut problem = max_flow(grounder, solver, "a", "g")?;
    print!("{problem}");
    let status = problem.solve()?;
    println!("status: {status}");
    if let Some(solution) = problem.solution() {
        print!("{solution}");
    }
    Ok(())
}
