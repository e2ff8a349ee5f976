//! Command line argument parsing for relational LP tools.

use clap::{ArgAction, Parser, ValueEnum};

/// Grounding strategy used to build the LP
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum GrounderKind {
    /// One bulk knowledge base query per summand.
    /// Rows are assembled from the joined answers,
    /// which suits backends with fast set-at-a-time queries.
    #[default]
    Block,
    /// One instance per constraint answer, expanded by substitution.
    /// Resolves every fact individually.
    Recursive,
}

/// Command line arguments for relational LP tools
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Choose grounding strategy (block = bulk queries per summand, recursive = per-instance substitution)
    #[arg(long, value_enum, default_value = "block", value_name = "STRATEGY")]
    pub grounder: GrounderKind,

    /// Compress the grounded LP by symmetry before solving
    #[arg(long, short = 'L', action = ArgAction::SetTrue)]
    pub lifted: bool,

    /// Pivot limit of the simplex solver
    #[arg(long, default_value_t = 10_000, value_name = "N")]
    pub max_iterations: usize,

    /// Pivot and feasibility tolerance of the simplex solver
    #[arg(long, default_value_t = 1e-9, value_name = "EPS")]
    pub tolerance: f64,

    /// Log filter used when RUST_LOG is unset (e.g. "info", "grounder=trace")
    #[arg(long, default_value = "info", value_name = "FILTER")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grounder: GrounderKind::default(),
            lifted: false,
            max_iterations: 10_000,
            tolerance: 1e-9,
            log_level: "info".into(),
        }
    }
}

impl Config {
    pub fn grounder(&self) -> GrounderKind {
        self.grounder
    }

    pub fn is_recursive(&self) -> bool {
        self.grounder == GrounderKind::Recursive
    }

    pub fn lifting_enabled(&self) -> bool {
        self.lifted
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_parsed_defaults() {
        let parsed = Config::parse_from(["rlp"]);
        let default = Config::default();
        assert_eq!(parsed.grounder, default.grounder);
        assert_eq!(parsed.lifted, default.lifted);
        assert_eq!(parsed.max_iterations, default.max_iterations);
        assert_eq!(parsed.tolerance, default.tolerance);
        assert_eq!(parsed.log_level, default.log_level);
    }

    #[test]
    fn flags() {
        let config = Config::parse_from([
            "rlp",
            "--grounder",
            "recursive",
            "--lifted",
            "--max-iterations",
            "50",
            "--log-level",
            "debug",
        ]);
        assert!(config.is_recursive());
        assert!(config.lifting_enabled());
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.log_level(), "debug");
    }
}
