// parking_sim/src/cli.rs

use bevy::prelude::Resource;
use clap::Parser;
use std::path::PathBuf;

/// Headless parking-spot finder: drives a simulated car down a lot, scans
/// each surveyed spot with its lidar and parks in the first free one.
#[derive(Parser, Debug, Resource, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/default.toml")]
    pub scenario: PathBuf,

    /// Log filter in `RUST_LOG` syntax.
    #[arg(long, default_value = "info,parking_sim=debug,parking_core=debug")]
    pub log_filter: String,

    /// Pace the loop by the wall clock instead of running as fast as possible.
    #[arg(long, default_value_t = false)]
    pub realtime: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_bundled_scenario() {
        let cli = Cli::parse_from(["parking_sim"]);
        assert_eq!(cli.scenario, PathBuf::from("assets/scenarios/default.toml"));
        assert!(!cli.realtime);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "parking_sim",
            "-s",
            "other.toml",
            "--realtime",
            "--log-filter",
            "warn",
        ]);
        assert_eq!(cli.scenario, PathBuf::from("other.toml"));
        assert!(cli.realtime);
        assert_eq!(cli.log_filter, "warn");
    }
}
