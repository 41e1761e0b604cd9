// parking_sim/src/main.rs

use bevy::prelude::*;
use clap::Parser;

use parking_sim::cli::Cli;
use parking_sim::headless_app;
use parking_sim::simulation::config::ScenarioConfig;

fn main() -> AppExit {
    let cli = Cli::parse();

    // --- 1. Load Simulation Configuration ---
    let config = match ScenarioConfig::load(&cli.scenario) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load scenario '{}': {}", cli.scenario.display(), e);
            return AppExit::error();
        }
    };

    // --- 2. Build and Run the App ---
    let mut app = headless_app(config, cli.realtime, Some(&cli.log_filter));
    app.insert_resource(cli);
    app.run()
}
