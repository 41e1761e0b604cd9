// parking_sim/src/simulation/plugins/validation/mod.rs

//! Ends the run: successfully once the provider has seen the mission
//! complete and the linger time has passed, with an error when the scenario
//! duration runs out first.

use crate::prelude::*;
use crate::simulation::plugins::autonomy::VehicleNode;
use crate::simulation::plugins::map_provider::ProviderNode;

pub struct RunMonitorPlugin;

impl Plugin for RunMonitorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            monitor_run.in_set(SimulationSet::Validation),
        );
    }
}

fn monitor_run(
    time: Res<Time>,
    config: Res<ScenarioConfig>,
    provider: Option<Res<ProviderNode>>,
    vehicles: Query<(&Name, &VehicleNode, &GroundTruthPose)>,
    mut exit: EventWriter<AppExit>,
    mut finished: Local<bool>,
) {
    if *finished {
        return;
    }
    let now = time.elapsed_secs_f64();
    let completed_at = provider
        .as_ref()
        .and_then(|p| p.0.provider().completed_at());

    let outcome = match completed_at {
        Some(done) if now >= done + config.simulation.linger_seconds => AppExit::Success,
        _ if now >= config.simulation.duration_seconds => {
            error!(
                "Mission did not complete within {:.1} s.",
                config.simulation.duration_seconds
            );
            AppExit::error()
        }
        _ => return,
    };

    *finished = true;
    report_run(now, provider.as_deref(), &vehicles);
    exit.write(outcome);
}

fn report_run(
    now: f64,
    provider: Option<&ProviderNode>,
    vehicles: &Query<(&Name, &VehicleNode, &GroundTruthPose)>,
) {
    info!("--- Run finished at t = {:.2} s ---", now);

    for (name, node, pose) in vehicles {
        let mission = node.0.mission();
        info!(
            "{}: state {}, true position ({:.2}, {:.2})",
            name.as_str(),
            mission.state(),
            pose.position.x,
            pose.position.y
        );
        match mission.summary() {
            Some(summary) => info!("{}: {}", name.as_str(), summary),
            None => warn!("{}: the mission produced no summary", name.as_str()),
        }
    }

    let Some(provider) = provider else {
        return;
    };
    let provider = provider.0.provider();
    let report = provider.report();
    info!(
        "Provider: map sent {} times, {} results checked ({} correct, {} incorrect, {} unknown)",
        provider.map_sends(),
        report.checked(),
        report.correct,
        report.incorrect,
        report.unknown
    );
    if let Some(accuracy) = report.accuracy() {
        info!("Classification accuracy {:.0}%", accuracy * 100.0);
    }
    if !report.mismatched.is_empty() {
        warn!("Misclassified spots: {}", report.mismatched.join(", "));
    }
    match (&report.free_spot, report.no_free_spots) {
        (Some(id), _) => info!("Vehicle parked in {}", id),
        (None, true) => info!("Vehicle reported no free spots"),
        (None, false) => {}
    }
}
