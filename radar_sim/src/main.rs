// radar_sim/src/main.rs

use clap::Parser;
use radar_sim::prelude::*;
use tracing::info;

fn main() -> Result<(), ScenarioError> {
    let cli = Cli::parse();
    init_logging(&cli.log);

    let catalog = load_catalog(&cli.catalog)?;
    let scenario = load_scenario(&cli.scenario, &catalog)?;

    if cli.dump_config {
        println!("{}", scenario.to_toml()?);
        return Ok(());
    }

    let mut runner = SimulationRunner::new(&scenario);
    let summary = runner.run(cli.steps);
    info!(
        "Finished {} step(s), {:.2} s of simulated time",
        summary.steps, summary.sim_time
    );

    for radar in runner.radars() {
        let Some(scan) = radar.snapshot().latest() else {
            info!("Radar '{}' never completed a scan", radar.name());
            continue;
        };
        info!(
            "Radar '{}' last scan #{}: {} report(s)",
            radar.name(),
            scan.measurement_counter,
            scan.payload.len()
        );
    }
    Ok(())
}
