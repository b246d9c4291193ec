use crate::cmd::{self, Session};
use crate::reports;
use clap::Args;
use rotaforge::config::Config;
use rotaforge::schedule::Schedule;
use rotaforge::{RotaError, RotaResult};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    #[command(flatten)]
    pub config: Config,

    /// Schedule to score. Defaults to the `--best` file.
    #[arg(long)]
    pub schedule: Option<PathBuf>,
}

pub fn run(args: StatsArgs) -> RotaResult<()> {
    let cfg = &args.config;
    let Session {
        registry,
        ctx,
        config,
        warnings,
    } = cmd::prepare(cfg)?;
    cmd::confirm_warnings(&warnings, true)?;

    let path = args.schedule.as_ref().unwrap_or(&cfg.data.best);
    if !path.exists() {
        return Err(RotaError::Config(format!(
            "schedule '{}' not found",
            path.display()
        )));
    }

    let schedule = Schedule::load(&registry, path)?.within(ctx.start, ctx.end);
    info!(
        "Scoring {} assignments from '{}'",
        schedule.len(),
        path.display()
    );

    cmd::write_stats(&config, &schedule, &cfg.data.stats)?;
    reports::print_fitness_breakdown(&config, &schedule);
    reports::print_schedule_grid(&schedule);
    Ok(())
}
