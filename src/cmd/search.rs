use crate::cmd::{self, Session};
use crate::reports;
use clap::Args;
use rotaforge::config::Config;
use rotaforge::optimizer::runner::{OptimizationOptions, Optimizer, ProgressCallback};
use rotaforge::schedule::Schedule;
use rotaforge::RotaResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub config: Config,

    /// Wall-clock limit in seconds; stops the running generation loop.
    #[arg(short = 'T', long)]
    pub time: Option<u64>,

    /// Back-to-back searches, each resuming from the previous best.
    #[arg(short = 'a', long)]
    pub attempts: Option<usize>,

    /// Print the final schedule as a table.
    #[arg(long, default_value_t = false)]
    pub grid: bool,
}

struct LogProgress;

impl ProgressCallback for LogProgress {
    fn on_generation(&self, generation: usize, best: f64, second: f64, worst: f64) -> bool {
        info!(
            "Gen={}, Best={}, Best2={}, Worst={}",
            generation, best, second, worst
        );
        true
    }
}

pub fn run(args: SearchArgs) -> RotaResult<()> {
    let cfg = &args.config;
    let Session {
        config, warnings, ..
    } = cmd::prepare(cfg)?;

    if !cmd::confirm_warnings(&warnings, cfg.rules.yes)? {
        warn!("Aborted by operator");
        return Ok(());
    }

    let mut best: Option<Schedule> = None;
    if cfg.data.best.exists() {
        info!("Resuming from '{}'", cfg.data.best.display());
        let loaded = Schedule::load(config.registry(), &cfg.data.best)?;
        let fitted = loaded.fit_to_window(config.start(), config.end());
        info!("Resumed fitness: {}", config.compute_fitness(&fitted));
        config.dump_stats(&fitted, &mut std::io::stdout())?;
        best = Some(fitted);
    }

    let cancel = Arc::new(AtomicBool::new(false));
    if let Some(secs) = args.time {
        let flag = cancel.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            flag.store(true, Ordering::Relaxed);
        });
    }

    let max_attempts = match (args.time, args.attempts) {
        (_, Some(a)) => a,
        (Some(_), None) => usize::MAX,
        (None, None) => 1,
    };

    let optimizer = Optimizer::new(config.clone(), OptimizationOptions::from(&cfg.search))?;
    let started = Instant::now();

    for attempt in 1..=max_attempts {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        info!("Attempt #{}", attempt);

        let result = optimizer.run(best.take(), &cancel, &LogProgress)?;
        info!(
            "Attempt #{} finished after {} generations ({:.1?}): fitness {}",
            attempt,
            result.generations,
            started.elapsed(),
            result.fitness
        );

        result.best.save(&cfg.data.best)?;
        cmd::write_stats(&config, &result.best, &cfg.data.stats)?;
        if let Some(path) = &cfg.data.summary {
            reports::RunSummary::new(&config, &result).save(path)?;
        }
        reports::print_fitness_breakdown(&config, &result.best);
        if args.grid {
            reports::print_schedule_grid(&result.best);
        }

        best = Some(result.best);
        if result.cancelled {
            break;
        }
    }

    Ok(())
}
