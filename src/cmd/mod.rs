pub mod search;
pub mod stats;

use rotaforge::config::Config;
use rotaforge::constraints::{ManualOverrideConstraint, RotateByQueueConstraint};
use rotaforge::context::RunContext;
use rotaforge::loader;
use rotaforge::optimizer::SchedulerConfig;
use rotaforge::random::StrongRandom;
use rotaforge::registry::Registry;
use rotaforge::rules::{self, RuleInputs, RuleKind, VacationRule};
use rotaforge::schedule::Schedule;
use rotaforge::RotaResult;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything loaded and built for one invocation.
pub struct Session {
    pub registry: Arc<Registry>,
    pub ctx: RunContext,
    pub config: Arc<SchedulerConfig>,
    pub warnings: Vec<String>,
}

pub fn prepare(cfg: &Config) -> RotaResult<Session> {
    let engineers = loader::load_engineers(&cfg.data.engineers)?;
    let queues = loader::load_queues(&cfg.data.queues)?;

    let mut registry =
        Registry::new(engineers, queues)?.with_rotation_start(cfg.search.rotation_start()?);
    if let Some(seed) = cfg.search.seed {
        info!("Using seeded random source ({})", seed);
        registry = registry.with_random(Arc::new(StrongRandom::with_seed(seed)));
    }
    let registry = Arc::new(registry);
    info!(
        "Loaded {} engineers, {} queues",
        registry.active_engineers().len(),
        registry.active_queues().len()
    );

    let history = if cfg.data.history.exists() {
        Schedule::load(&registry, &cfg.data.history)?
    } else {
        warn!(
            "History '{}' not found; starting without history",
            cfg.data.history.display()
        );
        Schedule::empty(registry.clone())
    };

    let (start, end) = cfg.search.resolve_window(&history)?;
    let ctx = RunContext::new(registry.clone(), history, start, end)?;
    info!("Scheduling {} to {} ({} days)", start, end, ctx.window_days());

    let inputs = RuleInputs {
        exclusions: load_optional(cfg.data.vacations.as_deref(), |p| loader::load_exclusions(p))?,
        holidays: load_optional(cfg.data.holidays.as_deref(), |p| loader::load_holidays(p))?,
        extended_rotation: cfg.rules.extended_rotation.clone(),
    };
    let overrides = load_optional(cfg.data.overrides.as_deref(), |p| loader::load_overrides(p))?;

    let mut config = SchedulerConfig::new(&ctx, cfg.search.population)?
        .with_tournament_size(cfg.search.tournament_size)?;
    config.add_constraint(Box::new(ManualOverrideConstraint::new(&registry, &overrides)));
    config.add_constraint(Box::new(RotateByQueueConstraint::new(
        registry.clone(),
        &ctx.history,
    )));

    let mut warnings = Vec::new();
    for kind in cfg.rules.enabled() {
        if kind == RuleKind::Vacation {
            let rule = VacationRule::new(&ctx, &inputs.exclusions);
            warnings.extend(rule.warnings().iter().cloned());
            config.add_rule(Box::new(rule));
        } else {
            config.add_rule(rules::build_rule(kind, &ctx, &inputs));
        }
    }
    let names: Vec<String> = config.rules().map(|k| k.to_string()).collect();
    info!("Rules: {}", names.join(", "));

    Ok(Session {
        registry,
        ctx,
        config: Arc::new(config),
        warnings,
    })
}

fn load_optional<T, F>(path: Option<&Path>, load: F) -> RotaResult<Vec<T>>
where
    F: FnOnce(&Path) -> RotaResult<Vec<T>>,
{
    match path {
        Some(p) => load(p),
        None => Ok(Vec::new()),
    }
}

/// Shows data warnings and waits for the operator. Returns false to abort.
pub fn confirm_warnings(warnings: &[String], assume_yes: bool) -> RotaResult<bool> {
    if warnings.is_empty() {
        return Ok(true);
    }
    for w in warnings {
        warn!("{}", w);
    }
    if assume_yes {
        return Ok(true);
    }

    print!("Warnings detected, please double check then press ENTER to continue (n to abort)... ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(!answer.trim().eq_ignore_ascii_case("n"))
}

/// Dumps per-rule stats to stdout and to `path`.
pub fn write_stats(config: &SchedulerConfig, schedule: &Schedule, path: &Path) -> RotaResult<()> {
    let mut buf = Vec::new();
    config.dump_stats(schedule, &mut buf)?;
    io::stdout().write_all(&buf)?;
    fs::write(path, &buf)?;
    Ok(())
}
