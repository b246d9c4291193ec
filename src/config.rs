use crate::error::{RotaError, RotaResult};
use crate::rules::RuleKind;
use crate::schedule::Schedule;
use crate::util::parse_date_arg;
use chrono::{Days, NaiveDate, NaiveTime};
use clap::Args;
use std::path::PathBuf;
use strum::IntoEnumIterator;

#[derive(Args, Debug, Clone, Default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub data: DataPaths,
    #[command(flatten)]
    pub rules: RuleSelection,
}

#[derive(Args, Debug, Clone)]
pub struct SearchParams {
    /// First day to schedule. Defaults to the day after the history ends.
    #[arg(long, value_parser = parse_date_arg)]
    pub start: Option<NaiveDate>,
    /// Day after the last scheduled day. Defaults to `--weeks` after the start.
    #[arg(long, value_parser = parse_date_arg)]
    pub end: Option<NaiveDate>,
    #[arg(long, default_value_t = 4)]
    pub weeks: u64,
    #[arg(long, default_value_t = 300)]
    pub population: usize,
    #[arg(long, default_value_t = 4000)]
    pub generations: usize,
    #[arg(long, default_value_t = 45)]
    pub max_mutation_size: usize,
    #[arg(long, default_value_t = 5)]
    pub tournament_size: usize,
    /// Worker threads for fitness evaluation.
    #[arg(long, default_value_t = 10)]
    pub parallelism: usize,
    /// Hour of day each rotation starts, written into saved schedules.
    #[arg(long, default_value_t = 9, value_parser = clap::value_parser!(u32).range(0..24))]
    pub rotation_start_hour: u32,
    /// Reproducible (non-cryptographic) random source.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            weeks: 4,
            population: 300,
            generations: 4000,
            max_mutation_size: 45,
            tournament_size: 5,
            parallelism: 10,
            rotation_start_hour: 9,
            seed: None,
        }
    }
}

impl SearchParams {
    pub fn rotation_start(&self) -> RotaResult<NaiveTime> {
        NaiveTime::from_hms_opt(self.rotation_start_hour, 0, 0).ok_or_else(|| {
            RotaError::Config(format!("invalid rotation start hour {}", self.rotation_start_hour))
        })
    }

    /// The `[start, end)` window, falling back to history when unset.
    pub fn resolve_window(&self, history: &Schedule) -> RotaResult<(NaiveDate, NaiveDate)> {
        let start = match self.start {
            Some(d) => d,
            None => history
                .max_date()
                .and_then(|d| d.succ_opt())
                .ok_or_else(|| {
                    RotaError::Config("no --start given and the history is empty".into())
                })?,
        };
        let end = match self.end {
            Some(d) => d,
            None => start
                .checked_add_days(Days::new(self.weeks * 7))
                .ok_or_else(|| RotaError::Config("window end out of range".into()))?,
        };
        if start >= end {
            return Err(RotaError::Config(format!(
                "start date {} must be before end date {}",
                start, end
            )));
        }
        Ok((start, end))
    }
}

#[derive(Args, Debug, Clone)]
pub struct DataPaths {
    /// `alias,external name,display name[,start date[,incident manager]]`
    #[arg(long, default_value = "OnCallEngineers.csv")]
    pub engineers: PathBuf,
    /// One queue per line; the first is the primary.
    #[arg(long, default_value = "Queues.csv")]
    pub queues: PathBuf,
    /// Previously published schedule.
    #[arg(long, default_value = "CurrentSchedule.csv")]
    pub history: PathBuf,
    /// `alias,start,end[,queue]`
    #[arg(long)]
    pub vacations: Option<PathBuf>,
    /// `start[,end]`
    #[arg(long)]
    pub holidays: Option<PathBuf>,
    /// `date,queue,alias`
    #[arg(long)]
    pub overrides: Option<PathBuf>,
    /// Best schedule so far; resumed from when present.
    #[arg(long, default_value = "best.csv")]
    pub best: PathBuf,
    #[arg(long, default_value = "stats.txt")]
    pub stats: PathBuf,
    /// JSON run summary.
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            engineers: PathBuf::from("OnCallEngineers.csv"),
            queues: PathBuf::from("Queues.csv"),
            history: PathBuf::from("CurrentSchedule.csv"),
            vacations: None,
            holidays: None,
            overrides: None,
            best: PathBuf::from("best.csv"),
            stats: PathBuf::from("stats.txt"),
            summary: None,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct RuleSelection {
    /// Rules to leave out (comma separated).
    #[arg(long, value_delimiter = ',')]
    pub disable: Vec<RuleKind>,
    /// Include the paid-holiday report.
    #[arg(long, default_value_t = false)]
    pub paid_holiday: bool,
    /// Aliases whose preferred shift is four days.
    #[arg(long, value_delimiter = ',')]
    pub extended_rotation: Vec<String>,
    /// Skip the confirmation prompt on data warnings.
    #[arg(short = 'y', long, default_value_t = false)]
    pub yes: bool,
}

impl RuleSelection {
    /// Enabled rules in evaluation order.
    pub fn enabled(&self) -> Vec<RuleKind> {
        RuleKind::iter()
            .filter(|k| k.enabled_by_default() || (*k == RuleKind::PaidHoliday && self.paid_holiday))
            .filter(|k| !self.disable.contains(k))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{Engineer, Queue};
    use crate::registry::Registry;
    use clap::Parser;
    use std::sync::Arc;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        config: Config,
    }

    #[test]
    fn test_cli_defaults_match_default_impl() {
        let parsed = Harness::parse_from(["rotaforge"]).config;
        let default = Config::default();
        assert_eq!(parsed.search.population, default.search.population);
        assert_eq!(parsed.search.generations, default.search.generations);
        assert_eq!(parsed.search.parallelism, default.search.parallelism);
        assert_eq!(parsed.search.max_mutation_size, 45);
        assert_eq!(parsed.data.best, default.data.best);
        assert!(parsed.rules.disable.is_empty());
    }

    #[test]
    fn test_rule_selection() {
        let parsed = Harness::parse_from([
            "rotaforge",
            "--disable",
            "clustering,fairness",
            "--paid-holiday",
        ])
        .config;
        let enabled = parsed.rules.enabled();
        assert!(!enabled.contains(&RuleKind::Clustering));
        assert!(!enabled.contains(&RuleKind::Fairness));
        assert!(enabled.contains(&RuleKind::PaidHoliday));
        assert!(!RuleSelection::default().enabled().contains(&RuleKind::PaidHoliday));
    }

    #[test]
    fn test_window_defaults_follow_history() {
        let registry = Arc::new(
            Registry::new(
                vec![Engineer::new("a", "A", "A", None, false)],
                vec![Queue::new("Primary")],
            )
            .unwrap(),
        );
        let d = |m, day| NaiveDate::from_ymd_opt(2017, m, day).unwrap();
        let history = Schedule::make_random(&registry, d(5, 1), d(6, 1));

        let params = SearchParams::default();
        assert_eq!(params.resolve_window(&history).unwrap(), (d(6, 1), d(6, 29)));

        let empty = Schedule::empty(registry);
        assert!(params.resolve_window(&empty).is_err());

        let bad = SearchParams {
            start: Some(d(6, 10)),
            end: Some(d(6, 1)),
            ..SearchParams::default()
        };
        assert!(matches!(bad.resolve_window(&history), Err(RotaError::Config(_))));
    }
}
