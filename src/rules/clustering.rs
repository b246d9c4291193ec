//! Shift length and spacing.
//!
//! An engineer's consecutive on-call days form a cluster. The rule prefers
//! clusters of the engineer's optimal length, spaced regularly and at least
//! 3.5 shift lengths apart. The most recent cluster in history is carried
//! into the window so shifts that straddle the boundary are scored whole.

use super::{Rule, RuleKind, HARD_PENALTY};
use crate::context::RunContext;
use crate::core_types::Engineer;
use crate::schedule::Schedule;
use crate::util;
use chrono::{Days, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::io::{self, Write};
use std::sync::Arc;

const DEFAULT_OPTIMAL_DAYS: u32 = 2;
const EXTENDED_OPTIMAL_DAYS: u32 = 4;

const OVER_LENGTH_WEIGHT: f64 = 5.0;
const CLOSE_GAP_WEIGHT: f64 = 10.0;
/// Gaps shorter than this many days are treated as back-to-back shifts.
const MIN_GAP_DAYS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cluster {
    pub start: NaiveDate,
    pub length: u32,
}

impl Cluster {
    fn next_day(&self) -> Option<NaiveDate> {
        self.start.checked_add_days(Days::new(u64::from(self.length)))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterStatistics {
    pub durations: Vec<u32>,
    /// Days between consecutive cluster starts.
    pub gaps: Vec<f64>,
}

impl ClusterStatistics {
    pub fn mean_duration(&self) -> f64 {
        mean(self.durations.iter().map(|d| f64::from(*d)))
    }

    pub fn mean_gap(&self) -> f64 {
        mean(self.gaps.iter().copied())
    }
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    values.sum::<f64>() / n as f64
}

pub struct ClusteringRule {
    /// Last pre-window cluster of every active engineer. Engineers missing
    /// from this map are not scored.
    trailing: HashMap<Arc<Engineer>, Option<Cluster>>,
    extended: HashSet<String>,
}

impl ClusteringRule {
    pub fn new(ctx: &RunContext, extended_rotation: &[String]) -> Self {
        let trailing = ctx
            .registry
            .active_engineers()
            .iter()
            .map(|e| (e.clone(), trailing_cluster(&ctx.history, e, ctx.start)))
            .collect();

        Self {
            trailing,
            extended: extended_rotation.iter().map(|a| a.to_lowercase()).collect(),
        }
    }

    pub fn optimal_duration(&self, engineer: &Engineer) -> u32 {
        if self.extended.contains(&engineer.alias().to_lowercase()) {
            EXTENDED_OPTIMAL_DAYS
        } else {
            DEFAULT_OPTIMAL_DAYS
        }
    }

    pub fn trailing_cluster(&self, engineer: &Engineer) -> Option<Cluster> {
        self.trailing.get(engineer).copied().flatten()
    }

    /// Per-engineer clusters in chronological order.
    pub fn clusters<'a>(&'a self, schedule: &'a Schedule) -> HashMap<&'a Engineer, Vec<Cluster>> {
        let mut days: BTreeMap<NaiveDate, Vec<&Engineer>> = BTreeMap::new();
        for a in schedule {
            if !self.trailing.contains_key(a.engineer.as_ref()) {
                continue;
            }
            let on_day = days.entry(a.date()).or_default();
            if !on_day.contains(&a.engineer.as_ref()) {
                on_day.push(a.engineer.as_ref());
            }
        }

        let mut seen: HashSet<&Engineer> = HashSet::new();
        let mut open: HashMap<&Engineer, Cluster> = HashMap::new();
        let mut done: HashMap<&Engineer, Vec<Cluster>> = HashMap::new();

        for (day, engineers) in &days {
            for &e in engineers {
                if seen.insert(e) {
                    if let Some(t) = self.trailing_cluster(e) {
                        if t.next_day() == Some(*day) {
                            open.insert(e, t);
                        } else {
                            done.entry(e).or_default().push(t);
                        }
                    }
                }

                if let Some(c) = open.get(e) {
                    if c.next_day() != Some(*day) {
                        // A calendar day without any assignments splits the cluster.
                        let closed = *c;
                        done.entry(e).or_default().push(closed);
                        open.remove(e);
                    }
                }

                open.entry(e)
                    .or_insert(Cluster {
                        start: *day,
                        length: 0,
                    })
                    .length += 1;
            }

            let ended: Vec<&Engineer> = open
                .keys()
                .filter(|e| !engineers.contains(e))
                .copied()
                .collect();
            for e in ended {
                if let Some(c) = open.remove(e) {
                    done.entry(e).or_default().push(c);
                }
            }
        }

        for (e, c) in open {
            done.entry(e).or_default().push(c);
        }
        for list in done.values_mut() {
            list.sort_by_key(|c| c.start);
        }
        done
    }

    pub fn clustering_statistics<'a>(
        &'a self,
        schedule: &'a Schedule,
    ) -> HashMap<&'a Engineer, ClusterStatistics> {
        self.clusters(schedule)
            .into_iter()
            .map(|(e, clusters)| {
                let gaps = clusters
                    .windows(2)
                    .map(|w| (w[1].start - w[0].start).num_days() as f64)
                    .collect();
                let durations = clusters.iter().map(|c| c.length).collect();
                (e, ClusterStatistics { durations, gaps })
            })
            .collect()
    }
}

/// The most recent run of consecutive days `engineer` held before `start`.
fn trailing_cluster(history: &Schedule, engineer: &Engineer, start: NaiveDate) -> Option<Cluster> {
    let dates: BTreeSet<NaiveDate> = history
        .iter()
        .filter(|a| a.engineer.as_ref() == engineer && a.date() < start)
        .map(|a| a.date())
        .collect();

    let mut cluster: Option<Cluster> = None;
    for date in dates.into_iter().rev() {
        match cluster.as_mut() {
            None => {
                cluster = Some(Cluster {
                    start: date,
                    length: 1,
                })
            }
            Some(c) if c.start.pred_opt() == Some(date) => {
                c.start = date;
                c.length += 1;
            }
            Some(_) => break,
        }
    }
    cluster
}

impl Rule for ClusteringRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Clustering
    }

    fn compute_fitness(&self, schedule: &Schedule) -> f64 {
        let mut fitness = 0.0;
        for (e, stats) in self.clustering_statistics(schedule) {
            let optimal = f64::from(self.optimal_duration(e));

            let deviation: f64 = stats
                .durations
                .iter()
                .map(|d| (f64::from(*d) - optimal).abs())
                .sum();
            let over: f64 = stats
                .durations
                .iter()
                .map(|d| (f64::from(*d) - optimal).max(0.0))
                .sum();
            let close = stats.gaps.iter().filter(|g| **g < 3.5 * optimal).count() as f64;
            let too_close = stats.gaps.iter().filter(|g| **g < MIN_GAP_DAYS).count() as f64;

            fitness -= deviation
                + OVER_LENGTH_WEIGHT * over
                + util::std_dev(&stats.gaps)
                + CLOSE_GAP_WEIGHT * close
                + HARD_PENALTY * too_close;
        }
        fitness
    }

    fn dump_stats(&self, schedule: &Schedule, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", self.kind())?;

        let mut stats: Vec<_> = self.clustering_statistics(schedule).into_iter().collect();
        stats.sort_by(|a, b| a.0.cmp(b.0));
        for (e, s) in stats {
            let durations: Vec<String> = s.durations.iter().map(|d| d.to_string()).collect();
            let gaps: Vec<String> = s.gaps.iter().map(|g| format!("{:.0}", g)).collect();
            writeln!(out, "{}", e)?;
            writeln!(
                out,
                " Durations=({:.1}) {}",
                s.mean_duration(),
                durations.join(",")
            )?;
            writeln!(out, " Gaps=({:.1}) {}", s.mean_gap(), gaps.join(","))?;
        }
        Ok(())
    }
}
