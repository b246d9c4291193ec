use chrono::NaiveDate;
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use rotaforge::optimizer::runner::OptimizationResult;
use rotaforge::optimizer::SchedulerConfig;
use rotaforge::schedule::Schedule;
use rotaforge::RotaResult;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct RuleScore {
    pub rule: String,
    pub fitness: f64,
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub population: usize,
    pub generations: usize,
    pub cancelled: bool,
    pub fitness: f64,
    pub breakdown: Vec<RuleScore>,
    pub history: Vec<f64>,
}

impl RunSummary {
    pub fn new(config: &SchedulerConfig, result: &OptimizationResult) -> Self {
        Self {
            start: config.start(),
            end: config.end(),
            population: config.population(),
            generations: result.generations,
            cancelled: result.cancelled,
            fitness: result.fitness,
            breakdown: breakdown(config, &result.best),
            history: result.history.clone(),
        }
    }

    pub fn save(&self, path: &Path) -> RotaResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

fn breakdown(config: &SchedulerConfig, schedule: &Schedule) -> Vec<RuleScore> {
    config
        .fitness_breakdown(schedule)
        .into_iter()
        .map(|(kind, fitness)| RuleScore {
            rule: kind.to_string(),
            fitness,
        })
        .collect()
}

pub fn print_fitness_breakdown(config: &SchedulerConfig, schedule: &Schedule) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Rule").add_attribute(Attribute::Bold),
        Cell::new("Fitness").add_attribute(Attribute::Bold),
    ]);
    if let Some(col) = table.column_mut(1) {
        col.set_cell_alignment(CellAlignment::Right);
    }

    let scores = breakdown(config, schedule);
    let total: f64 = scores.iter().map(|s| s.fitness).sum();
    for s in scores {
        let cell = Cell::new(format!("{:.1}", s.fitness));
        let cell = if s.fitness < 0.0 {
            cell.fg(Color::Red)
        } else {
            cell.fg(Color::Green)
        };
        table.add_row(vec![Cell::new(s.rule), cell]);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.1}", total))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
    ]);
    println!("\n{}", table);
}

/// One row per day, one column per active queue.
pub fn print_schedule_grid(schedule: &Schedule) {
    let queues = schedule.registry().active_queues();
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("Day").add_attribute(Attribute::Bold)];
    header.extend(
        queues
            .iter()
            .map(|q| Cell::new(q.name()).add_attribute(Attribute::Bold)),
    );
    table.add_row(header);

    let by_key = schedule.to_map();
    for day in schedule.days() {
        let mut row = vec![Cell::new(day.format("%a %Y-%m-%d"))];
        for q in queues {
            let key = rotaforge::core_types::AssignmentKey::new(day, q.clone());
            let cell = match by_key.get(&key) {
                Some(e) if e.is_incident_manager() => {
                    Cell::new(e.display_name()).fg(Color::Yellow)
                }
                Some(e) => Cell::new(e.display_name()),
                None => Cell::new("-").set_alignment(CellAlignment::Center),
            };
            row.push(cell);
        }
        table.add_row(row);
    }
    println!("\n{}", table);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotaforge::context::RunContext;
    use rotaforge::core_types::{Engineer, Queue};
    use rotaforge::registry::Registry;
    use rotaforge::rules::NoDoubleBookingRule;
    use std::sync::Arc;

    #[test]
    fn test_summary_serializes_breakdown() {
        let registry = Arc::new(
            Registry::new(
                vec![Engineer::new("a", "A", "A", None, false)],
                vec![Queue::new("Primary"), Queue::new("Secondary")],
            )
            .unwrap(),
        );
        let start = NaiveDate::from_ymd_opt(2017, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2017, 6, 3).unwrap();
        let ctx = RunContext::new(registry.clone(), Schedule::empty(registry), start, end).unwrap();
        let mut config = SchedulerConfig::new(&ctx, 2).unwrap();
        config.add_rule(Box::new(NoDoubleBookingRule));

        let best = config.make_random();
        let result = OptimizationResult {
            fitness: config.compute_fitness(&best),
            best,
            generations: 0,
            cancelled: false,
            history: vec![-20000.0],
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        RunSummary::new(&config, &result).save(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["start"], "2017-06-01");
        assert_eq!(json["breakdown"][0]["rule"], "no-double-booking");
        // One engineer on both queues every day.
        assert_eq!(json["fitness"], -20000.0);
    }
}
