//! Readers for the header-less comma separated inputs.
//!
//! Malformed required cells fail the whole load with the file and line;
//! blank lines are skipped.

use crate::core_types::{Engineer, Queue};
use crate::error::{RotaError, RotaResult};
use crate::util;
use chrono::NaiveDate;
use std::path::Path;
use tracing::debug;

/// `alias,start,end[,queue]`. Without a queue the exclusion covers every
/// queue on those days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRecord {
    pub alias: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub queue: Option<String>,
}

/// `start[,end]`, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HolidayRecord {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// `date,queue,alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideRecord {
    pub date: NaiveDate,
    pub queue: String,
    pub alias: String,
}

struct Row<'p> {
    path: &'p Path,
    line: u64,
    record: csv::StringRecord,
}

impl<'p> Row<'p> {
    fn error(&self, message: impl Into<String>) -> RotaError {
        RotaError::Parse {
            path: self.path.to_path_buf(),
            line: self.line,
            message: message.into(),
        }
    }

    fn required(&self, idx: usize, what: &str) -> RotaResult<&str> {
        match self.record.get(idx) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(self.error(format!("missing {}", what))),
        }
    }

    fn optional(&self, idx: usize) -> Option<&str> {
        self.record.get(idx).filter(|v| !v.is_empty())
    }

    fn date(&self, raw: &str) -> RotaResult<NaiveDate> {
        util::parse_date(raw).ok_or_else(|| self.error(format!("invalid date '{}'", raw)))
    }
}

fn read_rows(path: &Path) -> RotaResult<Vec<Row<'_>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|c| c.is_empty()) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        rows.push(Row { path, line, record });
    }
    Ok(rows)
}

fn parse_bool(row: &Row<'_>, raw: &str) -> RotaResult<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(row.error(format!("invalid flag '{}'", raw))),
    }
}

/// `alias,external name,display name[,start date[,incident manager]]`.
pub fn load_engineers(path: impl AsRef<Path>) -> RotaResult<Vec<Engineer>> {
    let path = path.as_ref();
    let mut engineers = Vec::new();
    for row in read_rows(path)? {
        let alias = row.required(0, "alias")?;
        let external = row.required(1, "external name")?;
        let display = row.required(2, "display name")?;
        let start = row.optional(3).map(|raw| row.date(raw)).transpose()?;
        let incident_manager = match row.optional(4) {
            Some(raw) => parse_bool(&row, raw)?,
            None => false,
        };
        engineers.push(Engineer::new(alias, external, display, start, incident_manager));
    }
    debug!("Loaded {} engineers from {}", engineers.len(), path.display());
    Ok(engineers)
}

/// One queue name per line, in declaration order.
pub fn load_queues(path: impl AsRef<Path>) -> RotaResult<Vec<Queue>> {
    let path = path.as_ref();
    let queues: Vec<Queue> = read_rows(path)?
        .iter()
        .map(|row| row.required(0, "queue name").map(Queue::new))
        .collect::<RotaResult<_>>()?;
    debug!("Loaded {} queues from {}", queues.len(), path.display());
    Ok(queues)
}

pub fn load_exclusions(path: impl AsRef<Path>) -> RotaResult<Vec<ExclusionRecord>> {
    let path = path.as_ref();
    let mut records = Vec::new();
    for row in read_rows(path)? {
        let alias = row.required(0, "alias")?.to_string();
        let start = row.date(row.required(1, "start date")?)?;
        let end = row.date(row.required(2, "end date")?)?;
        if end < start {
            return Err(row.error(format!("end {} is before start {}", end, start)));
        }
        records.push(ExclusionRecord {
            alias,
            start,
            end,
            queue: row.optional(3).map(str::to_string),
        });
    }
    Ok(records)
}

pub fn load_holidays(path: impl AsRef<Path>) -> RotaResult<Vec<HolidayRecord>> {
    let path = path.as_ref();
    let mut records = Vec::new();
    for row in read_rows(path)? {
        let start = row.date(row.required(0, "holiday date")?)?;
        let end = match row.optional(1) {
            Some(raw) => row.date(raw)?,
            None => start,
        };
        records.push(HolidayRecord { start, end });
    }
    Ok(records)
}

pub fn load_overrides(path: impl AsRef<Path>) -> RotaResult<Vec<OverrideRecord>> {
    let path = path.as_ref();
    let mut records = Vec::new();
    for row in read_rows(path)? {
        records.push(OverrideRecord {
            date: row.date(row.required(0, "date")?)?,
            queue: row.required(1, "queue")?.to_string(),
            alias: row.required(2, "alias")?.to_string(),
        });
    }
    Ok(records)
}
