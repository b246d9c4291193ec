//! Fitness rules. Each rule scores a schedule; higher is better and every
//! current rule is a penalty (non-positive).

pub mod clustering;
pub mod double_booking;
pub mod fairness;
pub mod incident_manager;
pub mod paid_holiday;
pub mod participation;
pub mod vacation;

pub use clustering::ClusteringRule;
pub use double_booking::NoDoubleBookingRule;
pub use fairness::FairnessRule;
pub use incident_manager::IncidentManagerRule;
pub use paid_holiday::PaidHolidayRule;
pub use participation::EveryoneParticipatesRule;
pub use vacation::VacationRule;

use crate::context::RunContext;
use crate::loader::{ExclusionRecord, HolidayRecord};
use crate::schedule::Schedule;
use std::io::{self, Write};
use strum_macros::{Display, EnumIter, EnumString};

/// Penalty used by the hard rules.
pub const HARD_PENALTY: f64 = 10_000.0;

pub trait Rule: Send + Sync {
    fn kind(&self) -> RuleKind;

    fn compute_fitness(&self, schedule: &Schedule) -> f64;

    /// Human-readable diagnostics. Never affects fitness.
    fn dump_stats(&self, _schedule: &Schedule, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, EnumIter, EnumString, Display, PartialEq, Eq, Hash)]
#[strum(serialize_all = "kebab-case")]
pub enum RuleKind {
    NoDoubleBooking,
    Clustering,
    Fairness,
    EveryoneParticipates,
    IncidentManager,
    Vacation,
    PaidHoliday,
}

impl RuleKind {
    /// The paid-holiday report is opt-in.
    pub fn enabled_by_default(&self) -> bool {
        !matches!(self, RuleKind::PaidHoliday)
    }
}

/// External data some rules are built from.
#[derive(Debug, Clone, Default)]
pub struct RuleInputs {
    pub exclusions: Vec<ExclusionRecord>,
    pub holidays: Vec<HolidayRecord>,
    /// Aliases whose preferred shift is four days instead of two.
    pub extended_rotation: Vec<String>,
}

pub fn build_rule(kind: RuleKind, ctx: &RunContext, inputs: &RuleInputs) -> Box<dyn Rule> {
    match kind {
        RuleKind::NoDoubleBooking => Box::new(NoDoubleBookingRule),
        RuleKind::Clustering => Box::new(ClusteringRule::new(ctx, &inputs.extended_rotation)),
        RuleKind::Fairness => Box::new(FairnessRule::new(ctx)),
        RuleKind::EveryoneParticipates => Box::new(EveryoneParticipatesRule::new(ctx)),
        RuleKind::IncidentManager => Box::new(IncidentManagerRule),
        RuleKind::Vacation => Box::new(VacationRule::new(ctx, &inputs.exclusions)),
        RuleKind::PaidHoliday => Box::new(PaidHolidayRule::new(ctx, &inputs.holidays)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_rule_names_round_trip() {
        for kind in RuleKind::iter() {
            assert_eq!(RuleKind::from_str(&kind.to_string()).unwrap(), kind);
        }
        assert_eq!(RuleKind::NoDoubleBooking.to_string(), "no-double-booking");
        assert!(RuleKind::from_str("nonsense").is_err());
    }

    #[test]
    fn test_only_paid_holiday_is_opt_in() {
        let disabled: Vec<_> = RuleKind::iter()
            .filter(|k| !k.enabled_by_default())
            .collect();
        assert_eq!(disabled, vec![RuleKind::PaidHoliday]);
    }
}
