use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::analyzers::rules::CategoryRule;
use crate::analyzers::utility::ratio;
use crate::schema::AccidentRecord;

/// Which accidents a [`CategoryStats`] covers relative to an intervention date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    All,
    /// At or before midnight of the intervention date.
    Before,
    /// Strictly after midnight of the intervention date.
    After,
}

/// Accident and harm counts for one category.
///
/// The per-accident averages are `None` when no accident matched, so an empty
/// category reads as "no data" rather than as zero.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub category: String,
    pub period: Period,
    pub accidents: usize,
    pub harmed: u64,
    pub diseased: u64,
    pub injured: u64,

    pub harmed_per_accident: Option<f64>,
    pub diseased_per_accident: Option<f64>,
    pub injured_per_accident: Option<f64>,
}

impl CategoryStats {
    pub fn from_records<'a, I>(rule: &CategoryRule, period: Period, records: I) -> Self
    where
        I: IntoIterator<Item = &'a AccidentRecord>,
    {
        let mut s = CategoryStats {
            category: rule.name.clone(),
            period,
            ..Default::default()
        };

        for record in records {
            let Some(harm) = rule.harm(record) else {
                continue;
            };
            s.accidents += 1;
            s.harmed += harm;
            s.diseased += u64::from(record.n_diseased);
            s.injured += u64::from(record.n_injured);
        }

        s.harmed_per_accident = ratio(s.harmed, s.accidents);
        s.diseased_per_accident = ratio(s.diseased, s.accidents);
        s.injured_per_accident = ratio(s.injured, s.accidents);
        s
    }

    pub fn has_data(&self) -> bool {
        self.accidents > 0
    }
}

/// Category statistics before and after an intervention (e.g. a barrier being built).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterventionStats {
    pub category: String,
    pub intervention_date: NaiveDate,
    pub before: CategoryStats,
    pub after: CategoryStats,
}

impl InterventionStats {
    pub fn from_records(rule: &CategoryRule, intervention_date: NaiveDate, records: &[AccidentRecord]) -> Self {
        let (after, before): (Vec<&AccidentRecord>, Vec<&AccidentRecord>) = records
            .iter()
            .partition(|r| is_after(r, intervention_date));

        Self {
            category: rule.name.clone(),
            intervention_date,
            before: CategoryStats::from_records(rule, Period::Before, before),
            after: CategoryStats::from_records(rule, Period::After, after),
        }
    }
}

/// `true` when the accident happened after midnight of `date`.
pub fn is_after(record: &AccidentRecord, date: NaiveDate) -> bool {
    record.time > date.and_time(NaiveTime::default())
}
