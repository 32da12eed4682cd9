use crate::analyzers::rules::CategoryRule;
use crate::analyzers::types::{DayAggregate, DaySeries};
use crate::schema::AccidentRecord;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// Sums the category's adjusted harm per calendar day.
///
/// Every day with at least one matching accident appears, even when its
/// adjusted harm is zero. Days are ascending.
pub fn aggregate_by_day(records: &[AccidentRecord], rule: &CategoryRule) -> DaySeries {
    let mut by_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    let mut matched = 0usize;

    for record in records {
        let Some(harm) = rule.harm(record) else {
            continue;
        };
        matched += 1;
        *by_day.entry(record.day()).or_default() += harm;
    }

    debug!(
        category = %rule.name,
        matched,
        days = by_day.len(),
        "Category aggregated by day"
    );

    DaySeries {
        category: rule.name.clone(),
        days: by_day
            .into_iter()
            .map(|(day, harmed)| DayAggregate { day, harmed })
            .collect(),
    }
}
