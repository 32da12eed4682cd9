use anyhow::{Result, ensure};
use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::analyzers::types::{DaySeries, JoinedDay, JoinedDaySeries};

/// Outer-joins two category series on day.
///
/// A day present in only one series has zero harm in the other. Rows are
/// ascending by day and carry running totals per category.
pub fn join_categories(x: &DaySeries, y: &DaySeries) -> Result<JoinedDaySeries> {
    ensure!(
        x.category != y.category,
        "cannot join category '{}' with itself",
        x.category
    );

    let mut by_day: BTreeMap<NaiveDate, [u64; 2]> = BTreeMap::new();
    for (slot, series) in [x, y].into_iter().enumerate() {
        for aggregate in &series.days {
            by_day.entry(aggregate.day).or_default()[slot] += aggregate.harmed;
        }
    }

    let mut totals = [0u64; 2];
    let rows = by_day
        .into_iter()
        .map(|(day, harmed)| {
            totals[0] += harmed[0];
            totals[1] += harmed[1];
            JoinedDay {
                day,
                harmed,
                cumulative: totals,
            }
        })
        .collect();

    Ok(JoinedDaySeries {
        categories: [x.category.clone(), y.category.clone()],
        rows,
    })
}
