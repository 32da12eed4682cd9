//! Data types produced by the aggregation pipeline.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analyzers::utility::running_total;

/// Summed harm of one category on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayAggregate {
    pub day: NaiveDate,
    pub harmed: u64,
}

/// Day aggregates of one category, ascending by day with unique days.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySeries {
    pub category: String,
    pub days: Vec<DayAggregate>,
}

impl DaySeries {
    /// Running harm total aligned with `days`.
    pub fn cumulative(&self) -> Vec<u64> {
        running_total(self.days.iter().map(|d| d.harmed))
    }

    pub fn total(&self) -> u64 {
        self.days.iter().map(|d| d.harmed).sum()
    }
}

/// One row of a [`JoinedDaySeries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinedDay {
    pub day: NaiveDate,
    pub harmed: [u64; 2],
    pub cumulative: [u64; 2],
}

/// Two categories aligned on day, zero-filled, with cumulative columns.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedDaySeries {
    pub categories: [String; 2],
    pub rows: Vec<JoinedDay>,
}

impl JoinedDaySeries {
    /// `day`, then `n_harmed_<category>` and `n_harmed_<category>_cumulative`
    /// per category.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec!["day".to_string()];
        names.extend(self.categories.iter().map(|c| harmed_column(c)));
        names.extend(
            self.categories
                .iter()
                .map(|c| format!("{}_cumulative", harmed_column(c))),
        );
        names
    }

    pub fn category_index(&self, category: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == category)
    }

    pub fn harmed_on(&self, day: NaiveDate, category: &str) -> Option<u64> {
        let idx = self.category_index(category)?;
        self.rows.iter().find(|r| r.day == day).map(|r| r.harmed[idx])
    }

    /// Final cumulative harm per category.
    pub fn totals(&self) -> [u64; 2] {
        self.rows.last().map(|r| r.cumulative).unwrap_or_default()
    }
}

pub fn harmed_column(category: &str) -> String {
    format!("n_harmed_{category}")
}
