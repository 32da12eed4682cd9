//! Type coercion of the translated table into [`AccidentRecord`]s.
//!
//! The source extract uses Estonian conventions: decimal commas, `JAH`/`EI`
//! yes/no tokens and day-first dates in a handful of layouts. Missing
//! chainage/coordinate cells follow the run's [`MissingValuePolicy`]; any other
//! missing required value, and any present value that does not parse, is a
//! [`DataQualityError`] that stops the run.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;

use crate::parser::Table;
use crate::schema::{AccidentRecord, Column, Involvement, RoadUser};

/// Value written into a missing chainage/coordinate cell under
/// [`MissingValuePolicy::Impute`].
pub const MISSING_VALUE_PLACEHOLDER: f64 = -1.0;

/// Source-language "yes" token for `within_built_up_area`.
pub const YES_TOKEN: &str = "jah";

/// Speed limit the source uses for locations without a real limit.
pub const INVALID_SPEED_LIMIT: u32 = 901;

const DATETIME_FORMATS: &[&str] = &[
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

/// How missing `route_km_marker`, `gps_x` and `gps_y` cells are handled.
///
/// One policy applies to a whole run. Rows are kept either way; a missing
/// location only removes a record from the area predicate that needs it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum MissingValuePolicy {
    /// Replace the cell with [`MISSING_VALUE_PLACEHOLDER`] and keep the row.
    #[default]
    Impute,
    /// Leave the cell empty so the record fails the predicate that reads it.
    Drop,
}

/// A fatal data-quality problem in the source table.
#[derive(Debug, Error, PartialEq)]
pub enum DataQualityError {
    #[error("required column '{column}' is missing from the table")]
    MissingColumn { column: &'static str },

    #[error("line {line}: required value for '{column}' is missing")]
    MissingValue { line: usize, column: &'static str },

    #[error("line {line}: cannot parse {value:?} in '{column}' as {expected}")]
    Unparseable {
        line: usize,
        column: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Row counters for one normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeSummary {
    pub rows_read: usize,
    pub rows_used: usize,
    pub imputed_cells: usize,
    /// Location cells left empty under [`MissingValuePolicy::Drop`].
    pub missing_cells: usize,
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub records: Vec<AccidentRecord>,
    pub summary: NormalizeSummary,
}

/// Converts a translated table into typed records.
///
/// # Errors
///
/// Returns a [`DataQualityError`] for a missing required column, a missing
/// required value, or a present value that does not parse.
#[tracing::instrument(skip_all, fields(rows = table.len(), policy = ?policy))]
pub fn normalize(table: &Table, policy: MissingValuePolicy) -> Result<Normalized, DataQualityError> {
    let index = ColumnIndex::resolve(table)?;
    let placeholder = match policy {
        MissingValuePolicy::Impute => Some(MISSING_VALUE_PLACEHOLDER),
        MissingValuePolicy::Drop => None,
    };
    let mut summary = NormalizeSummary::default();
    let mut records = Vec::with_capacity(table.len());

    for (idx, row) in table.rows.iter().enumerate() {
        summary.rows_read += 1;
        let cells = RowCells {
            line: idx + 2,
            row,
            index: &index,
        };

        let location = [
            cells.decimal(Column::RouteKmMarker)?,
            cells.decimal(Column::GpsX)?,
            cells.decimal(Column::GpsY)?,
        ];
        let time_text = cells.required(Column::Time)?;
        let time = parse_timestamp(time_text)
            .ok_or_else(|| cells.unparseable(Column::Time, time_text, "date"))?;

        let mut involvement = Involvement::default();
        for user in RoadUser::ALL {
            if cells.flag(Column::Involves(user))? {
                involvement.insert(user);
            }
        }

        let record = AccidentRecord {
            case_number: cells.required(Column::CaseNumber)?.to_string(),
            time,
            within_built_up_area: parse_yes_token(cells.required(Column::WithinBuiltUpArea)?),
            route_number: cells.integer(Column::RouteNumber)?,
            street_name: cells.optional(Column::StreetName).map(str::to_string),
            route_km_marker: location[0].or(placeholder),
            gps_x: location[1].or(placeholder),
            gps_y: location[2].or(placeholder),
            involvement,
            n_participants: cells.count(Column::NParticipants)?,
            n_vehicles: cells.count(Column::NVehicles)?,
            n_diseased: cells.count(Column::NDiseased)?,
            n_injured: cells.count(Column::NInjured)?,
            speed_limit: cells
                .integer(Column::SpeedLimit)?
                .filter(|limit| *limit != INVALID_SPEED_LIMIT),
            accident_type: cells.optional(Column::AccidentType).map(str::to_string),
        };

        let missing = location.iter().filter(|v| v.is_none()).count();
        match policy {
            MissingValuePolicy::Impute => summary.imputed_cells += missing,
            MissingValuePolicy::Drop => summary.missing_cells += missing,
        }
        records.push(record);
    }

    summary.rows_used = records.len();
    info!(
        rows_read = summary.rows_read,
        rows_used = summary.rows_used,
        imputed_cells = summary.imputed_cells,
        missing_cells = summary.missing_cells,
        "Table normalized"
    );

    Ok(Normalized { records, summary })
}

/// Parses a timestamp in any supported layout, reading slash/dot dates day-first.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Parses a decimal written with either a comma or a period separator.
pub fn parse_locale_decimal(value: &str) -> Option<f64> {
    value
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parses a non-negative integer, tolerating an all-zero fraction (`"15,0"`).
pub fn parse_integer(value: &str) -> Option<u32> {
    let value = value.trim();
    value.parse::<u32>().ok().or_else(|| {
        parse_locale_decimal(value)
            .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= f64::from(u32::MAX))
            .map(|v| v as u32)
    })
}

/// Parses a 0/1-like involvement flag.
///
/// `true`/`false` are accepted so that re-deriving an already boolean column
/// gives the same values.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "1.0" | "1,0" | "true" => Some(true),
        "0" | "0.0" | "0,0" | "false" => Some(false),
        _ => None,
    }
}

/// `true` when the token is the source-language yes token (any case).
///
/// Every other token is `false`; the literal `true` is treated as yes so the
/// derivation is idempotent.
pub fn parse_yes_token(value: &str) -> bool {
    let token = value.trim().to_lowercase();
    token == YES_TOKEN || token == "true"
}

struct ColumnIndex {
    positions: HashMap<Column, usize>,
}

impl ColumnIndex {
    fn resolve(table: &Table) -> Result<Self, DataQualityError> {
        let mut positions = HashMap::new();
        for column in Column::required() {
            let idx = table
                .column_index(column.name())
                .ok_or(DataQualityError::MissingColumn {
                    column: column.name(),
                })?;
            positions.insert(column, idx);
        }
        if let Some(idx) = table.column_index(Column::AccidentType.name()) {
            positions.insert(Column::AccidentType, idx);
        }
        Ok(Self { positions })
    }
}

struct RowCells<'a> {
    line: usize,
    row: &'a [Option<String>],
    index: &'a ColumnIndex,
}

impl<'a> RowCells<'a> {
    fn optional(&self, column: Column) -> Option<&'a str> {
        self.index
            .positions
            .get(&column)
            .and_then(|idx| self.row.get(*idx))
            .and_then(|cell| cell.as_deref())
    }

    fn required(&self, column: Column) -> Result<&'a str, DataQualityError> {
        self.optional(column).ok_or(DataQualityError::MissingValue {
            line: self.line,
            column: column.name(),
        })
    }

    fn unparseable(&self, column: Column, value: &str, expected: &'static str) -> DataQualityError {
        DataQualityError::Unparseable {
            line: self.line,
            column: column.name(),
            value: value.to_string(),
            expected,
        }
    }

    fn decimal(&self, column: Column) -> Result<Option<f64>, DataQualityError> {
        self.optional(column)
            .map(|v| parse_locale_decimal(v).ok_or_else(|| self.unparseable(column, v, "decimal")))
            .transpose()
    }

    fn integer(&self, column: Column) -> Result<Option<u32>, DataQualityError> {
        self.optional(column)
            .map(|v| parse_integer(v).ok_or_else(|| self.unparseable(column, v, "integer")))
            .transpose()
    }

    fn count(&self, column: Column) -> Result<u32, DataQualityError> {
        let value = self.required(column)?;
        parse_integer(value).ok_or_else(|| self.unparseable(column, value, "count"))
    }

    fn flag(&self, column: Column) -> Result<bool, DataQualityError> {
        match self.optional(column) {
            Some(v) => parse_flag(v).ok_or_else(|| self.unparseable(column, v, "flag")),
            None => Ok(false),
        }
    }
}
