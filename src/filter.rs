//! Area-of-interest selection.
//!
//! Records are matched two ways: by GPS bounding box (minus routes known to
//! cross the box by coincidence) and by route identity plus chainage range.
//! The union is deduplicated on `(case_number, time)`.

use anyhow::{Result, bail};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

use crate::normalize::{MISSING_VALUE_PLACEHOLDER, MissingValuePolicy};
use crate::schema::AccidentRecord;

/// Inclusive coordinate box in the dataset's projected GPS units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl BoundingBox {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }

    /// A record without both coordinates is never inside.
    pub fn contains_record(&self, record: &AccidentRecord) -> bool {
        match (record.gps_x, record.gps_y) {
            (Some(x), Some(y)) => self.contains(x, y),
            _ => false,
        }
    }
}

/// A route that falls inside the bounding box without belonging to the area.
///
/// Without `from_km` the whole route is excluded; with it, only known chainage
/// at or beyond `from_km`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteExclusion {
    pub route_number: u32,
    #[serde(default)]
    pub from_km: Option<f64>,
}

impl RouteExclusion {
    pub fn excludes(&self, record: &AccidentRecord) -> bool {
        record.route_number == Some(self.route_number)
            && self
                .from_km
                .is_none_or(|from_km| record.route_km_marker.is_some_and(|km| km >= from_km))
    }
}

/// A stretch of road identified by number or name, with an inclusive chainage range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    #[serde(default)]
    pub route_number: Option<u32>,
    #[serde(default)]
    pub street_name: Option<String>,
    pub start_km: f64,
    pub end_km: f64,
}

impl RouteSegment {
    pub fn matches(&self, record: &AccidentRecord) -> bool {
        let on_route = self
            .route_number
            .is_some_and(|n| record.route_number == Some(n))
            || self
                .street_name
                .as_deref()
                .is_some_and(|name| record.street_name.as_deref() == Some(name));

        on_route
            && record
                .route_km_marker
                .is_some_and(|km| (self.start_km..=self.end_km).contains(&km))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaOfInterest {
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub exclusions: Vec<RouteExclusion>,
    #[serde(default)]
    pub route: Option<RouteSegment>,
}

impl Default for AreaOfInterest {
    /// Stretch of the Tallinn–Rapla–Türi road (route 15) around Saue.
    fn default() -> Self {
        Self {
            bounding_box: Some(BoundingBox {
                x_min: 6_565_550.0,
                x_max: 6_567_850.0,
                y_min: 542_660.0,
                y_max: 544_382.0,
            }),
            exclusions: vec![
                RouteExclusion {
                    route_number: 11154,
                    from_km: None,
                },
                RouteExclusion {
                    route_number: 11153,
                    from_km: Some(0.1),
                },
            ],
            route: Some(RouteSegment {
                route_number: Some(15),
                street_name: Some("TALLINN - RAPLA - TÜRI".to_string()),
                start_km: 18.0,
                end_km: 21.0,
            }),
        }
    }
}

impl AreaOfInterest {
    /// Rejects empty or inverted areas, and areas whose ranges would admit the
    /// imputed placeholder as a real location.
    pub fn validate(&self, policy: MissingValuePolicy) -> Result<()> {
        if self.bounding_box.is_none() && self.route.is_none() {
            bail!("area of interest needs a bounding box, a route, or both");
        }

        if let Some(bbox) = &self.bounding_box {
            if bbox.x_min > bbox.x_max || bbox.y_min > bbox.y_max {
                bail!("bounding box is inverted: {bbox:?}");
            }
            // Coordinates are imputed per cell, so one axis is enough to leak.
            if policy == MissingValuePolicy::Impute
                && ((bbox.x_min..=bbox.x_max).contains(&MISSING_VALUE_PLACEHOLDER)
                    || (bbox.y_min..=bbox.y_max).contains(&MISSING_VALUE_PLACEHOLDER))
            {
                bail!("bounding box contains the missing-value placeholder {MISSING_VALUE_PLACEHOLDER}");
            }
        }

        if let Some(route) = &self.route {
            if route.route_number.is_none() && route.street_name.is_none() {
                bail!("route filter needs a route number or a street name");
            }
            if route.start_km > route.end_km {
                bail!(
                    "route chainage range is inverted: {} > {}",
                    route.start_km,
                    route.end_km
                );
            }
            if policy == MissingValuePolicy::Impute
                && (route.start_km..=route.end_km).contains(&MISSING_VALUE_PLACEHOLDER)
            {
                bail!("route chainage range contains the missing-value placeholder {MISSING_VALUE_PLACEHOLDER}");
            }
        }

        Ok(())
    }
}

/// Selects records inside `area`, deduplicated on `(case_number, time)`.
///
/// Bounding-box matches come first (in input order), followed by route matches
/// not already present.
#[tracing::instrument(skip_all, fields(records = records.len()))]
pub fn filter_area(records: &[AccidentRecord], area: &AreaOfInterest) -> Vec<AccidentRecord> {
    let by_gps: Vec<&AccidentRecord> = match &area.bounding_box {
        Some(bbox) => records
            .iter()
            .filter(|r| bbox.contains_record(r))
            .filter(|r| !area.exclusions.iter().any(|e| e.excludes(r)))
            .collect(),
        None => Vec::new(),
    };

    let by_route: Vec<&AccidentRecord> = match &area.route {
        Some(route) => records.iter().filter(|r| route.matches(r)).collect(),
        None => Vec::new(),
    };

    let (gps_count, route_count) = (by_gps.len(), by_route.len());
    let matched = dedup_by_key(by_gps.into_iter().chain(by_route).cloned());

    info!(
        gps_matches = gps_count,
        route_matches = route_count,
        unique = matched.len(),
        "Area filter applied"
    );

    matched
}

/// Keeps the first record of each `(case_number, time)` pair.
pub fn dedup_by_key<I>(records: I) -> Vec<AccidentRecord>
where
    I: IntoIterator<Item = AccidentRecord>,
{
    let mut seen: HashSet<(String, NaiveDateTime)> = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert((r.case_number.clone(), r.time)))
        .collect()
}
