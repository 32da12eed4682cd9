use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::RoadUser;

/// Set of road-user categories involved in one accident.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Involvement(u32);

impl Involvement {
    pub fn insert(&mut self, user: RoadUser) {
        self.0 |= user.bit();
    }

    pub fn contains(&self, user: RoadUser) -> bool {
        self.0 & user.bit() != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = RoadUser> + '_ {
        RoadUser::ALL.into_iter().filter(move |u| self.contains(*u))
    }
}

impl FromIterator<RoadUser> for Involvement {
    fn from_iter<I: IntoIterator<Item = RoadUser>>(iter: I) -> Self {
        let mut involvement = Involvement::default();
        for user in iter {
            involvement.insert(user);
        }
        involvement
    }
}

/// One cleaned accident report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccidentRecord {
    pub case_number: String,
    pub time: NaiveDateTime,
    pub within_built_up_area: bool,
    pub route_number: Option<u32>,
    pub street_name: Option<String>,
    /// `None` when the cell was empty and the run drops missing locations.
    pub route_km_marker: Option<f64>,
    pub gps_x: Option<f64>,
    pub gps_y: Option<f64>,
    #[serde(skip)]
    pub involvement: Involvement,
    pub n_participants: u32,
    pub n_vehicles: u32,
    pub n_diseased: u32,
    pub n_injured: u32,
    /// `None` when the source has no real limit for the location.
    pub speed_limit: Option<u32>,
    pub accident_type: Option<String>,
}

impl AccidentRecord {
    /// A record with every count at zero and no flags set.
    pub fn new(case_number: impl Into<String>, time: NaiveDateTime) -> Self {
        Self {
            case_number: case_number.into(),
            time,
            within_built_up_area: false,
            route_number: None,
            street_name: None,
            route_km_marker: None,
            gps_x: None,
            gps_y: None,
            involvement: Involvement::default(),
            n_participants: 0,
            n_vehicles: 0,
            n_diseased: 0,
            n_injured: 0,
            speed_limit: None,
            accident_type: None,
        }
    }

    /// Fatalities plus injuries.
    pub fn harmed(&self) -> u64 {
        u64::from(self.n_diseased) + u64::from(self.n_injured)
    }

    pub fn involves(&self, user: RoadUser) -> bool {
        self.involvement.contains(user)
    }

    pub fn day(&self) -> NaiveDate {
        self.time.date()
    }

    /// Identity of a report across overlapping filter results.
    pub fn key(&self) -> (&str, NaiveDateTime) {
        (&self.case_number, self.time)
    }
}
