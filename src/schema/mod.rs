//! Canonical column and road-user vocabulary for the accident dataset.
//!
//! Every predicate, filter and export in the crate refers to fields through
//! these enums instead of raw column-name strings, so a renamed column shows up
//! as a missing-column error at load time rather than as a predicate that
//! silently stops matching.

pub mod record;
pub mod translate;

pub use record::{AccidentRecord, Involvement};
pub use translate::{TranslationReport, Translations, rename_with_check};

use serde::{Deserialize, Serialize};

/// A road-user category recorded as an "involves ..." flag on every accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadUser {
    Pedestrian,
    Cyclist,
    PassengerCarDriver,
    MotorcycleDriver,
    MopedDriver,
    BusDriver,
    TruckDriver,
    PublicTransportDriver,
    OffRoadDriver,
    UnderagePerson,
    ProvisionalLicenseDriver,
    UnrestrainedPerson,
    LightElectricVehicleDriver,
    /// Union flag: car, bus, truck, motorcycle, moped or off-road driver.
    MotorVehicleDriver,
    Passenger,
    /// Driver aged 65 or over.
    OldDriver,
}

impl RoadUser {
    pub const ALL: [RoadUser; 16] = [
        RoadUser::Pedestrian,
        RoadUser::Cyclist,
        RoadUser::PassengerCarDriver,
        RoadUser::MotorcycleDriver,
        RoadUser::MopedDriver,
        RoadUser::BusDriver,
        RoadUser::TruckDriver,
        RoadUser::PublicTransportDriver,
        RoadUser::OffRoadDriver,
        RoadUser::UnderagePerson,
        RoadUser::ProvisionalLicenseDriver,
        RoadUser::UnrestrainedPerson,
        RoadUser::LightElectricVehicleDriver,
        RoadUser::MotorVehicleDriver,
        RoadUser::Passenger,
        RoadUser::OldDriver,
    ];

    /// Canonical (translated) column name of the flag.
    pub fn column_name(self) -> &'static str {
        match self {
            RoadUser::Pedestrian => "involves_pedestrian",
            RoadUser::Cyclist => "involves_cyclist",
            RoadUser::PassengerCarDriver => "involves_passenger_car_driver",
            RoadUser::MotorcycleDriver => "involves_motorcycle_driver",
            RoadUser::MopedDriver => "involves_moped_driver",
            RoadUser::BusDriver => "involves_bus_driver",
            RoadUser::TruckDriver => "involves_truck_driver",
            RoadUser::PublicTransportDriver => "involves_public_transport_driver",
            RoadUser::OffRoadDriver => "involves_off_road_driver",
            RoadUser::UnderagePerson => "involves_underage_person",
            RoadUser::ProvisionalLicenseDriver => "involves_provisional_driving_license_driver",
            RoadUser::UnrestrainedPerson => "involves_person_not_using_safety_equipment",
            RoadUser::LightElectricVehicleDriver => {
                "involves_personal_light_electric_vehicle_driver"
            }
            RoadUser::MotorVehicleDriver => "involves_motor_vehicle_driver",
            RoadUser::Passenger => "involves_passenger",
            RoadUser::OldDriver => "involves_old_driver",
        }
    }

    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// A canonical column of the translated accident table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    CaseNumber,
    Time,
    NParticipants,
    NVehicles,
    NDiseased,
    NInjured,
    WithinBuiltUpArea,
    RouteNumber,
    StreetName,
    RouteKmMarker,
    SpeedLimit,
    GpsX,
    GpsY,
    AccidentType,
    Involves(RoadUser),
}

impl Column {
    /// Columns the normalizer cannot run without.
    pub fn required() -> Vec<Column> {
        let mut columns = vec![
            Column::CaseNumber,
            Column::Time,
            Column::NParticipants,
            Column::NVehicles,
            Column::NDiseased,
            Column::NInjured,
            Column::WithinBuiltUpArea,
            Column::RouteNumber,
            Column::StreetName,
            Column::RouteKmMarker,
            Column::SpeedLimit,
            Column::GpsX,
            Column::GpsY,
        ];
        columns.extend(RoadUser::ALL.into_iter().map(Column::Involves));
        columns
    }

    pub fn name(self) -> &'static str {
        match self {
            Column::CaseNumber => "case_number",
            Column::Time => "time",
            Column::NParticipants => "n_participants",
            Column::NVehicles => "n_vehicles",
            Column::NDiseased => "n_diseased",
            Column::NInjured => "n_injured",
            Column::WithinBuiltUpArea => "within_built_up_area",
            Column::RouteNumber => "route_number",
            Column::StreetName => "street_name",
            Column::RouteKmMarker => "route_km_marker",
            Column::SpeedLimit => "speed_limit",
            Column::GpsX => "gps_x",
            Column::GpsY => "gps_y",
            Column::AccidentType => "accident_classification_2",
            Column::Involves(user) => user.column_name(),
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
