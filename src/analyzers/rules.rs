//! Declarative road-user category rules.
//!
//! A category is a named predicate over [`AccidentRecord`] plus an optional
//! harm adjustment. The two built-in framings are expressed as data so new
//! ones can be added from the run configuration.

use serde::{Deserialize, Serialize};

use crate::schema::{AccidentRecord, RoadUser};

pub const MOTOR_VEHICLE: &str = "motor_vehicle";
pub const BICYCLE: &str = "bicycle";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Involves(RoadUser),
    /// Harm (fatalities + injuries) strictly greater than the value.
    HarmedAbove(u32),
    Not(Box<Predicate>),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn matches(&self, record: &AccidentRecord) -> bool {
        match self {
            Predicate::Involves(user) => record.involves(*user),
            Predicate::HarmedAbove(n) => record.harmed() > u64::from(*n),
            Predicate::Not(inner) => !inner.matches(record),
            Predicate::All(all) => all.iter().all(|p| p.matches(record)),
            Predicate::Any(any) => any.iter().any(|p| p.matches(record)),
        }
    }

    fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }
}

/// Harm adjustment applied after a record matches a category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmAdjustment {
    #[default]
    None,
    /// Remove one presumed at-fault participant when more than one person was
    /// harmed. An unharmed at-fault party is not accounted for.
    SubtractAtFault,
}

impl HarmAdjustment {
    pub fn apply(self, harmed: u64) -> u64 {
        match self {
            HarmAdjustment::None => harmed,
            HarmAdjustment::SubtractAtFault if harmed > 1 => harmed - 1,
            HarmAdjustment::SubtractAtFault => harmed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub predicate: Predicate,
    #[serde(default)]
    pub adjustment: HarmAdjustment,
}

impl CategoryRule {
    /// Adjusted harm of `record`, or `None` when it is outside the category.
    pub fn harm(&self, record: &AccidentRecord) -> Option<u64> {
        self.predicate
            .matches(record)
            .then(|| self.adjustment.apply(record.harmed()))
    }
}

/// Built-in motor-vehicle vs bicycle framings.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    /// Every accident flagged for the category counts its full harm.
    #[default]
    Naive,
    /// Harm to other road users, with one presumed at-fault party removed.
    Victims,
}

impl Framing {
    /// Category rules for the framing, motor vehicle first.
    pub fn rules(self) -> Vec<CategoryRule> {
        use Predicate::{All, Any, HarmedAbove, Involves};
        use RoadUser::{Cyclist, LightElectricVehicleDriver, MotorVehicleDriver, Pedestrian};

        match self {
            Framing::Naive => vec![
                CategoryRule {
                    name: MOTOR_VEHICLE.to_string(),
                    predicate: Involves(MotorVehicleDriver),
                    adjustment: HarmAdjustment::None,
                },
                CategoryRule {
                    name: BICYCLE.to_string(),
                    predicate: Involves(Cyclist),
                    adjustment: HarmAdjustment::None,
                },
            ],
            Framing::Victims => vec![
                CategoryRule {
                    name: MOTOR_VEHICLE.to_string(),
                    predicate: All(vec![
                        Involves(MotorVehicleDriver),
                        Any(vec![
                            HarmedAbove(1),
                            Involves(Pedestrian),
                            Involves(Cyclist),
                            Involves(LightElectricVehicleDriver),
                        ]),
                    ]),
                    adjustment: HarmAdjustment::SubtractAtFault,
                },
                CategoryRule {
                    name: BICYCLE.to_string(),
                    predicate: All(vec![
                        Involves(Cyclist),
                        Involves(MotorVehicleDriver).negate(),
                        Any(vec![
                            HarmedAbove(1),
                            Involves(LightElectricVehicleDriver),
                            Involves(Pedestrian),
                        ]),
                    ]),
                    adjustment: HarmAdjustment::SubtractAtFault,
                },
            ],
        }
    }
}
