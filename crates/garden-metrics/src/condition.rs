//! Condition status encoding.

use garden_state::Condition;

/// Health state of a single condition, exported as a small integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionStatus {
    Unknown,
    Unhealthy,
    Healthy,
    Progressing,
}

impl ConditionStatus {
    /// Map a raw status string. Matching is case-sensitive and anything
    /// unrecognized is `Unknown`.
    pub fn from_status(raw: &str) -> Self {
        match raw {
            "True" => ConditionStatus::Healthy,
            "False" => ConditionStatus::Unhealthy,
            "Progressing" => ConditionStatus::Progressing,
            _ => ConditionStatus::Unknown,
        }
    }

    /// Exported sample value: -1=Unknown, 0=Unhealthy, 1=Healthy, 2=Progressing.
    pub fn value(self) -> f64 {
        match self {
            ConditionStatus::Unknown => -1.0,
            ConditionStatus::Unhealthy => 0.0,
            ConditionStatus::Healthy => 1.0,
            ConditionStatus::Progressing => 2.0,
        }
    }
}

impl From<&Condition> for ConditionStatus {
    fn from(condition: &Condition) -> Self {
        ConditionStatus::from_status(&condition.status)
    }
}
