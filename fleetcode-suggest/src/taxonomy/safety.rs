//! Safety-system category lookup
//!
//! Coarse grouping used by inspection reporting. Derived only from the
//! system code, never from keywords or confidence.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetySystem {
    Brakes,
    Steering,
    Suspension,
    Tires,
    Wheels,
    Lighting,
    Frame,
    Exhaust,
    Fuel,
    CabAndVisibility,
    /// System not tracked as a safety category
    Other,
}

impl SafetySystem {
    /// Map a system code to its safety category
    pub fn for_system_code(system_code: &str) -> Self {
        match system_code {
            "013" => SafetySystem::Brakes,
            "015" => SafetySystem::Steering,
            "016" => SafetySystem::Suspension,
            "017" => SafetySystem::Tires,
            "018" => SafetySystem::Wheels,
            "034" => SafetySystem::Lighting,
            "014" => SafetySystem::Frame,
            "043" => SafetySystem::Exhaust,
            "044" => SafetySystem::Fuel,
            "002" => SafetySystem::CabAndVisibility,
            _ => SafetySystem::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SafetySystem::Brakes => "brakes",
            SafetySystem::Steering => "steering",
            SafetySystem::Suspension => "suspension",
            SafetySystem::Tires => "tires",
            SafetySystem::Wheels => "wheels",
            SafetySystem::Lighting => "lighting",
            SafetySystem::Frame => "frame",
            SafetySystem::Exhaust => "exhaust",
            SafetySystem::Fuel => "fuel",
            SafetySystem::CabAndVisibility => "cab_and_visibility",
            SafetySystem::Other => "other",
        }
    }

    /// Inverse of [`SafetySystem::as_str`], for database columns
    pub fn parse(value: &str) -> Option<Self> {
        let parsed = match value {
            "brakes" => SafetySystem::Brakes,
            "steering" => SafetySystem::Steering,
            "suspension" => SafetySystem::Suspension,
            "tires" => SafetySystem::Tires,
            "wheels" => SafetySystem::Wheels,
            "lighting" => SafetySystem::Lighting,
            "frame" => SafetySystem::Frame,
            "exhaust" => SafetySystem::Exhaust,
            "fuel" => SafetySystem::Fuel,
            "cab_and_visibility" => SafetySystem::CabAndVisibility,
            "other" => SafetySystem::Other,
            _ => return None,
        };
        Some(parsed)
    }
}
