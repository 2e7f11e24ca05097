use std::fmt;
use std::str::FromStr;

use crate::error::TripDataError;

/// The four kinds of trip records published by the NYC Taxi & Limousine
/// Commission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TripCategory {
    Yellow,
    Green,
    /// For-hire vehicles
    Fhv,
    /// High volume for-hire vehicles (Uber, Lyft, ...)
    Fhvhv,
}

impl TripCategory {
    pub const ALL: [TripCategory; 4] = [
        TripCategory::Yellow,
        TripCategory::Green,
        TripCategory::Fhv,
        TripCategory::Fhvhv,
    ];

    /// Name used in the download url and in the local directory layout.
    pub fn slug(&self) -> &'static str {
        use TripCategory::*;
        match self {
            Yellow => "yellow",
            Green => "green",
            Fhv => "fhv",
            Fhvhv => "fhvhv",
        }
    }

    pub fn table_name(&self) -> &'static str {
        use TripCategory::*;
        match self {
            Yellow => "yellow_trips",
            Green => "green_trips",
            Fhv => "for_hire_vehicles",
            Fhvhv => "fhvhv",
        }
    }
}

impl fmt::Display for TripCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for TripCategory {
    type Err = TripDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TripCategory::ALL
            .into_iter()
            .find(|e| e.slug() == s)
            .ok_or_else(|| TripDataError::UnknownCategory(s.to_string()))
    }
}
