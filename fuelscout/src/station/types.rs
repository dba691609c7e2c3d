//! Station record model.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coord::GeoPoint;

/// Backend identity of a station.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(pub String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Fuel grades the backend can price and filter by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Gasoline95,
    Gasoline98,
    Diesel,
    #[serde(rename = "premium_diesel")]
    PremiumDiesel,
    Lpg,
}

impl FuelType {
    /// All fuel types in display order.
    pub const ALL: [FuelType; 5] = [
        FuelType::Gasoline95,
        FuelType::Gasoline98,
        FuelType::Diesel,
        FuelType::PremiumDiesel,
        FuelType::Lpg,
    ];

    /// Stable wire/config name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Gasoline95 => "gasoline95",
            FuelType::Gasoline98 => "gasoline98",
            FuelType::Diesel => "diesel",
            FuelType::PremiumDiesel => "premium_diesel",
            FuelType::Lpg => "lpg",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        FuelType::ALL
            .into_iter()
            .find(|fuel| fuel.as_str() == needle)
            .ok_or_else(|| format!("unknown fuel type '{}'", s.trim()))
    }
}

/// Ordering the backend applies to a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    /// Cheapest first.
    #[default]
    Price,
    /// Nearest first.
    Distance,
}

impl SortOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Price => "price",
            SortOption::Distance => "distance",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "price" => Ok(SortOption::Price),
            "distance" => Ok(SortOption::Distance),
            other => Err(format!("unknown sort option '{}'", other)),
        }
    }
}

/// Opening hours as reported by the backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInfo {
    #[serde(default)]
    pub always_open: bool,
    #[serde(default)]
    pub hours: Option<String>,
}

/// One point of interest as delivered inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationRecord {
    pub id: StationId,
    pub name: String,
    pub brand: String,
    pub coordinates: GeoPoint,
    #[serde(default)]
    pub prices_by_fuel_type: BTreeMap<FuelType, f64>,
    #[serde(default)]
    pub schedule_info: ScheduleInfo,
    pub last_updated: DateTime<Utc>,
}

impl StationRecord {
    /// Price for one fuel grade, if the station sells it.
    pub fn price(&self, fuel: FuelType) -> Option<f64> {
        self.prices_by_fuel_type.get(&fuel).copied()
    }
}

/// Backend-ordered set of records, replaced wholesale on each fetch.
///
/// Cloning is cheap; the records are shared.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    records: Arc<Vec<StationRecord>>,
}

impl Snapshot {
    pub fn new(records: Vec<StationRecord>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[StationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Row position of a station.
    pub fn position_of(&self, id: &StationId) -> Option<usize> {
        self.records.iter().position(|r| &r.id == id)
    }

    pub fn get(&self, id: &StationId) -> Option<&StationRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &StationId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StationRecord> {
        self.records.iter()
    }
}

impl From<Vec<StationRecord>> for Snapshot {
    fn from(records: Vec<StationRecord>) -> Self {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a StationRecord;
    type IntoIter = std::slice::Iter<'a, StationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
