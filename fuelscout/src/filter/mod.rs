//! Brand-exclusion filter.
//!
//! A pure pass over a snapshot. It is re-run wholesale whenever the snapshot
//! or the exclusion list changes; snapshots are small enough that diffing
//! would buy nothing.

use std::collections::BTreeSet;

use crate::station::{Snapshot, StationRecord};

/// Brands the user never wants to see.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterConfig {
    pub excluded_brands: BTreeSet<String>,
}

impl FilterConfig {
    pub fn new<I, S>(brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_brands: brands.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.excluded_brands.is_empty()
    }

    /// Case-insensitive, whitespace-insensitive brand match.
    pub fn excludes(&self, record: &StationRecord) -> bool {
        let brand = normalize(&record.brand);
        self.excluded_brands.iter().any(|b| normalize(b) == brand)
    }
}

fn normalize(brand: &str) -> String {
    brand.trim().to_lowercase()
}

/// Remove excluded-brand records, preserving backend order.
pub fn filter(snapshot: &Snapshot, config: &FilterConfig) -> Snapshot {
    if config.is_empty() {
        return snapshot.clone();
    }

    Snapshot::new(
        snapshot
            .iter()
            .filter(|record| !config.excludes(record))
            .cloned()
            .collect(),
    )
}
