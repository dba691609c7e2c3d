//! Measured list row heights.

use std::collections::HashMap;

/// List index → measured pixel height.
///
/// Rows that have not reported a measurement count as zero.
#[derive(Debug, Clone, Default)]
pub struct RowHeightTable {
    heights: HashMap<usize, f64>,
}

impl RowHeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the measurement for a row. Negative or non-finite values are
    /// treated as zero.
    pub fn record(&mut self, index: usize, height: f64) {
        let height = if height.is_finite() { height.max(0.0) } else { 0.0 };
        self.heights.insert(index, height);
    }

    pub fn height(&self, index: usize) -> f64 {
        self.heights.get(&index).copied().unwrap_or(0.0)
    }

    /// Sum of the heights of all rows above `index`.
    pub fn offset_before(&self, index: usize) -> f64 {
        self.heights
            .iter()
            .filter(|(i, _)| **i < index)
            .map(|(_, h)| *h)
            .sum()
    }

    pub fn clear(&mut self) {
        self.heights.clear();
    }

    /// Number of measured rows.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }
}
