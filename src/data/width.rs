use serde::{Deserialize, Serialize};

use super::model::Dataset;

/// Scale and bounds for column widths, in semantic pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidthRule {
    /// Pixels per character.
    pub scale: f32,
    pub min_width: f32,
    pub max_width: f32,
}

impl Default for WidthRule {
    fn default() -> Self {
        Self {
            scale: 10.0,
            min_width: 100.0,
            max_width: 300.0,
        }
    }
}

impl WidthRule {
    /// Finite, non-negative numbers with `min_width <= max_width`.
    pub fn is_valid(&self) -> bool {
        [self.scale, self.min_width, self.max_width]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
            && self.min_width <= self.max_width
    }
}

/// `clamp(max(header chars, widest cell chars) * scale, min, max)` over every
/// row of the dataset, so widths stay put while filters and paging change.
/// An invalid rule falls back to [`WidthRule::default`].
pub fn width_for(column: &str, dataset: &Dataset, rule: &WidthRule) -> f32 {
    let rule = if rule.is_valid() {
        *rule
    } else {
        WidthRule::default()
    };
    let header = column.chars().count();
    let widest = dataset
        .column_position(column)
        .map(|pos| {
            dataset
                .rows()
                .iter()
                .filter_map(|row| row.get(pos))
                .map(|cell| cell.to_string().chars().count())
                .max()
                .unwrap_or(0)
        })
        .unwrap_or(0);

    let raw = header.max(widest) as f32 * rule.scale;
    raw.clamp(rule.min_width, rule.max_width)
}

/// Widths for every column, in column order.
pub fn column_widths(dataset: &Dataset, rule: &WidthRule) -> Vec<f32> {
    dataset
        .columns()
        .iter()
        .map(|c| width_for(c, dataset, rule))
        .collect()
}
