use std::collections::{BTreeMap, BTreeSet};

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Filter predicate: one substring per column
// ---------------------------------------------------------------------------

/// Per-column filter text: maps column_name → filter string.
/// An absent column or an empty string means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    filters: BTreeMap<String, String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column's filter. An empty value removes the constraint.
    pub fn set(&mut self, column: &str, value: &str) {
        if value.is_empty() {
            self.filters.remove(column);
        } else {
            self.filters.insert(column.to_string(), value.to_string());
        }
    }

    pub fn clear(&mut self, column: &str) {
        self.filters.remove(column);
    }

    pub fn clear_all(&mut self) {
        self.filters.clear();
    }

    /// Current filter text for a column ("" when unconstrained).
    pub fn get(&self, column: &str) -> &str {
        self.filters.get(column).map(String::as_str).unwrap_or("")
    }

    /// Non-empty constraints, in column-name order.
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = FilterSet::new();
        for (k, v) in iter {
            set.set(&k.into(), &v.into());
        }
        set
    }
}

/// Return indices of rows that pass all active filters, in dataset order.
///
/// A row passes a column filter when its lower-cased cell text contains the
/// lower-cased filter text. Missing cells are the empty string. Columns the
/// dataset does not have are ignored.
pub fn filtered_indices(dataset: &Dataset, filters: &FilterSet) -> Vec<usize> {
    let constraints: Vec<(usize, String)> = filters
        .active()
        .filter_map(|(col, needle)| {
            let pos = dataset.column_position(col);
            if pos.is_none() {
                log::warn!("ignoring filter on unknown column {col:?}");
            }
            pos.map(|p| (p, needle.to_lowercase()))
        })
        .collect();

    dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            constraints.iter().all(|(pos, needle)| {
                row.get(*pos)
                    .map(|cell| cell.folded().contains(needle.as_str()))
                    .unwrap_or(false)
            })
        })
        .map(|(i, _)| i)
        .collect()
}

/// Sorted distinct display values of a column, missing cells excluded.
pub fn distinct_values(dataset: &Dataset, column: &str) -> Vec<String> {
    let Some(pos) = dataset.column_position(column) else {
        return Vec::new();
    };
    dataset
        .rows()
        .iter()
        .filter_map(|row| row.get(pos))
        .filter(|cell| !cell.is_missing())
        .map(ToString::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
