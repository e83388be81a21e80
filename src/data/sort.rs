use super::model::Dataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// At most one active sort key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub column: Option<String>,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn by(column: &str, direction: SortDirection) -> Self {
        Self {
            column: Some(column.to_string()),
            direction,
        }
    }

    /// Same column flips the direction, a new column starts ascending.
    pub fn toggle(&mut self, column: &str) {
        if self.column.as_deref() == Some(column) {
            self.direction = self.direction.flipped();
        } else {
            self.column = Some(column.to_string());
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn clear(&mut self) {
        *self = SortSpec::default();
    }

    /// Direction for `column` if it is the active key.
    pub fn direction_for(&self, column: &str) -> Option<SortDirection> {
        (self.column.as_deref() == Some(column)).then_some(self.direction)
    }
}

/// Stable reorder of `indices` by the lower-cased text of the sort column.
///
/// Comparison is lexicographic on the string form for every cell type.
/// Without an active column, or for a column the dataset lacks, `indices`
/// come back unchanged.
pub fn sort_indices(dataset: &Dataset, indices: Vec<usize>, spec: &SortSpec) -> Vec<usize> {
    let Some(column) = spec.column.as_deref() else {
        return indices;
    };
    let Some(pos) = dataset.column_position(column) else {
        log::warn!("ignoring sort on unknown column {column:?}");
        return indices;
    };

    let mut keyed: Vec<(String, usize)> = indices
        .into_iter()
        .map(|i| {
            let key = dataset
                .row(i)
                .and_then(|row| row.get(pos))
                .map(|cell| cell.folded())
                .unwrap_or_default();
            (key, i)
        })
        .collect();

    // `sort_by` is stable; equal keys keep their incoming order in both directions.
    keyed.sort_by(|(a, _), (b, _)| match spec.direction {
        SortDirection::Ascending => a.cmp(b),
        SortDirection::Descending => b.cmp(a),
    });

    keyed.into_iter().map(|(_, i)| i).collect()
}
