use std::collections::BTreeSet;

use serde::Serialize;

use super::model::Key;

// ---------------------------------------------------------------------------
// Filter: which keys of a dimension are selected
// ---------------------------------------------------------------------------

/// The active selection on one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum Filter {
    /// No constraint (show everything).
    #[default]
    All,
    Exact(Key),
    /// Half-open range `[lower, upper)`.
    Range { lower: Key, upper: Key },
    /// Any of the listed keys. An empty set means "no filter".
    In(BTreeSet<Key>),
}

impl Filter {
    /// Whether a record projecting to `key` passes this filter.
    pub fn matches(&self, key: &Key) -> bool {
        match self {
            Filter::All => true,
            Filter::Exact(k) => k == key,
            Filter::Range { lower, upper } => lower <= key && key < upper,
            Filter::In(keys) => keys.is_empty() || keys.contains(key),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }

    /// Collapse the "empty selection" forms to [`Filter::All`].
    pub fn normalized(self) -> Self {
        match self {
            Filter::In(keys) if keys.is_empty() => Filter::All,
            other => other,
        }
    }

    /// Add `key` to the selection, or remove it if already selected.
    ///
    /// This is the click behaviour of an ordinal chart: starting from
    /// [`Filter::All`] the clicked key becomes the only selection, and
    /// deselecting the last key clears the filter.
    pub fn toggled(&self, key: &Key) -> Self {
        let mut keys = match self {
            Filter::All | Filter::Range { .. } => BTreeSet::new(),
            Filter::Exact(k) => BTreeSet::from([k.clone()]),
            Filter::In(keys) => keys.clone(),
        };
        if !keys.remove(key) {
            keys.insert(key.clone());
        }
        Filter::In(keys).normalized()
    }

    /// Whether `key` is explicitly selected (false for [`Filter::All`]).
    pub fn selects(&self, key: &Key) -> bool {
        !self.is_all() && self.matches(key)
    }
}
