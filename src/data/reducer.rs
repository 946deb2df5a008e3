//! Incremental aggregators.
//!
//! A group never re-folds its records after it is bound: each record entering
//! or leaving the visible set is applied as an `add` or `remove` delta. Every
//! variant keeps `remove(add(s, r), r) == s`.

use serde::Serialize;

use super::model::{Field, Key, Record};

/// Equality test on one record attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub field: Field,
    pub value: Key,
}

impl Match {
    pub fn new(field: Field, value: impl Into<Key>) -> Self {
        Match { field, value: value.into() }
    }

    pub fn test(&self, record: &Record) -> bool {
        record.matches(self.field, &self.value)
    }
}

// ---------------------------------------------------------------------------
// Reducer – the closed set of aggregations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Reducer {
    /// Number of visible records per key; the pass-through group.
    Count,
    /// Among records in `subset` (all records when `None`), how many also
    /// satisfy `matched`.
    CountRatio { subset: Option<Match>, matched: Match },
    /// Mean of an integer field.
    Average { field: Field },
    /// Percentage of records per key whose `field` equals `category`.
    CategoryShare { field: Field, category: String },
}

impl Reducer {
    pub fn initial(&self) -> Aggregate {
        match self {
            Reducer::Count => Aggregate::Count { count: 0 },
            Reducer::CountRatio { .. } => Aggregate::Ratio { count: 0, matched: 0 },
            Reducer::Average { .. } => Aggregate::Average { count: 0, total: 0, average: 0.0 },
            Reducer::CategoryShare { .. } => Aggregate::Share { total: 0, matched: 0 },
        }
    }

    /// Fold `add` over `records` starting from [`Reducer::initial`].
    pub fn fold<'a>(&self, records: impl IntoIterator<Item = &'a Record>) -> Aggregate {
        let mut state = self.initial();
        for record in records {
            state.add(self, record);
        }
        state
    }
}

// ---------------------------------------------------------------------------
// Aggregate – reducer state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Aggregate {
    Count { count: u64 },
    Ratio { count: u64, matched: u64 },
    /// `total` is widened so that summing any number of `i64` values cannot
    /// overflow.
    Average { count: u64, total: i128, average: f64 },
    Share { total: u64, matched: u64 },
}

impl Aggregate {
    /// Apply the "record entered the visible set" transition.
    pub fn add(&mut self, reducer: &Reducer, record: &Record) {
        match (self, reducer) {
            (Aggregate::Count { count }, Reducer::Count) => *count += 1,
            (Aggregate::Ratio { count, matched }, Reducer::CountRatio { subset, matched: m }) => {
                if subset.as_ref().map_or(true, |s| s.test(record)) {
                    *count += 1;
                    if m.test(record) {
                        *matched += 1;
                    }
                }
            }
            (Aggregate::Average { count, total, average }, Reducer::Average { field }) => {
                *count += 1;
                *total += i128::from(record.int(*field).unwrap_or(0));
                *average = *total as f64 / *count as f64;
            }
            (Aggregate::Share { total, matched }, Reducer::CategoryShare { field, category }) => {
                *total += 1;
                if record.text(*field) == Some(category.as_str()) {
                    *matched += 1;
                }
            }
            (state, reducer) => {
                log::error!("aggregate {state:?} does not belong to reducer {reducer:?}");
            }
        }
    }

    /// Apply the "record left the visible set" transition; the inverse of
    /// [`Aggregate::add`] for a record that was previously added.
    pub fn remove(&mut self, reducer: &Reducer, record: &Record) {
        match (self, reducer) {
            (Aggregate::Count { count }, Reducer::Count) => *count = count.saturating_sub(1),
            (Aggregate::Ratio { count, matched }, Reducer::CountRatio { subset, matched: m }) => {
                if subset.as_ref().map_or(true, |s| s.test(record)) {
                    *count = count.saturating_sub(1);
                    if m.test(record) {
                        *matched = matched.saturating_sub(1);
                    }
                }
            }
            (Aggregate::Average { count, total, average }, Reducer::Average { field }) => {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    *total = 0;
                    *average = 0.0;
                } else {
                    *total -= i128::from(record.int(*field).unwrap_or(0));
                    *average = *total as f64 / *count as f64;
                }
            }
            (Aggregate::Share { total, matched }, Reducer::CategoryShare { field, category }) => {
                *total = total.saturating_sub(1);
                if record.text(*field) == Some(category.as_str()) {
                    *matched = matched.saturating_sub(1);
                }
            }
            (state, reducer) => {
                log::error!("aggregate {state:?} does not belong to reducer {reducer:?}");
            }
        }
    }

    /// The displayable scalar. Empty ratios, shares and averages report `0`.
    pub fn value(&self) -> f64 {
        match *self {
            Aggregate::Count { count } => count as f64,
            Aggregate::Ratio { count, matched } => {
                if count == 0 {
                    0.0
                } else {
                    matched as f64 / count as f64
                }
            }
            Aggregate::Average { average, .. } => average,
            Aggregate::Share { total, matched } => {
                if total > 0 {
                    matched as f64 / total as f64 * 100.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Number of records folded into this state.
    pub fn count(&self) -> u64 {
        match *self {
            Aggregate::Count { count }
            | Aggregate::Ratio { count, .. }
            | Aggregate::Average { count, .. } => count,
            Aggregate::Share { total, .. } => total,
        }
    }
}
