//! Dimensional index: dimensions, groups and cross-filtering over an
//! immutable record set.
//!
//! Every record carries a bitmask with one bit per dimension; a set bit means
//! the record fails that dimension's filter. A group keyed on dimension `d`
//! sees a record when every bit except `d`'s is clear, which is what makes a
//! chart ignore its own selection.

use std::collections::BTreeMap;

use serde::Serialize;

use super::coordinator::{self, FilterDelta};
use super::error::IndexError;
use super::filter::Filter;
use super::model::{Key, Projection, Record};
use super::reducer::{Aggregate, Reducer};

/// One bit per dimension in a `u64` mask.
pub const MAX_DIMENSIONS: usize = 64;

static ALL_KEY: Key = Key::All;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DimensionId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupId(pub(crate) usize);

impl DimensionId {
    pub(crate) fn bit(self) -> u64 {
        1u64 << self.0
    }
}

#[derive(Debug)]
pub(crate) struct Dimension {
    pub(crate) name: String,
    /// `keys[i]` is the projection of record `i`.
    pub(crate) keys: Vec<Key>,
    /// Record indices sorted by key; ties keep load order.
    order: Vec<usize>,
    pub(crate) filter: Filter,
}

#[derive(Debug)]
pub(crate) struct Group {
    /// `None` for a group-all.
    pub(crate) dimension: Option<DimensionId>,
    pub(crate) reducer: Reducer,
    pub(crate) buckets: BTreeMap<Key, Aggregate>,
}

impl Group {
    /// Mask bits this group ignores when deciding visibility.
    pub(crate) fn ignored_bits(&self) -> u64 {
        self.dimension.map_or(0, DimensionId::bit)
    }

    pub(crate) fn bucket_key<'a>(&self, dimensions: &'a [Dimension], record: usize) -> &'a Key {
        match self.dimension {
            Some(d) => &dimensions[d.0].keys[record],
            None => &ALL_KEY,
        }
    }
}

/// Read-only view of one group, entries in ascending key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSnapshot {
    pub id: GroupId,
    pub dimension: Option<DimensionId>,
    pub entries: Vec<(Key, Aggregate)>,
}

impl GroupSnapshot {
    pub fn get(&self, key: &Key) -> Option<&Aggregate> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, a)| a)
    }
}

// ---------------------------------------------------------------------------
// DimensionalIndex
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct DimensionalIndex {
    records: Vec<Record>,
    /// Per-record filter mask, bit `d` set when dimension `d` rejects it.
    masks: Vec<u64>,
    dimensions: Vec<Dimension>,
    groups: Vec<Group>,
}

impl DimensionalIndex {
    pub fn new(records: Vec<Record>) -> Self {
        let masks = vec![0; records.len()];
        DimensionalIndex {
            records,
            masks,
            dimensions: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records passing every active filter.
    pub fn visible_count(&self) -> usize {
        self.masks.iter().filter(|&&m| m == 0).count()
    }

    /// Register a projection. The initial filter matches everything.
    pub fn create_dimension(
        &mut self,
        name: impl Into<String>,
        projection: impl Into<Projection>,
    ) -> Result<DimensionId, IndexError> {
        if self.dimensions.len() == MAX_DIMENSIONS {
            return Err(IndexError::TooManyDimensions { max: MAX_DIMENSIONS });
        }
        let projection = projection.into();
        let keys: Vec<Key> = self.records.iter().map(|r| projection.key(r)).collect();
        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));

        let id = DimensionId(self.dimensions.len());
        let name = name.into();
        log::debug!("dimension {name} ({projection:?}) registered as #{}", id.0);
        self.dimensions.push(Dimension {
            name,
            keys,
            order,
            filter: Filter::All,
        });
        Ok(id)
    }

    /// Bind `reducer` to the keys of `dimension`.
    ///
    /// Every key present in the dataset gets a bucket, even when all of its
    /// records are currently filtered out.
    pub fn create_group(&mut self, dimension: DimensionId, reducer: Reducer) -> Result<GroupId, IndexError> {
        self.dimension(dimension)?;
        Ok(self.bind(Some(dimension), reducer))
    }

    /// Bind `reducer` to the whole visible record set.
    pub fn create_group_all(&mut self, reducer: Reducer) -> GroupId {
        self.bind(None, reducer)
    }

    fn bind(&mut self, dimension: Option<DimensionId>, reducer: Reducer) -> GroupId {
        let mut group = Group {
            dimension,
            reducer,
            buckets: BTreeMap::new(),
        };
        self.fold_into(&mut group);
        let id = GroupId(self.groups.len());
        self.groups.push(group);
        id
    }

    fn fold_into(&self, group: &mut Group) {
        if group.dimension.is_none() {
            group.buckets.insert(Key::All, group.reducer.initial());
        }
        let ignored = group.ignored_bits();
        for (i, record) in self.records.iter().enumerate() {
            let key = group.bucket_key(&self.dimensions, i);
            if !group.buckets.contains_key(key) {
                group.buckets.insert(key.clone(), group.reducer.initial());
            }
            if self.masks[i] & !ignored == 0 {
                if let Some(state) = group.buckets.get_mut(key) {
                    state.add(&group.reducer, record);
                }
            }
        }
    }

    /// Replace the filter on `dimension` and bring every other group up to
    /// date before returning.
    pub fn set_filter(&mut self, dimension: DimensionId, filter: Filter) -> Result<FilterDelta, IndexError> {
        self.dimension(dimension)?;
        Ok(self.apply_filter(dimension, filter))
    }

    /// Clear every dimension's filter.
    pub fn filter_all(&mut self) {
        for d in 0..self.dimensions.len() {
            if !self.dimensions[d].filter.is_all() {
                self.apply_filter(DimensionId(d), Filter::All);
            }
        }
    }

    /// `dimension` must be one of ours.
    fn apply_filter(&mut self, dimension: DimensionId, filter: Filter) -> FilterDelta {
        self.dimensions[dimension.0].filter = filter.normalized();

        let delta = coordinator::propagate(
            &self.records,
            &self.dimensions,
            &mut self.groups,
            &mut self.masks,
            dimension,
        );
        log::debug!(
            "filter on {} -> {:?}: {} entered, {} exited",
            self.dimensions[dimension.0].name,
            self.dimensions[dimension.0].filter,
            delta.entered,
            delta.exited
        );
        delta
    }

    pub fn filter(&self, dimension: DimensionId) -> Result<&Filter, IndexError> {
        Ok(&self.dimension(dimension)?.filter)
    }

    pub fn dimension_name(&self, dimension: DimensionId) -> Result<&str, IndexError> {
        Ok(&self.dimension(dimension)?.name)
    }

    fn dimension(&self, id: DimensionId) -> Result<&Dimension, IndexError> {
        self.dimensions.get(id.0).ok_or(IndexError::UnknownDimension(id.0))
    }

    fn group_state(&self, id: GroupId) -> Result<&Group, IndexError> {
        self.groups.get(id.0).ok_or(IndexError::UnknownGroup(id.0))
    }

    // -- order statistics --

    /// The `k` records with the smallest keys among those passing all filters.
    pub fn bottom(&self, dimension: DimensionId, k: usize) -> Result<Vec<&Record>, IndexError> {
        let dim = self.dimension(dimension)?;
        if self.records.is_empty() {
            return Err(IndexError::EmptyDataset);
        }
        Ok(self.visible_in(dim.order.iter(), k))
    }

    /// The `k` records with the largest keys among those passing all filters,
    /// largest first.
    pub fn top(&self, dimension: DimensionId, k: usize) -> Result<Vec<&Record>, IndexError> {
        let dim = self.dimension(dimension)?;
        if self.records.is_empty() {
            return Err(IndexError::EmptyDataset);
        }
        Ok(self.visible_in(dim.order.iter().rev(), k))
    }

    fn visible_in<'a>(&self, order: impl Iterator<Item = &'a usize>, k: usize) -> Vec<&Record> {
        order
            .filter(|&&i| self.masks[i] == 0)
            .take(k)
            .map(|&i| &self.records[i])
            .collect()
    }

    // -- reads --

    pub fn group(&self, id: GroupId) -> Result<GroupSnapshot, IndexError> {
        let group = self.group_state(id)?;
        Ok(GroupSnapshot {
            id,
            dimension: group.dimension,
            entries: group.buckets.iter().map(|(k, a)| (k.clone(), a.clone())).collect(),
        })
    }

    /// Current value of a group-all (or of the first bucket of any group).
    pub fn group_value(&self, id: GroupId) -> Result<Aggregate, IndexError> {
        let group = self.group_state(id)?;
        Ok(group
            .buckets
            .values()
            .next()
            .cloned()
            .unwrap_or_else(|| group.reducer.initial()))
    }

    pub fn all_groups_snapshot(&self) -> Vec<GroupSnapshot> {
        (0..self.groups.len())
            .filter_map(|i| self.group(GroupId(i)).ok())
            .collect()
    }

    /// Fold the group from scratch over the records it should currently see.
    pub fn recompute_group(&self, id: GroupId) -> Result<GroupSnapshot, IndexError> {
        let group = self.group_state(id)?;
        let mut fresh = Group {
            dimension: group.dimension,
            reducer: group.reducer.clone(),
            buckets: BTreeMap::new(),
        };
        self.fold_into(&mut fresh);
        Ok(GroupSnapshot {
            id,
            dimension: fresh.dimension,
            entries: fresh.buckets.into_iter().collect(),
        })
    }
}
