//! Propagation of one dimension's filter change to every other group.

use serde::Serialize;

use super::index::{Dimension, DimensionId, Group};
use super::model::Record;

/// What a single filter change did to the records of its dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterDelta {
    pub dimension: DimensionId,
    /// Records that now pass the dimension's filter but did not before.
    pub entered: usize,
    /// Records that passed before and no longer do.
    pub exited: usize,
}

/// Bring `masks` and `groups` in line with the (already replaced) filter of
/// `changed`.
///
/// The changed dimension's keys are scanned once. Only records whose pass/fail
/// state flipped are applied to the groups, each as an `add` or `remove`
/// delta under that group's own key, so the cost is
/// `O(n + flipped * groups)`. Groups keyed on `changed` are skipped.
pub(crate) fn propagate(
    records: &[Record],
    dimensions: &[Dimension],
    groups: &mut [Group],
    masks: &mut [u64],
    changed: DimensionId,
) -> FilterDelta {
    let dim = &dimensions[changed.0];
    let bit = changed.bit();
    let mut delta = FilterDelta {
        dimension: changed,
        entered: 0,
        exited: 0,
    };

    for (i, key) in dim.keys.iter().enumerate() {
        let before = masks[i];
        let passed = before & bit == 0;
        let passes = dim.filter.matches(key);
        if passed == passes {
            continue;
        }

        let after = if passes { before & !bit } else { before | bit };
        masks[i] = after;
        if passes {
            delta.entered += 1;
        } else {
            delta.exited += 1;
        }

        let record = &records[i];
        for group in groups.iter_mut() {
            if group.dimension == Some(changed) {
                continue;
            }
            let ignored = group.ignored_bits();
            let was_visible = before & !ignored == 0;
            let is_visible = after & !ignored == 0;
            if was_visible == is_visible {
                continue;
            }
            let key = group.bucket_key(dimensions, i);
            let reducer = &group.reducer;
            let Some(state) = group.buckets.get_mut(key) else {
                log::warn!("group on {:?} has no bucket for {key}", group.dimension);
                continue;
            };
            if is_visible {
                state.add(reducer, record);
            } else {
                state.remove(reducer, record);
            }
        }
    }

    delta
}

#[cfg(test)]
mod tests {
    use crate::data::filter::Filter;
    use crate::data::index::DimensionalIndex;
    use crate::data::model::{Field, Key, Record};
    use crate::data::reducer::Reducer;

    fn records() -> Vec<Record> {
        (0..40)
            .map(|i| Record {
                discipline: if i % 3 == 0 { "A".into() } else { "B".into() },
                sex: if i % 4 == 0 { "Female".into() } else { "Male".into() },
                rank: ["Prof", "AsstProf", "AssocProf"][i % 3].into(),
                salary: 60_000 + (i as i64 * 7_919) % 90_000,
                yrs_service: (i as i64 * 13) % 41,
                yrs_since_phd: (i as i64 * 17) % 47,
            })
            .collect()
    }

    #[test]
    fn only_flipped_records_are_counted() {
        let mut index = DimensionalIndex::new(records());
        let service = index.create_dimension("yrs_service", Field::YrsService).unwrap();

        let first = index
            .set_filter(service, Filter::Range { lower: Key::Int(0), upper: Key::Int(20) })
            .unwrap();
        let widened = index
            .set_filter(service, Filter::Range { lower: Key::Int(0), upper: Key::Int(30) })
            .unwrap();

        assert_eq!(first.entered, 0);
        assert_eq!(widened.exited, 0);
        let in_20_30 = index
            .records()
            .iter()
            .filter(|r| (20..30).contains(&r.yrs_service))
            .count();
        assert_eq!(widened.entered, in_20_30);
    }

    #[test]
    fn groups_match_a_fresh_fold_after_each_change() {
        let mut index = DimensionalIndex::new(records());
        let discipline = index.create_dimension("discipline", Field::Discipline).unwrap();
        let sex = index.create_dimension("sex", Field::Sex).unwrap();
        let service = index.create_dimension("yrs_service", Field::YrsService).unwrap();
        let groups = [
            index.create_group(discipline, Reducer::Count).unwrap(),
            index.create_group(sex, Reducer::Average { field: Field::Salary }).unwrap(),
            index
                .create_group(sex, Reducer::CategoryShare { field: Field::Rank, category: "Prof".into() })
                .unwrap(),
            index.create_group_all(Reducer::Count),
        ];

        let changes = [
            (discipline, Filter::Exact(Key::text("A"))),
            (service, Filter::Range { lower: Key::Int(5), upper: Key::Int(25) }),
            (sex, Filter::Exact(Key::text("Female"))),
            (discipline, Filter::All),
            (service, Filter::Range { lower: Key::Int(10), upper: Key::Int(41) }),
            (sex, Filter::All),
        ];
        for (dimension, filter) in changes {
            index.set_filter(dimension, filter).unwrap();
            for &group in &groups {
                assert_eq!(index.group(group).unwrap(), index.recompute_group(group).unwrap());
            }
        }
    }
}
