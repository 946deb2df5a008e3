//! The faculty-salary views: which dimensions and groups each chart uses and
//! how a displayable value is read from each aggregate.
//!
//! Every chart gets its own dimensions, even when two charts project the same
//! field. A click on the gender-balance chart therefore filters the
//! average-salary chart, while each chart keeps showing all of its own keys.

use serde::Serialize;

use crate::data::coordinator::FilterDelta;
use crate::data::{
    Aggregate, DimensionId, DimensionalIndex, Field, Filter, GroupId, GroupSnapshot, IndexError,
    Key, Match, Projection, Record, Reducer,
};

/// Rank counted by the "percent professors" displays.
pub const PROFESSOR_RANK: &str = "Prof";

/// Genders with a percent-professors display, in display order.
pub const GENDERS: [&str; 2] = ["Female", "Male"];

/// `(rank value, legend label)` for the stacked rank chart, bottom layer first.
pub const RANK_LAYERS: [(&str, &str); 3] = [
    ("Prof", "Prof"),
    ("AsstProf", "Asst Prof"),
    ("AssocProf", "Assoc Prof"),
];

// ---------------------------------------------------------------------------
// View descriptors
// ---------------------------------------------------------------------------

/// How a chart turns an aggregate into the number it draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueAccessor {
    /// [`Aggregate::value`] as is.
    Raw,
    /// [`Aggregate::value`] rounded to two decimals.
    TwoDecimals,
}

impl ValueAccessor {
    pub fn read(self, aggregate: &Aggregate) -> f64 {
        let v = aggregate.value();
        match self {
            ValueAccessor::Raw => v,
            ValueAccessor::TwoDecimals => (v * 100.0).round() / 100.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectorView {
    pub dimension: DimensionId,
    pub group: GroupId,
}

#[derive(Debug, Clone)]
pub struct NumberView {
    pub gender: String,
    pub group: GroupId,
}

#[derive(Debug, Clone)]
pub struct BarView {
    pub title: &'static str,
    pub x_label: &'static str,
    pub dimension: DimensionId,
    pub group: GroupId,
    pub accessor: ValueAccessor,
}

#[derive(Debug, Clone)]
pub struct StackLayer {
    pub label: &'static str,
    pub group: GroupId,
}

#[derive(Debug, Clone)]
pub struct StackedBarView {
    pub title: &'static str,
    pub dimension: DimensionId,
    pub layers: Vec<StackLayer>,
}

#[derive(Debug, Clone)]
pub struct ScatterView {
    pub title: &'static str,
    pub x_label: &'static str,
    pub dimension: DimensionId,
    pub group: GroupId,
    /// x-axis range, fixed when the dashboard is built.
    pub domain: Result<(i64, i64), IndexError>,
}

// ---------------------------------------------------------------------------
// Rendered values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub key: Key,
    pub value: f64,
    /// Explicitly selected in this chart's own filter.
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub label: &'static str,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScatterPoint {
    pub x: i64,
    pub salary: i64,
    pub sex: String,
    pub rank: String,
    pub count: u64,
}

impl ScatterPoint {
    fn from_key(key: &Key, count: u64) -> Option<Self> {
        Some(ScatterPoint {
            x: key.component(0)?.as_i64()?,
            salary: key.component(1)?.as_i64()?,
            sex: key.component(2)?.as_str()?.to_string(),
            rank: key.component(3)?.as_str()?.to_string(),
            count,
        })
    }

    /// Hover text, e.g. `Prof earned 139750`.
    pub fn title(&self) -> String {
        format!("{} earned {}", self.rank, self.salary)
    }
}

#[derive(Serialize)]
struct Snapshot<'a> {
    total: usize,
    visible: usize,
    groups: Vec<NamedGroup<'a>>,
}

#[derive(Serialize)]
struct NamedGroup<'a> {
    name: Option<&'a str>,
    #[serde(flatten)]
    group: GroupSnapshot,
}

// ---------------------------------------------------------------------------
// SalaryDashboard
// ---------------------------------------------------------------------------

/// Owns the index and every view bound to it.
#[derive(Debug)]
pub struct SalaryDashboard {
    index: DimensionalIndex,
    pub discipline: SelectorView,
    pub percent_professors: Vec<NumberView>,
    pub gender_balance: BarView,
    pub average_salary: BarView,
    pub rank_distribution: StackedBarView,
    pub service_salary: ScatterView,
    pub phd_salary: ScatterView,
}

impl SalaryDashboard {
    pub fn build(records: Vec<Record>) -> Result<Self, IndexError> {
        let mut index = DimensionalIndex::new(records);

        let dimension = index.create_dimension("discipline", Field::Discipline)?;
        let discipline = SelectorView {
            dimension,
            group: index.create_group(dimension, Reducer::Count)?,
        };

        let percent_professors = GENDERS
            .iter()
            .map(|&gender| NumberView {
                gender: gender.to_string(),
                group: index.create_group_all(Reducer::CountRatio {
                    subset: Some(Match::new(Field::Sex, gender)),
                    matched: Match::new(Field::Rank, PROFESSOR_RANK),
                }),
            })
            .collect();

        let dimension = index.create_dimension("gender balance", Field::Sex)?;
        let gender_balance = BarView {
            title: "Gender Balance",
            x_label: "Gender",
            dimension,
            group: index.create_group(dimension, Reducer::Count)?,
            accessor: ValueAccessor::Raw,
        };

        let dimension = index.create_dimension("average salary", Field::Sex)?;
        let average_salary = BarView {
            title: "Average Salary",
            x_label: "Gender",
            dimension,
            group: index.create_group(dimension, Reducer::Average { field: Field::Salary })?,
            accessor: ValueAccessor::TwoDecimals,
        };

        let dimension = index.create_dimension("rank by gender", Field::Sex)?;
        let mut layers = Vec::with_capacity(RANK_LAYERS.len());
        for (rank, label) in RANK_LAYERS {
            let reducer = Reducer::CategoryShare {
                field: Field::Rank,
                category: rank.to_string(),
            };
            layers.push(StackLayer {
                label,
                group: index.create_group(dimension, reducer)?,
            });
        }
        let rank_distribution = StackedBarView {
            title: "Rank Distribution (%)",
            dimension,
            layers,
        };

        let service_salary = scatter(
            &mut index,
            "Years of Service vs Salary",
            "Years of Service",
            Field::YrsService,
            Field::YrsService,
        )?;
        // Known discrepancy: this view's x domain spans `yrs_service` of the
        // phd-extreme records, not `yrs_since_phd`.
        let phd_salary = scatter(
            &mut index,
            "Years since PhD vs Salary",
            "Years since phD",
            Field::YrsSincePhd,
            Field::YrsService,
        )?;

        Ok(SalaryDashboard {
            index,
            discipline,
            percent_professors,
            gender_balance,
            average_salary,
            rank_distribution,
            service_salary,
            phd_salary,
        })
    }

    pub fn index(&self) -> &DimensionalIndex {
        &self.index
    }

    // -- interaction --

    pub fn set_filter(&mut self, dimension: DimensionId, filter: Filter) -> Result<FilterDelta, IndexError> {
        self.index.set_filter(dimension, filter)
    }

    /// Click on an ordinal bar: select or deselect `key` on `dimension`.
    pub fn toggle(&mut self, dimension: DimensionId, key: &Key) -> Result<FilterDelta, IndexError> {
        let filter = self.index.filter(dimension)?.toggled(key);
        self.index.set_filter(dimension, filter)
    }

    /// Select menu: `None` shows every discipline.
    pub fn select_discipline(&mut self, discipline: Option<&str>) -> Result<FilterDelta, IndexError> {
        let filter = discipline.map_or(Filter::All, |d| Filter::Exact(Key::text(d)));
        self.index.set_filter(self.discipline.dimension, filter)
    }

    pub fn selected_discipline(&self) -> Option<String> {
        match self.index.filter(self.discipline.dimension) {
            Ok(Filter::Exact(key)) => Some(key.to_string()),
            _ => None,
        }
    }

    pub fn reset_filters(&mut self) {
        self.index.filter_all();
    }

    // -- reads --

    /// `(discipline, visible record count)` for the select menu.
    pub fn discipline_options(&self) -> Result<Vec<(String, u64)>, IndexError> {
        let group = self.index.group(self.discipline.group)?;
        Ok(group
            .entries
            .iter()
            .map(|(key, aggregate)| (key.to_string(), aggregate.count()))
            .collect())
    }

    /// Fraction (0..=1) of the view's gender that holds the professor rank.
    pub fn professor_ratio(&self, view: &NumberView) -> Result<f64, IndexError> {
        Ok(self.index.group_value(view.group)?.value())
    }

    pub fn bars(&self, view: &BarView) -> Result<Vec<Bar>, IndexError> {
        let group = self.index.group(view.group)?;
        let filter = self.index.filter(view.dimension)?;
        Ok(group
            .entries
            .into_iter()
            .map(|(key, aggregate)| Bar {
                value: view.accessor.read(&aggregate),
                selected: filter.selects(&key),
                key,
            })
            .collect())
    }

    pub fn stacked(&self, view: &StackedBarView) -> Result<Vec<Layer>, IndexError> {
        let filter = self.index.filter(view.dimension)?;
        view.layers
            .iter()
            .map(|layer| -> Result<Layer, IndexError> {
                let group = self.index.group(layer.group)?;
                Ok(Layer {
                    label: layer.label,
                    bars: group
                        .entries
                        .into_iter()
                        .map(|(key, aggregate)| Bar {
                            value: aggregate.value(),
                            selected: filter.selects(&key),
                            key,
                        })
                        .collect(),
                })
            })
            .collect()
    }

    /// Points with at least one visible record, in key order.
    pub fn scatter_points(&self, view: &ScatterView) -> Result<Vec<ScatterPoint>, IndexError> {
        let group = self.index.group(view.group)?;
        Ok(group
            .entries
            .iter()
            .filter(|(_, aggregate)| aggregate.count() > 0)
            .filter_map(|(key, aggregate)| ScatterPoint::from_key(key, aggregate.count()))
            .collect())
    }

    /// Every group's current entries as pretty-printed JSON.
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        let groups = self
            .index
            .all_groups_snapshot()
            .into_iter()
            .map(|group| NamedGroup {
                name: group.dimension.and_then(|d| self.index.dimension_name(d).ok()),
                group,
            })
            .collect();
        serde_json::to_string_pretty(&Snapshot {
            total: self.index.len(),
            visible: self.index.visible_count(),
            groups,
        })
    }
}

/// A scatter view: an order dimension on `x_field` for the axis domain and a
/// pass-through group on `(x_field, salary, sex, rank)`.
///
/// The domain spans `domain_field` of the records at the bottom and top of the
/// order dimension.
fn scatter(
    index: &mut DimensionalIndex,
    title: &'static str,
    x_label: &'static str,
    x_field: Field,
    domain_field: Field,
) -> Result<ScatterView, IndexError> {
    let order = index.create_dimension(x_label, x_field)?;
    let projection = Projection::Composite(vec![x_field, Field::Salary, Field::Sex, Field::Rank]);
    let dimension = index.create_dimension(title, projection)?;
    let group = index.create_group(dimension, Reducer::Count)?;

    let domain = x_domain(index, order, domain_field);
    if let Err(e) = &domain {
        log::warn!("{title}: no x domain ({e})");
    }
    Ok(ScatterView {
        title,
        x_label,
        dimension,
        group,
        domain,
    })
}

fn x_domain(index: &DimensionalIndex, order: DimensionId, field: Field) -> Result<(i64, i64), IndexError> {
    let low = index.bottom(order, 1)?.first().and_then(|r| r.int(field));
    let high = index.top(order, 1)?.first().and_then(|r| r.int(field));
    low.zip(high).ok_or(IndexError::EmptyDataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(discipline: &str, sex: &str, rank: &str, salary: i64, service: i64, phd: i64) -> Record {
        Record {
            discipline: discipline.into(),
            sex: sex.into(),
            rank: rank.into(),
            salary,
            yrs_service: service,
            yrs_since_phd: phd,
        }
    }

    fn faculty() -> Vec<Record> {
        vec![
            rec("A", "Male", "Prof", 150_000, 30, 33),
            rec("A", "Female", "AsstProf", 80_000, 1, 4),
            rec("B", "Male", "AssocProf", 95_000, 12, 14),
            rec("B", "Female", "Prof", 120_000, 20, 45),
            rec("B", "Male", "AsstProf", 78_000, 3, 2),
        ]
    }

    fn bar_value(bars: &[Bar], key: &str) -> f64 {
        bars.iter().find(|b| b.key == Key::text(key)).map_or(f64::NAN, |b| b.value)
    }

    #[test]
    fn percent_professors_per_gender() {
        let dashboard = SalaryDashboard::build(vec![
            rec("A", "Male", "Prof", 1, 1, 1),
            rec("A", "Male", "AsstProf", 1, 1, 1),
            rec("A", "Female", "Prof", 1, 1, 1),
        ])
        .unwrap();
        let [female, male] = [&dashboard.percent_professors[0], &dashboard.percent_professors[1]];
        assert_eq!(female.gender, "Female");
        assert_eq!(dashboard.professor_ratio(female).unwrap(), 1.0);
        assert_eq!(dashboard.professor_ratio(male).unwrap(), 0.5);
    }

    #[test]
    fn unmatched_discipline_zeroes_every_chart() {
        let mut dashboard = SalaryDashboard::build(faculty()).unwrap();
        dashboard.select_discipline(Some("Z")).unwrap();

        let balance = dashboard.bars(&dashboard.gender_balance).unwrap();
        assert_eq!(balance.len(), 2);
        assert!(balance.iter().all(|b| b.value == 0.0));

        let average = dashboard.bars(&dashboard.average_salary).unwrap();
        assert_eq!(bar_value(&average, "Female"), 0.0);
        assert_eq!(bar_value(&average, "Male"), 0.0);

        for view in &dashboard.percent_professors {
            assert_eq!(dashboard.professor_ratio(view).unwrap(), 0.0);
        }
        assert!(dashboard.scatter_points(&dashboard.service_salary).unwrap().is_empty());
    }

    #[test]
    fn average_salary_is_rounded_to_cents() {
        let dashboard = SalaryDashboard::build(vec![
            rec("A", "Male", "Prof", 100, 1, 1),
            rec("A", "Male", "Prof", 100, 1, 1),
            rec("A", "Male", "Prof", 101, 1, 1),
        ])
        .unwrap();
        let average = dashboard.bars(&dashboard.average_salary).unwrap();
        assert_eq!(bar_value(&average, "Male"), 100.33);
    }

    #[test]
    fn clicking_gender_balance_filters_the_other_charts() {
        let mut dashboard = SalaryDashboard::build(faculty()).unwrap();
        let dim = dashboard.gender_balance.dimension;
        dashboard.toggle(dim, &Key::text("Female")).unwrap();

        let balance = dashboard.bars(&dashboard.gender_balance).unwrap();
        assert_eq!(bar_value(&balance, "Male"), 3.0);
        assert!(balance.iter().any(|b| b.selected && b.key == Key::text("Female")));

        let average = dashboard.bars(&dashboard.average_salary).unwrap();
        assert_eq!(bar_value(&average, "Female"), 100_000.0);
        assert_eq!(bar_value(&average, "Male"), 0.0);

        let options = dashboard.discipline_options().unwrap();
        assert_eq!(options, vec![("A".to_string(), 1), ("B".to_string(), 1)]);

        dashboard.toggle(dim, &Key::text("Female")).unwrap();
        assert!(dashboard.index().filter(dim).unwrap().is_all());
    }

    #[test]
    fn rank_layers_are_percentages_per_gender() {
        let dashboard = SalaryDashboard::build(faculty()).unwrap();
        let layers = dashboard.stacked(&dashboard.rank_distribution).unwrap();
        let labels: Vec<&str> = layers.iter().map(|l| l.label).collect();
        assert_eq!(labels, vec!["Prof", "Asst Prof", "Assoc Prof"]);

        assert_eq!(bar_value(&layers[0].bars, "Female"), 50.0);
        assert_eq!(bar_value(&layers[1].bars, "Female"), 50.0);
        assert_eq!(bar_value(&layers[2].bars, "Female"), 0.0);
        let male_total: f64 = layers.iter().map(|l| bar_value(&l.bars, "Male")).sum();
        assert!((male_total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn scatter_points_decode_tuple_keys() {
        let dashboard = SalaryDashboard::build(faculty()).unwrap();
        let points = dashboard.scatter_points(&dashboard.service_salary).unwrap();
        assert_eq!(points.len(), 5);
        assert_eq!(points[0].x, 1);
        assert_eq!(points[0].title(), "AsstProf earned 80000");
        assert_eq!(dashboard.service_salary.domain, Ok((1, 30)));
    }

    #[test]
    fn phd_scatter_domain_reads_service_years_of_extreme_records() {
        let dashboard = SalaryDashboard::build(faculty()).unwrap();
        // Lowest yrs_since_phd is 2 (yrs_service 3), highest is 45 (yrs_service 20).
        assert_eq!(dashboard.phd_salary.domain, Ok((3, 20)));
        let xs: Vec<i64> = dashboard
            .scatter_points(&dashboard.phd_salary)
            .unwrap()
            .iter()
            .map(|p| p.x)
            .collect();
        assert_eq!(xs, vec![2, 4, 14, 33, 45]);
    }

    #[test]
    fn empty_dataset_only_breaks_the_scatter_domains() {
        let dashboard = SalaryDashboard::build(Vec::new()).unwrap();
        assert_eq!(dashboard.service_salary.domain, Err(IndexError::EmptyDataset));
        assert_eq!(dashboard.phd_salary.domain, Err(IndexError::EmptyDataset));
        assert!(dashboard.bars(&dashboard.gender_balance).unwrap().is_empty());
        assert_eq!(dashboard.professor_ratio(&dashboard.percent_professors[0]).unwrap(), 0.0);
    }

    #[test]
    fn reset_restores_full_dataset_values() {
        let mut dashboard = SalaryDashboard::build(faculty()).unwrap();
        let before = dashboard.index().all_groups_snapshot();

        dashboard.select_discipline(Some("A")).unwrap();
        let dim = dashboard.average_salary.dimension;
        dashboard.toggle(dim, &Key::text("Male")).unwrap();
        assert_ne!(dashboard.index().all_groups_snapshot(), before);

        dashboard.reset_filters();
        assert_eq!(dashboard.index().all_groups_snapshot(), before);
        assert_eq!(dashboard.selected_discipline(), None);
    }

    #[test]
    fn snapshot_names_dimensions() {
        let dashboard = SalaryDashboard::build(faculty()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&dashboard.snapshot_json().unwrap()).unwrap();
        assert_eq!(json["total"], 5);
        assert_eq!(json["groups"][0]["name"], "discipline");
        assert_eq!(json["groups"][0]["dimension"], 0);
        assert!(json["groups"][1]["name"].is_null());
    }
}
