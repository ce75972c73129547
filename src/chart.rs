//! Chart selection: turn an aggregated table into a renderer-independent chart spec.
//!
//! One selector serves every chart type; the count column is passed by name so that
//! per-country (`num_proposals`) and split (`count`) tables go through the same code.

use crate::error::{PipelineError, Result};
use crate::models::{AggregatedTable, ChartKind, FundedBucket};
use log::debug;
use serde::{Deserialize, Serialize};

/// Continuous colour scales known to the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorScale {
    /// Yellow → green → blue, sequential.
    YlGnBu,
}

/// How map locations are matched to geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationMode {
    CountryNames,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    NaturalEarth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
}

/// Inclusive range of counts a colour scale is stretched over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueDomain {
    pub min: usize,
    pub max: usize,
}

impl ValueDomain {
    fn of(values: impl IntoIterator<Item = usize>) -> Self {
        let mut it = values.into_iter();
        match it.next() {
            None => ValueDomain { min: 0, max: 0 },
            Some(first) => it.fold(ValueDomain { min: first, max: first }, |d, v| ValueDomain {
                min: d.min.min(v),
                max: d.max.max(v),
            }),
        }
    }

    /// Position of `v` inside the domain in `[0, 1]`; a degenerate domain maps to 1.
    pub fn normalize(&self, v: usize) -> f64 {
        if self.max <= self.min {
            return 1.0;
        }
        let t = (v.saturating_sub(self.min)) as f64 / (self.max - self.min) as f64;
        t.clamp(0.0, 1.0)
    }
}

/// A (country, count) pair as drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryValue {
    pub country: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoroplethSpec {
    pub title: String,
    pub location_column: String,
    pub value_column: String,
    pub location_mode: LocationMode,
    pub color_scale: ColorScale,
    pub domain: ValueDomain,
    pub values: Vec<CountryValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubbleSpec {
    pub title: String,
    pub location_column: String,
    /// Column encoded as marker size.
    pub size_column: String,
    pub location_mode: LocationMode,
    pub projection: Projection,
    pub max_value: usize,
    pub values: Vec<CountryValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSpec {
    pub title: String,
    pub category_column: String,
    pub value_column: String,
    pub orientation: Orientation,
    /// Ascending by value; ties keep table order.
    pub bars: Vec<CountryValue>,
}

/// Stroke of the zero-to-value stem of a lollipop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentStyle {
    pub width: u32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub size: u32,
    pub color: String,
}

/// Baseline segment from `from` to `to` on the value axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stem {
    pub country: String,
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LollipopSpec {
    pub title: String,
    pub category_column: String,
    pub value_column: String,
    pub x_axis_title: String,
    pub orientation: Orientation,
    pub stems: Vec<Stem>,
    pub heads: Vec<CountryValue>,
    pub stem_style: SegmentStyle,
    pub head_style: MarkerStyle,
}

/// One panel of the faceted map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetPanel {
    pub key: String,
    pub values: Vec<CountryValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetedChoroplethSpec {
    pub title: String,
    pub location_column: String,
    pub value_column: String,
    pub facet_column: String,
    pub location_mode: LocationMode,
    pub color_scale: ColorScale,
    /// Shared by every panel.
    pub domain: ValueDomain,
    pub panels: Vec<FacetPanel>,
}

/// Renderable description of one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Choropleth(ChoroplethSpec),
    Bubble(BubbleSpec),
    Bar(BarSpec),
    Lollipop(LollipopSpec),
    FacetedChoropleth(FacetedChoroplethSpec),
}

impl ChartSpec {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartSpec::Choropleth(_) => ChartKind::Choropleth,
            ChartSpec::Bubble(_) => ChartKind::Bubble,
            ChartSpec::Bar(_) => ChartKind::Bar,
            ChartSpec::Lollipop(_) => ChartKind::Lollipop,
            ChartSpec::FacetedChoropleth(_) => ChartKind::FacetedChoropleth,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Choropleth(s) => &s.title,
            ChartSpec::Bubble(s) => &s.title,
            ChartSpec::Bar(s) => &s.title,
            ChartSpec::Lollipop(s) => &s.title,
            ChartSpec::FacetedChoropleth(s) => &s.title,
        }
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        match self {
            ChartSpec::Choropleth(s) => s.values.is_empty(),
            ChartSpec::Bubble(s) => s.values.is_empty(),
            ChartSpec::Bar(s) => s.bars.is_empty(),
            ChartSpec::Lollipop(s) => s.heads.is_empty(),
            ChartSpec::FacetedChoropleth(s) => s.panels.is_empty(),
        }
    }
}

/// Check the table has the shape `kind` expects and counts under `value_column`.
fn check_shape(table: &AggregatedTable, kind: ChartKind, value_column: &str) -> Result<()> {
    if table.value_column != value_column {
        return Err(PipelineError::ConfigurationMismatch(format!(
            "{kind} expects count column `{value_column}`, table has `{}`",
            table.value_column
        )));
    }
    if kind.needs_split() != table.is_split() {
        let want = if kind.needs_split() {
            "a funded-bucket column"
        } else {
            "one row per country (no funded-bucket column)"
        };
        return Err(PipelineError::ConfigurationMismatch(format!(
            "{kind} needs a table with {want}"
        )));
    }
    if let Some(r) = table.rows.iter().find(|r| r.funded.is_some() != table.is_split()) {
        return Err(PipelineError::ConfigurationMismatch(format!(
            "row for `{}` does not match the table's funded-bucket column",
            r.country
        )));
    }
    Ok(())
}

fn country_values(table: &AggregatedTable) -> Vec<CountryValue> {
    table
        .rows
        .iter()
        .map(|r| CountryValue {
            country: r.country.clone(),
            value: r.count,
        })
        .collect()
}

fn ascending(table: &AggregatedTable) -> Vec<CountryValue> {
    let mut v = country_values(table);
    v.sort_by_key(|cv| cv.value);
    v
}

/// Panels in bucket order (Yes, No, Unclassified, then any unknown keys by name).
fn facet_panels(table: &AggregatedTable) -> Vec<FacetPanel> {
    let mut panels: Vec<FacetPanel> = Vec::new();
    for r in &table.rows {
        let key = r.funded.clone().unwrap_or_default();
        let cv = CountryValue {
            country: r.country.clone(),
            value: r.count,
        };
        match panels.iter_mut().find(|p| p.key == key) {
            Some(p) => p.values.push(cv),
            None => panels.push(FacetPanel {
                key,
                values: vec![cv],
            }),
        }
    }
    panels.sort_by(|a, b| {
        let ka = (FundedBucket::from_label(&a.key).is_none(), FundedBucket::from_label(&a.key));
        let kb = (FundedBucket::from_label(&b.key).is_none(), FundedBucket::from_label(&b.key));
        ka.cmp(&kb).then_with(|| a.key.cmp(&b.key))
    });
    panels
}

/// Build the chart spec for `kind` from `table`.
///
/// ### Errors
/// `ConfigurationMismatch` if `value_column` differs from the table's count column, or if
/// the table is split for a non-faceted chart (or not split for the faceted one).
pub fn select(table: &AggregatedTable, kind: ChartKind, value_column: &str) -> Result<ChartSpec> {
    check_shape(table, kind, value_column)?;
    debug!("select {kind}: {} table rows", table.len());

    let spec = match kind {
        ChartKind::Choropleth => ChartSpec::Choropleth(ChoroplethSpec {
            title: "Number of Proposals by Country".into(),
            location_column: table.country_column.clone(),
            value_column: value_column.to_string(),
            location_mode: LocationMode::CountryNames,
            color_scale: ColorScale::YlGnBu,
            domain: ValueDomain::of(table.rows.iter().map(|r| r.count)),
            values: country_values(table),
        }),
        ChartKind::Bubble => ChartSpec::Bubble(BubbleSpec {
            title: "Bubble Map of Proposals by Country".into(),
            location_column: table.country_column.clone(),
            size_column: value_column.to_string(),
            location_mode: LocationMode::CountryNames,
            projection: Projection::NaturalEarth,
            max_value: table.rows.iter().map(|r| r.count).max().unwrap_or(0),
            values: country_values(table),
        }),
        ChartKind::Bar => ChartSpec::Bar(BarSpec {
            title: "Number of Proposals by Country".into(),
            category_column: table.country_column.clone(),
            value_column: value_column.to_string(),
            orientation: Orientation::Horizontal,
            bars: ascending(table),
        }),
        ChartKind::Lollipop => {
            let heads = ascending(table);
            let stems = heads
                .iter()
                .map(|cv| Stem {
                    country: cv.country.clone(),
                    from: 0,
                    to: cv.value,
                })
                .collect();
            ChartSpec::Lollipop(LollipopSpec {
                title: "Lollipop Chart of Proposals".into(),
                category_column: table.country_column.clone(),
                value_column: value_column.to_string(),
                x_axis_title: "Proposals".into(),
                orientation: Orientation::Horizontal,
                stems,
                heads,
                stem_style: SegmentStyle {
                    width: 2,
                    color: "gray".into(),
                },
                head_style: MarkerStyle {
                    size: 10,
                    color: "crimson".into(),
                },
            })
        }
        ChartKind::FacetedChoropleth => {
            let facet_column = table.funded_column.clone().ok_or_else(|| {
                PipelineError::ConfigurationMismatch("faceted map needs a facet column".into())
            })?;
            ChartSpec::FacetedChoropleth(FacetedChoroplethSpec {
                title: "Proposals by Country: Funded Status".into(),
                location_column: table.country_column.clone(),
                value_column: value_column.to_string(),
                facet_column,
                location_mode: LocationMode::CountryNames,
                color_scale: ColorScale::YlGnBu,
                domain: ValueDomain::of(table.rows.iter().map(|r| r.count)),
                panels: facet_panels(table),
            })
        }
    };
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::models::Row;

    #[test]
    fn domain_of_values() {
        assert_eq!(ValueDomain::of([3, 1, 7]), ValueDomain { min: 1, max: 7 });
        assert_eq!(ValueDomain::of(Vec::<usize>::new()), ValueDomain { min: 0, max: 0 });
        let d = ValueDomain { min: 2, max: 6 };
        assert_eq!(d.normalize(2), 0.0);
        assert_eq!(d.normalize(4), 0.5);
        assert_eq!(d.normalize(6), 1.0);
        assert_eq!(ValueDomain { min: 3, max: 3 }.normalize(3), 1.0);
    }

    #[test]
    fn wrong_value_column_is_a_mismatch() {
        let t = aggregate(&[Row::new("Greece", "Yes")], false);
        let err = select(&t, ChartKind::Bar, "count").unwrap_err();
        assert!(matches!(err, PipelineError::ConfigurationMismatch(_)));
    }

    #[test]
    fn spec_serializes_with_kind_tag() {
        let t = aggregate(&[Row::new("Greece", "Yes")], false);
        let spec = select(&t, ChartKind::Bubble, "num_proposals").unwrap();
        let v = serde_json::to_value(&spec).unwrap();
        assert_eq!(v["kind"], "bubble");
        assert_eq!(v["size_column"], "num_proposals");
        assert_eq!(v["max_value"], 1);
    }
}
