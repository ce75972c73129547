use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Name of the country column in input datasets and exported tables.
pub const COUNTRY_COLUMN: &str = "Country";
/// Name of the funding-status column in input datasets and split tables.
pub const FUNDED_COLUMN: &str = "Funded";
/// Count column used for per-country tables unless the caller picks another name.
pub const DEFAULT_VALUE_COLUMN: &str = "num_proposals";
/// Count column used for the country × funded-bucket table behind the faceted chart.
pub const SPLIT_VALUE_COLUMN: &str = "count";

/// One participation record (one row of the loaded dataset).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Row {
    pub country: String,
    /// Free-text funding status ("Yes", "funded", "No", ...), compared case-insensitively.
    pub funded: String,
    /// Columns the pipeline does not look at, kept verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Row {
    pub fn new(country: impl Into<String>, funded: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            funded: funded.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    pub fn bucket(&self) -> FundedBucket {
        FundedBucket::classify(&self.funded)
    }
}

/// Normalized funding-status category of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FundedBucket {
    Funded,
    NotFunded,
    Unclassified,
}

impl FundedBucket {
    /// Lower-cases the raw value; "yes"/"funded" are funded, "no" is not funded.
    /// Anything else (including surrounding whitespace) is unclassified.
    pub fn classify(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "yes" | "funded" => FundedBucket::Funded,
            "no" => FundedBucket::NotFunded,
            _ => FundedBucket::Unclassified,
        }
    }

    /// Facet key written into split tables.
    pub fn label(self) -> &'static str {
        match self {
            FundedBucket::Funded => "Yes",
            FundedBucket::NotFunded => "No",
            FundedBucket::Unclassified => "Unclassified",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Yes" => Some(FundedBucket::Funded),
            "No" => Some(FundedBucket::NotFunded),
            "Unclassified" => Some(FundedBucket::Unclassified),
            _ => None,
        }
    }
}

/// Lower-case, treat `-`/`_` as spaces and collapse runs of whitespace.
fn normalize_choice(s: &str) -> String {
    s.to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Geographic grouping used as a filter predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Region {
    #[default]
    All,
    Emmena,
    Eu,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::All, Region::Emmena, Region::Eu];

    pub fn name(self) -> &'static str {
        match self {
            Region::All => "All Countries",
            Region::Emmena => "EMMENA",
            Region::Eu => "EU",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_choice(s).as_str() {
            "all" | "all countries" => Ok(Region::All),
            "emmena" | "emmena only" => Ok(Region::Emmena),
            "eu" | "eu only" => Ok(Region::Eu),
            _ => Err(PipelineError::UnknownRegion(s.to_string())),
        }
    }
}

/// Funding-status predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FundingFilter {
    #[default]
    All,
    FundedOnly,
    NotFundedOnly,
}

impl FundingFilter {
    /// Whether a row with this bucket passes the predicate.
    pub fn accepts(self, bucket: FundedBucket) -> bool {
        match self {
            FundingFilter::All => true,
            FundingFilter::FundedOnly => bucket == FundedBucket::Funded,
            FundingFilter::NotFundedOnly => bucket == FundedBucket::NotFunded,
        }
    }
}

impl fmt::Display for FundingFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FundingFilter::All => "All",
            FundingFilter::FundedOnly => "Funded Only",
            FundingFilter::NotFundedOnly => "Not Funded Only",
        })
    }
}

impl FromStr for FundingFilter {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_choice(s).as_str() {
            "all" => Ok(FundingFilter::All),
            "funded" | "funded only" | "fundedonly" => Ok(FundingFilter::FundedOnly),
            "not funded" | "not funded only" | "notfunded" | "notfundedonly" | "unfunded" => {
                Ok(FundingFilter::NotFundedOnly)
            }
            _ => Err(PipelineError::UnknownFundingFilter(s.to_string())),
        }
    }
}

/// Region + funding choice for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSelection {
    pub region: Region,
    pub funded: FundingFilter,
}

impl FilterSelection {
    pub fn new(region: Region, funded: FundingFilter) -> Self {
        Self { region, funded }
    }
}

/// Chart types offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ChartKind {
    #[default]
    Choropleth,
    Bubble,
    Bar,
    Lollipop,
    FacetedChoropleth,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::Choropleth,
        ChartKind::Bubble,
        ChartKind::Bar,
        ChartKind::Lollipop,
        ChartKind::FacetedChoropleth,
    ];

    /// Only the faceted map needs the country × funded-bucket aggregation.
    pub fn needs_split(self) -> bool {
        matches!(self, ChartKind::FacetedChoropleth)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChartKind::Choropleth => "Choropleth Map",
            ChartKind::Bubble => "Bubble Map",
            ChartKind::Bar => "Bar Chart",
            ChartKind::Lollipop => "Lollipop Chart",
            ChartKind::FacetedChoropleth => "Small Multiples (Funded vs Not Funded)",
        })
    }
}

impl FromStr for ChartKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_choice(s).as_str() {
            "choropleth" | "choropleth map" | "map" => Ok(ChartKind::Choropleth),
            "bubble" | "bubble map" => Ok(ChartKind::Bubble),
            "bar" | "bar chart" => Ok(ChartKind::Bar),
            "lollipop" | "lollipop chart" => Ok(ChartKind::Lollipop),
            "faceted" | "faceted choropleth" | "small multiples"
            | "small multiples (funded vs not funded)" => Ok(ChartKind::FacetedChoropleth),
            _ => Err(PipelineError::UnknownChartType(s.to_string())),
        }
    }
}

/// One aggregated group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregatedRow {
    pub country: String,
    /// Funded-bucket label; present only in split tables.
    pub funded: Option<String>,
    pub count: usize,
}

/// Per-country (or per country × funded bucket) row counts.
///
/// Rows are ordered by country, then by funded bucket (Yes, No, Unclassified).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregatedTable {
    pub country_column: String,
    /// Column name of the funded bucket; `Some` iff the table is split.
    pub funded_column: Option<String>,
    pub value_column: String,
    pub rows: Vec<AggregatedRow>,
}

impl AggregatedTable {
    pub fn is_split(&self) -> bool {
        self.funded_column.is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of all counts; equals the number of rows that were aggregated.
    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    /// Count for a country summed over buckets; `None` if the country has no row.
    pub fn count_for(&self, country: &str) -> Option<usize> {
        let mut hits = self.rows.iter().filter(|r| r.country == country).peekable();
        hits.peek()?;
        Some(hits.map(|r| r.count).sum())
    }

    /// Header names in export order.
    pub fn columns(&self) -> Vec<&str> {
        let mut cols = vec![self.country_column.as_str()];
        if let Some(f) = self.funded_column.as_deref() {
            cols.push(f);
        }
        cols.push(self.value_column.as_str());
        cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_is_case_insensitive_and_exact() {
        assert_eq!(FundedBucket::classify("YES"), FundedBucket::Funded);
        assert_eq!(FundedBucket::classify("Funded"), FundedBucket::Funded);
        assert_eq!(FundedBucket::classify("nO"), FundedBucket::NotFunded);
        assert_eq!(FundedBucket::classify("pending"), FundedBucket::Unclassified);
        assert_eq!(FundedBucket::classify(" yes"), FundedBucket::Unclassified);
        assert_eq!(FundedBucket::classify(""), FundedBucket::Unclassified);
    }

    #[test]
    fn parse_selection_labels() {
        assert_eq!("EMMENA Only".parse::<Region>().unwrap(), Region::Emmena);
        assert_eq!("all-countries".parse::<Region>().unwrap(), Region::All);
        assert!(matches!(
            "Asia".parse::<Region>(),
            Err(PipelineError::UnknownRegion(s)) if s == "Asia"
        ));
        assert_eq!(
            "Not Funded Only".parse::<FundingFilter>().unwrap(),
            FundingFilter::NotFundedOnly
        );
        assert_eq!(
            "funded_only".parse::<FundingFilter>().unwrap(),
            FundingFilter::FundedOnly
        );
        assert_eq!(
            "Small Multiples (Funded vs Not Funded)"
                .parse::<ChartKind>()
                .unwrap(),
            ChartKind::FacetedChoropleth
        );
        assert!(matches!(
            "pie".parse::<ChartKind>(),
            Err(PipelineError::UnknownChartType(_))
        ));
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for kind in ChartKind::ALL {
            assert_eq!(kind.to_string().parse::<ChartKind>().unwrap(), kind);
        }
        for region in Region::ALL {
            assert_eq!(region.to_string().parse::<Region>().unwrap(), region);
        }
    }

    #[test]
    fn table_columns_and_totals() {
        let t = AggregatedTable {
            country_column: COUNTRY_COLUMN.into(),
            funded_column: Some(FUNDED_COLUMN.into()),
            value_column: SPLIT_VALUE_COLUMN.into(),
            rows: vec![
                AggregatedRow { country: "Greece".into(), funded: Some("Yes".into()), count: 1 },
                AggregatedRow { country: "Greece".into(), funded: Some("No".into()), count: 2 },
            ],
        };
        assert_eq!(t.columns(), vec!["Country", "Funded", "count"]);
        assert_eq!(t.total(), 3);
        assert_eq!(t.count_for("Greece"), Some(3));
        assert_eq!(t.count_for("Egypt"), None);
    }
}
