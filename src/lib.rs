//! proposal_maps
//!
//! A small Rust library for exploring proposal participation data by country.
//! Pairs with the `pmap` CLI.
//!
//! ### Features
//! - Load a dataset (CSV or JSON) with `Country` and `Funded` columns
//! - Narrow rows by region (All, EMMENA, EU) and funding status
//! - Count rows per country, optionally split by funded bucket
//! - Pick one of five chart specs (choropleth, bubble, bar, lollipop, faceted choropleth)
//! - Export the counts as CSV and render any chart spec to SVG/PNG
//!
//! ### Example
//! ```no_run
//! use proposal_maps::{ChartKind, FilterSelection, FundingFilter, Region};
//!
//! let rows = proposal_maps::storage::load_rows("proposals.csv")?;
//! let selection = FilterSelection::new(Region::Emmena, FundingFilter::FundedOnly);
//! let out = proposal_maps::pipeline::run(&rows, &selection, ChartKind::Bar, "num_proposals")?;
//! std::fs::write("filtered_counts.csv", proposal_maps::storage::export_csv(&out.counts)?)?;
//! proposal_maps::viz::render_chart(&out.spec, "bar.svg", 1000, 600, "en")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod aggregate;
pub mod chart;
pub mod error;
pub mod filter;
pub mod models;
pub mod pipeline;
pub mod regions;
pub mod storage;
pub mod viz;

pub use chart::ChartSpec;
pub use error::PipelineError;
pub use models::{
    AggregatedRow, AggregatedTable, ChartKind, FilterSelection, FundedBucket, FundingFilter,
    Region, Row,
};
