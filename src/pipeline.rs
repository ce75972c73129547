//! One full pass of filter → aggregate → chart selection for a single interaction.

use crate::aggregate::aggregate_as;
use crate::chart::{ChartSpec, select};
use crate::error::Result;
use crate::filter::filter_rows;
use crate::models::{AggregatedTable, ChartKind, FilterSelection, Row, SPLIT_VALUE_COLUMN};

/// Everything one interaction produces.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Number of rows that passed the filters.
    pub filtered_rows: usize,
    /// Per-country counts; this is what gets exported.
    pub counts: AggregatedTable,
    /// Table the chart was built from (split by funded bucket for the faceted map).
    pub chart_table: AggregatedTable,
    pub spec: ChartSpec,
}

/// Run the pipeline over an immutable dataset snapshot.
///
/// The faceted map is built from the country × funded-bucket aggregation counted under
/// `count`; every other chart uses the per-country table counted under `value_column`.
pub fn run(
    rows: &[Row],
    selection: &FilterSelection,
    kind: ChartKind,
    value_column: &str,
) -> Result<PipelineOutput> {
    let filtered = filter_rows(rows, selection);
    let counts = aggregate_as(&filtered, false, value_column);
    let (chart_table, chart_value_column) = if kind.needs_split() {
        (
            aggregate_as(&filtered, true, SPLIT_VALUE_COLUMN),
            SPLIT_VALUE_COLUMN,
        )
    } else {
        (counts.clone(), value_column)
    };
    let spec = select(&chart_table, kind, chart_value_column)?;
    Ok(PipelineOutput {
        filtered_rows: filtered.len(),
        counts,
        chart_table,
        spec,
    })
}
