use crate::models::{FilterSelection, FundedBucket, FundingFilter, Row};
use crate::regions::belongs_to;
use log::{debug, warn};

/// Keep the rows that pass both the region and the funding predicate.
///
/// Rows whose funding status is neither funded nor not-funded are dropped by any
/// non-`All` funding filter. Input order is preserved, though callers must not rely on it.
pub fn filter_rows(rows: &[Row], selection: &FilterSelection) -> Vec<Row> {
    let mut unclassified = 0usize;
    let out: Vec<Row> = rows
        .iter()
        .filter(|r| belongs_to(&r.country, selection.region))
        .filter(|r| {
            let bucket = r.bucket();
            let keep = selection.funded.accepts(bucket);
            if !keep && bucket == FundedBucket::Unclassified {
                unclassified += 1;
            }
            keep
        })
        .cloned()
        .collect();

    if unclassified > 0 && selection.funded != FundingFilter::All {
        warn!(
            "{} row(s) with unrecognized funding status dropped by `{}` filter",
            unclassified, selection.funded
        );
    }
    debug!(
        "filter region={} funded={}: {} -> {} rows",
        selection.region,
        selection.funded,
        rows.len(),
        out.len()
    );
    out
}
