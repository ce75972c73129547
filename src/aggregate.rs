use crate::models::{
    AggregatedRow, AggregatedTable, COUNTRY_COLUMN, DEFAULT_VALUE_COLUMN, FUNDED_COLUMN,
    FundedBucket, Row, SPLIT_VALUE_COLUMN,
};
use log::debug;
use std::collections::BTreeMap;

/// Grouping key: country, plus the funded bucket in split mode.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub country: String,
    pub bucket: Option<FundedBucket>,
}

/// Count rows per country (and per funded bucket when `split_by_funded`).
///
/// Uses `num_proposals` as the count column for per-country tables and `count` for
/// split tables.
pub fn aggregate(rows: &[Row], split_by_funded: bool) -> AggregatedTable {
    let value_column = if split_by_funded {
        SPLIT_VALUE_COLUMN
    } else {
        DEFAULT_VALUE_COLUMN
    };
    aggregate_as(rows, split_by_funded, value_column)
}

/// Same as [`aggregate`] with a caller-chosen count column name.
pub fn aggregate_as(rows: &[Row], split_by_funded: bool, value_column: &str) -> AggregatedTable {
    let mut groups: BTreeMap<GroupKey, usize> = BTreeMap::new();
    for r in rows {
        let key = GroupKey {
            country: r.country.clone(),
            bucket: split_by_funded.then(|| r.bucket()),
        };
        *groups.entry(key).or_default() += 1;
    }

    let rows_out: Vec<AggregatedRow> = groups
        .into_iter()
        .map(|(key, count)| AggregatedRow {
            country: key.country,
            funded: key.bucket.map(|b| b.label().to_string()),
            count,
        })
        .collect();
    debug!(
        "aggregate split={}: {} rows -> {} groups",
        split_by_funded,
        rows.len(),
        rows_out.len()
    );

    AggregatedTable {
        country_column: COUNTRY_COLUMN.to_string(),
        funded_column: split_by_funded.then(|| FUNDED_COLUMN.to_string()),
        value_column: value_column.to_string(),
        rows: rows_out,
    }
}

/// Re-aggregate a table to one row per country by summing counts.
///
/// Applied to a per-country table this is the identity; applied to a split table it
/// yields the per-country table the same rows would have produced.
pub fn collapse_by_country(table: &AggregatedTable, value_column: &str) -> AggregatedTable {
    let mut sums: BTreeMap<&str, usize> = BTreeMap::new();
    for r in &table.rows {
        *sums.entry(r.country.as_str()).or_default() += r.count;
    }
    AggregatedTable {
        country_column: table.country_column.clone(),
        funded_column: None,
        value_column: value_column.to_string(),
        rows: sums
            .into_iter()
            .map(|(country, count)| AggregatedRow {
                country: country.to_string(),
                funded: None,
                count,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_exact_string_groups() {
        let rows = vec![
            Row::new("Greece", "Yes"),
            Row::new("greece", "Yes"),
            Row::new("Greece", "No"),
        ];
        let t = aggregate(&rows, false);
        assert_eq!(t.value_column, "num_proposals");
        assert_eq!(t.count_for("Greece"), Some(2));
        assert_eq!(t.count_for("greece"), Some(1));
        assert_eq!(t.total(), 3);
    }

    #[test]
    fn split_orders_buckets_within_country() {
        let rows = vec![
            Row::new("Egypt", "maybe"),
            Row::new("Egypt", "no"),
            Row::new("Egypt", "FUNDED"),
        ];
        let t = aggregate(&rows, true);
        let labels: Vec<_> = t.rows.iter().map(|r| r.funded.as_deref().unwrap()).collect();
        assert_eq!(labels, vec!["Yes", "No", "Unclassified"]);
        assert_eq!(t.value_column, "count");
        assert_eq!(t.funded_column.as_deref(), Some("Funded"));
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let t = aggregate(&[], false);
        assert!(t.is_empty());
        assert_eq!(t.total(), 0);
    }
}
