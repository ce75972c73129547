use proposal_maps::aggregate::aggregate;
use proposal_maps::chart::{ChartSpec, ColorScale, Orientation, ValueDomain, select};
use proposal_maps::models::{DEFAULT_VALUE_COLUMN, SPLIT_VALUE_COLUMN};
use proposal_maps::{AggregatedRow, AggregatedTable, ChartKind, PipelineError, Row};

fn table(pairs: &[(&str, usize)]) -> AggregatedTable {
    AggregatedTable {
        country_column: "Country".into(),
        funded_column: None,
        value_column: DEFAULT_VALUE_COLUMN.into(),
        rows: pairs
            .iter()
            .map(|(c, n)| AggregatedRow {
                country: c.to_string(),
                funded: None,
                count: *n,
            })
            .collect(),
    }
}

fn order(values: &[proposal_maps::chart::CountryValue]) -> Vec<(&str, usize)> {
    values.iter().map(|cv| (cv.country.as_str(), cv.value)).collect()
}

#[test]
fn bar_sorts_ascending() {
    let t = table(&[("Greece", 5), ("Egypt", 2), ("Libya", 8)]);
    let ChartSpec::Bar(bar) = select(&t, ChartKind::Bar, DEFAULT_VALUE_COLUMN).unwrap() else {
        panic!("expected bar");
    };
    assert_eq!(order(&bar.bars), vec![("Egypt", 2), ("Greece", 5), ("Libya", 8)]);
    assert_eq!(bar.orientation, Orientation::Horizontal);
    assert_eq!(bar.category_column, "Country");
    assert_eq!(bar.value_column, "num_proposals");
}

#[test]
fn bar_ties_keep_table_order() {
    let t = table(&[("Algeria", 3), ("Bahrain", 1), ("Cyprus", 3)]);
    let ChartSpec::Bar(bar) = select(&t, ChartKind::Bar, DEFAULT_VALUE_COLUMN).unwrap() else {
        panic!("expected bar");
    };
    assert_eq!(
        order(&bar.bars),
        vec![("Bahrain", 1), ("Algeria", 3), ("Cyprus", 3)]
    );
}

#[test]
fn lollipop_has_stems_and_heads_in_bar_order() {
    let t = table(&[("Greece", 5), ("Egypt", 2), ("Libya", 8)]);
    let ChartSpec::Lollipop(l) = select(&t, ChartKind::Lollipop, DEFAULT_VALUE_COLUMN).unwrap()
    else {
        panic!("expected lollipop");
    };
    assert_eq!(order(&l.heads), vec![("Egypt", 2), ("Greece", 5), ("Libya", 8)]);
    assert_eq!(l.stems.len(), 3);
    for (stem, head) in l.stems.iter().zip(&l.heads) {
        assert_eq!(stem.country, head.country);
        assert_eq!(stem.from, 0);
        assert_eq!(stem.to, head.value);
    }
    assert_eq!(l.x_axis_title, "Proposals");
    assert_eq!(l.head_style.color, "crimson");
}

#[test]
fn choropleth_and_bubble_encode_counts() {
    let t = table(&[("Greece", 5), ("Egypt", 2), ("Libya", 8)]);
    let ChartSpec::Choropleth(c) = select(&t, ChartKind::Choropleth, DEFAULT_VALUE_COLUMN).unwrap()
    else {
        panic!("expected choropleth");
    };
    assert_eq!(c.domain, ValueDomain { min: 2, max: 8 });
    assert_eq!(c.color_scale, ColorScale::YlGnBu);
    assert_eq!(order(&c.values), vec![("Greece", 5), ("Egypt", 2), ("Libya", 8)]);

    let ChartSpec::Bubble(b) = select(&t, ChartKind::Bubble, DEFAULT_VALUE_COLUMN).unwrap() else {
        panic!("expected bubble");
    };
    assert_eq!(b.size_column, "num_proposals");
    assert_eq!(b.max_value, 8);
}

#[test]
fn faceted_panels_share_one_domain() {
    let rows = vec![
        Row::new("Greece", "Yes"),
        Row::new("Greece", "Yes"),
        Row::new("Greece", "Yes"),
        Row::new("Egypt", "No"),
        Row::new("Libya", "unsure"),
    ];
    let t = aggregate(&rows, true);
    let ChartSpec::FacetedChoropleth(f) =
        select(&t, ChartKind::FacetedChoropleth, SPLIT_VALUE_COLUMN).unwrap()
    else {
        panic!("expected faceted");
    };
    assert_eq!(f.facet_column, "Funded");
    assert_eq!(f.domain, ValueDomain { min: 1, max: 3 });
    let keys: Vec<&str> = f.panels.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["Yes", "No", "Unclassified"]);
}

#[test]
fn split_table_is_rejected_by_flat_charts() {
    let t = aggregate(&[Row::new("Greece", "Yes")], true);
    for kind in [
        ChartKind::Choropleth,
        ChartKind::Bubble,
        ChartKind::Bar,
        ChartKind::Lollipop,
    ] {
        let err = select(&t, kind, SPLIT_VALUE_COLUMN).unwrap_err();
        assert!(
            matches!(err, PipelineError::ConfigurationMismatch(_)),
            "{kind}: {err}"
        );
    }
}

#[test]
fn faceted_without_bucket_column_is_rejected() {
    let t = table(&[("Greece", 1)]);
    let err = select(&t, ChartKind::FacetedChoropleth, DEFAULT_VALUE_COLUMN).unwrap_err();
    assert!(matches!(err, PipelineError::ConfigurationMismatch(_)));
}

#[test]
fn value_column_must_match() {
    let t = table(&[("Greece", 1)]);
    let err = select(&t, ChartKind::Choropleth, "proposals").unwrap_err();
    assert!(err.to_string().contains("num_proposals"));
}

#[test]
fn inconsistent_rows_are_rejected() {
    let mut t = table(&[("Greece", 1)]);
    t.rows[0].funded = Some("Yes".into());
    let err = select(&t, ChartKind::Bar, DEFAULT_VALUE_COLUMN).unwrap_err();
    assert!(matches!(err, PipelineError::ConfigurationMismatch(_)));
}

#[test]
fn empty_table_gives_empty_spec() {
    let t = table(&[]);
    let spec = select(&t, ChartKind::Choropleth, DEFAULT_VALUE_COLUMN).unwrap();
    assert!(spec.is_empty());
    assert_eq!(spec.title(), "Number of Proposals by Country");
}
