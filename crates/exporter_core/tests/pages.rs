use std::path::{Path, PathBuf};

use exporter_core::{
    classify, expected_page_count, page_specs, DerivedAssets, LayoutDecision, PageLayout,
    SpreadOrder,
};
use pretty_assertions::assert_eq;

#[test]
fn classification_is_strict() {
    assert_eq!(classify(1600, 1200), PageLayout::Spread);
    assert_eq!(classify(1200, 1200), PageLayout::Single);
    assert_eq!(classify(800, 1200), PageLayout::Single);
}

#[test]
fn single_page_keeps_its_number() {
    let specs = page_specs(
        4,
        &LayoutDecision::Single(PathBuf::from("page-004.jpg")),
        SpreadOrder::default(),
    );
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].label, "4");
    assert_eq!(specs[0].asset, PathBuf::from("page-004.jpg"));
}

#[test]
fn spread_reads_full_then_right_then_left() {
    let assets = DerivedAssets::in_dir(Path::new("out"), 2);
    let decision = LayoutDecision::Spread {
        full: assets.page.clone(),
        left: assets.left.clone(),
        right: assets.right.clone(),
    };

    let specs = page_specs(2, &decision, SpreadOrder::RightToLeft);
    let labels: Vec<&str> = specs.iter().map(|spec| spec.label.as_str()).collect();
    assert_eq!(labels, vec!["2", "2 - 1", "2 - 2"]);
    assert_eq!(
        specs.iter().map(|spec| spec.asset.clone()).collect::<Vec<_>>(),
        vec![
            PathBuf::from("out/page-002.jpg"),
            PathBuf::from("out/page-002-right.jpg"),
            PathBuf::from("out/page-002-left.jpg"),
        ]
    );

    let specs = page_specs(2, &decision, SpreadOrder::LeftToRight);
    assert_eq!(specs[1].asset, assets.left);
    assert_eq!(specs[2].asset, assets.right);
}

#[test]
fn page_count_triples_spreads() {
    assert_eq!(expected_page_count(2, 1), 5);
    assert_eq!(expected_page_count(0, 0), 0);
    assert_eq!(SpreadOrder::RightToLeft.progression(), "rtl");
}
