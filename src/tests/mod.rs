use std::collections::BTreeMap;

use crate::config::{self, CardOptions};
use crate::dataset::{parse_entities, DatasetFormat};
use crate::engine::{compute_facet_counts, reduce, Catalog};
use crate::model::{Dimension, FacetConfig, Grouping, Intent, SortMode, ViewState};
use crate::session::{parse_command, Command, Session};
use crate::view::build_view;

fn catalog(csv: &str) -> Catalog {
    let (rows, _) = parse_entities(csv.as_bytes(), DatasetFormat::Csv).unwrap();
    Catalog::new(rows)
}

fn toggle(dimension: Dimension, value: &str) -> Intent {
    Intent::Toggle {
        dimension,
        value: value.to_string(),
    }
}

fn urls(catalog: &Catalog, state: &ViewState, facets: &FacetConfig) -> Vec<String> {
    catalog
        .query(state, facets)
        .results
        .iter()
        .map(|e| e.url.clone())
        .collect()
}

fn bike_grouping() -> FacetConfig {
    let mut groups = BTreeMap::new();
    groups.insert(
        "bike".to_string(),
        vec!["cycling".to_string(), "mtb".to_string()],
    );
    FacetConfig {
        grouping: Some(Grouping {
            parent: Dimension::Category,
            child: Dimension::Activity,
            groups,
        }),
        ..FacetConfig::default()
    }
}

#[test]
fn selecting_a_page_type_narrows_results() {
    let catalog = catalog(
        "url,page_type\n\
         https://one,tech\n\
         https://two,news\n\
         https://three,Tech\n",
    );
    let cfg = FacetConfig::default();
    let state = reduce(&ViewState::default(), &toggle(Dimension::PageType, "tech"), &cfg);

    assert_eq!(urls(&catalog, &state, &cfg), vec!["https://one", "https://three"]);
    let view = build_view(&catalog, &state, &cfg, &CardOptions::default());
    assert_eq!(view.status, "2 results");
}

#[test]
fn grouped_category_cascades_to_activities() {
    let catalog = catalog(
        "url,category,activity\n\
         https://a,bike,cycling\n\
         https://b,bike,mtb\n\
         https://c,run,running\n",
    );
    let cfg = bike_grouping();

    let on = reduce(&ViewState::default(), &toggle(Dimension::Category, "bike"), &cfg);
    assert!(on.selection.contains(Dimension::Activity, "cycling"));
    assert!(on.selection.contains(Dimension::Activity, "mtb"));
    assert!(on.selection.group_selected("bike"));
    assert_eq!(urls(&catalog, &on, &cfg), vec!["https://a", "https://b"]);

    let view = build_view(&catalog, &on, &cfg, &CardOptions::default());
    let category = view
        .facets
        .iter()
        .find(|g| g.dimension == Dimension::Category)
        .unwrap();
    assert!(category.derived);
    assert_eq!(category.controls.len(), 1);
    assert_eq!(category.controls[0].count, 2);
    assert!(category.controls[0].checked);

    let off = reduce(&on, &toggle(Dimension::Category, "bike"), &cfg);
    assert!(!off.selection.contains(Dimension::Activity, "cycling"));
    assert!(!off.selection.contains(Dimension::Activity, "mtb"));
    assert_eq!(off, ViewState::default());
}

#[test]
fn newest_ranks_invalid_dates_last() {
    let catalog = catalog(
        "url,publish_date\n\
         https://bad,not-a-date\n\
         https://good,2024-01-01\n",
    );
    let cfg = FacetConfig::default();
    let state = reduce(&ViewState::default(), &Intent::SetSort(SortMode::Newest), &cfg);
    assert_eq!(urls(&catalog, &state, &cfg), vec!["https://good", "https://bad"]);
}

#[test]
fn non_http_rows_never_surface() {
    let catalog = catalog(
        "url,page_type,category\n\
         ftp://x,ghost,phantom\n\
         https://ok,news,bike\n",
    );
    assert_eq!(catalog.len(), 1);
    let cfg = FacetConfig::default();
    let view = build_view(&catalog, &ViewState::default(), &cfg, &CardOptions::default());
    let values: Vec<&str> = view
        .facets
        .iter()
        .flat_map(|g| g.controls.iter().map(|c| c.value.as_str()))
        .collect();
    assert!(!values.contains(&"ghost"));
    assert!(!values.contains(&"phantom"));
    assert!(view.cards.iter().all(|c| c.url != "ftp://x"));
}

#[test]
fn unfiltered_relevant_keeps_dataset_order() {
    let catalog = catalog(
        "url,publish_date\n\
         https://3,2021-01-01\n\
         https://1,2024-01-01\n\
         https://2,\n",
    );
    let cfg = FacetConfig::default();
    assert_eq!(
        urls(&catalog, &ViewState::default(), &cfg),
        vec!["https://3", "https://1", "https://2"]
    );
}

#[test]
fn toggle_twice_restores_result_count() {
    let catalog = catalog(
        "url,page_type,activity\n\
         https://a,news,mtb\n\
         https://b,tech,\n\
         https://c,news,road\n",
    );
    let cfg = FacetConfig::default();
    let base = ViewState::default();
    for (dimension, value) in [(Dimension::PageType, "news"), (Dimension::Activity, "mtb")] {
        let on = reduce(&base, &toggle(dimension, value), &cfg);
        assert_ne!(catalog.query(&on, &cfg).results.len(), catalog.len());
        let off = reduce(&on, &toggle(dimension, value), &cfg);
        assert_eq!(off, base);
        assert_eq!(catalog.query(&off, &cfg).results.len(), catalog.len());
    }
}

#[test]
fn facet_counts_ignore_own_dimension() {
    let catalog = catalog(
        "url,page_type,category\n\
         https://a,news,bike\n\
         https://b,tech,bike\n\
         https://c,news,run\n",
    );
    let cfg = FacetConfig::default();
    let state = reduce(&ViewState::default(), &toggle(Dimension::PageType, "news"), &cfg);
    let counts = compute_facet_counts(catalog.entities(), &state.selection, &cfg);
    assert_eq!(counts.get(Dimension::PageType, "tech"), 1);
    assert_eq!(counts.get(Dimension::Category, "bike"), 1);
    assert_eq!(counts.get(Dimension::Category, "run"), 1);
    assert_eq!(
        counts,
        compute_facet_counts(catalog.entities(), &state.selection, &cfg)
    );
}

#[test]
fn session_follows_command_lines() {
    let cfg = config::parse_config(
        "grouping:\n  parent: category\n  child: activity\n  groups:\n    bike: [cycling, mtb]\n",
    )
    .unwrap();
    let mut session = Session::new(cfg.facet_config().unwrap(), cfg.card_options());
    let (rows, _) = parse_entities(
        "url,page_type,category,activity,publish_date\n\
         https://a,news,bike,cycling,2023-05-01\n\
         https://b,tech,bike,mtb,2024-05-01\n\
         https://c,news,run,trail,2022-01-01\n"
            .as_bytes(),
        DatasetFormat::Csv,
    )
    .unwrap();
    session.loaded(Ok(rows));

    for line in ["toggle category bike", "sort newest"] {
        match parse_command(line).unwrap() {
            Command::Intent(intent) => session.dispatch(&intent),
            other => panic!("unexpected command {other:?}"),
        }
    }
    let view = session.view();
    let order: Vec<&str> = view.cards.iter().map(|c| c.url.as_str()).collect();
    assert_eq!(order, vec!["https://b", "https://a"]);
    assert_eq!(view.active_filters.len(), 3);

    if let Command::Intent(intent) = parse_command("clear").unwrap() {
        session.dispatch(&intent);
    }
    assert_eq!(session.view().status, "3 results");
    assert_eq!(session.state().sort, SortMode::Newest);
}
