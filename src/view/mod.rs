use serde::Serialize;

use crate::config::CardOptions;
use crate::engine::{self, Catalog};
use crate::model::{Dimension, FacetConfig, SortMode, ViewState};
use crate::normalize;

pub const LOADING_STATUS: &str = "Loading…";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FacetControl {
    pub id: String,
    pub value: String,
    pub count: usize,
    pub checked: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FacetGroup {
    pub dimension: Dimension,
    pub label: String,
    pub open: bool,
    pub derived: bool,
    pub controls: Vec<FacetControl>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Chip {
    pub dimension: Dimension,
    pub value: String,
    pub accent: bool,
    pub aria_label: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Card {
    pub index: usize,
    pub title: String,
    pub url: String,
    pub image: String,
    pub publish_date: String,
    pub chips: Vec<Chip>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActiveFilter {
    pub dimension: Dimension,
    pub value: String,
    pub control_id: String,
    pub aria_label: String,
}

/// Everything a renderer draws for one state snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderedView {
    pub status: String,
    pub total: usize,
    pub sort: SortMode,
    pub active_label: String,
    pub active_filters: Vec<ActiveFilter>,
    pub facets: Vec<FacetGroup>,
    pub cards: Vec<Card>,
}

pub fn results_label(n: usize) -> String {
    format!("{n} results")
}

pub fn build_view(
    catalog: &Catalog,
    state: &ViewState,
    facets: &FacetConfig,
    cards: &CardOptions,
) -> RenderedView {
    let query = catalog.query(state, facets);
    let entities = catalog.entities();

    let groups = facets
        .facets
        .iter()
        .map(|spec| {
            let derived = facets.is_derived(spec.dimension);
            let controls = engine::facet_values(entities, spec.dimension, facets)
                .into_iter()
                .map(|value| FacetControl {
                    id: normalize::control_id(spec.dimension, &value),
                    count: query.counts.get(spec.dimension, &value),
                    checked: if derived {
                        state.selection.group_selected(&value)
                    } else {
                        state.selection.contains(spec.dimension, &value)
                    },
                    value,
                })
                .collect();
            FacetGroup {
                dimension: spec.dimension,
                label: spec.label.clone(),
                open: spec.open,
                derived,
                controls,
            }
        })
        .collect();

    let rendered_cards = query
        .results
        .iter()
        .enumerate()
        .map(|(i, e)| Card {
            index: i + 1,
            title: cards.title_for(&e.title),
            url: e.url.clone(),
            image: cards.image_for(&e.image_url, &e.page_type),
            publish_date: e.publish_date.clone(),
            chips: Dimension::ALL
                .iter()
                .filter(|d| !e.value(**d).is_empty())
                .map(|d| Chip {
                    dimension: *d,
                    value: e.value(*d).to_string(),
                    accent: *d == Dimension::PageType,
                    aria_label: format!(
                        "Filter by {}: {}",
                        d.key().replace('_', " "),
                        e.value(*d)
                    ),
                })
                .collect(),
        })
        .collect();

    let active_filters = active_filters(state, facets);
    RenderedView {
        status: results_label(query.results.len()),
        total: query.results.len(),
        sort: state.sort,
        active_label: if active_filters.is_empty() {
            "All content".to_string()
        } else {
            "Active:".to_string()
        },
        active_filters,
        facets: groups,
        cards: rendered_cards,
    }
}

/// View shown while loading or after a fatal load error: only a status line.
pub fn status_view(status: &str, state: &ViewState) -> RenderedView {
    RenderedView {
        status: status.to_string(),
        total: 0,
        sort: state.sort,
        active_label: "All content".to_string(),
        active_filters: Vec::new(),
        facets: Vec::new(),
        cards: Vec::new(),
    }
}

fn active_filters(state: &ViewState, facets: &FacetConfig) -> Vec<ActiveFilter> {
    let mut out = Vec::new();
    for dimension in Dimension::ALL {
        let values: Vec<String> = if facets.is_derived(dimension) {
            state.selection.groups().map(|v| v.to_string()).collect()
        } else {
            state
                .selection
                .values(dimension)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default()
        };
        for value in values {
            out.push(ActiveFilter {
                dimension,
                control_id: normalize::control_id(dimension, &value),
                aria_label: format!("Remove {value} filter"),
                value,
            });
        }
    }
    out
}
