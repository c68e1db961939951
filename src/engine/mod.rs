pub mod reducer;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::model::{Dimension, Entity, FacetConfig, Selection, SortMode, ViewState};

pub use reducer::reduce;

/// OR within a dimension, AND across dimensions.
pub fn matches(entity: &Entity, selection: &Selection) -> bool {
    Dimension::ALL
        .iter()
        .all(|d| dimension_matches(entity, selection, *d))
}

fn dimension_matches(entity: &Entity, selection: &Selection, dimension: Dimension) -> bool {
    match selection.values(dimension) {
        None => true,
        Some(active) => active.contains(entity.value(dimension)),
    }
}

fn matches_except(entity: &Entity, selection: &Selection, skip: Dimension) -> bool {
    Dimension::ALL
        .iter()
        .filter(|d| **d != skip)
        .all(|d| dimension_matches(entity, selection, *d))
}

/// Number of active dimensions the entity satisfies. Inactive dimensions
/// contribute nothing.
pub fn relevance_score(entity: &Entity, selection: &Selection) -> u8 {
    Dimension::ALL
        .iter()
        .filter(|d| {
            selection
                .values(**d)
                .is_some_and(|active| active.contains(entity.value(**d)))
        })
        .count() as u8
}

/// Stable ordering of `entities` for the given mode. `Relevant` with no
/// active constraint returns the input order untouched.
pub fn sort_entities<'a>(
    entities: Vec<&'a Entity>,
    selection: &Selection,
    mode: SortMode,
) -> Vec<&'a Entity> {
    match mode {
        SortMode::Newest => {
            let mut keyed: Vec<_> = entities.into_iter().map(|e| (e.published(), e)).collect();
            keyed.sort_by(|a, b| b.0.cmp(&a.0));
            keyed.into_iter().map(|(_, e)| e).collect()
        }
        SortMode::Relevant if selection.is_empty() => entities,
        SortMode::Relevant => {
            let mut keyed: Vec<_> = entities
                .into_iter()
                .map(|e| (relevance_score(e, selection), e.published(), e))
                .collect();
            keyed.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
            keyed.into_iter().map(|(_, _, e)| e).collect()
        }
    }
}

/// Live per-value counts: how many results a value would yield given every
/// other dimension's current selection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FacetCounts {
    counts: BTreeMap<Dimension, BTreeMap<String, usize>>,
}

impl FacetCounts {
    pub fn get(&self, dimension: Dimension, value: &str) -> usize {
        self.counts
            .get(&dimension)
            .and_then(|m| m.get(value))
            .copied()
            .unwrap_or(0)
    }

    pub fn dimension(&self, dimension: Dimension) -> Option<&BTreeMap<String, usize>> {
        self.counts.get(&dimension)
    }
}

pub fn compute_facet_counts(
    entities: &[Entity],
    selection: &Selection,
    config: &FacetConfig,
) -> FacetCounts {
    let mut counts: BTreeMap<Dimension, BTreeMap<String, usize>> = BTreeMap::new();

    for dimension in Dimension::ALL {
        if config.is_derived(dimension) {
            continue;
        }
        let per_value = counts.entry(dimension).or_default();
        for entity in entities {
            if !matches_except(entity, selection, dimension) {
                continue;
            }
            let value = entity.value(dimension);
            if value.is_empty() {
                continue;
            }
            *per_value.entry(value.to_string()).or_insert(0) += 1;
        }
    }

    if let Some(grouping) = config.grouping.as_ref() {
        let child_counts = counts.get(&grouping.child).cloned().unwrap_or_default();
        let per_group = counts.entry(grouping.parent).or_default();
        for (parent, members) in grouping.groups.iter() {
            let unique: BTreeSet<&str> = members.iter().map(|m| m.as_str()).collect();
            let total: usize = unique
                .iter()
                .map(|m| child_counts.get(*m).copied().unwrap_or(0))
                .sum();
            if total > 0 {
                per_group.insert(parent.clone(), total);
            }
        }
    }

    FacetCounts { counts }
}

/// Unique, sorted, non-empty values observed for a dimension. A derived
/// dimension lists its configured parent values instead.
pub fn facet_values(entities: &[Entity], dimension: Dimension, config: &FacetConfig) -> Vec<String> {
    if let Some(grouping) = config.grouping.as_ref().filter(|g| g.parent == dimension) {
        return grouping.groups.keys().cloned().collect();
    }
    let values: BTreeSet<&str> = entities
        .iter()
        .map(|e| e.value(dimension))
        .filter(|v| !v.is_empty())
        .collect();
    values.into_iter().map(|v| v.to_string()).collect()
}

/// The immutable working set produced by one dataset load.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entities: Vec<Entity>,
}

/// Everything a render needs for one state snapshot.
#[derive(Clone, Debug)]
pub struct QueryResult<'a> {
    pub results: Vec<&'a Entity>,
    pub counts: FacetCounts,
}

impl Catalog {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn query(&self, state: &ViewState, config: &FacetConfig) -> QueryResult<'_> {
        let filtered: Vec<&Entity> = self
            .entities
            .iter()
            .filter(|e| matches(e, &state.selection))
            .collect();
        QueryResult {
            results: sort_entities(filtered, &state.selection, state.sort),
            counts: compute_facet_counts(&self.entities, &state.selection, config),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::entity;
    use super::*;
    use crate::model::Grouping;

    fn sample() -> Vec<Entity> {
        vec![
            entity("https://a", "tech", "bike", "mtb", "2024-01-01"),
            entity("https://b", "news", "bike", "cycling", "2024-03-01"),
            entity("https://c", "tech", "run", "trail", "2023-06-01"),
            entity("https://d", "news", "run", "", "bogus"),
        ]
    }

    fn select(pairs: &[(Dimension, &str)]) -> Selection {
        let mut s = Selection::new();
        for (d, v) in pairs {
            s.insert(*d, v.to_string());
        }
        s
    }

    fn urls(list: &[&Entity]) -> Vec<String> {
        list.iter().map(|e| e.url.clone()).collect()
    }

    #[test]
    fn matches_requires_every_active_dimension() {
        let rows = sample();
        let s = select(&[(Dimension::PageType, "tech"), (Dimension::Category, "bike")]);
        let hits: Vec<_> = rows.iter().filter(|e| matches(e, &s)).collect();
        assert_eq!(urls(&hits), vec!["https://a"]);
    }

    #[test]
    fn matches_is_or_within_a_dimension() {
        let rows = sample();
        let s = select(&[(Dimension::PageType, "tech"), (Dimension::PageType, "news")]);
        assert!(rows.iter().all(|e| matches(e, &s)));
    }

    #[test]
    fn empty_selection_matches_everything() {
        assert!(sample().iter().all(|e| matches(e, &Selection::new())));
    }

    #[test]
    fn score_counts_only_active_dimensions() {
        let rows = sample();
        assert_eq!(relevance_score(&rows[0], &Selection::new()), 0);
        let s = select(&[
            (Dimension::PageType, "tech"),
            (Dimension::Category, "bike"),
            (Dimension::Activity, "mtb"),
        ]);
        assert_eq!(relevance_score(&rows[0], &s), 3);
        assert_eq!(relevance_score(&rows[1], &s), 1);
        assert_eq!(relevance_score(&rows[3], &s), 0);
    }

    #[test]
    fn relevant_without_filters_keeps_load_order() {
        let rows = sample();
        let sorted = sort_entities(rows.iter().collect(), &Selection::new(), SortMode::Relevant);
        assert_eq!(
            urls(&sorted),
            vec!["https://a", "https://b", "https://c", "https://d"]
        );
    }

    #[test]
    fn relevant_orders_by_score_then_newest() {
        let rows = sample();
        let s = select(&[(Dimension::PageType, "tech"), (Dimension::Category, "bike")]);
        let sorted = sort_entities(rows.iter().collect(), &s, SortMode::Relevant);
        // a scores 2; b and c score 1 (b is newer); d scores 0
        assert_eq!(
            urls(&sorted),
            vec!["https://a", "https://b", "https://c", "https://d"]
        );
    }

    #[test]
    fn newest_is_non_increasing_with_invalid_dates_last() {
        let rows = sample();
        let sorted = sort_entities(rows.iter().collect(), &Selection::new(), SortMode::Newest);
        assert_eq!(
            urls(&sorted),
            vec!["https://b", "https://a", "https://c", "https://d"]
        );
        for pair in sorted.windows(2) {
            assert!(pair[0].published() >= pair[1].published());
        }
    }

    #[test]
    fn newest_is_stable_for_equal_dates() {
        let rows = vec![
            entity("https://x", "", "", "", "2024-01-01"),
            entity("https://y", "", "", "", "2024-01-01"),
            entity("https://z", "", "", "", ""),
            entity("https://w", "", "", "", "garbage"),
        ];
        let sorted = sort_entities(rows.iter().collect(), &Selection::new(), SortMode::Newest);
        assert_eq!(
            urls(&sorted),
            vec!["https://x", "https://y", "https://z", "https://w"]
        );
    }

    #[test]
    fn relevant_is_stable_for_equal_score_and_date() {
        let rows = vec![
            entity("https://p", "tech", "bike", "", "2024-01-01"),
            entity("https://q", "news", "", "", ""),
            entity("https://r", "tech", "run", "", "2024-01-01"),
            entity("https://s", "tech", "bike", "", "2024-01-01"),
            entity("https://t", "news", "", "", "junk"),
        ];
        let s = select(&[(Dimension::PageType, "tech")]);
        let sorted = sort_entities(rows.iter().collect(), &s, SortMode::Relevant);
        assert_eq!(
            urls(&sorted),
            vec!["https://p", "https://r", "https://s", "https://q", "https://t"]
        );
    }

    #[test]
    fn counts_ignore_own_dimension() {
        let rows = sample();
        let s = select(&[(Dimension::PageType, "tech")]);
        let counts = compute_facet_counts(&rows, &s, &FacetConfig::default());
        // page_type counts are unaffected by the page_type selection
        assert_eq!(counts.get(Dimension::PageType, "tech"), 2);
        assert_eq!(counts.get(Dimension::PageType, "news"), 2);
        // category counts respect page_type=tech
        assert_eq!(counts.get(Dimension::Category, "bike"), 1);
        assert_eq!(counts.get(Dimension::Category, "run"), 1);
        assert_eq!(counts.get(Dimension::Activity, "cycling"), 0);
        // empty values are never counted
        assert!(counts
            .dimension(Dimension::Activity)
            .is_some_and(|m| !m.contains_key("")));
    }

    #[test]
    fn counts_are_idempotent() {
        let rows = sample();
        let s = select(&[(Dimension::Category, "run")]);
        let cfg = FacetConfig::default();
        assert_eq!(
            compute_facet_counts(&rows, &s, &cfg),
            compute_facet_counts(&rows, &s, &cfg)
        );
    }

    #[test]
    fn derived_dimension_sums_member_counts() {
        let rows = sample();
        let cfg = FacetConfig {
            grouping: Some(Grouping {
                parent: Dimension::Category,
                child: Dimension::Activity,
                groups: [
                    ("bike".to_string(), vec!["mtb".to_string(), "cycling".to_string()]),
                    ("run".to_string(), vec!["trail".to_string(), "trail".to_string()]),
                ]
                .into_iter()
                .collect(),
            }),
            ..FacetConfig::default()
        };
        let counts = compute_facet_counts(&rows, &Selection::new(), &cfg);
        assert_eq!(counts.get(Dimension::Category, "bike"), 2);
        assert_eq!(counts.get(Dimension::Category, "run"), 1);
        assert_eq!(
            facet_values(&rows, Dimension::Category, &cfg),
            vec!["bike", "run"]
        );
    }

    #[test]
    fn facet_values_are_unique_and_sorted() {
        let rows = sample();
        assert_eq!(
            facet_values(&rows, Dimension::Activity, &FacetConfig::default()),
            vec!["cycling", "mtb", "trail"]
        );
    }
}
