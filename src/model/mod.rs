use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A filterable taxonomy dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    PageType,
    Category,
    Activity,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::PageType, Dimension::Category, Dimension::Activity];

    pub fn key(self) -> &'static str {
        match self {
            Dimension::PageType => "page_type",
            Dimension::Category => "category",
            Dimension::Activity => "activity",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dimension::PageType => "Page type",
            Dimension::Category => "Category",
            Dimension::Activity => "Activity",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "page_type" | "pagetype" | "type" => Some(Self::PageType),
            "category" | "cat" => Some(Self::Category),
            "activity" | "act" => Some(Self::Activity),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Relevant,
    Newest,
}

impl SortMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "relevant" | "relevance" | "most-relevant" => Some(Self::Relevant),
            "newest" | "date" | "recent" => Some(Self::Newest),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Relevant => "relevant",
            SortMode::Newest => "newest",
        }
    }
}

/// One catalog item. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub url: String,
    pub title: String,
    pub image_url: String,
    pub page_type: String,
    pub category: String,
    pub activity: String,
    pub publish_date: String,
}

impl Entity {
    pub fn value(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::PageType => &self.page_type,
            Dimension::Category => &self.category,
            Dimension::Activity => &self.activity,
        }
    }

    pub fn published(&self) -> Option<NaiveDate> {
        parse_publish_date(&self.publish_date)
    }
}

/// Parses `YYYY-MM-DD`, also accepting full RFC 3339 timestamps and
/// `YYYY-MM-DDTHH:MM:SS`. `None` orders before every valid date.
pub fn parse_publish_date(value: &str) -> Option<NaiveDate> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// Selected canonical values per dimension. An absent or empty set means
/// "no constraint". `groups` holds the checked parent values of a derived
/// grouping dimension; they never constrain matching on their own.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    sets: BTreeMap<Dimension, BTreeSet<String>>,
    groups: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self, dimension: Dimension) -> Option<&BTreeSet<String>> {
        self.sets.get(&dimension).filter(|s| !s.is_empty())
    }

    pub fn is_active(&self, dimension: Dimension) -> bool {
        self.values(dimension).is_some()
    }

    pub fn contains(&self, dimension: Dimension, value: &str) -> bool {
        self.sets
            .get(&dimension)
            .map(|s| s.contains(value))
            .unwrap_or(false)
    }

    /// True when no dimension carries an active constraint.
    pub fn is_empty(&self) -> bool {
        self.sets.values().all(|s| s.is_empty())
    }

    pub fn insert(&mut self, dimension: Dimension, value: String) -> bool {
        self.sets.entry(dimension).or_default().insert(value)
    }

    pub fn remove(&mut self, dimension: Dimension, value: &str) -> bool {
        let removed = match self.sets.get_mut(&dimension) {
            Some(set) => set.remove(value),
            None => false,
        };
        if self.sets.get(&dimension).is_some_and(|s| s.is_empty()) {
            self.sets.remove(&dimension);
        }
        removed
    }

    pub fn group_selected(&self, value: &str) -> bool {
        self.groups.contains(value)
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|s| s.as_str())
    }

    pub(crate) fn insert_group(&mut self, value: String) -> bool {
        self.groups.insert(value)
    }

    pub(crate) fn remove_group(&mut self, value: &str) -> bool {
        self.groups.remove(value)
    }

    /// Selected values in dimension order, then value order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &str)> {
        self.sets
            .iter()
            .flat_map(|(d, set)| set.iter().map(move |v| (*d, v.as_str())))
    }

    pub fn len(&self) -> usize {
        self.sets.values().map(|s| s.len()).sum()
    }
}

/// Snapshot of everything the user controls. Replaced wholesale per intent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub selection: Selection,
    pub sort: SortMode,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Toggle { dimension: Dimension, value: String },
    /// Checks a value without ever unchecking it.
    Select { dimension: Dimension, value: String },
    Remove { dimension: Dimension, value: String },
    SetSort(SortMode),
    ClearAll,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSpec {
    pub dimension: Dimension,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_open")]
    pub open: bool,
}

fn default_open() -> bool {
    true
}

/// A derived parent dimension whose values aggregate child values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grouping {
    pub parent: Dimension,
    pub child: Dimension,
    pub groups: BTreeMap<String, Vec<String>>,
}

impl Grouping {
    pub fn members(&self, parent_value: &str) -> Option<&[String]> {
        self.groups.get(parent_value).map(|m| m.as_slice())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FacetConfig {
    pub facets: Vec<FacetSpec>,
    pub grouping: Option<Grouping>,
}

impl FacetConfig {
    pub fn is_derived(&self, dimension: Dimension) -> bool {
        self.grouping
            .as_ref()
            .is_some_and(|g| g.parent == dimension)
    }
}

impl Default for FacetConfig {
    fn default() -> Self {
        Self {
            facets: vec![
                FacetSpec {
                    dimension: Dimension::PageType,
                    label: Dimension::PageType.label().to_string(),
                    open: true,
                },
                FacetSpec {
                    dimension: Dimension::Category,
                    label: Dimension::Category.label().to_string(),
                    open: true,
                },
                FacetSpec {
                    dimension: Dimension::Activity,
                    label: Dimension::Activity.label().to_string(),
                    open: false,
                },
            ],
            grouping: None,
        }
    }
}
