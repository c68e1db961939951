use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::model::{Dimension, FacetConfig, FacetSpec, Grouping};
use crate::normalize;

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    #[serde(alias = "csv", alias = "csv_path")]
    pub dataset: Option<String>,
    pub timeout: Option<u64>,
    pub sort: Option<String>,
    pub filters: Option<Vec<String>>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub no_color: Option<bool>,
    pub untitled_label: Option<String>,
    pub default_image: Option<String>,
    pub image_fallbacks: Option<BTreeMap<String, String>>,
    pub facets: Option<Vec<FacetSpec>>,
    pub grouping: Option<GroupingFile>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GroupingFile {
    #[serde(default = "default_grouping_parent")]
    pub parent: Dimension,
    #[serde(default = "default_grouping_child")]
    pub child: Dimension,
    pub groups: BTreeMap<String, Vec<String>>,
}

fn default_grouping_parent() -> Dimension {
    Dimension::Category
}

fn default_grouping_child() -> Dimension {
    Dimension::Activity
}

/// How cards fill in missing titles and images.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardOptions {
    pub untitled_label: String,
    pub default_image: String,
    pub image_fallbacks: BTreeMap<String, String>,
}

impl Default for CardOptions {
    fn default() -> Self {
        let image_fallbacks = ["technology", "inspiration", "news", "helmets"]
            .iter()
            .map(|t| (t.to_string(), format!("images/{t}.jpg")))
            .collect();
        Self {
            untitled_label: "Untitled".to_string(),
            default_image: "images/helmets.jpg".to_string(),
            image_fallbacks,
        }
    }
}

impl CardOptions {
    pub fn image_for(&self, image_url: &str, page_type: &str) -> String {
        if !image_url.trim().is_empty() {
            return image_url.trim().to_string();
        }
        self.image_fallbacks
            .get(&normalize::key(page_type))
            .cloned()
            .unwrap_or_else(|| self.default_image.clone())
    }

    pub fn title_for(&self, title: &str) -> String {
        if title.trim().is_empty() {
            self.untitled_label.clone()
        } else {
            title.trim().to_string()
        }
    }
}

impl ConfigFile {
    pub fn card_options(&self) -> CardOptions {
        let mut opts = CardOptions::default();
        if let Some(label) = self.untitled_label.as_ref().filter(|s| !s.trim().is_empty()) {
            opts.untitled_label = label.trim().to_string();
        }
        if let Some(image) = self.default_image.as_ref().filter(|s| !s.trim().is_empty()) {
            opts.default_image = image.trim().to_string();
        }
        if let Some(map) = self.image_fallbacks.as_ref() {
            for (k, v) in map {
                opts.image_fallbacks.insert(normalize::key(k), v.trim().to_string());
            }
        }
        opts
    }

    pub fn facet_config(&self) -> Result<FacetConfig, String> {
        let mut cfg = FacetConfig::default();
        if let Some(facets) = self.facets.as_ref() {
            if facets.is_empty() {
                return Err("facets list is empty".to_string());
            }
            let mut seen = Vec::new();
            for f in facets {
                if seen.contains(&f.dimension) {
                    return Err(format!("facet '{}' listed twice", f.dimension.key()));
                }
                seen.push(f.dimension);
            }
            cfg.facets = facets
                .iter()
                .map(|f| FacetSpec {
                    dimension: f.dimension,
                    label: if f.label.trim().is_empty() {
                        f.dimension.label().to_string()
                    } else {
                        f.label.trim().to_string()
                    },
                    open: f.open,
                })
                .collect();
        }
        if let Some(g) = self.grouping.as_ref() {
            if g.parent == g.child {
                return Err(format!(
                    "grouping parent and child must differ (both '{}')",
                    g.parent.key()
                ));
            }
            let groups = g
                .groups
                .iter()
                .map(|(k, members)| {
                    (
                        normalize::key(k),
                        members
                            .iter()
                            .map(|m| normalize::key(m))
                            .collect::<Vec<String>>(),
                    )
                })
                .filter(|(k, _)| !k.is_empty())
                .collect();
            cfg.grouping = Some(Grouping {
                parent: g.parent,
                child: g.child,
                groups,
            });
        }
        Ok(cfg)
    }
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".pagegrid").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

pub fn parse_config(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents)
}

fn default_config_yaml() -> String {
    r#"# pagegrid config
#
# Location (default):
#   ~/.pagegrid/config.yml

# Dataset (local path or http(s) URL)
dataset: ./pages.csv
timeout: 10

# Initial view
sort: relevant
# filters:
#   - page_type=news
#   - activity=cycling

# Output (optional)
# output: ./catalog.html
# output_format: html
no_color: false

# Cards
untitled_label: Untitled
default_image: images/helmets.jpg
image_fallbacks:
  technology: images/technology.jpg
  inspiration: images/inspiration.jpg
  news: images/news.jpg
  helmets: images/helmets.jpg

# Facet groups, in display order
facets:
  - dimension: page_type
    label: Page type
    open: true
  - dimension: category
    label: Category
    open: true
  - dimension: activity
    label: Activity
    open: false

# Derived grouping (optional): selecting a parent value selects all of its
# members in the child dimension.
# grouping:
#   parent: category
#   child: activity
#   groups:
#     bike: [cycling, mtb]
#     run: [running, trail]
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    let contents = default_config_yaml();
    std::fs::write(path, contents)
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}
