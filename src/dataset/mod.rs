pub mod columns;

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::Entity;
use crate::normalize::{normalize_key, normalize_text};

use columns::{ColumnMap, Field};
use csv::StringRecord;

pub const DEFAULT_DATASET: &str = "./pages.csv";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatasetSource {
    File(PathBuf),
    Url(String),
}

impl DatasetSource {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::File(crate::config::expand_tilde(trimmed))
        }
    }

    /// Last path segment, used in user-facing status messages.
    pub fn name(&self) -> String {
        let path = match self {
            Self::File(p) => p.to_string_lossy().to_string(),
            Self::Url(u) => reqwest::Url::parse(u)
                .map(|parsed| parsed.path().to_string())
                .unwrap_or_else(|_| u.clone()),
        };
        path.rsplit(['/', '\\'])
            .find(|s| !s.is_empty())
            .unwrap_or("dataset")
            .to_string()
    }

    pub fn display(&self) -> String {
        match self {
            Self::File(p) => p.display().to_string(),
            Self::Url(u) => u.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Tsv,
}

impl DatasetFormat {
    /// Tab-delimited for `.tsv`/`.tab`, comma-delimited for everything else.
    /// Content that is not CSV fails later as a parse error.
    pub fn detect(source: &DatasetSource) -> Self {
        let name = source.name();
        let ext = Path::new(&name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "tsv" | "tab" => Self::Tsv,
            _ => Self::Csv,
        }
    }

    fn delimiter(self) -> u8 {
        match self {
            Self::Csv => b',',
            Self::Tsv => b'\t',
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    /// The CSV reader is compiled in, so `load` never returns this; it
    /// exists for embedders that gate parsing behind their own feature.
    #[error("CSV parser not loaded ({reason})")]
    ParserUnavailable { reason: String },

    #[error("Could not load {name}: failed to read {path}: {source}")]
    Read {
        name: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not load {name}: request failed for {url}: {source}")]
    Fetch {
        name: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Could not load {name}: HTTP {status} for {url}")]
    HttpStatus {
        name: String,
        url: String,
        status: u16,
    },

    #[error("Could not load {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: csv::Error,
    },
}

impl LoadError {
    /// The static message shown in place of the result count.
    pub fn status_message(&self) -> String {
        match self {
            Self::ParserUnavailable { .. } => "CSV parser not loaded".to_string(),
            Self::Read { name, .. }
            | Self::Fetch { name, .. }
            | Self::HttpStatus { name, .. }
            | Self::Parse { name, .. } => format!("Could not load {name}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows: usize,
    pub blank: usize,
    pub dropped: usize,
    pub lossy: usize,
}

/// Parses dataset bytes into entities, preserving row order. Rows without an
/// http(s) url are dropped silently; invalid UTF-8 is decoded lossily.
pub fn parse_entities<R: std::io::Read>(
    reader: R,
    format: DatasetFormat,
) -> Result<(Vec<Entity>, LoadStats), csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(format.delimiter())
        .from_reader(reader);

    let headers = decode_record(rdr.byte_headers()?).0;
    let columns = ColumnMap::resolve(&headers);
    let unresolved = columns.unresolved();
    if !unresolved.is_empty() {
        debug!("unresolved dataset columns: {:?}", unresolved);
    }

    let mut stats = LoadStats::default();
    let mut entities = Vec::new();
    for record in rdr.byte_records() {
        let (record, lossy) = decode_record(&record?);
        stats.rows += 1;
        if lossy {
            stats.lossy += 1;
        }
        if record.iter().all(|f| f.trim().is_empty()) {
            stats.blank += 1;
            continue;
        }
        let entity = Entity {
            url: normalize_text(columns.get(&record, Field::Url)),
            title: normalize_text(columns.get(&record, Field::Title)),
            image_url: normalize_text(columns.get(&record, Field::ImageUrl)),
            page_type: normalize_key(columns.get(&record, Field::PageType)),
            category: normalize_key(columns.get(&record, Field::Category)),
            activity: normalize_key(columns.get(&record, Field::Activity)),
            publish_date: normalize_text(columns.get(&record, Field::PublishDate)),
        };
        if entity.url.is_empty() || !entity.url.starts_with("http") {
            stats.dropped += 1;
            continue;
        }
        entities.push(entity);
    }
    Ok((entities, stats))
}

fn decode_record(record: &csv::ByteRecord) -> (StringRecord, bool) {
    let mut lossy = false;
    let fields: Vec<String> = record
        .iter()
        .map(|field| {
            let text = String::from_utf8_lossy(field);
            lossy |= matches!(text, Cow::Owned(_));
            text.into_owned()
        })
        .collect();
    (StringRecord::from(fields), lossy)
}

/// Fetches and parses the dataset. Delivered exactly once; never retried.
pub async fn load(source: &DatasetSource, timeout: Duration) -> Result<Vec<Entity>, LoadError> {
    let format = DatasetFormat::detect(source);
    let name = source.name();
    let bytes = match source {
        DatasetSource::File(path) => {
            tokio::fs::read(path)
                .await
                .map_err(|e| LoadError::Read {
                    name: name.clone(),
                    path: path.display().to_string(),
                    source: e,
                })?
        }
        DatasetSource::Url(url) => fetch(url, &name, timeout).await?,
    };

    let (entities, stats) =
        parse_entities(bytes.as_slice(), format).map_err(|e| LoadError::Parse {
            name: name.clone(),
            source: e,
        })?;
    if stats.dropped > 0 {
        debug!("dropped {} rows without an http(s) url", stats.dropped);
    }
    if stats.lossy > 0 {
        warn!("{} rows contained invalid UTF-8 and were decoded lossily", stats.lossy);
    }
    info!(
        "dataset loaded - source={}, rows={}, entities={}, blank={}, dropped={}",
        source.display(),
        stats.rows,
        entities.len(),
        stats.blank,
        stats.dropped
    );
    Ok(entities)
}

async fn fetch(url: &str, name: &str, timeout: Duration) -> Result<Vec<u8>, LoadError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LoadError::Fetch {
            name: name.to_string(),
            url: url.to_string(),
            source: e,
        })?;
    let resp = client.get(url).send().await.map_err(|e| LoadError::Fetch {
        name: name.to_string(),
        url: url.to_string(),
        source: e,
    })?;
    let status = resp.status();
    if !status.is_success() {
        warn!("dataset request returned {} for {}", status, url);
        return Err(LoadError::HttpStatus {
            name: name.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let body = resp.bytes().await.map_err(|e| LoadError::Fetch {
        name: name.to_string(),
        url: url.to_string(),
        source: e,
    })?;
    Ok(body.to_vec())
}
