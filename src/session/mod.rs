pub mod command;

use tracing::{info, warn};

use crate::config::CardOptions;
use crate::dataset::LoadError;
use crate::engine::{reduce, Catalog};
use crate::model::{Entity, FacetConfig, Intent, ViewState};
use crate::view::{build_view, status_view, RenderedView, LOADING_STATUS};

pub use command::{parse_command, parse_filter_spec, Command, CommandError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(String),
}

/// One browsing session: the loaded catalog plus the current view state.
/// Every intent replaces `state` wholesale; the catalog only changes when a
/// load completes.
pub struct Session {
    catalog: Catalog,
    state: ViewState,
    facets: FacetConfig,
    cards: CardOptions,
    status: LoadStatus,
}

impl Session {
    pub fn new(facets: FacetConfig, cards: CardOptions) -> Self {
        Self {
            catalog: Catalog::default(),
            state: ViewState::default(),
            facets,
            cards,
            status: LoadStatus::Loading,
        }
    }

    pub fn loaded(&mut self, result: Result<Vec<Entity>, LoadError>) {
        match result {
            Ok(entities) => {
                info!("catalog ready with {} entities", entities.len());
                self.catalog = Catalog::new(entities);
                self.status = LoadStatus::Ready;
            }
            Err(e) => {
                warn!("{e}");
                self.catalog = Catalog::default();
                self.status = LoadStatus::Failed(e.status_message());
            }
        }
    }

    /// Intents received before the catalog is ready still update the
    /// selection; they show up once results render.
    pub fn dispatch(&mut self, intent: &Intent) {
        self.state = reduce(&self.state, intent, &self.facets);
    }

    pub fn view(&self) -> RenderedView {
        match &self.status {
            LoadStatus::Loading => status_view(LOADING_STATUS, &self.state),
            LoadStatus::Failed(message) => status_view(message, &self.state),
            LoadStatus::Ready => build_view(&self.catalog, &self.state, &self.facets, &self.cards),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn facets(&self) -> &FacetConfig {
        &self.facets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetSource, LoadError};
    use crate::engine::fixtures::entity;
    use crate::model::{Dimension, SortMode};

    fn session() -> Session {
        Session::new(FacetConfig::default(), CardOptions::default())
    }

    #[test]
    fn starts_in_loading_state() {
        let s = session();
        assert_eq!(s.status(), &LoadStatus::Loading);
        assert_eq!(s.view().status, "Loading…");
        assert!(s.view().cards.is_empty());
    }

    #[test]
    fn intents_before_load_apply_after_load() {
        let mut s = session();
        s.dispatch(&Intent::Toggle {
            dimension: Dimension::PageType,
            value: "news".to_string(),
        });
        s.loaded(Ok(vec![
            entity("https://a", "news", "", "", ""),
            entity("https://b", "tech", "", "", ""),
        ]));
        let view = s.view();
        assert_eq!(view.status, "1 results");
        assert_eq!(view.cards[0].url, "https://a");
    }

    #[tokio::test]
    async fn failed_load_shows_status_only() {
        let mut s = session();
        let source = DatasetSource::parse("./no/such/dir/pages.csv");
        let result = crate::dataset::load(&source, std::time::Duration::from_secs(1)).await;
        assert!(matches!(result, Err(LoadError::Read { .. })));
        s.loaded(result);
        let view = s.view();
        assert_eq!(view.status, "Could not load pages.csv");
        assert!(view.facets.is_empty());
        assert!(view.cards.is_empty());
    }

    #[test]
    fn sort_intent_keeps_selection() {
        let mut s = session();
        s.loaded(Ok(vec![entity("https://a", "news", "", "", "")]));
        s.dispatch(&Intent::Toggle {
            dimension: Dimension::PageType,
            value: "news".to_string(),
        });
        s.dispatch(&Intent::SetSort(SortMode::Newest));
        assert_eq!(s.state().sort, SortMode::Newest);
        assert!(s.state().selection.contains(Dimension::PageType, "news"));
    }
}
