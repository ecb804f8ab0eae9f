//! Form management services
//!
//! [`FormManager`] is the entry point callers use: it validates field
//! design, keeps templates in step with field changes, stores submissions,
//! renders templates and runs searches. Permission checks belong to the
//! caller.

use std::sync::Arc;

use datafos_fields::{OptionLabels, RenderContext};

use crate::config::{Config, SearchConfig};
use crate::db::{RecordStore, SearchEngine};

mod entries;
mod export;
mod fields;
mod forms;
mod search;
mod templates;

pub use entries::SubmissionResult;
pub use search::SearchRequest;

/// Coordinates storage, rendering and search for datafos forms
#[derive(Clone)]
pub struct FormManager<S: RecordStore> {
    store: S,
    engine: SearchEngine<S>,
    labels: Arc<OptionLabels>,
    locale: String,
    search_config: SearchConfig,
}

impl<S: RecordStore> FormManager<S> {
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            engine: SearchEngine::new(store.clone()),
            store,
            labels: Arc::new(config.labels.clone()),
            locale: config.locale.clone(),
            search_config: config.search.clone(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn engine(&self) -> &SearchEngine<S> {
        &self.engine
    }

    pub fn search_config(&self) -> &SearchConfig {
        &self.search_config
    }

    fn render_context(&self) -> RenderContext<'_> {
        RenderContext::new(&self.locale, &self.labels)
    }
}

pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
