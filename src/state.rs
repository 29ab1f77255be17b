//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::conversion::Converter;
use crate::storage::ArtifactStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    store: ArtifactStore,
    converter: Converter,
}

impl AppState {
    /// Wire the DOCX → PDF pipeline over the configured storage roots.
    ///
    /// The store is not initialized here; call `ArtifactStore::initialize`
    /// before serving.
    pub fn new(config: Config) -> Self {
        let store = ArtifactStore::new(
            config.storage.upload_dir.clone(),
            config.storage.output_dir.clone(),
        );
        let converter = Converter::new(store.clone());
        Self::with_converter(config, converter)
    }

    /// Use a custom converter (stub stages in tests)
    pub fn with_converter(config: Config, converter: Converter) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store: converter.store().clone(),
                converter,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the artifact store
    pub fn store(&self) -> &ArtifactStore {
        &self.inner.store
    }

    /// Get the converter
    pub fn converter(&self) -> &Converter {
        &self.inner.converter
    }
}
