//! Application state management.

use crate::config::Config;
use crate::decoder_feed::{registry_handler, DecoderEventFeed, DEFAULT_FEED_CAPACITY};
use crate::decoder_registry::DecoderRegistry;
use crate::events::EventBroadcaster;
use crate::hostif::{ConfigurationSource, HostIfClient};
use crate::storage::{JsonParameterStore, ParameterStore};
use crate::telemetry::{MarkerLog, MarkerSink, ProfileCatalog, TelemetryService};
use std::sync::Arc;
use tracing::info;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Latest decoder status per pipeline
    decoders: DecoderRegistry,
    /// Producer side of the decoder event feed
    decoder_feed: DecoderEventFeed,
    /// Event broadcaster for real-time updates
    events: EventBroadcaster,
    /// Device configuration lookups
    configuration: Arc<dyn ConfigurationSource>,
    /// Report profiles and application markers
    telemetry: TelemetryService,
}

/// Collaborators used to assemble an [`AppState`].
pub struct AppStateBuilder {
    feed_capacity: usize,
    configuration: Arc<dyn ConfigurationSource>,
    catalog: ProfileCatalog,
    parameters: Arc<dyn ParameterStore>,
    markers: Arc<dyn MarkerSink>,
}

impl AppStateBuilder {
    pub fn new(
        configuration: Arc<dyn ConfigurationSource>,
        parameters: Arc<dyn ParameterStore>,
    ) -> Self {
        Self {
            feed_capacity: DEFAULT_FEED_CAPACITY,
            configuration,
            catalog: ProfileCatalog::default(),
            parameters,
            markers: Arc::new(MarkerLog::default()),
        }
    }

    pub fn feed_capacity(mut self, capacity: usize) -> Self {
        self.feed_capacity = capacity;
        self
    }

    pub fn profile_catalog(mut self, catalog: ProfileCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn markers(mut self, markers: Arc<dyn MarkerSink>) -> Self {
        self.markers = markers;
        self
    }

    /// Build the state and start the decoder feed worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> AppState {
        let decoders = DecoderRegistry::new();
        let events = EventBroadcaster::default();

        let (decoder_feed, _worker) = DecoderEventFeed::spawn(
            self.feed_capacity,
            registry_handler(decoders.clone(), events.clone()),
        );

        AppState {
            inner: Arc::new(AppStateInner {
                decoders,
                decoder_feed,
                events,
                configuration: self.configuration,
                telemetry: TelemetryService::new(self.catalog, self.parameters, self.markers),
            }),
        }
    }
}

impl AppState {
    /// Create application state from loaded configuration.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let hostif = HostIfClient::new(config.hostif_url.clone(), config.hostif_timeout)?;
        info!("Host interface: {}", hostif.url());

        let catalog = ProfileCatalog::new(&config.profiles_file, &config.persistent_dir);
        info!(
            "Telemetry profiles: {} + {}",
            catalog.profiles_file().display(),
            catalog.persistent_dir().display()
        );

        Ok(AppStateBuilder::new(
            Arc::new(hostif),
            Arc::new(JsonParameterStore::new(&config.parameters_path)),
        )
        .feed_capacity(config.event_buffer)
        .profile_catalog(catalog)
        .markers(Arc::new(MarkerLog::new(config.marker_log.clone())))
        .build())
    }

    /// Get the decoder status registry.
    pub fn decoders(&self) -> &DecoderRegistry {
        &self.inner.decoders
    }

    /// Get the decoder event feed.
    pub fn decoder_feed(&self) -> &DecoderEventFeed {
        &self.inner.decoder_feed
    }

    /// Get the event broadcaster.
    pub fn events(&self) -> &EventBroadcaster {
        &self.inner.events
    }

    /// Get the device configuration source.
    pub fn configuration(&self) -> &Arc<dyn ConfigurationSource> {
        &self.inner.configuration
    }

    /// Get the telemetry service.
    pub fn telemetry(&self) -> &TelemetryService {
        &self.inner.telemetry
    }
}
