//! Panel invocation: argument in, exactly one panel out.

use crate::args::{PanelArgs, PanelMode};
use crate::cache::InfoCache;
use crate::classify::{classify, Panel};
use crate::config::Config;
use crate::lookup::InfoLookup;
use crate::source::{HttpInfoSource, LookupError};
use crate::store::{FileStore, KeyValueStore, MemoryStore, SystemClock};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs panel invocations against one lookup.
pub struct PanelRunner {
    lookup: InfoLookup,
    default_mode: PanelMode,
}

impl PanelRunner {
    /// Create a runner from its parts.
    pub fn new(lookup: InfoLookup, default_mode: PanelMode) -> Self {
        Self {
            lookup,
            default_mode,
        }
    }

    /// Build the HTTP source, store and cache described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, LookupError> {
        let source = Box::new(HttpInfoSource::new(&config.endpoint)?);
        let clock = Arc::new(SystemClock);

        let lookup = if config.cache.enabled {
            let store: Arc<dyn KeyValueStore> = match config.cache.store_path {
                Some(ref path) => Arc::new(FileStore::new(path)),
                None => Arc::new(MemoryStore::new()),
            };
            info!(
                store = store.name(),
                ttl_ms = config.cache.ttl_ms,
                "Info cache enabled"
            );
            InfoLookup::new(source, InfoCache::from_config(store, &config.cache), clock)
        } else {
            InfoLookup::uncached(source, clock)
        };

        Ok(Self::new(lookup, config.settings.default_mode))
    }

    /// Mode used when the argument names none.
    pub fn default_mode(&self) -> PanelMode {
        self.default_mode
    }

    /// Handle one invocation with the host's raw argument.
    pub async fn run(&self, argument: Option<&str>) -> Panel {
        let args = PanelArgs::parse(argument);
        match args.mode(self.default_mode) {
            Ok(mode) => self.run_mode(mode).await,
            Err(e) => {
                warn!(error = %e, "Rejecting panel invocation");
                Panel::error(e.to_string())
            }
        }
    }

    /// Handle one invocation for an already selected mode.
    pub async fn run_mode(&self, mode: PanelMode) -> Panel {
        debug!(mode = %mode, "Rendering panel");
        render_panel(&self.lookup, mode).await
    }
}

/// One host invocation from a possibly failed configuration load.
///
/// A configuration or client setup failure becomes an error panel like any
/// lookup failure.
pub async fn invoke(
    config: anyhow::Result<Config>,
    mode: Option<PanelMode>,
    argument: Option<&str>,
) -> Panel {
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Configuration unusable");
            return Panel::error(format!("Config Error: {}", e));
        }
    };

    match PanelRunner::from_config(&config) {
        Ok(runner) => match mode {
            Some(mode) => runner.run_mode(mode).await,
            None => runner.run(argument).await,
        },
        Err(e) => {
            warn!(error = %e, "Failed to build HTTP client");
            Panel::error(e.to_string())
        }
    }
}

/// Look up the record and classify it. Lookup failures become an error panel.
pub async fn render_panel(lookup: &InfoLookup, mode: PanelMode) -> Panel {
    match lookup.get_info().await {
        Ok(record) => classify(&record, mode),
        Err(e) => {
            warn!(mode = %mode, error = %e, "Info lookup failed");
            Panel::error(e.to_string())
        }
    }
}
