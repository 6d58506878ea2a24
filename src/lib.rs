//! IPPure status panel.
//!
//! Looks up the current IP's reputation from the IPPure info endpoint and
//! turns it into a `title`/`content`/`style` panel.
//!
//! # Features
//!
//! - **Fraud Score** - Bucket the 0-100 fraud score into low/medium/high risk
//! - **Native Check** - Residential vs datacenter, native vs broadcast
//! - **IP Info** - Location and AS organization
//! - **Combined** - Fraud and native checks in one panel, worst style wins
//! - **Caching** - Panels refreshed together share one request (10s TTL)
//!
//! # Example Configuration
//!
//! ```yaml
//! settings:
//!   default_mode: info
//!
//! endpoint:
//!   url: "https://my.ippure.com/v1/info"
//!   timeout_ms: 5000
//!
//! cache:
//!   ttl_ms: 10000
//!   store_path: "${HOME}/.cache/ippure-panel/store.json"
//! ```

pub mod args;
pub mod cache;
pub mod classify;
pub mod config;
pub mod lookup;
pub mod panel;
pub mod record;
pub mod source;
pub mod store;

pub use args::{PanelArgs, PanelMode};
pub use classify::{classify, Panel, Style};
pub use config::Config;
pub use lookup::InfoLookup;
pub use panel::{invoke, PanelRunner};
pub use record::InfoRecord;
