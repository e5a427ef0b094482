//! Synchronous client core for the Piwik web analytics API.
//!
//! # Overview
//! Typed gateway methods turn their arguments into [`Parameter`]s, the
//! [`PiwikClient`] serializes them into an `HttpRequest`, a caller-supplied
//! [`Transport`] executes it, and the JSON body is decoded into the method's
//! result shape.
//!
//! # Design
//! - `PiwikClient` is stateless; it holds only its `ClientConfig`.
//! - Requests and responses are plain data (host-does-IO). The core never
//!   opens a socket.
//! - Result shapes declare an explicit remote-key mapping table
//!   ([`Record::FIELDS`]) instead of relying on derive attributes, so decode
//!   errors can name the remote field that drifted.
//!
//! ```no_run
//! use piwik_core::{ClientConfig, PiwikClient, SiteOptions, Transport};
//!
//! fn register(transport: &impl Transport) -> Result<i64, piwik_core::ApiError> {
//!     let client = PiwikClient::new(ClientConfig::new("https://stats.example.com/index.php"));
//!     client
//!         .sites_manager(transport)
//!         .add_site("Example", &["https://example.com"], &SiteOptions::default())
//! }
//! ```

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod http;
pub mod modules;
pub mod parameter;
pub mod types;

pub use client::PiwikClient;
pub use config::{ClientConfig, ConfigError};
pub use decode::{decode, Field, FromJson, Record};
pub use error::{ApiError, DecodeError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use modules::{Period, ReportDate, SiteOptions, SitesManager, VisitorInterest};
pub use parameter::{Parameter, Scalar};
pub use types::{SiteId, SiteInfo, VisitsPerPage};
