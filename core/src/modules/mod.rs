//! Typed gateways, one per remote Piwik plugin.
//!
//! Each gateway borrows a `PiwikClient` and a `Transport` and exposes one
//! method per remote operation, plus a pure `build_*` twin that returns the
//! request without sending it.

mod sites_manager;
mod visitor_interest;

pub use sites_manager::{SiteOptions, SitesManager};
pub use visitor_interest::{Period, ReportDate, VisitorInterest};
