//! Result shapes returned by the Piwik API.
//!
//! # Design
//! Each record maps the server's JSON keys to local field names through a
//! `Record::FIELDS` table. `SiteInfo` keeps every key its table does not
//! claim in `extra`, since Piwik returns more site attributes than are
//! mapped here and the set grows between server versions.

use serde_json::{Map, Value};

use crate::decode::{decode_record, Field, FromJson, Record};
use crate::error::DecodeError;

/// Remote field names shared by the SitesManager results.
pub mod fields {
    pub const ID: &str = "idsite";
    pub const NAME: &str = "name";
    pub const MAIN_URL: &str = "main_url";
    pub const TS_CREATED: &str = "ts_created";
    pub const TIMEZONE: &str = "timezone";
    pub const CURRENCY: &str = "currency";
    pub const LABEL: &str = "label";
    pub const NB_VISITS: &str = "nb_visits";
}

/// A site id as returned by `getSitesIdFromSiteUrl`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiteId {
    pub site_id: i64,
}

impl Record for SiteId {
    const FIELDS: &'static [Field<Self>] = &[Field {
        remote: fields::ID,
        required: true,
        assign: |site, value| {
            site.site_id = i64::from_json(value)?;
            Ok(())
        },
    }];
}

impl FromJson for SiteId {
    fn from_json(value: &Value) -> Result<Self, DecodeError> {
        decode_record(value)
    }
}

/// A site as returned by `getSiteFromId` and `getSitesFromGroup`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteInfo {
    pub site_id: i64,
    pub name: String,
    pub main_url: String,
    /// Creation timestamp as the server formats it (`YYYY-MM-DD hh:mm:ss`).
    pub created: String,
    pub timezone: String,
    pub currency: String,
    /// Attributes not mapped above, keyed by remote name.
    pub extra: Map<String, Value>,
}

impl Record for SiteInfo {
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            remote: fields::ID,
            required: true,
            assign: |site, value| {
                site.site_id = i64::from_json(value)?;
                Ok(())
            },
        },
        Field {
            remote: fields::NAME,
            required: false,
            assign: |site, value| {
                site.name = String::from_json(value)?;
                Ok(())
            },
        },
        Field {
            remote: fields::MAIN_URL,
            required: false,
            assign: |site, value| {
                site.main_url = String::from_json(value)?;
                Ok(())
            },
        },
        Field {
            remote: fields::TS_CREATED,
            required: false,
            assign: |site, value| {
                site.created = String::from_json(value)?;
                Ok(())
            },
        },
        Field {
            remote: fields::TIMEZONE,
            required: false,
            assign: |site, value| {
                site.timezone = String::from_json(value)?;
                Ok(())
            },
        },
        Field {
            remote: fields::CURRENCY,
            required: false,
            assign: |site, value| {
                site.currency = String::from_json(value)?;
                Ok(())
            },
        },
    ];

    fn unmapped(&mut self, key: &str, value: &Value) {
        self.extra.insert(key.to_string(), value.clone());
    }
}

impl FromJson for SiteInfo {
    fn from_json(value: &Value) -> Result<Self, DecodeError> {
        decode_record(value)
    }
}

/// One row of the VisitorInterest "visits per number of pages" report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitsPerPage {
    /// Bucket label, e.g. `"1 page"` or `"6-7 pages"`.
    pub pages_count: String,
    pub visits: i64,
}

impl Record for VisitsPerPage {
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            remote: fields::LABEL,
            required: true,
            assign: |row, value| {
                row.pages_count = String::from_json(value)?;
                Ok(())
            },
        },
        Field {
            remote: fields::NB_VISITS,
            required: false,
            assign: |row, value| {
                row.visits = i64::from_json(value)?;
                Ok(())
            },
        },
    ];
}

impl FromJson for VisitsPerPage {
    fn from_json(value: &Value) -> Result<Self, DecodeError> {
        decode_record(value)
    }
}
