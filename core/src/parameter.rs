//! Request arguments and their query-string fragments.
//!
//! A [`Parameter`] either contributes exactly one `&name=value` fragment or
//! nothing at all. [`Parameter::serialize`] renders the raw fragment;
//! percent-encoding happens in [`Parameter::encoded_fragment`], which is what
//! the request builder uses.

use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything but the RFC 3986 unreserved characters gets escaped.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Calendar format of every date sent to the API.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single scalar argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Scalar {
    /// Raw wire value. Booleans become `1`/`0`; `Null` has none.
    fn render(&self) -> Option<String> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(true) => Some("1".to_string()),
            Scalar::Bool(false) => Some("0".to_string()),
            Scalar::Int(value) => Some(value.to_string()),
            Scalar::Str(value) => Some(value.clone()),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(i64::from(value))
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Int(i64::from(value))
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl From<&String> for Scalar {
    fn from(value: &String) -> Self {
        Scalar::Str(value.clone())
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Null, Into::into)
    }
}

/// One named argument of a remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    Simple {
        name: String,
        value: Scalar,
    },
    Array {
        name: String,
        values: Vec<Scalar>,
        omit_if_empty: bool,
    },
    /// `None` is the "unset" date and is never sent.
    Date {
        name: String,
        date: Option<NaiveDate>,
    },
}

impl Parameter {
    pub fn simple(name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Parameter::Simple {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn array<I>(name: impl Into<String>, values: I, omit_if_empty: bool) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Scalar>,
    {
        Parameter::Array {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
            omit_if_empty,
        }
    }

    pub fn date(name: impl Into<String>, date: Option<NaiveDate>) -> Self {
        Parameter::Date {
            name: name.into(),
            date,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Parameter::Simple { name, .. }
            | Parameter::Array { name, .. }
            | Parameter::Date { name, .. } => name,
        }
    }

    /// Raw value to send, or `None` when the parameter is omitted.
    pub fn value(&self) -> Option<String> {
        self.rendered_values().map(|values| values.join(","))
    }

    /// Raw `&name=value` fragment, or the empty string when omitted.
    pub fn serialize(&self) -> String {
        self.value()
            .map(|value| format!("&{}={value}", self.name()))
            .unwrap_or_default()
    }

    /// Percent-encoded `&name=value` fragment, or `None` when omitted.
    ///
    /// Array elements are escaped one by one so the `,` separator survives
    /// while commas inside an element do not.
    pub fn encoded_fragment(&self) -> Option<String> {
        let values = self.rendered_values()?;
        let encoded: Vec<String> = values.iter().map(|value| encode(value)).collect();
        Some(format!("&{}={}", encode(self.name()), encoded.join(",")))
    }

    fn rendered_values(&self) -> Option<Vec<String>> {
        match self {
            Parameter::Simple { value, .. } => value
                .render()
                .filter(|value| !value.is_empty())
                .map(|value| vec![value]),
            Parameter::Array {
                values,
                omit_if_empty,
                ..
            } => {
                let rendered: Vec<String> = values.iter().filter_map(Scalar::render).collect();
                if rendered.is_empty() && *omit_if_empty {
                    None
                } else {
                    Some(rendered)
                }
            }
            Parameter::Date { date, .. } => {
                date.map(|date| vec![date.format(DATE_FORMAT).to_string()])
            }
        }
    }
}

pub(crate) fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}
