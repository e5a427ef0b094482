//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. The core builds `HttpRequest`
//! values and parses `HttpResponse` values; executing the round-trip is the
//! job of a [`Transport`] supplied by the caller. Connection handling,
//! timeouts, TLS and retries all live on the other side of that trait.

use serde::Deserialize;

use crate::error::TransportError;

/// HTTP method used to reach the API endpoint.
///
/// Piwik accepts its parameters either in the query string or as a
/// form-encoded body; the query is identical in both cases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `PiwikClient::build_request`. For `Get` the encoded query is
/// appended to `url`; for `Post` it is carried in `body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// The percent-encoded query, wherever the method put it.
    pub fn query(&self) -> &str {
        match self.method {
            HttpMethod::Get => self.url.split_once('?').map_or("", |(_, query)| query),
            HttpMethod::Post => self.body.as_deref().unwrap_or(""),
        }
    }

    /// The query split into `&key=value` fragments, in order.
    pub fn fragments(&self) -> Vec<String> {
        self.query()
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| format!("&{pair}"))
            .collect()
    }
}

/// An HTTP response described as plain data.
///
/// Constructed by the transport after executing an `HttpRequest`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Executes one HTTP round-trip.
///
/// Implementations must return non-2xx responses as data rather than as
/// `Err`; status interpretation belongs to the client. Calls made from
/// several threads are only as safe as the implementation makes them.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[test]
    fn query_of_get_is_taken_from_url() {
        let req = get("http://host/index.php?module=API&idSite=3");
        assert_eq!(req.query(), "module=API&idSite=3");
        assert_eq!(req.fragments(), vec!["&module=API", "&idSite=3"]);
    }

    #[test]
    fn query_of_get_without_question_mark_is_empty() {
        let req = get("http://host/index.php");
        assert_eq!(req.query(), "");
        assert!(req.fragments().is_empty());
    }

    #[test]
    fn query_of_post_is_taken_from_body() {
        let req = HttpRequest {
            method: HttpMethod::Post,
            url: "http://host/index.php".to_string(),
            headers: Vec::new(),
            body: Some("module=API&format=json".to_string()),
        };
        assert_eq!(req.fragments(), vec!["&module=API", "&format=json"]);
    }

    #[test]
    fn method_deserializes_from_uppercase() {
        let method: HttpMethod = serde_json::from_str(r#""POST""#).unwrap();
        assert_eq!(method, HttpMethod::Post);
        assert_eq!(method.as_str(), "POST");
    }
}
