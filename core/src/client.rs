//! Stateless request builder and response parser for the Piwik API.
//!
//! # Design
//! `PiwikClient` holds only its `ClientConfig` and carries no mutable state
//! between calls. Building a request and parsing a response are separate
//! pure steps; [`PiwikClient::call`] strings them together around one
//! [`Transport::send`]. Module gateways (`SitesManager`, `VisitorInterest`)
//! are thin typed facades over `call`.

use crate::config::ClientConfig;
use crate::decode::{decode, FromJson};
use crate::error::{ApiError, DecodeError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::modules::{SitesManager, VisitorInterest};
use crate::parameter::encode;
use crate::Parameter;

/// Output format requested from the server. The decoder only reads JSON.
pub const FORMAT: &str = "json";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Synchronous, stateless client for the Piwik API.
#[derive(Debug, Clone)]
pub struct PiwikClient {
    config: ClientConfig,
}

impl PiwikClient {
    pub fn new(config: ClientConfig) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Self {
            config: ClientConfig { base_url, ..config },
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn sites_manager<'c, T: Transport>(&'c self, transport: &'c T) -> SitesManager<'c, T> {
        SitesManager::new(self, transport)
    }

    pub fn visitor_interest<'c, T: Transport>(
        &'c self,
        transport: &'c T,
    ) -> VisitorInterest<'c, T> {
        VisitorInterest::new(self, transport)
    }

    /// Assemble the request for `plugin.operation`.
    ///
    /// The fixed `module`, `method`, `format` and `token_auth` fragments come
    /// first, then every parameter that is not omitted, in the given order.
    pub fn build_request(
        &self,
        plugin: &str,
        operation: &str,
        parameters: &[Parameter],
    ) -> HttpRequest {
        let mut query = format!(
            "module=API&method={}&format={FORMAT}&token_auth={}",
            encode(&format!("{plugin}.{operation}")),
            encode(&self.config.token_auth),
        );
        for fragment in parameters.iter().filter_map(Parameter::encoded_fragment) {
            query.push_str(&fragment);
        }

        tracing::debug!(
            plugin,
            operation,
            method = self.config.method.as_str(),
            parameters = parameters.len(),
            "built piwik request"
        );

        match self.config.method {
            HttpMethod::Get => HttpRequest {
                method: HttpMethod::Get,
                url: format!("{}?{query}", self.config.base_url),
                headers: Vec::new(),
                body: None,
            },
            HttpMethod::Post => HttpRequest {
                method: HttpMethod::Post,
                url: self.config.base_url.clone(),
                headers: vec![("content-type".to_string(), FORM_CONTENT_TYPE.to_string())],
                body: Some(query),
            },
        }
    }

    /// Check the status and decode the body of `operation`'s response.
    pub fn parse_response<T: FromJson>(
        &self,
        operation: &str,
        response: HttpResponse,
    ) -> Result<T, ApiError> {
        check_status(operation, &response)?;
        decode(&response.body).map_err(|source| {
            if let DecodeError::RemoteError { message } = &source {
                tracing::warn!(operation, message = %message, "piwik returned an error");
            }
            ApiError::Decode {
                operation: operation.to_string(),
                source,
            }
        })
    }

    /// Build, send and parse one call. Exactly one request is sent.
    pub fn call<T, R>(
        &self,
        transport: &T,
        plugin: &str,
        operation: &str,
        parameters: &[Parameter],
    ) -> Result<R, ApiError>
    where
        T: Transport + ?Sized,
        R: FromJson,
    {
        let request = self.build_request(plugin, operation, parameters);
        let response = transport.send(&request)?;
        tracing::debug!(
            plugin,
            operation,
            status = response.status,
            bytes = response.body.len(),
            "received piwik response"
        );
        self.parse_response(&format!("{plugin}.{operation}"), response)
    }
}

/// Piwik reports failures inside a 200 body; any other status is an error.
fn check_status(operation: &str, response: &HttpResponse) -> Result<(), ApiError> {
    if response.status == 200 {
        return Ok(());
    }
    Err(ApiError::HttpStatus {
        operation: operation.to_string(),
        status: response.status,
        body: response.body.clone(),
    })
}
