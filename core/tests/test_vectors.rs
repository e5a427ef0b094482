//! Verify gateway requests and response parsing against `test-vectors/`.
//!
//! Each case names an operation, its inputs, the query fragments expected
//! after the fixed `module`/`method`/`format`/`token_auth` prefix, a
//! simulated response, and either the expected result or the expected error
//! kind. Results are compared as JSON values so field order never matters.

use chrono::NaiveDate;
use piwik_core::{
    ApiError, ClientConfig, DecodeError, FromJson, HttpRequest, HttpResponse, PiwikClient,
    SiteId, SiteInfo, SiteOptions, Transport, TransportError,
};
use serde::Deserialize;
use serde_json::{json, Value};

/// Never called: vectors only use the pure `build_*` side of the gateway.
struct Offline;

impl Transport for Offline {
    fn send(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        Err(TransportError::new("offline"))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Input {
    id_site: i64,
    site_name: String,
    urls: Vec<String>,
    url: String,
    group: Option<String>,
    ecommerce: bool,
    excluded_ips: Vec<String>,
    excluded_query_parameters: Vec<String>,
    timezone: Option<String>,
    currency: Option<String>,
    start_date: Option<String>,
}

impl Input {
    fn options(&self) -> SiteOptions {
        SiteOptions {
            ecommerce: self.ecommerce,
            excluded_ips: self.excluded_ips.clone(),
            excluded_query_parameters: self.excluded_query_parameters.clone(),
            timezone: self.timezone.clone(),
            currency: self.currency.clone(),
            group: self.group.clone(),
            start_date: self
                .start_date
                .as_deref()
                .map(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()),
        }
    }
}

fn site_info_json(site: &SiteInfo) -> Value {
    json!({
        "site_id": site.site_id,
        "name": site.name,
        "main_url": site.main_url,
        "created": site.created,
        "timezone": site.timezone,
        "currency": site.currency,
        "extra": site.extra,
    })
}

/// Parse `response` for `operation` and render the result as JSON.
fn parse<T, F>(
    client: &PiwikClient,
    operation: &str,
    response: HttpResponse,
    render: F,
) -> Result<Value, ApiError>
where
    T: FromJson,
    F: FnOnce(T) -> Value,
{
    client
        .parse_response::<T>(&format!("SitesManager.{operation}"), response)
        .map(render)
}

fn error_kind(err: &ApiError) -> &'static str {
    match err {
        ApiError::Transport(_) => "Transport",
        ApiError::HttpStatus { .. } => "HttpStatus",
        ApiError::Decode { source, .. } => match source {
            DecodeError::MalformedPayload(_) => "MalformedPayload",
            DecodeError::RemoteError { .. } => "RemoteError",
            DecodeError::TypeMismatch { .. } => "TypeMismatch",
            DecodeError::MissingField { .. } => "MissingField",
        },
    }
}

#[test]
fn sites_manager_test_vectors() {
    let raw = include_str!("../../test-vectors/sites_manager.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let client = PiwikClient::new(
        ClientConfig::new(vectors["base_url"].as_str().unwrap())
            .with_token_auth(vectors["token_auth"].as_str().unwrap()),
    );
    let sites = client.sites_manager(&Offline);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let operation = case["operation"].as_str().unwrap();
        let input: Input = serde_json::from_value(case["input"].clone()).unwrap();

        // Verify build
        let req = match operation {
            "addSite" => sites.build_add_site(&input.site_name, &input.urls, &input.options()),
            "deleteSite" => sites.build_delete_site(input.id_site),
            "getSitesIdFromSiteUrl" => sites.build_get_sites_id_from_site_url(&input.url),
            "getSiteUrlsFromId" => sites.build_get_site_urls_from_id(input.id_site),
            "getSiteFromId" => sites.build_get_site_from_id(input.id_site),
            "updateSite" => sites.build_update_site(
                input.id_site,
                &input.site_name,
                &input.urls,
                &input.options(),
            ),
            "getAllSitesId" => sites.build_get_all_sites_id(),
            "getSitesFromGroup" => {
                sites.build_get_sites_from_group(input.group.as_deref().unwrap_or_default())
            }
            other => panic!("{name}: unknown operation {other}"),
        };

        let fragments = req.fragments();
        assert_eq!(
            fragments[..4],
            [
                "&module=API".to_string(),
                format!("&method=SitesManager.{operation}"),
                "&format=json".to_string(),
                "&token_auth=anonymous".to_string(),
            ],
            "{name}: fixed fragments"
        );
        let expected: Vec<String> =
            serde_json::from_value(case["expected_fragments"].clone()).unwrap();
        assert_eq!(fragments[4..], expected[..], "{name}: parameter fragments");

        // Verify parse
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        };
        let result = match operation {
            "addSite" => parse(&client, operation, response, |id: i64| json!(id)),
            "deleteSite" | "updateSite" => {
                parse(&client, operation, response, |ok: bool| json!(ok))
            }
            "getSitesIdFromSiteUrl" => parse(&client, operation, response, |ids: Vec<SiteId>| {
                json!(ids.iter().map(|id| id.site_id).collect::<Vec<_>>())
            }),
            "getSiteUrlsFromId" => {
                parse(&client, operation, response, |urls: Vec<String>| json!(urls))
            }
            "getSiteFromId" | "getSitesFromGroup" => {
                parse(&client, operation, response, |sites: Vec<SiteInfo>| {
                    Value::Array(sites.iter().map(site_info_json).collect())
                })
            }
            "getAllSitesId" => parse(&client, operation, response, |ids: Vec<i64>| json!(ids)),
            other => panic!("{name}: unknown operation {other}"),
        };

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_eq!(
                error_kind(&err),
                expected_error.as_str().unwrap(),
                "{name}: error kind ({err})"
            );
        } else {
            let value = result.unwrap_or_else(|e| panic!("{name}: unexpected error {e}"));
            assert_eq!(value, case["expected_result"], "{name}: parsed result");
        }
    }
}
