//! Full site lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every gateway
//! operation over real HTTP through a ureq-backed `Transport`, once with GET
//! and once with POST.

use piwik_core::{
    ApiError, ClientConfig, DecodeError, HttpMethod, HttpRequest, HttpResponse, PiwikClient,
    ReportDate, SiteOptions, Transport, TransportError,
};

/// `Transport` over ureq.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses reach the client as data.
struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn send(&self, req: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let response = match (req.method, &req.body) {
            (HttpMethod::Get, _) => self.agent.get(&req.url).call(),
            (HttpMethod::Post, Some(body)) => self
                .agent
                .post(&req.url)
                .content_type("application/x-www-form-urlencoded")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => self.agent.post(&req.url).send_empty(),
        };
        let mut response = response.map_err(TransportError::new)?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(TransportError::new)?;

        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}

/// Start a mock server on a random port and return its endpoint URL.
fn start_server(app: mock_server::Router) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, app).await
        })
        .unwrap();
    });

    format!("http://{addr}/index.php")
}

fn site_lifecycle(method: HttpMethod) {
    let endpoint = start_server(mock_server::app_with_token("secret"));
    let transport = UreqTransport::new();
    let client = PiwikClient::new(
        ClientConfig::new(endpoint)
            .with_token_auth("secret")
            .with_method(method),
    );
    let sites = client.sites_manager(&transport);

    // Step 1: no sites yet.
    assert!(sites.get_all_sites_id().unwrap().is_empty());

    // Step 2: add a site with defaults.
    let id = sites
        .add_site("Test", &["http://a.com"], &SiteOptions::default())
        .unwrap();
    assert_eq!(id, 1);

    // Step 3: look it up by id.
    let found = sites.get_site_from_id(id).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].site_id, id);
    assert_eq!(found[0].name, "Test");
    assert_eq!(found[0].main_url, "http://a.com");
    assert_eq!(found[0].timezone, "UTC");
    assert_eq!(found[0].extra.get("ecommerce"), Some(&serde_json::json!("0")));

    // Step 4: look it up by url.
    let ids = sites.get_sites_id_from_site_url("http://a.com").unwrap();
    assert_eq!(ids.len(), 1);
    assert_eq!(ids[0].site_id, id);

    // Step 5: update with every option.
    let options = SiteOptions {
        ecommerce: true,
        excluded_ips: vec!["10.0.0.1".to_string()],
        excluded_query_parameters: vec!["sid".to_string(), "token".to_string()],
        timezone: Some("Europe/Paris".to_string()),
        currency: Some("EUR".to_string()),
        group: Some("shops".to_string()),
        start_date: None,
    };
    assert!(sites
        .update_site(id, "Shop", &["http://a.com", "http://b.com"], &options)
        .unwrap());

    let urls = sites.get_site_urls_from_id(id).unwrap();
    assert_eq!(urls, vec!["http://a.com", "http://b.com"]);

    let grouped = sites.get_sites_from_group("shops").unwrap();
    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped[0].name, "Shop");
    assert_eq!(grouped[0].currency, "EUR");
    assert_eq!(grouped[0].timezone, "Europe/Paris");
    assert_eq!(
        grouped[0].extra.get("excluded_parameters"),
        Some(&serde_json::json!("sid,token"))
    );

    // Step 6: reports on the site, for one day and for a range.
    let from = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let to = chrono::NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
    let interest = client.visitor_interest(&transport);
    let rows = interest
        .get_number_of_visits_per_page(id, ReportDate::day(to), None)
        .unwrap();
    assert_eq!(rows[0].pages_count, "1 page");
    let rows = interest
        .get_number_of_visits_per_page(id, ReportDate::Range(from, to), None)
        .unwrap();
    assert_eq!(rows.len(), 3);

    // Step 7: delete.
    assert!(sites.delete_site(id).unwrap());

    // Step 8: the server now reports the site as unknown.
    let err = sites.get_site_from_id(id).unwrap_err();
    assert!(matches!(
        err.as_decode(),
        Some(DecodeError::RemoteError { .. })
    ));

    // Step 9: empty again.
    assert!(sites.get_all_sites_id().unwrap().is_empty());
}

#[test]
fn site_lifecycle_over_get() {
    site_lifecycle(HttpMethod::Get);
}

#[test]
fn site_lifecycle_over_post() {
    site_lifecycle(HttpMethod::Post);
}

#[test]
fn wrong_token_is_a_remote_error() {
    let endpoint = start_server(mock_server::app_with_token("secret"));
    let transport = UreqTransport::new();
    let client = PiwikClient::new(ClientConfig::new(endpoint).with_token_auth("wrong"));

    let err = client.sites_manager(&transport).get_all_sites_id().unwrap_err();
    match err {
        ApiError::Decode { operation, source } => {
            assert_eq!(operation, "SitesManager.getAllSitesId");
            assert!(matches!(source, DecodeError::RemoteError { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unreachable_server_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let transport = UreqTransport::new();
    let client = PiwikClient::new(ClientConfig::new(format!("http://127.0.0.1:{port}/index.php")));

    let err = client.sites_manager(&transport).get_all_sites_id().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
