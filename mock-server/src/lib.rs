//! In-memory stand-in for the Piwik HTTP API.
//!
//! Serves `/` and `/index.php` for GET (query string) and POST (form body).
//! Every answer is a 200 with a JSON body; failures use Piwik's
//! `{"result":"error","message":...}` envelope, mutations that return
//! nothing use `{"result":"success","message":"ok"}`.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Query, State},
    routing::get,
    Form, Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub use axum::Router;

type Params = HashMap<String, String>;

/// A site as the mock stores it. Numeric columns are rendered as strings,
/// the way Piwik returns database rows.
#[derive(Clone, Debug, Serialize)]
pub struct Site {
    #[serde(rename = "idsite", serialize_with = "as_string")]
    pub id: i64,
    pub name: String,
    pub main_url: String,
    #[serde(skip)]
    pub alias_urls: Vec<String>,
    pub ts_created: String,
    #[serde(serialize_with = "flag_as_string")]
    pub ecommerce: bool,
    pub excluded_ips: String,
    pub excluded_parameters: String,
    pub timezone: String,
    pub currency: String,
    pub group: String,
}

fn as_string<S: serde::Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

fn flag_as_string<S: serde::Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "1" } else { "0" })
}

#[derive(Debug, Default)]
pub struct SiteStore {
    next_id: i64,
    sites: BTreeMap<i64, Site>,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<SiteStore>>,
    /// When set, requests must carry this `token_auth`.
    pub token_auth: Option<Arc<str>>,
}

/// Router that accepts any token.
pub fn app() -> Router {
    router(None)
}

/// Router that rejects requests whose `token_auth` differs from `token`.
pub fn app_with_token(token: impl Into<String>) -> Router {
    router(Some(Arc::from(token.into())))
}

fn router(token_auth: Option<Arc<str>>) -> Router {
    let state = AppState {
        store: Arc::new(RwLock::new(SiteStore::default())),
        token_auth,
    };
    Router::new()
        .route("/", get(api_query).post(api_form))
        .route("/index.php", get(api_query).post(api_form))
        .with_state(state)
}

pub async fn run(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

async fn api_query(State(state): State<AppState>, Query(params): Query<Params>) -> Json<Value> {
    Json(dispatch(&state, &params).await.unwrap_or_else(error_envelope))
}

async fn api_form(State(state): State<AppState>, Form(params): Form<Params>) -> Json<Value> {
    Json(dispatch(&state, &params).await.unwrap_or_else(error_envelope))
}

fn error_envelope(message: String) -> Value {
    json!({ "result": "error", "message": message })
}

fn success_envelope() -> Value {
    json!({ "result": "success", "message": "ok" })
}

async fn dispatch(state: &AppState, params: &Params) -> Result<Value, String> {
    if params.get("module").map(String::as_str) != Some("API") {
        return Err("The parameter 'module' must be 'API'.".to_string());
    }
    if let Some(format) = params.get("format") {
        if !format.eq_ignore_ascii_case("json") {
            return Err(format!("Unsupported format '{format}'."));
        }
    }
    if let Some(expected) = &state.token_auth {
        if params.get("token_auth").map(String::as_str) != Some(&**expected) {
            return Err(no_access());
        }
    }

    let method = required(params, "method")?;
    tracing::debug!(%method, "dispatching api call");

    match method {
        "SitesManager.addSite" => add_site(&mut *state.store.write().await, params),
        "SitesManager.updateSite" => update_site(&mut *state.store.write().await, params),
        "SitesManager.deleteSite" => {
            let id = site_id(params)?;
            let mut store = state.store.write().await;
            store.sites.remove(&id).ok_or_else(|| unknown_site(id))?;
            Ok(success_envelope())
        }
        "SitesManager.getSiteFromId" => {
            let id = site_id(params)?;
            let store = state.store.read().await;
            let site = store.sites.get(&id).ok_or_else(|| unknown_site(id))?;
            Ok(json!([site]))
        }
        "SitesManager.getSiteUrlsFromId" => {
            let id = site_id(params)?;
            let store = state.store.read().await;
            let site = store.sites.get(&id).ok_or_else(|| unknown_site(id))?;
            let urls: Vec<&String> = std::iter::once(&site.main_url)
                .chain(&site.alias_urls)
                .collect();
            Ok(json!(urls))
        }
        "SitesManager.getSitesIdFromSiteUrl" => {
            let url = required(params, "url")?;
            let store = state.store.read().await;
            let ids: Vec<Value> = store
                .sites
                .values()
                .filter(|site| site.main_url == url || site.alias_urls.iter().any(|u| u == url))
                .map(|site| json!({ "idsite": site.id.to_string() }))
                .collect();
            Ok(Value::Array(ids))
        }
        "SitesManager.getAllSitesId" => {
            let store = state.store.read().await;
            let ids: Vec<String> = store.sites.keys().map(ToString::to_string).collect();
            Ok(json!(ids))
        }
        "SitesManager.getSitesFromGroup" => {
            let group = params.get("group").map(String::as_str).unwrap_or_default();
            let store = state.store.read().await;
            let sites: Vec<&Site> = store
                .sites
                .values()
                .filter(|site| site.group == group)
                .collect();
            Ok(json!(sites))
        }
        "VisitorInterest.getNumberOfVisitsPerPage" => {
            let id = site_id(params)?;
            check_report_date(params)?;
            if !state.store.read().await.sites.contains_key(&id) {
                return Err(unknown_site(id));
            }
            Ok(visits_per_page_report())
        }
        other => Err(format!("The method '{other}' does not exist or is not available.")),
    }
}

fn add_site(store: &mut SiteStore, params: &Params) -> Result<Value, String> {
    let mut site = site_from_params(params)?;
    store.next_id += 1;
    site.id = store.next_id;
    store.sites.insert(site.id, site);
    Ok(json!(store.next_id))
}

fn update_site(store: &mut SiteStore, params: &Params) -> Result<Value, String> {
    let id = site_id(params)?;
    let existing = store.sites.get(&id).ok_or_else(|| unknown_site(id))?;
    let mut site = site_from_params(params)?;
    site.id = id;
    site.ts_created = existing.ts_created.clone();
    store.sites.insert(id, site);
    Ok(success_envelope())
}

fn site_from_params(params: &Params) -> Result<Site, String> {
    let name = required(params, "siteName")?;
    let mut urls = list(params, "urls");
    if urls.is_empty() {
        return Err("You must specify at least one URL for the site.".to_string());
    }
    let main_url = urls.remove(0);
    let ts_created = match params.get("startDate") {
        Some(date) => format!("{date} 00:00:00"),
        None => chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    };
    Ok(Site {
        id: 0,
        name: name.to_string(),
        main_url,
        alias_urls: urls,
        ts_created,
        ecommerce: params.get("ecommerce").map(String::as_str) == Some("1"),
        excluded_ips: list(params, "excludedIps").join(","),
        excluded_parameters: list(params, "excludedQueryParameters").join(","),
        timezone: optional(params, "timezone", "UTC"),
        currency: optional(params, "currency", "USD"),
        group: optional(params, "group", ""),
    })
}

fn visits_per_page_report() -> Value {
    json!([
        { "label": "1 page", "nb_visits": 0 },
        { "label": "2 pages", "nb_visits": 0 },
        { "label": "3 pages", "nb_visits": 0 },
    ])
}

/// `period=range` takes `<from>,<to>`; every other period takes one date.
fn check_report_date(params: &Params) -> Result<(), String> {
    let period = required(params, "period")?;
    let date = required(params, "date")?;
    let bounds: Vec<&str> = date.split(',').collect();
    match (period, bounds.len()) {
        ("day" | "week" | "month" | "year", 1) => {}
        ("range", 2) => {}
        ("range", _) => return Err(format!("The date '{date}' is not a correct date range.")),
        ("day" | "week" | "month" | "year", _) => {
            return Err(format!("The date '{date}' is not a correct date."))
        }
        (other, _) => return Err(format!("The period '{other}' is not supported.")),
    }
    for bound in bounds {
        chrono::NaiveDate::parse_from_str(bound, "%Y-%m-%d")
            .map_err(|_| format!("The date '{bound}' is not a correct date."))?;
    }
    Ok(())
}

fn required<'p>(params: &'p Params, name: &str) -> Result<&'p str, String> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| format!("Please specify a value for '{name}'."))
}

fn optional(params: &Params, name: &str, default: &str) -> String {
    params
        .get(name)
        .filter(|value| !value.is_empty())
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

fn list(params: &Params, name: &str) -> Vec<String> {
    params
        .get(name)
        .map(|value| {
            value
                .split(',')
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn site_id(params: &Params) -> Result<i64, String> {
    let raw = required(params, "idSite")?;
    raw.parse()
        .map_err(|_| format!("The parameter 'idSite' must be an integer, got '{raw}'."))
}

fn no_access() -> String {
    "You can't access this resource as it requires 'view' access.".to_string()
}

fn unknown_site(id: i64) -> String {
    format!("An unexpected website was found in the request: website id was set to '{id}'.")
}
