//! Gateway for the `SitesManager` plugin.

use chrono::NaiveDate;

use crate::client::PiwikClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, Transport};
use crate::parameter::Parameter;
use crate::types::{SiteId, SiteInfo};

const PLUGIN: &str = "SitesManager";

/// Optional attributes of `addSite` / `updateSite`.
///
/// The defaults send `ecommerce=0` and omit everything else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteOptions {
    pub ecommerce: bool,
    pub excluded_ips: Vec<String>,
    pub excluded_query_parameters: Vec<String>,
    pub timezone: Option<String>,
    pub currency: Option<String>,
    pub group: Option<String>,
    /// `None` leaves the server's default (the creation date).
    pub start_date: Option<NaiveDate>,
}

/// Typed facade over the `SitesManager` API.
#[derive(Debug, Clone, Copy)]
pub struct SitesManager<'c, T> {
    client: &'c PiwikClient,
    transport: &'c T,
}

impl<'c, T: Transport> SitesManager<'c, T> {
    pub(crate) fn new(client: &'c PiwikClient, transport: &'c T) -> Self {
        Self { client, transport }
    }

    pub fn build_add_site(
        &self,
        site_name: &str,
        urls: &[impl AsRef<str>],
        options: &SiteOptions,
    ) -> HttpRequest {
        let parameters = site_parameters(site_name, urls, options);
        self.client.build_request(PLUGIN, "addSite", &parameters)
    }

    /// Register a site and return its new id.
    pub fn add_site(
        &self,
        site_name: &str,
        urls: &[impl AsRef<str>],
        options: &SiteOptions,
    ) -> Result<i64, ApiError> {
        let parameters = site_parameters(site_name, urls, options);
        self.call("addSite", &parameters)
    }

    pub fn build_delete_site(&self, id_site: i64) -> HttpRequest {
        self.client
            .build_request(PLUGIN, "deleteSite", &[Parameter::simple("idSite", id_site)])
    }

    pub fn delete_site(&self, id_site: i64) -> Result<bool, ApiError> {
        self.call("deleteSite", &[Parameter::simple("idSite", id_site)])
    }

    pub fn build_get_sites_id_from_site_url(&self, url: &str) -> HttpRequest {
        self.client
            .build_request(PLUGIN, "getSitesIdFromSiteUrl", &[Parameter::simple("url", url)])
    }

    /// Ids of every site tracking `url`.
    pub fn get_sites_id_from_site_url(&self, url: &str) -> Result<Vec<SiteId>, ApiError> {
        self.call("getSitesIdFromSiteUrl", &[Parameter::simple("url", url)])
    }

    pub fn build_get_site_urls_from_id(&self, id_site: i64) -> HttpRequest {
        self.client
            .build_request(PLUGIN, "getSiteUrlsFromId", &[Parameter::simple("idSite", id_site)])
    }

    /// Main URL followed by the alias URLs of a site.
    pub fn get_site_urls_from_id(&self, id_site: i64) -> Result<Vec<String>, ApiError> {
        self.call("getSiteUrlsFromId", &[Parameter::simple("idSite", id_site)])
    }

    pub fn build_get_site_from_id(&self, id_site: i64) -> HttpRequest {
        self.client
            .build_request(PLUGIN, "getSiteFromId", &[Parameter::simple("idSite", id_site)])
    }

    pub fn get_site_from_id(&self, id_site: i64) -> Result<Vec<SiteInfo>, ApiError> {
        self.call("getSiteFromId", &[Parameter::simple("idSite", id_site)])
    }

    pub fn build_update_site(
        &self,
        id_site: i64,
        site_name: &str,
        urls: &[impl AsRef<str>],
        options: &SiteOptions,
    ) -> HttpRequest {
        let parameters = update_parameters(id_site, site_name, urls, options);
        self.client.build_request(PLUGIN, "updateSite", &parameters)
    }

    /// Overwrite a site. Attributes left at their default are cleared on the
    /// server, so pass every value the site should keep.
    pub fn update_site(
        &self,
        id_site: i64,
        site_name: &str,
        urls: &[impl AsRef<str>],
        options: &SiteOptions,
    ) -> Result<bool, ApiError> {
        let parameters = update_parameters(id_site, site_name, urls, options);
        self.call("updateSite", &parameters)
    }

    pub fn build_get_all_sites_id(&self) -> HttpRequest {
        self.client.build_request(PLUGIN, "getAllSitesId", &[])
    }

    pub fn get_all_sites_id(&self) -> Result<Vec<i64>, ApiError> {
        self.call("getAllSitesId", &[])
    }

    pub fn build_get_sites_from_group(&self, group: &str) -> HttpRequest {
        self.client
            .build_request(PLUGIN, "getSitesFromGroup", &[Parameter::simple("group", group)])
    }

    pub fn get_sites_from_group(&self, group: &str) -> Result<Vec<SiteInfo>, ApiError> {
        self.call("getSitesFromGroup", &[Parameter::simple("group", group)])
    }

    fn call<R: crate::decode::FromJson>(
        &self,
        operation: &str,
        parameters: &[Parameter],
    ) -> Result<R, ApiError> {
        self.client.call(self.transport, PLUGIN, operation, parameters)
    }
}

fn site_parameters(
    site_name: &str,
    urls: &[impl AsRef<str>],
    options: &SiteOptions,
) -> Vec<Parameter> {
    vec![
        Parameter::simple("siteName", site_name),
        Parameter::simple("ecommerce", options.ecommerce),
        Parameter::array("excludedIps", &options.excluded_ips, true),
        Parameter::array(
            "excludedQueryParameters",
            &options.excluded_query_parameters,
            true,
        ),
        Parameter::array("urls", urls.iter().map(|url| url.as_ref()), false),
        Parameter::simple("timezone", options.timezone.as_deref()),
        Parameter::simple("currency", options.currency.as_deref()),
        Parameter::simple("group", options.group.as_deref()),
        Parameter::date("startDate", options.start_date),
    ]
}

fn update_parameters(
    id_site: i64,
    site_name: &str,
    urls: &[impl AsRef<str>],
    options: &SiteOptions,
) -> Vec<Parameter> {
    let mut parameters = vec![Parameter::simple("idSite", id_site)];
    parameters.extend(site_parameters(site_name, urls, options));
    parameters
}
