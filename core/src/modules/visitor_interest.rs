//! Gateway for the `VisitorInterest` plugin.

use chrono::NaiveDate;

use crate::client::PiwikClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, Transport};
use crate::parameter::{Parameter, DATE_FORMAT};
use crate::types::VisitsPerPage;

const PLUGIN: &str = "VisitorInterest";

/// Calendar period containing a single report date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }
}

/// What a report covers: the period around one date, or an explicit range.
///
/// A range is sent as `period=range&date=<from>,<to>`, so Piwik never sees
/// `period=range` with a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportDate {
    Single(Period, NaiveDate),
    /// Inclusive on both ends.
    Range(NaiveDate, NaiveDate),
}

impl ReportDate {
    pub fn day(date: NaiveDate) -> Self {
        ReportDate::Single(Period::Day, date)
    }

    /// Value of the `period` parameter.
    pub fn period(&self) -> &'static str {
        match self {
            ReportDate::Single(period, _) => period.as_str(),
            ReportDate::Range(..) => "range",
        }
    }

    fn parameters(&self) -> [Parameter; 2] {
        let period = Parameter::simple("period", self.period());
        match *self {
            ReportDate::Single(_, date) => [period, Parameter::date("date", Some(date))],
            ReportDate::Range(from, to) => {
                let bounds = [from, to].map(|date| date.format(DATE_FORMAT).to_string());
                [period, Parameter::array("date", bounds, false)]
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VisitorInterest<'c, T> {
    client: &'c PiwikClient,
    transport: &'c T,
}

impl<'c, T: Transport> VisitorInterest<'c, T> {
    pub(crate) fn new(client: &'c PiwikClient, transport: &'c T) -> Self {
        Self { client, transport }
    }

    pub fn build_get_number_of_visits_per_page(
        &self,
        id_site: i64,
        date: ReportDate,
        segment: Option<&str>,
    ) -> HttpRequest {
        let parameters = report_parameters(id_site, date, segment);
        self.client
            .build_request(PLUGIN, "getNumberOfVisitsPerPage", &parameters)
    }

    /// Visits bucketed by the number of pages viewed.
    pub fn get_number_of_visits_per_page(
        &self,
        id_site: i64,
        date: ReportDate,
        segment: Option<&str>,
    ) -> Result<Vec<VisitsPerPage>, ApiError> {
        let parameters = report_parameters(id_site, date, segment);
        self.client.call(
            self.transport,
            PLUGIN,
            "getNumberOfVisitsPerPage",
            &parameters,
        )
    }
}

fn report_parameters(id_site: i64, date: ReportDate, segment: Option<&str>) -> Vec<Parameter> {
    let mut parameters = vec![Parameter::simple("idSite", id_site)];
    parameters.extend(date.parameters());
    parameters.push(Parameter::simple("segment", segment));
    parameters
}
