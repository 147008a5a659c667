//! Bus Tracker predictions for a single stop.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::arrival::{Countdown, derive_arrival};
use crate::clock::{NOT_AVAILABLE, format_clock, parse_bus_timestamp};
use crate::fetch::{HttpClient, feed_url, fetch_bytes};
use crate::xml::{Element, parse_document, parse_logged};

/// Distances up to this many feet are shown in feet, beyond it in miles.
pub const FEET_DISPLAY_LIMIT: f64 = 1000.0;
pub const FEET_PER_MILE: f64 = 5280.0;

/// One normalized `prd` node. Every field is display-ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusPrediction {
    pub route: String,
    /// `Delayed`, `DUE`, `N minutes` or `N/A`.
    pub status: String,
    /// Upstream `prdtm` as a 12-hour clock time.
    pub predicted_arrival: String,
    /// Feed time plus the computed countdown.
    pub actual_arrival: String,
    pub distance: String,
}

/// Parses a `dstp` value in feet; non-finite numbers are rejected.
pub fn parse_feet(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|feet| feet.is_finite())
}

/// Formats a distance in feet as `N ft` or `N.NN mi`.
pub fn format_distance(feet: Option<f64>) -> String {
    let Some(feet) = feet else {
        return NOT_AVAILABLE.to_string();
    };

    if feet <= FEET_DISPLAY_LIMIT {
        format!("{feet:.0} ft")
    } else {
        format!("{:.2} mi", feet / FEET_PER_MILE)
    }
}

/// Normalizes a `getpredictions` XML document.
///
/// The first `tmstmp` in the document is the reference clock. One record is
/// produced per `prd` node, in document order.
///
/// # Errors
///
/// Returns an error if the body is not UTF-8 or not well-formed XML.
pub fn parse_bus_response(body: &[u8]) -> Result<Vec<BusPrediction>> {
    let text = std::str::from_utf8(body).context("bus feed is not valid UTF-8")?;
    let root = parse_document(text).context("bus feed is not valid XML")?;

    for message in root
        .find_all("error")
        .into_iter()
        .filter_map(|e| e.child_text("msg"))
    {
        warn!(upstream_message = message, "Bus Tracker reported an error");
    }

    let reference = parse_logged("tmstmp", root.find_text("tmstmp"), parse_bus_timestamp);
    if reference.is_none() {
        debug!("No usable tmstmp in bus feed, using raw countdowns");
    }

    Ok(root
        .find_all("prd")
        .into_iter()
        .map(|prd| bus_prediction(prd, reference))
        .collect())
}

fn bus_prediction(prd: &Element, reference: Option<NaiveDateTime>) -> BusPrediction {
    let predicted = prd.parse_child("prdtm", parse_bus_timestamp);
    let raw_countdown = prd.parse_child("prdctdn", |raw| Countdown::parse(raw).map(|_| raw));
    let arrival = derive_arrival(reference, predicted, raw_countdown);

    let prediction = BusPrediction {
        route: prd.child_text("rt").unwrap_or(NOT_AVAILABLE).to_string(),
        status: arrival.status,
        predicted_arrival: predicted
            .map(format_clock)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        actual_arrival: arrival.actual_arrival,
        distance: format_distance(prd.parse_child("dstp", parse_feet)),
    };
    debug!(?prediction, "Bus prediction normalized");
    prediction
}

/// Fetches predictions for one stop from the Bus Tracker API.
pub struct BusPredictor<C> {
    client: C,
    endpoint: String,
    stop_id: String,
}

impl<C: HttpClient> BusPredictor<C> {
    /// `client` is expected to add the API key (see
    /// [`UrlParam::key`](crate::fetch::auth::UrlParam::key)).
    pub fn new(client: C, endpoint: impl Into<String>, stop_id: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            stop_id: stop_id.into(),
        }
    }

    pub fn stop_id(&self) -> &str {
        &self.stop_id
    }

    /// Current predictions in upstream order.
    ///
    /// Transport and document failures are logged and produce an empty list.
    #[tracing::instrument(skip(self), fields(endpoint = %self.endpoint, stop_id = %self.stop_id))]
    pub async fn predictions(&self) -> Vec<BusPrediction> {
        match self.fetch().await {
            Ok(predictions) => {
                info!(count = predictions.len(), "Bus predictions fetched");
                predictions
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "Bus predictions unavailable");
                Vec::new()
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<BusPrediction>> {
        let url = feed_url(
            &self.endpoint,
            &[("stpid", self.stop_id.as_str()), ("format", "xml")],
        )?;
        let bytes = fetch_bytes(&self.client, url)
            .await
            .context("bus feed request failed")?;
        debug!(bytes = bytes.len(), "Bus feed received, parsing");
        parse_bus_response(&bytes)
    }
}
