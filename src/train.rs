//! Train Tracker arrivals for a single station.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::arrival::{Arrival, derive_arrival};
use crate::clock::{NOT_AVAILABLE, chicago_now, format_clock, parse_train_timestamp};
use crate::fetch::{HttpClient, feed_url, fetch_bytes};
use crate::xml::{Element, parse_document, parse_logged};

pub const DEFAULT_MAX_RESULTS: u32 = 5;
pub const UNKNOWN_DESTINATION: &str = "Unknown destination";

/// One normalized `eta` node. Every field is display-ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainPrediction {
    pub route_name: String,
    pub destination: String,
    pub status: String,
    pub predicted_arrival: String,
    pub actual_arrival: String,
}

/// Spells out a Train Tracker route code, e.g. `Brn` -> `Brown Line`.
pub fn route_name(code: &str) -> String {
    let name = match code {
        "Red" => "Red Line",
        "Blue" => "Blue Line",
        "Brn" => "Brown Line",
        "G" => "Green Line",
        "Org" => "Orange Line",
        "Pink" => "Pink Line",
        "P" => "Purple Line",
        "Y" => "Yellow Line",
        other => return format!("{other} Line"),
    };
    name.to_string()
}

/// Normalizes a `ttarrivals` XML document.
///
/// The first `tmst` in the document is the reference clock; when it is
/// missing or malformed `local_now` is used instead.
///
/// # Errors
///
/// Returns an error if the body is not UTF-8 or not well-formed XML.
pub fn parse_train_response(body: &[u8], local_now: NaiveDateTime) -> Result<Vec<TrainPrediction>> {
    let text = std::str::from_utf8(body).context("train feed is not valid UTF-8")?;
    let root = parse_document(text).context("train feed is not valid XML")?;

    if let Some(code) = root.find_text("errCd").filter(|code| *code != "0") {
        let name = root.find_text("errNm").unwrap_or(NOT_AVAILABLE);
        warn!(error_code = code, error_name = name, "Train Tracker reported an error");
    }

    let reference = match parse_logged("tmst", root.find_text("tmst"), parse_train_timestamp) {
        Some(reference) => reference,
        None => {
            debug!(%local_now, "No usable tmst in train feed, using local clock");
            local_now
        }
    };

    Ok(root
        .find_all("eta")
        .into_iter()
        .map(|eta| train_prediction(eta, reference))
        .collect())
}

fn train_prediction(eta: &Element, reference: NaiveDateTime) -> TrainPrediction {
    let code = eta.child_text("rt").unwrap_or(NOT_AVAILABLE);
    let predicted = eta.parse_child("arrT", parse_train_timestamp);

    // no countdown fallback on this feed
    let arrival = match predicted {
        Some(predicted) => derive_arrival(Some(reference), Some(predicted), None),
        None => Arrival::unavailable(),
    };

    let prediction = TrainPrediction {
        route_name: route_name(code),
        destination: eta
            .child_text("destNm")
            .unwrap_or(UNKNOWN_DESTINATION)
            .to_string(),
        status: arrival.status,
        predicted_arrival: predicted
            .map(format_clock)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        actual_arrival: arrival.actual_arrival,
    };
    debug!(?prediction, "Train prediction normalized");
    prediction
}

/// Fetches arrivals for one station from the Train Tracker API.
pub struct TrainPredictor<C> {
    client: C,
    endpoint: String,
    station_id: String,
    max_results: u32,
}

impl<C: HttpClient> TrainPredictor<C> {
    /// `client` is expected to add the API key (see
    /// [`UrlParam::key`](crate::fetch::auth::UrlParam::key)).
    pub fn new(
        client: C,
        endpoint: impl Into<String>,
        station_id: impl Into<String>,
        max_results: u32,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            station_id: station_id.into(),
            max_results,
        }
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    /// Current arrivals in upstream order, at most `max_results` of them.
    ///
    /// Transport and document failures are logged and produce an empty list.
    #[tracing::instrument(
        skip(self),
        fields(endpoint = %self.endpoint, station_id = %self.station_id, max = self.max_results)
    )]
    pub async fn predictions(&self) -> Vec<TrainPrediction> {
        match self.fetch().await {
            Ok(predictions) => {
                info!(count = predictions.len(), "Train predictions fetched");
                predictions
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "Train predictions unavailable");
                Vec::new()
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<TrainPrediction>> {
        let max = self.max_results.to_string();
        let url = feed_url(
            &self.endpoint,
            &[
                ("mapid", self.station_id.as_str()),
                ("max", max.as_str()),
                ("outputType", "XML"),
            ],
        )?;
        let bytes = fetch_bytes(&self.client, url)
            .await
            .context("train feed request failed")?;
        debug!(bytes = bytes.len(), "Train feed received, parsing");
        parse_train_response(&bytes, chicago_now())
    }
}
