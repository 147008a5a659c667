//! Combined bus and train board, the data a page or terminal renders.

use serde::Serialize;

use crate::bus::{BusPrediction, BusPredictor};
use crate::clock::{chicago_now, format_clock};
use crate::fetch::HttpClient;
use crate::train::{TrainPrediction, TrainPredictor};

#[derive(Debug, Clone, Serialize)]
pub struct Board {
    pub bus_stop_name: String,
    pub train_station_name: String,
    /// Chicago wall-clock time when the board was built.
    pub current_time: String,
    pub bus: Vec<BusPrediction>,
    pub train: Vec<TrainPrediction>,
}

/// Queries both feeds concurrently and assembles a [`Board`].
///
/// Each feed degrades on its own: a failed feed leaves its list empty
/// without affecting the other.
#[tracing::instrument(skip_all, fields(stop_id = bus.stop_id(), station_id = train.station_id()))]
pub async fn compose_board<B, T>(
    bus: &BusPredictor<B>,
    train: &TrainPredictor<T>,
    bus_stop_name: &str,
    train_station_name: &str,
) -> Board
where
    B: HttpClient,
    T: HttpClient,
{
    let (bus, train) = tokio::join!(bus.predictions(), train.predictions());

    Board {
        bus_stop_name: bus_stop_name.to_string(),
        train_station_name: train_station_name.to_string(),
        current_time: format_clock(chicago_now()),
        bus,
        train,
    }
}
