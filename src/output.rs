//! Terminal and JSON presentation of normalized predictions.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::board::Board;
use crate::bus::BusPrediction;
use crate::train::TrainPrediction;

/// One numbered line per bus prediction.
pub fn bus_lines(predictions: &[BusPrediction]) -> Vec<String> {
    predictions
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            format!(
                "{}. Route: {}, Status: {}, CTA Predicted: {}, Actual Arrival: {}, Distance: {}",
                idx + 1,
                p.route,
                p.status,
                p.predicted_arrival,
                p.actual_arrival,
                p.distance
            )
        })
        .collect()
}

/// One numbered line per train prediction.
pub fn train_lines(predictions: &[TrainPrediction]) -> Vec<String> {
    predictions
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            format!(
                "{}. Route: {}, Destination: {}, Status: {}, CTA Predicted: {}, Actual Arrival: {}",
                idx + 1,
                p.route_name,
                p.destination,
                p.status,
                p.predicted_arrival,
                p.actual_arrival
            )
        })
        .collect()
}

/// Full board as text: a header per section, then the prediction lines.
pub fn board_lines(board: &Board) -> Vec<String> {
    let mut lines = vec![format!("Current time: {}", board.current_time), String::new()];

    lines.push(format!("Bus: {}", board.bus_stop_name));
    if board.bus.is_empty() {
        lines.push("No bus predictions available".to_string());
    }
    lines.extend(bus_lines(&board.bus));
    lines.push(String::new());

    lines.push(format!("Train: {}", board.train_station_name));
    if board.train.is_empty() {
        lines.push("No train predictions available".to_string());
    }
    lines.extend(train_lines(&board.train));
    lines
}

/// Serializes any output value as pretty-printed JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Writes lines to stdout.
pub fn print_lines(lines: &[String]) {
    debug!(count = lines.len(), "Printing output");
    for line in lines {
        println!("{line}");
    }
}
