pub mod arrival;
pub mod board;
pub mod bus;
pub mod clock;
pub mod config;
pub mod fetch;
pub mod output;
pub mod train;
pub mod xml;

#[cfg(test)]
mod testing;
