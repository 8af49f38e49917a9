pub mod rsi;

pub use rsi::{RsiError, calculate_rsi};
