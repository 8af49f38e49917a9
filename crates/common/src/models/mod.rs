pub mod interval;
pub mod signal;

pub use interval::{KlineInterval, UnknownInterval};
pub use signal::{Direction, Signal};
