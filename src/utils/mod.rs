pub mod constants;
pub mod progress_bars;
