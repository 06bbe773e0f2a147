pub mod series;

pub use series::{require_len, SeriesView};
