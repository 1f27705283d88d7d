//! Geometry: the measurement seam and its implementations

pub mod font;
mod measure;
mod text_metrics;

pub use font::FontMetrics;
pub use measure::{measure_page, BlockBox, FixedMeasure, Measure, PageGeometry};
pub use text_metrics::TextMetricsMeasure;
