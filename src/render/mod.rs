//! Chart rendering.

mod chart;

pub use chart::{correlogram_svg, forecast_chart_svg, ChartOptions};
