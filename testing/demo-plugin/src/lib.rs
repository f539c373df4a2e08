//! Fixture crate: two plugin contracts implemented the ways discovery has to
//! understand, plus templates under `Components/`.

mod plugins;

pub use plugins::{
    forecast::{Forecast, ForecastPlugin},
    metrics::MetricsRegistrar,
};

plugweave::start!();
