use plugweave::prelude::*;

///
/// Forecast
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Forecast {
    pub city: String,
    pub celsius: i32,
}

///
/// ForecastPlugin
///

#[derive(Debug, Default)]
pub struct ForecastPlugin;

impl Plugin for ForecastPlugin {
    fn id(&self) -> &str {
        "forecast"
    }

    fn name(&self) -> &str {
        "Forecast"
    }

    fn version(&self) -> &str {
        "1.2.0"
    }

    fn description(&self) -> &str {
        "Daily temperature forecasts"
    }
}

impl ServiceRegistrar for ForecastPlugin {
    fn register_services(&self, services: &mut ServiceCollection) {
        services.insert(Forecast {
            city: "Lisbon".to_string(),
            celsius: 21,
        });
    }
}
