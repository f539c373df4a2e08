use plugweave::{ServiceCollection, ServiceRegistrar};

///
/// MetricsRegistrar
///
/// Registers services without being a plugin, so discovery skips it.
///

#[derive(Debug, Default)]
pub struct MetricsRegistrar;

impl ServiceRegistrar for MetricsRegistrar {
    fn register_services(&self, services: &mut ServiceCollection) {
        services.insert(0_u64);
    }
}
