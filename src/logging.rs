use std::sync::Once;

static INIT: Once = Once::new();

/// Sets up `env_logger` the first time it is called. `RUST_LOG` wins when set,
/// otherwise the demo logs at `info`.
pub fn init() {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        match std::env::var("RUST_LOG") {
            Ok(filter) => builder.parse_filters(&filter),
            Err(_) => builder.filter_level(log::LevelFilter::Info),
        };
        builder.init();
        log::debug!("logging initialized");
    });
}
