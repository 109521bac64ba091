use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "chuckle_core=debug,wgpu_core=warn").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Caps the chatty wgpu/naga targets at `warn` unless a filter names them.
    pub quiet_gpu: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            quiet_gpu: true,
        }
    }
}

const GPU_TARGETS: [&str; 4] = ["wgpu_core", "wgpu_hal", "naga", "wgpu"];

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Subsequent calls are ignored. Call early in `main`, before opening a window.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        let filter = config
            .env_filter
            .or_else(|| std::env::var("RUST_LOG").ok());

        match filter.as_deref() {
            Some(filter) => {
                if config.quiet_gpu {
                    quiet_gpu_targets(&mut builder, Some(filter));
                }
                builder.parse_filters(filter);
            }
            None => {
                builder.filter_level(log::LevelFilter::Info);
                if config.quiet_gpu {
                    quiet_gpu_targets(&mut builder, None);
                }
            }
        }

        builder.write_style(config.write_style);
        builder.format_timestamp_millis();

        if builder.try_init().is_err() {
            // Another logger was installed by the host application.
            return;
        }

        log::debug!("logging initialized");
    });
}

fn quiet_gpu_targets(builder: &mut env_logger::Builder, filter: Option<&str>) {
    for target in GPU_TARGETS {
        let named = filter.is_some_and(|f| f.split(',').any(|d| d.starts_with(target)));
        if !named {
            builder.filter_module(target, log::LevelFilter::Warn);
        }
    }
}
