use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber. `RUST_LOG` wins when set;
/// otherwise `verbosity` picks warn, info, debug or trace.
pub fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber installed earlier (e.g. by a test harness) stays in place.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_keeps_first_subscriber() {
        init_logging(1);
        init_logging(3);
        tracing::info!("still logging after a second init");
    }
}
