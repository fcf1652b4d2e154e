use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Initialize logging for CLI use.  If the environment variable `RUST_LOG` is
/// set to a *non-empty* value we interpret it as an env-filter and enable
/// compact logging.  Wrapper scripts frequently export RUST_LOG
/// unconditionally but empty, and an empty value must not be interpreted as a
/// desire to enable logging.
pub fn init_logging() {
    if let Ok(rustlog) = std::env::var("RUST_LOG") {
        if !rustlog.is_empty() {
            if let Ok(env_filter) = EnvFilter::try_from_default_env() {
                tracing_subscriber::fmt()
                    .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
                    .compact()
                    // This mostly ends up in logs that get excerpted into
                    // emails, where ANSI and sub-second timestamps are noise.
                    .with_ansi(false)
                    .without_time()
                    .with_env_filter(env_filter)
                    .init();
            }
        }
    }
}
