use std::env;

use is_terminal::IsTerminal;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

// ---

/// Dependencies whose debug output drowns the service's own logs.
const QUIET_TARGETS: &str = "sqlx::query=warn,hyper=warn,reqwest=warn";

/// Initialize the global tracing subscriber for structured logging.
///
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR`:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by `SPAN_EVENTS`:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Level from `RUST_LOG` when set, otherwise `LOG_LEVEL`. The default is
///   `debug` when `DEBUG=True`, else `info`
///
/// Call once at startup before any logging macro runs.
pub fn init_tracing() {
    // ---
    let span_events = match env::var("SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let debug = env::var("DEBUG").as_deref() == Ok("True");
        let level = log_level(env::var("LOG_LEVEL").ok().as_deref(), debug);
        EnvFilter::new(format!("{level},{QUIET_TARGETS}"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}

/// Requested level if it names one, otherwise the debug-mode default.
fn log_level(requested: Option<&str>, debug: bool) -> &'static str {
    match requested {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ if debug => "debug",
        _ => "info",
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_log_level_default_follows_debug_mode() {
        // ---
        assert_eq!(log_level(Some("warn"), false), "warn");
        assert_eq!(log_level(Some("warn"), true), "warn");
        assert_eq!(log_level(Some("verbose"), true), "debug");
        assert_eq!(log_level(None, true), "debug");
        assert_eq!(log_level(None, false), "info");
    }
}
