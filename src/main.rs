use std::{env, io, process};

use akashacms::cli::{output, Dispatcher, Locations, COMMANDS};
use akashacms::config::Settings;
use akashacms::exitcode;
use akashacms::infrastructure::di::ServiceContainer;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Environment variable holding the tracing filter directive.
const LOG_ENV: &str = "AKASHACMS_LOG";
const DEFAULT_LOG_FILTER: &str = "akashacms=info";

fn main() {
    setup_logging();

    let locations = Locations::detect().unwrap_or_else(|e| {
        output::error(&format!("cannot determine working directory: {e}"));
        process::exit(exitcode::IOERR);
    });

    let settings = Settings::load().unwrap_or_else(|e| {
        output::error(&e);
        process::exit(exitcode::CONFIG);
    });

    let services = ServiceContainer::new(settings, &locations.working_dir);
    let dispatcher = Dispatcher::new(COMMANDS, &services, locations);
    let invocation = dispatcher
        .parse(env::args_os())
        .unwrap_or_else(|e| e.exit());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = dispatcher.execute(&invocation, &mut out) {
        output::error(&e);
        if let Some(hint) = e.hint() {
            for line in hint.lines() {
                output::hint(line);
            }
        }
        process::exit(e.exit_code());
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // Formatted output directed to stderr; stdout carries command results
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NONE);

    let filtered_layer = fmt_layer.with_filter(filter);

    tracing_subscriber::registry().with(filtered_layer).init();
    tracing::debug!("logging initialized from {}", LOG_ENV);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_filter_when_parsed_then_valid_directive() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }
}
