//! Minimal stderr logger.
//!
//! Prints `[elapsed LEVEL target] message`. Install once at startup with
//! [`init_with_level`]; [`level_from_env`] reads `QUADGRID_LOG` / `RUST_LOG`.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let target = record.target().split("::").next().unwrap_or("");
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:7.3}s {:>5} {}] {}",
            elapsed,
            record.level(),
            target,
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Variables consulted for the log level, highest priority first.
const LOG_ENV_VARS: [&str; 2] = ["QUADGRID_LOG", "RUST_LOG"];

fn env_values() -> impl Iterator<Item = String> {
    LOG_ENV_VARS
        .iter()
        .filter_map(|key| std::env::var(key).ok())
}

/// Level from `QUADGRID_LOG`, then `RUST_LOG`, else `fallback`.
///
/// Only plain level names (`error`, `warn`, `info`, `debug`, `trace`, `off`)
/// are understood; anything else falls back.
pub fn level_from_env(fallback: LevelFilter) -> LevelFilter {
    parse_level(env_values(), fallback)
}

fn parse_level<I: IntoIterator<Item = String>>(values: I, fallback: LevelFilter) -> LevelFilter {
    values
        .into_iter()
        .find_map(|v| v.trim().parse::<LevelFilter>().ok())
        .unwrap_or(fallback)
}

/// First non-blank value, used verbatim as a filter directive
/// (`quadgrid_decode=debug,info` works), else the fallback level name.
#[cfg(any(feature = "tracing", test))]
fn filter_directive<I: IntoIterator<Item = String>>(values: I, fallback: LevelFilter) -> String {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string().to_ascii_lowercase())
}

/// Install a `tracing` subscriber with span close events.
///
/// The filter follows the same variables as [`level_from_env`] but accepts
/// full `EnvFilter` directives; an unparsable directive falls back to
/// `fallback`. `log` records are bridged by the subscriber.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, fallback: LevelFilter) {
    let directive = filter_directive(env_values(), fallback);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|err| {
        eprintln!("invalid log filter {directive:?}: {err}");
        EnvFilter::new(fallback.to_string().to_ascii_lowercase())
    });
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .with_target(false)
            .finish()
            .try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn first_parsable_level_wins() {
        assert_eq!(
            parse_level(owned(&["debug", "error"]), LevelFilter::Warn),
            LevelFilter::Debug
        );
        assert_eq!(
            parse_level(owned(&["quadgrid=trace", " Info "]), LevelFilter::Warn),
            LevelFilter::Info
        );
        assert_eq!(parse_level(owned(&[]), LevelFilter::Error), LevelFilter::Error);
    }

    #[test]
    fn directive_keeps_targets_and_falls_back_to_level_name() {
        assert_eq!(
            filter_directive(owned(&["quadgrid_decode=debug,info", "warn"]), LevelFilter::Warn),
            "quadgrid_decode=debug,info"
        );
        assert_eq!(filter_directive(owned(&["  ", "trace"]), LevelFilter::Warn), "trace");
        assert_eq!(filter_directive(owned(&[]), LevelFilter::Warn), "warn");
    }
}
