// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

const DEFAULT_LOGGING_CONFIG: &str = "info";
const VERBOSE_LOGGING_CONFIG: &str = "debug";

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogFormat {
    /// Human-readable multi-line output
    #[default]
    Pretty,
    /// One JSON object per line, suitable for log collectors
    Json,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Keeps logging sinks alive. Dropping it flushes buffered records.
#[must_use]
#[derive(Default)]
pub struct Guard {
    appender: Option<WorkerGuard>,
}

impl Guard {
    pub fn has_appender(&self) -> bool {
        self.appender.is_some()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Picks the filter directive for a verbosity level, unless `RUST_LOG` is set
pub fn env_filter(verbosity_level: u8) -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match verbosity_level {
            0 => EnvFilter::new(DEFAULT_LOGGING_CONFIG),
            _ => EnvFilter::new(VERBOSE_LOGGING_CONFIG),
        },
    }
}

/// Configures the global `tracing` subscriber writing to STDERR.
///
/// Standard `log` records are redirected into `tracing` as well.
pub fn init(app_name: &str, format: LogFormat, verbosity_level: u8) -> Guard {
    // Logging may be already initialized when running under tests
    if tracing::dispatcher::has_been_set() {
        return Guard::default();
    }

    let env_filter = env_filter(verbosity_level);

    match format {
        LogFormat::Pretty => {
            let res = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_span_events(if verbosity_level > 1 {
                    FmtSpan::NEW | FmtSpan::CLOSE
                } else {
                    FmtSpan::NONE
                })
                .with_writer(std::io::stderr)
                .pretty()
                .finish()
                .try_init();

            if let Err(err) = res {
                eprintln!("{app_name}: failed to initialize logging: {err}");
            }

            Guard::default()
        }
        LogFormat::Json => {
            let (appender, appender_guard) = tracing_appender::non_blocking(std::io::stderr());

            let res = tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_writer(appender),
                )
                .try_init();

            if let Err(err) = res {
                eprintln!("{app_name}: failed to initialize logging: {err}");
            }

            Guard {
                appender: Some(appender_guard),
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
