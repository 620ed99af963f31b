/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use serde::{Deserialize, Serialize};
use tracing::subscriber::set_global_default;
pub use tracing::{debug, error, info, instrument, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, EnvFilter, Registry};

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub enum LogLevel {
    TRACE,
    DEBUG,
    INFO,
    WARN,
    ERROR,
    OFF,
}

impl From<LogLevel> for LevelFilter {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::TRACE => LevelFilter::TRACE,
            LogLevel::DEBUG => LevelFilter::DEBUG,
            LogLevel::INFO => LevelFilter::INFO,
            LogLevel::WARN => LevelFilter::WARN,
            LogLevel::ERROR => LevelFilter::ERROR,
            LogLevel::OFF => LevelFilter::OFF,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub log_to_file: bool,
    pub log_directory: String,
}

/// Installs the global bunyan/JSON subscriber for the service.
///
/// The configured level is the floor; `RUST_LOG` directives, when present, narrow it further
/// per target (e.g. `RUST_LOG=dispatch_service::common=debug,fred=warn`).
/// When `log_to_file` is set, a daily rolling file under `log_directory` receives the same
/// records as stdout.
///
/// Keep the returned `WorkerGuard` alive for the lifetime of the process, dropping it flushes
/// and stops the non-blocking writer.
pub fn setup_tracing(logger_cfg: LoggerConfig) -> WorkerGuard {
    LogTracer::init().expect("Failed to setup logger");

    let app_name = concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION")).to_string();

    let (non_blocking_console_writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    let bunyan_console_formatting_layer =
        BunyanFormattingLayer::new(app_name.to_owned(), non_blocking_console_writer);

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(logger_cfg.level).into())
        .from_env_lossy();

    let subscriber = Registry::default()
        .with(LevelFilter::from(logger_cfg.level))
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(bunyan_console_formatting_layer);

    if logger_cfg.log_to_file {
        let file_writer = tracing_appender::rolling::daily(
            logger_cfg.log_directory.as_str(),
            format!("{app_name}.log"),
        );
        let bunyan_file_formatting_layer =
            BunyanFormattingLayer::new(app_name.to_owned(), file_writer);

        set_global_default(subscriber.with(bunyan_file_formatting_layer))
            .expect("Unable to set global tracing subscriber");
    } else {
        set_global_default(subscriber).expect("Unable to set global tracing subscriber");
    }

    guard
}
