/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use prometheus::{
    opts, register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};

pub static INCOMING_API: once_cell::sync::Lazy<HistogramVec> = once_cell::sync::Lazy::new(|| {
    register_histogram_vec!(
        opts!("http_request_duration_seconds", "Incoming API requests").into(),
        &["method", "handler", "status_code", "code", "version"]
    )
    .expect("Failed to register incoming API metrics")
});

pub static CALL_EXTERNAL_API: once_cell::sync::Lazy<HistogramVec> =
    once_cell::sync::Lazy::new(|| {
        register_histogram_vec!(
            opts!("external_request_duration", "Dispatch backend API requests").into(),
            &["method", "host", "service", "status", "version"]
        )
        .expect("Failed to register external API metrics")
    });

pub static CONSTRAINT_RESOLUTIONS: once_cell::sync::Lazy<IntCounterVec> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter_vec!(
            opts!("constraint_resolutions", "Constraint resolutions by kind and method"),
            &["kind", "method"]
        )
        .expect("Failed to register constraint resolution metrics")
    });

pub static FLEET_DATA_ANOMALIES: once_cell::sync::Lazy<IntCounterVec> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter_vec!(
            opts!("fleet_data_anomalies", "Duplicate ids and skipped records in reference data"),
            &["source", "anomaly"]
        )
        .expect("Failed to register fleet data anomaly metrics")
    });

pub static CURRENT_JOB_OUTCOMES: once_cell::sync::Lazy<IntCounterVec> =
    once_cell::sync::Lazy::new(|| {
        register_int_counter_vec!(
            opts!("current_job_outcomes", "Current job lookups by deciding level"),
            &["outcome"]
        )
        .expect("Failed to register current job metrics")
    });

/// Observes the duration of an incoming API request.
///
/// * `$method` - HTTP method of the request.
/// * `$endpoint` - Route of the request with path params replaced by their names.
/// * `$status` - HTTP status code of the response.
/// * `$code` - `SUCCESS` or the `AppError` code.
/// * `$start` - `Instant` at which the request was received.
#[macro_export]
macro_rules! incoming_api {
    ($method:expr, $endpoint:expr, $status:expr, $code:expr, $start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        let version = std::env::var("DEPLOYMENT_VERSION").unwrap_or("DEV".to_string());
        INCOMING_API
            .with_label_values(&[$method, $endpoint, $status, $code, version.as_str()])
            .observe(duration);
    };
}

/// Observes the duration of a call made to the dispatch backend.
#[macro_export]
macro_rules! call_external_api {
    ($method:expr, $host:expr, $path:expr, $status:expr, $start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        let version = std::env::var("DEPLOYMENT_VERSION").unwrap_or("DEV".to_string());
        CALL_EXTERNAL_API
            .with_label_values(&[$method, $host, $path, $status, version.as_str()])
            .observe(duration);
    };
}

/// Builds the `/metrics` endpoint middleware and registers the service's own collectors with it.
///
/// # Panics
///
/// * If the metrics registry cannot be built or a collector is registered twice.
pub fn prometheus_metrics() -> PrometheusMetrics {
    let prometheus = PrometheusMetricsBuilder::new("dispatch_service")
        .endpoint("/metrics")
        .build()
        .expect("Failed to create Prometheus Metrics");

    prometheus
        .registry
        .register(Box::new(INCOMING_API.to_owned()))
        .expect("Failed to register incoming API metrics");

    prometheus
        .registry
        .register(Box::new(CALL_EXTERNAL_API.to_owned()))
        .expect("Failed to register external API metrics");

    prometheus
        .registry
        .register(Box::new(CONSTRAINT_RESOLUTIONS.to_owned()))
        .expect("Failed to register constraint resolution metrics");

    prometheus
        .registry
        .register(Box::new(FLEET_DATA_ANOMALIES.to_owned()))
        .expect("Failed to register fleet data anomaly metrics");

    prometheus
        .registry
        .register(Box::new(CURRENT_JOB_OUTCOMES.to_owned()))
        .expect("Failed to register current job metrics");

    prometheus
        .registry
        .register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))
        .expect("Failed to register process metrics");

    prometheus
}
