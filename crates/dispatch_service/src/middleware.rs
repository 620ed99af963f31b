/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use std::time::Duration;

use crate::incoming_api;
use crate::tools::prometheus::INCOMING_API;
use actix::fut::{ready, Ready};
use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::JsonPayloadError,
    http::StatusCode,
    Error, HttpRequest,
};
use futures::future::LocalBoxFuture;
use tokio::time::{timeout, Instant};
use tracing::Span;
use tracing::{error, info};
use tracing_actix_web::{DefaultRootSpanBuilder, RootSpanBuilder};
use uuid::Uuid;

use crate::tools::error::AppError;

/// Answers `REQUEST_TIMEOUT` for any request still running after the configured duration.
pub struct RequestTimeout(pub Duration);

impl<S: 'static> Transform<S, ServiceRequest> for RequestTimeout
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTimeoutMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTimeoutMiddleware {
            service,
            limit: self.0,
        }))
    }
}

pub struct RequestTimeoutMiddleware<S> {
    service: S,
    limit: Duration,
}

impl<S> Service<ServiceRequest> for RequestTimeoutMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let limit = self.limit;
        let fut = self.service.call(req);
        Box::pin(async move {
            timeout(limit, fut)
                .await
                .unwrap_or_else(|_| Err(AppError::RequestTimeout.into()))
        })
    }
}

/// Root span per request, tagged with the caller's `x-request-id` (or a fresh one) and the
/// operator console that issued it when the `x-operator-id` header is present.
pub struct DomainRootSpanBuilder;

impl RootSpanBuilder for DomainRootSpanBuilder {
    fn on_request_start(request: &ServiceRequest) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|request_id| request_id.to_str().ok())
            .map(|str| str.to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let operator_id = request
            .headers()
            .get("x-operator-id")
            .and_then(|operator_id| operator_id.to_str().ok())
            .map(|str| str.to_string());

        tracing_actix_web::root_span!(request, request_id, operator_id)
    }

    fn on_request_end<B: MessageBody>(span: Span, outcome: &Result<ServiceResponse<B>, Error>) {
        DefaultRootSpanBuilder::on_request_end(span, outcome);
    }
}

/// Logs every incoming request and records it in the `http_request_duration` histogram.
pub struct IncomingRequestMetrics;

impl<S> Transform<S, ServiceRequest> for IncomingRequestMetrics
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = IncomingRequestMetricsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IncomingRequestMetricsMiddleware { service }))
    }
}

pub struct IncomingRequestMetricsMiddleware<S> {
    service: S,
}

impl<S> Service<ServiceRequest> for IncomingRequestMetricsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();

        let req_path = get_path(req.request());
        let req_method = get_method(req.request());

        let fut = self.service.call(req);
        Box::pin(async move {
            match fut.await {
                Ok(response) => {
                    calculate_metrics(
                        response.response().error(),
                        response.status(),
                        get_method(response.request()),
                        get_path(response.request()),
                        start_time,
                    );
                    Ok(response)
                }
                Err(err) => {
                    let err_resp_status = err.error_response().status();
                    calculate_metrics(
                        Some(&err),
                        err_resp_status,
                        req_method,
                        req_path,
                        start_time,
                    );
                    Err(err)
                }
            }
        })
    }
}

/// Request path with matched segments replaced by `:name`, so `/internal/vehicle/V12/currentJob`
/// is recorded as `/internal/vehicle/:callsign/currentJob`.
fn get_path(request: &HttpRequest) -> String {
    let mut path = request.path().to_string();
    request
        .match_info()
        .iter()
        .for_each(|(path_name, path_val)| {
            path = path.replace(path_val, format!(":{path_name}").as_str());
        });
    path
}

fn get_method(request: &HttpRequest) -> String {
    request.method().to_string()
}

fn calculate_metrics(
    err_resp: Option<&Error>,
    resp_status: StatusCode,
    req_method: String,
    req_path: String,
    time: Instant,
) {
    if let Some(err_resp) = err_resp {
        let err_resp_code = err_resp.to_string();
        error!(tag = "[INCOMING API - ERROR]", request_method = %req_method, request_path = %req_path, response_code = err_resp_code, response_status = resp_status.as_str(), latency = format!("{:?}ms", time.elapsed().as_millis()));
        incoming_api!(
            req_method.as_str(),
            req_path.as_str(),
            resp_status.as_str(),
            err_resp_code.as_str(),
            time
        );
    } else {
        info!(tag = "[INCOMING API]", request_method = %req_method, request_path = %req_path, response_status = resp_status.as_str(), latency = format!("{:?}ms", time.elapsed().as_millis()));
        incoming_api!(
            req_method.as_str(),
            req_path.as_str(),
            resp_status.as_str(),
            "SUCCESS",
            time
        );
    }
}

/// Maps JSON body extraction failures onto the service's error body. Bodies over the
/// configured limit become `LARGE_PAYLOAD_SIZE`, anything else `UNPROCESSIBLE_REQUEST`.
pub fn json_payload_error(err: JsonPayloadError, _req: &HttpRequest) -> Error {
    let app_error = match err {
        JsonPayloadError::OverflowKnownLength { length, limit } => {
            AppError::LargePayloadSize(length, limit)
        }
        JsonPayloadError::Overflow { limit } => AppError::LargePayloadSize(limit + 1, limit),
        err => AppError::UnprocessibleRequest(err.to_string()),
    };
    app_error.into()
}
