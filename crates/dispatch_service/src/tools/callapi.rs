/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::call_external_api;
use crate::tools::error::AppError;
use crate::tools::prometheus::CALL_EXTERNAL_API;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, info, warn};

/// Sends a JSON request to the dispatch backend and deserializes the response body.
///
/// Every call is bounded by `timeout`; an elapsed timeout surfaces as
/// `AppError::ExternalAPICallError` like any other transport failure.
///
/// # Arguments
///
/// * `client` - Shared `reqwest` client (connection pooling lives here).
/// * `method` - HTTP method for the request.
/// * `url` - Target URL.
/// * `headers` - Header key-value pairs.
/// * `body` - Optional body, serialized to JSON.
/// * `timeout` - Upper bound for the whole request, including reading the body.
pub async fn call_api<T, U>(
    client: &Client,
    method: Method,
    url: &Url,
    headers: Vec<(&str, &str)>,
    body: Option<U>,
    timeout: Duration,
) -> Result<T, AppError>
where
    T: DeserializeOwned,
    U: Serialize + Debug,
{
    let start_time = std::time::Instant::now();

    let mut header_map = HeaderMap::new();

    for (header_key, header_value) in headers {
        let header_name = HeaderName::from_str(header_key)
            .map_err(|_| AppError::InvalidRequest(format!("Invalid Header Name : {header_key}")))?;
        let header_value = HeaderValue::from_str(header_value).map_err(|_| {
            AppError::InvalidRequest(format!("Invalid Header Value : {header_value}"))
        })?;

        header_map.insert(header_name, header_value);
    }

    let mut request = client
        .request(method.to_owned(), url.to_owned())
        .headers(header_map)
        .timeout(timeout);

    if let Some(body) = &body {
        let body = serde_json::to_string(body)
            .map_err(|err| AppError::SerializationError(err.to_string()))?;
        request = request.body(body);
    }

    let resp = request.send().await;

    let url_str = format!(
        "{}://{}:{}",
        url.scheme(),
        url.host_str().unwrap_or(""),
        url.port_or_known_default().unwrap_or(80)
    );

    let status = match resp.as_ref() {
        Ok(resp) => resp.status().as_str().to_string(),
        Err(err) if err.is_timeout() => "TIMEOUT".to_string(),
        Err(err) => err
            .status()
            .map(|status| status.to_string())
            .unwrap_or("UNKNOWN".to_string()),
    };

    call_external_api!(
        method.as_str(),
        url_str.as_str(),
        url.path(),
        status.as_str(),
        start_time
    );

    match resp {
        Ok(resp) => {
            if resp.status().is_success() {
                info!(tag = "[OUTGOING API]", request_method = %method, request_url = %url_str, request_path = url.path(), response_status = status.as_str(), latency = format!("{:?}ms", start_time.elapsed().as_millis()));
                resp.json::<T>()
                    .await
                    .map_err(|err| AppError::DeserializationError(err.to_string()))
            } else {
                error!(tag = "[OUTGOING API - ERROR]", request_method = %method, request_body = format!("{:?}", body), request_url = %url_str, request_path = url.path(), error = format!("{:?}", resp), latency = format!("{:?}ms", start_time.elapsed().as_millis()));
                Err(AppError::ExternalAPICallError(resp.status().to_string()))
            }
        }
        Err(err) => {
            error!(tag = "[OUTGOING API - ERROR]", request_method = %method, request_body = format!("{:?}", body), request_url = %url_str, request_path = url.path(), error = format!("{:?}", err), latency = format!("{:?}ms", start_time.elapsed().as_millis()));
            Err(AppError::ExternalAPICallError(err.to_string()))
        }
    }
}

/// Same as [`call_api`] but re-issues the request up to `retries` more times on failure.
///
/// Only meant for lightweight idempotent lookups; bulk searches go through [`call_api`] directly.
pub async fn call_api_with_retries<T, U>(
    client: &Client,
    method: Method,
    url: &Url,
    headers: Vec<(&str, &str)>,
    body: Option<U>,
    timeout: Duration,
    retries: u32,
) -> Result<T, AppError>
where
    T: DeserializeOwned,
    U: Serialize + Debug + Clone,
{
    let mut attempt = 0;
    loop {
        match call_api::<T, U>(
            client,
            method.to_owned(),
            url,
            headers.to_owned(),
            body.to_owned(),
            timeout,
        )
        .await
        {
            Ok(resp) => return Ok(resp),
            Err(err) if attempt < retries => {
                attempt += 1;
                warn!(tag = "[OUTGOING API - RETRY]", request_path = url.path(), attempt = attempt, error = %err.message());
            }
            Err(err) => return Err(err),
        }
    }
}
