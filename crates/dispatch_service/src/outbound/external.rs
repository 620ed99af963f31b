/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::{types::*, DispatchBackend};
use crate::common::types::*;
use crate::environment::DispatchApiConfig;
use crate::tools::{
    callapi::{call_api, call_api_with_retries},
    error::AppError,
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method};
use url::Url;
use std::time::Duration;

/// HTTP client for the dispatch backend's booking search and fleet snapshot endpoints.
pub struct DispatchApiClient {
    client: Client,
    booking_search_url: Url,
    fleet_snapshot_url: Url,
    api_key: String,
    booking_search_timeout: Duration,
    fleet_snapshot_timeout: Duration,
    fleet_snapshot_retries: u32,
}

impl DispatchApiClient {
    pub fn new(cfg: &DispatchApiConfig) -> Result<Self, AppError> {
        // Endpoint paths are joined relative to the base, which needs a trailing slash for that.
        let base = if cfg.base_url.ends_with('/') {
            cfg.base_url.to_owned()
        } else {
            format!("{}/", cfg.base_url)
        };
        let base_url = Url::parse(&base).map_err(|err| {
            AppError::InvalidConfiguration(format!("base_url {} : {err}", cfg.base_url))
        })?;
        let endpoint = |path: &str| {
            base_url
                .join(path)
                .map_err(|err| AppError::InvalidConfiguration(format!("{path} : {err}")))
        };

        let client = Client::builder()
            .build()
            .map_err(|err| AppError::InvalidConfiguration(err.to_string()))?;

        Ok(DispatchApiClient {
            client,
            booking_search_url: endpoint("bookings/search")?,
            fleet_snapshot_url: endpoint("vehicles/snapshot")?,
            api_key: cfg.api_key.to_owned(),
            booking_search_timeout: Duration::from_millis(cfg.booking_search_timeout_ms),
            fleet_snapshot_timeout: Duration::from_millis(cfg.fleet_snapshot_timeout_ms),
            fleet_snapshot_retries: cfg.fleet_snapshot_retries,
        })
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("content-type", "application/json"),
            ("api-key", self.api_key.as_str()),
        ]
    }
}

#[async_trait]
impl DispatchBackend for DispatchApiClient {
    async fn search_bookings(&self, query: &BookingSearchQuery) -> Result<Vec<Booking>, AppError> {
        // Searches are heavy upstream, a failed one is reported rather than repeated.
        let response = call_api::<BookingSearchResponse, BookingSearchRequest>(
            &self.client,
            Method::POST,
            &self.booking_search_url,
            self.headers(),
            Some(query.to_request()),
            self.booking_search_timeout,
        )
        .await?;

        Ok(bookings_from_wire(response.bookings.unwrap_or_default()))
    }

    async fn fleet_snapshot(&self) -> Result<FleetSnapshot, AppError> {
        let response = call_api_with_retries::<FleetSnapshotResponse, String>(
            &self.client,
            Method::GET,
            &self.fleet_snapshot_url,
            self.headers(),
            None,
            self.fleet_snapshot_timeout,
            self.fleet_snapshot_retries,
        )
        .await?;

        Ok(fleet_from_wire(
            response.vehicles.unwrap_or_default(),
            Utc::now(),
        ))
    }
}
