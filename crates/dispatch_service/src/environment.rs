/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use std::sync::Arc;

use crate::{
    common::{
        current_job::CurrentJobConfig,
        dispatch_window::{BoardWindowConfig, DispatchWindow},
        license_roster::LicenseRoster,
    },
    outbound::{external::DispatchApiClient, DispatchBackend},
    redis::types::{RedisConnectionPool, RedisSettings},
    tools::{error::AppError, logger::*},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub workers: usize,
    pub logger_cfg: LoggerConfig,
    pub redis_cfg: RedisSettings,
    pub dispatch_api_cfg: DispatchApiConfig,
    pub board_window_cfg: BoardWindowConfig,
    pub current_job_cfg: CurrentJobConfig,
    pub license_roster_path: String,
    pub fleet_snapshot_cache_ttl: u32,
    pub request_timeout: u64,
    pub max_allowed_req_size: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DispatchApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub booking_search_timeout_ms: u64,
    pub fleet_snapshot_timeout_ms: u64,
    pub fleet_snapshot_retries: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn DispatchBackend>,
    pub redis: Arc<RedisConnectionPool>,
    pub roster: Arc<LicenseRoster>,
    pub dispatch_window: DispatchWindow,
    pub current_job_cfg: CurrentJobConfig,
    pub fleet_snapshot_cache_ttl: u32,
    pub request_timeout: u64,
    pub max_allowed_req_size: usize,
}

impl AppState {
    pub async fn new(app_config: AppConfig) -> Result<AppState, AppError> {
        let backend = Arc::new(DispatchApiClient::new(&app_config.dispatch_api_cfg)?);

        let redis = Arc::new(RedisConnectionPool::new(&app_config.redis_cfg).await?);

        // The board keeps working without the roster, only offline units stop resolving.
        let roster = LicenseRoster::from_path(&app_config.license_roster_path).unwrap_or_else(|err| {
            error!(tag = "[License Roster]", path = %app_config.license_roster_path, error = %err.message());
            LicenseRoster::empty()
        });

        Ok(AppState {
            backend,
            redis,
            roster: Arc::new(roster),
            dispatch_window: DispatchWindow::from(app_config.board_window_cfg),
            current_job_cfg: app_config.current_job_cfg,
            fleet_snapshot_cache_ttl: app_config.fleet_snapshot_cache_ttl,
            request_timeout: app_config.request_timeout,
            max_allowed_req_size: app_config.max_allowed_req_size,
        })
    }
}
