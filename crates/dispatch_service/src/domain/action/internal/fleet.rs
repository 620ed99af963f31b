/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::types::*;
use crate::environment::AppState;
use crate::outbound::DispatchBackend;
use crate::redis::{commands::*, types::RedisConnectionPool};
use crate::tools::error::AppError;
use tracing::{error, warn};

pub async fn fleet_snapshot(data: &AppState) -> Result<FleetSnapshot, AppError> {
    let cache = Some(data.redis.as_ref()).filter(|_| data.fleet_snapshot_cache_ttl > 0);
    fetch_fleet_snapshot(data.backend.as_ref(), cache, data.fleet_snapshot_cache_ttl).await
}

/// Fleet snapshot from the short lived cache, else from the backend.
///
/// Cache problems are logged and otherwise ignored. A backend failure is fatal for the
/// request since nothing can be resolved without live fleet state.
pub async fn fetch_fleet_snapshot(
    backend: &dyn DispatchBackend,
    cache: Option<&RedisConnectionPool>,
    cache_ttl: u32,
) -> Result<FleetSnapshot, AppError> {
    if let Some(redis) = cache {
        match get_cached_fleet_snapshot(redis).await {
            Ok(Some(snapshot)) => return Ok(snapshot),
            Ok(None) => (),
            Err(err) => {
                warn!(tag = "[Fleet Snapshot Cache - Read Failed]", error = %err.message())
            }
        }
    }

    let snapshot = backend
        .fleet_snapshot()
        .await
        .map_err(|err| upstream_unavailable("fleet_snapshot", err))?;

    if let Some(redis) = cache {
        if let Err(err) = cache_fleet_snapshot(redis, &snapshot, cache_ttl).await {
            warn!(tag = "[Fleet Snapshot Cache - Write Failed]", error = %err.message());
        }
    }

    Ok(snapshot)
}

pub fn upstream_unavailable(source: &str, err: AppError) -> AppError {
    error!(tag = "[Upstream Unavailable]", source = source, error_code = %err.code(), error = %err.message());
    AppError::UpstreamUnavailable(format!("{source} : {}", err.message()))
}
