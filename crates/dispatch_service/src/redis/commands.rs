/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::types::*;
use crate::redis::{keys::*, types::RedisConnectionPool};
use crate::tools::error::AppError;

pub async fn get_cached_fleet_snapshot(
    redis: &RedisConnectionPool,
) -> Result<Option<FleetSnapshot>, AppError> {
    match redis.get_key(&fleet_snapshot_key()).await? {
        Some(cached) => serde_json::from_str::<FleetSnapshot>(&cached)
            .map(Some)
            .map_err(|err| AppError::DeserializationError(err.to_string())),
        None => Ok(None),
    }
}

pub async fn cache_fleet_snapshot(
    redis: &RedisConnectionPool,
    snapshot: &FleetSnapshot,
    ttl: u32,
) -> Result<(), AppError> {
    let value = serde_json::to_string(snapshot)
        .map_err(|err| AppError::SerializationError(err.to_string()))?;
    redis
        .set_with_expiry(&fleet_snapshot_key(), value, ttl)
        .await
}

pub async fn check_redis_health(redis: &RedisConnectionPool) -> Result<(), AppError> {
    redis
        .set_key(
            &health_check_key(),
            "dispatch-service-health-check".to_string(),
        )
        .await?;

    match redis.get_key(&health_check_key()).await? {
        Some(_) => Ok(()),
        None => Err(AppError::InternalError(
            "Health check failed as cannot get key from redis".to_string(),
        )),
    }
}
