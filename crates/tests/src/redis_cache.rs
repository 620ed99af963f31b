/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::support::*;
use dispatch_service::{
    common::types::*,
    domain::action::internal::fleet::fetch_fleet_snapshot,
    redis::{
        commands::*,
        keys::health_check_key,
        types::{RedisConnectionPool, RedisSettings},
    },
};
use std::time::Duration;

/// Pool against the local Redis from the default settings, `None` when no server answers.
async fn local_redis() -> Option<RedisConnectionPool> {
    let settings = RedisSettings {
        reconnect_max_attempts: 1,
        reconnect_delay: 100,
        ..RedisSettings::default()
    };
    match tokio::time::timeout(Duration::from_secs(2), RedisConnectionPool::new(&settings)).await {
        Ok(Ok(pool)) => Some(pool),
        _ => None,
    }
}

#[tokio::test]
async fn test_redis_health_check_writes_then_reads_its_key() {
    let Some(redis) = local_redis().await else {
        return;
    };

    check_redis_health(&redis).await.expect("healthy redis");
    assert_eq!(
        redis.get_key(&health_check_key()).await.expect("get"),
        Some("dispatch-service-health-check".to_string())
    );
}

#[tokio::test]
async fn test_cached_fleet_snapshot_is_served_without_the_backend() {
    let Some(redis) = local_redis().await else {
        return;
    };

    let fleet = fleet_with_997(StatusColor::Busy);
    cache_fleet_snapshot(&redis, &fleet, 20)
        .await
        .expect("cache write");

    let backend = InMemoryBackend::failing(fleet_with_997(StatusColor::Available));
    let snapshot = fetch_fleet_snapshot(&backend, Some(&redis), 20)
        .await
        .expect("cached snapshot");

    assert_eq!(snapshot, fleet);
}
