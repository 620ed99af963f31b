/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::tools::error::AppError;
use fred::{
    interfaces::{ClientLike, KeysInterface},
    types::{Expiration, ReconnectPolicy, RedisConfig},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RedisSettings {
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_pool_size: usize,
    pub redis_partition: usize,
    pub reconnect_max_attempts: u32,
    /// Reconnect delay in milliseconds
    pub reconnect_delay: u32,
    /// TTL in seconds
    pub default_ttl: u32,
}

impl Default for RedisSettings {
    fn default() -> Self {
        RedisSettings {
            redis_host: String::from("localhost"),
            redis_port: 6379,
            redis_pool_size: 10,
            redis_partition: 0,
            reconnect_max_attempts: 5,
            reconnect_delay: 1000,
            default_ttl: 3600,
        }
    }
}

pub struct RedisConnectionPool {
    pub pool: fred::prelude::RedisPool,
    default_ttl: u32,
}

impl RedisConnectionPool {
    /// Create a new Redis connection
    pub async fn new(conf: &RedisSettings) -> Result<Self, AppError> {
        let redis_connection_url = format!(
            "redis://{}:{}/{}", //URI Schema
            conf.redis_host, conf.redis_port, conf.redis_partition
        );
        let config = RedisConfig::from_url(&redis_connection_url)
            .map_err(|err| AppError::CacheFailed(err.to_string()))?;
        let reconnect_policy =
            ReconnectPolicy::new_constant(conf.reconnect_max_attempts, conf.reconnect_delay);

        let pool = fred::prelude::RedisPool::new(
            config,
            None,
            None,
            Some(reconnect_policy),
            conf.redis_pool_size,
        )
        .map_err(|err| AppError::CacheFailed(err.to_string()))?;

        let _ = pool.connect();
        pool.wait_for_connect()
            .await
            .map_err(|err| AppError::CacheFailed(err.to_string()))?;

        Ok(Self {
            pool,
            default_ttl: conf.default_ttl,
        })
    }

    #[instrument(level = "DEBUG", skip(self, value))]
    pub async fn set_key(&self, key: &str, value: String) -> Result<(), AppError> {
        self.set_with_expiry(key, value, self.default_ttl).await
    }

    // set key with expiry
    #[instrument(level = "DEBUG", skip(self, value))]
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: String,
        expiry: u32,
    ) -> Result<(), AppError> {
        self.pool
            .next()
            .set::<(), _, _>(key, value, Some(Expiration::EX(expiry.into())), None, false)
            .await
            .map_err(|err| AppError::CacheFailed(err.to_string()))
    }

    #[instrument(level = "DEBUG", skip(self))]
    pub async fn get_key(&self, key: &str) -> Result<Option<String>, AppError> {
        self.pool
            .next()
            .get::<Option<String>, _>(key)
            .await
            .map_err(|err| AppError::CacheFailed(err.to_string()))
    }
}
