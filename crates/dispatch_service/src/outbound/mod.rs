/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
pub mod external;
pub mod types;

use self::types::BookingSearchQuery;
use crate::common::types::*;
use crate::tools::error::AppError;
use async_trait::async_trait;

/// Read-only view of the upstream dispatch system.
#[async_trait]
pub trait DispatchBackend: Send + Sync {
    /// Bookings whose pickup falls inside the query window, filtered by type when any are given.
    async fn search_bookings(&self, query: &BookingSearchQuery) -> Result<Vec<Booking>, AppError>;

    async fn fleet_snapshot(&self) -> Result<FleetSnapshot, AppError>;
}
