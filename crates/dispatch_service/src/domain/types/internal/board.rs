/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{dispatch_window::TimeWindow, types::*};

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DispatchBoardRequest {
    /// Callsign or booking id. A search skips the board window.
    pub search: Option<String>,
    /// Also include completed and cancelled bookings.
    pub include_historic: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct BoardWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl From<TimeWindow> for BoardWindow {
    fn from(TimeWindow { from, to }: TimeWindow) -> Self {
        BoardWindow { from, to }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchBoardResponse {
    pub assigned: Vec<ClassifiedBooking>,
    pub unassigned: Vec<ClassifiedBooking>,
    /// `None` for a targeted search.
    pub window: Option<BoardWindow>,
    pub generated_at: TimeStamp,
}
