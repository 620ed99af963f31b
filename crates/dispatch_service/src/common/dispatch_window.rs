/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use super::types::*;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct BoardWindowConfig {
    pub lookback_minutes: i64,
    pub lookahead_minutes: i64,
}

impl Default for BoardWindowConfig {
    fn default() -> Self {
        BoardWindowConfig {
            lookback_minutes: 30,
            lookahead_minutes: 120,
        }
    }
}

/// Inclusive time range around `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    pub fn around(now: DateTime<Utc>, lookback: Duration, lookahead: Duration) -> TimeWindow {
        TimeWindow {
            from: now - lookback,
            to: now + lookahead,
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant <= self.to
    }
}

/// Decides which bookings belong on the live dispatch board.
///
/// Anything due further back than the lookback is assumed handled, anything beyond the
/// lookahead is an advance reservation that is not actionable yet.
#[derive(Debug, Clone, Copy)]
pub struct DispatchWindow {
    lookback: Duration,
    lookahead: Duration,
}

impl Default for DispatchWindow {
    fn default() -> Self {
        DispatchWindow::from(BoardWindowConfig::default())
    }
}

impl From<BoardWindowConfig> for DispatchWindow {
    fn from(cfg: BoardWindowConfig) -> Self {
        DispatchWindow {
            lookback: Duration::minutes(cfg.lookback_minutes),
            lookahead: Duration::minutes(cfg.lookahead_minutes),
        }
    }
}

impl DispatchWindow {
    pub fn window(&self, now: DateTime<Utc>) -> TimeWindow {
        TimeWindow::around(now, self.lookback, self.lookahead)
    }

    pub fn is_on_dispatch_board(&self, pickup_due_time: &TimeStamp, now: DateTime<Utc>) -> bool {
        let TimeStamp(pickup_due_time) = pickup_due_time;
        self.window(now).contains(*pickup_due_time)
    }

    /// Keeps the bookings that belong on the board. A targeted search skips the window
    /// altogether, the only booking that proves an assignment may lie outside it.
    pub fn select(
        &self,
        bookings: Vec<Booking>,
        now: DateTime<Utc>,
        targeted_search: bool,
    ) -> Vec<Booking> {
        if targeted_search {
            return bookings;
        }
        bookings
            .into_iter()
            .filter(|booking| self.is_on_dispatch_board(&booking.pickup_due_time, now))
            .collect()
    }
}

/// Board membership with the default 30 minute lookback and 120 minute lookahead.
pub fn is_on_dispatch_board(pickup_due_time: &TimeStamp, now: DateTime<Utc>) -> bool {
    DispatchWindow::default().is_on_dispatch_board(pickup_due_time, now)
}
