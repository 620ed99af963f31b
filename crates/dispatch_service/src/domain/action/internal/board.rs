/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use super::fleet::{fleet_snapshot, upstream_unavailable};
use crate::common::{
    assignment_classifier::classify,
    constraint_resolver::ConstraintResolver,
    dispatch_window::{DispatchWindow, TimeWindow},
    license_roster::LicenseRoster,
    types::*,
};
use crate::domain::types::internal::board::*;
use crate::environment::AppState;
use crate::outbound::{types::BookingSearchQuery, DispatchBackend};
use crate::tools::error::AppError;
use actix_web::web::Data;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

pub async fn dispatch_board(
    data: Data<AppState>,
    request_body: DispatchBoardRequest,
) -> Result<DispatchBoardResponse, AppError> {
    let fleet = fleet_snapshot(&data).await?;

    build_dispatch_board(
        data.backend.as_ref(),
        &fleet,
        &data.roster,
        &data.dispatch_window,
        Duration::hours(data.current_job_cfg.broad_window_hours),
        request_body,
        Utc::now(),
    )
    .await
}

/// Classified board for the operator console.
///
/// Without a search term the board shows live bookings inside the dispatch window. A search
/// asks the backend for a full `search_span` either side of `now`, skips the board window
/// and keeps the bookings whose id or resolved callsign equals the term.
pub async fn build_dispatch_board(
    backend: &dyn DispatchBackend,
    fleet: &FleetSnapshot,
    roster: &LicenseRoster,
    dispatch_window: &DispatchWindow,
    search_span: Duration,
    request_body: DispatchBoardRequest,
    now: DateTime<Utc>,
) -> Result<DispatchBoardResponse, AppError> {
    let search = request_body
        .search
        .as_deref()
        .and_then(Callsign::parse);

    let query = BookingSearchQuery {
        window: match search {
            Some(_) => TimeWindow::around(now, search_span, search_span),
            None => dispatch_window.window(now),
        },
        booking_types: if request_body.include_historic.unwrap_or(false) {
            Vec::new()
        } else {
            BookingType::live()
        },
    };

    let bookings = backend
        .search_bookings(&query)
        .await
        .map_err(|err| upstream_unavailable("booking_search", err))?;
    let bookings = dispatch_window.select(bookings, now, search.is_some());

    let resolver = ConstraintResolver::new(fleet, roster);
    let ClassifiedBookings {
        assigned,
        unassigned,
    } = classify(&bookings, &resolver);

    let (assigned, unassigned) = match &search {
        Some(term) => (
            matching_search(assigned, term),
            matching_search(unassigned, term),
        ),
        None => (assigned, unassigned),
    };

    info!(tag = "[Dispatch Board]", search = ?search, assigned = assigned.len(), unassigned = unassigned.len());

    Ok(DispatchBoardResponse {
        assigned,
        unassigned,
        window: search.is_none().then(|| BoardWindow::from(query.window)),
        generated_at: TimeStamp(now),
    })
}

fn matching_search(bookings: Vec<ClassifiedBooking>, term: &Callsign) -> Vec<ClassifiedBooking> {
    let Callsign(raw) = term;
    bookings
        .into_iter()
        .filter(|entry| {
            let BookingId(booking_id) = entry.booking.id;
            booking_id.to_string() == *raw || entry.assignment.matches_callsign(term)
        })
        .collect()
}
