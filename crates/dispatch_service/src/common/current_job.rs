/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use super::{
    assignment_classifier::resolve_assignment, constraint_resolver::ConstraintResolver,
    dispatch_window::TimeWindow, license_roster::LicenseRoster, types::*,
};
use crate::outbound::{types::BookingSearchQuery, DispatchBackend};
use crate::tools::prometheus::CURRENT_JOB_OUTCOMES;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{info, warn};

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct CurrentJobConfig {
    pub narrow_lookback_minutes: i64,
    pub narrow_lookahead_minutes: i64,
    pub broad_window_hours: i64,
    pub search_timeout_ms: u64,
}

impl Default for CurrentJobConfig {
    fn default() -> Self {
        CurrentJobConfig {
            narrow_lookback_minutes: 180,
            narrow_lookahead_minutes: 60,
            broad_window_hours: 12,
            search_timeout_ms: 4000,
        }
    }
}

/// Finds the one booking a vehicle is working on.
///
/// Levels run strictly one after another so a request costs at most two booking searches:
///
/// 1. live bookings in a narrow window that resolve to the vehicle;
/// 2. a busy vehicle with no such booking is reported as a street (meter) job;
/// 3. bookings of any type over a full day that resolve to the vehicle;
/// 4. otherwise no job.
///
/// A search that fails or times out only means "no evidence at this level".
pub struct CurrentJobLocator<'a> {
    backend: &'a dyn DispatchBackend,
    cfg: CurrentJobConfig,
}

impl<'a> CurrentJobLocator<'a> {
    pub fn new(backend: &'a dyn DispatchBackend, cfg: CurrentJobConfig) -> CurrentJobLocator<'a> {
        CurrentJobLocator { backend, cfg }
    }

    pub async fn find_current_job(
        &self,
        vehicle: &Callsign,
        fleet: &FleetSnapshot,
        roster: &LicenseRoster,
        now: DateTime<Utc>,
    ) -> CurrentJob {
        let resolver = ConstraintResolver::new(fleet, roster);

        let narrow = BookingSearchQuery {
            window: TimeWindow::around(
                now,
                Duration::minutes(self.cfg.narrow_lookback_minutes),
                Duration::minutes(self.cfg.narrow_lookahead_minutes),
            ),
            booking_types: BookingType::live(),
        };
        if let Some(job) = self
            .search_level("exact_assignment", &narrow, vehicle, &resolver, now)
            .await
        {
            return found("exact_assignment", vehicle, CurrentJob::Booked(job));
        }

        if let Some(fleet_vehicle) = fleet
            .vehicle_by_callsign(vehicle)
            .filter(|fleet_vehicle| fleet_vehicle.status_color == StatusColor::Busy)
        {
            return found(
                "street_job",
                vehicle,
                CurrentJob::StreetJob {
                    vehicle: vehicle.to_owned(),
                    driver_name: fleet_vehicle.driver_name.to_owned(),
                },
            );
        }

        let broad = BookingSearchQuery {
            window: TimeWindow::around(
                now,
                Duration::hours(self.cfg.broad_window_hours),
                Duration::hours(self.cfg.broad_window_hours),
            ),
            booking_types: Vec::new(),
        };
        if let Some(job) = self
            .search_level("broadened_search", &broad, vehicle, &resolver, now)
            .await
        {
            return found("broadened_search", vehicle, CurrentJob::Booked(job));
        }

        found(
            "no_job",
            vehicle,
            CurrentJob::NoJob {
                vehicle: vehicle.to_owned(),
            },
        )
    }

    async fn search_level(
        &self,
        level: &str,
        query: &BookingSearchQuery,
        vehicle: &Callsign,
        resolver: &ConstraintResolver<'_>,
        now: DateTime<Utc>,
    ) -> Option<JobDetails> {
        let search_timeout = std::time::Duration::from_millis(self.cfg.search_timeout_ms);
        let bookings = match timeout(search_timeout, self.backend.search_bookings(query)).await {
            Ok(Ok(bookings)) => bookings,
            Ok(Err(err)) => {
                warn!(tag = "[Current Job - Search Failed]", level = level, vehicle = %vehicle, error = %err.message());
                return None;
            }
            Err(_) => {
                warn!(tag = "[Current Job - Search Timed Out]", level = level, vehicle = %vehicle, timeout_ms = self.cfg.search_timeout_ms);
                return None;
            }
        };

        pick_current_job(bookings, query, vehicle, resolver, now)
    }
}

/// Picks the best candidate among bookings that resolve to `vehicle`: lowest status rank
/// (Active, Dispatched, Advanced, Mobile, then the rest), then pickup closest to `now`.
///
/// Proximity is measured in both directions. A pickup ten minutes ago is most likely the
/// trip in progress, so it beats one due in two hours even though the latter is upcoming.
pub fn pick_current_job(
    bookings: Vec<Booking>,
    query: &BookingSearchQuery,
    vehicle: &Callsign,
    resolver: &ConstraintResolver,
    now: DateTime<Utc>,
) -> Option<JobDetails> {
    bookings
        .into_iter()
        .filter(|booking| query.matches(booking))
        .filter_map(|booking| {
            let assignment = resolve_assignment(&booking, resolver);
            if assignment.matches_callsign(vehicle) {
                Some((booking, assignment.method))
            } else {
                None
            }
        })
        .min_by_key(|(booking, _)| {
            let TimeStamp(pickup_due_time) = booking.pickup_due_time;
            (
                booking.booking_type.status_rank(),
                (pickup_due_time - now).num_seconds().abs(),
                booking.id,
            )
        })
        .map(|(booking, matched_by)| JobDetails {
            booking_id: booking.id,
            customer_name: booking.customer_name,
            pickup_address: booking.pickup_address,
            destination_address: booking.destination_address,
            price: booking.pricing.display_price(),
            status: booking.booking_type,
            pickup_time: booking.pickup_due_time,
            matched_by,
        })
}

fn found(outcome: &str, vehicle: &Callsign, job: CurrentJob) -> CurrentJob {
    info!(tag = "[Current Job]", vehicle = %vehicle, outcome = outcome);
    CURRENT_JOB_OUTCOMES.with_label_values(&[outcome]).inc();
    job
}
