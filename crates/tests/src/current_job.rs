/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::support::*;
use chrono::{Duration, Utc};
use dispatch_service::common::{
    constraint_resolver::ConstraintResolver,
    current_job::{pick_current_job, CurrentJobConfig, CurrentJobLocator},
    dispatch_window::TimeWindow,
    license_roster::LicenseRoster,
    types::*,
};
use dispatch_service::outbound::types::BookingSearchQuery;

fn booked_id(job: &CurrentJob) -> Option<BookingId> {
    match job {
        CurrentJob::Booked(details) => Some(details.booking_id),
        _ => None,
    }
}

#[tokio::test]
async fn test_busy_vehicle_without_bookings_is_on_a_street_job() {
    let now = Utc::now();
    let fleet = fleet_with_997(StatusColor::Busy);
    let roster = LicenseRoster::empty();
    let backend = InMemoryBackend::new(Vec::new(), fleet.to_owned());

    let job = CurrentJobLocator::new(&backend, CurrentJobConfig::default())
        .find_current_job(&callsign("997"), &fleet, &roster, now)
        .await;

    assert_eq!(
        job,
        CurrentJob::StreetJob {
            vehicle: callsign("997"),
            driver_name: Some("Ada Mensah".to_string()),
        }
    );
    // The status heuristic short-circuits the broadened search.
    assert_eq!(backend.queries().len(), 1);
}

#[tokio::test]
async fn test_available_vehicle_without_bookings_has_no_job() {
    let now = Utc::now();
    let fleet = fleet_with_997(StatusColor::Available);
    let roster = LicenseRoster::empty();
    let backend = InMemoryBackend::new(
        vec![with_vehicle_constraint(booking(1, now, 10, BookingType::Active), 99999)],
        fleet.to_owned(),
    );

    let job = CurrentJobLocator::new(&backend, CurrentJobConfig::default())
        .find_current_job(&callsign("997"), &fleet, &roster, now)
        .await;

    assert_eq!(
        job,
        CurrentJob::NoJob {
            vehicle: callsign("997")
        }
    );
    assert_eq!(backend.queries().len(), 2);
}

#[tokio::test]
async fn test_exact_assignment_is_found_in_the_narrow_window() {
    let now = Utc::now();
    let fleet = fleet_with_997(StatusColor::Busy);
    let roster = LicenseRoster::empty();
    let backend = InMemoryBackend::new(
        vec![
            with_vehicle_constraint(booking(7, now, -20, BookingType::Active), 385),
            with_vehicle_constraint(booking(8, now, -15, BookingType::Active), 412),
        ],
        fleet.to_owned(),
    );

    let job = CurrentJobLocator::new(&backend, CurrentJobConfig::default())
        .find_current_job(&callsign("997"), &fleet, &roster, now)
        .await;

    match job {
        CurrentJob::Booked(details) => {
            assert_eq!(details.booking_id, BookingId(7));
            assert_eq!(details.matched_by, ResolutionMethod::DirectId);
            assert_eq!(details.price, Some(24.5));
            assert_eq!(details.status, BookingType::Active);
            assert_eq!(details.customer_name, Some("Customer 7".to_string()));
        }
        other => panic!("expected a booked job, got {other:?}"),
    }

    let queries = backend.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].booking_types, BookingType::live());
    assert_eq!(
        queries[0].window,
        TimeWindow::around(now, Duration::minutes(180), Duration::minutes(60))
    );
}

#[tokio::test]
async fn test_driver_constraint_links_the_job_to_the_vehicle() {
    let now = Utc::now();
    let fleet = fleet_with_997(StatusColor::Available);
    let roster = LicenseRoster::empty();
    let backend = InMemoryBackend::new(
        vec![with_driver_constraint(booking(9, now, 30, BookingType::Dispatched), 525)],
        fleet.to_owned(),
    );

    let job = CurrentJobLocator::new(&backend, CurrentJobConfig::default())
        .find_current_job(&callsign("997"), &fleet, &roster, now)
        .await;

    assert_eq!(booked_id(&job), Some(BookingId(9)));
}

#[tokio::test]
async fn test_driver_with_own_callsign_links_the_job_to_their_vehicle() {
    let now = Utc::now();
    let fleet = fleet_with_997_driven_by_d997(StatusColor::Busy);
    let roster = LicenseRoster::empty();
    let backend = InMemoryBackend::new(
        vec![with_driver_constraint(booking(9, now, 10, BookingType::Active), 525)],
        fleet.to_owned(),
    );

    let job = CurrentJobLocator::new(&backend, CurrentJobConfig::default())
        .find_current_job(&callsign("997"), &fleet, &roster, now)
        .await;

    assert_eq!(booked_id(&job), Some(BookingId(9)));
}

#[tokio::test]
async fn test_cross_kind_match_links_the_job_to_the_vehicle() {
    let now = Utc::now();
    let fleet = fleet_with_997_driven_by_d997(StatusColor::Busy);
    let roster = LicenseRoster::empty();
    let backend = InMemoryBackend::new(
        vec![with_vehicle_constraint(booking(10, now, 10, BookingType::Dispatched), 525)],
        fleet.to_owned(),
    );

    let job = CurrentJobLocator::new(&backend, CurrentJobConfig::default())
        .find_current_job(&callsign("997"), &fleet, &roster, now)
        .await;

    assert_eq!(booked_id(&job), Some(BookingId(10)));
}

#[test]
fn test_status_rank_then_pickup_proximity_breaks_ties() {
    let now = Utc::now();
    let fleet = fleet_with_997(StatusColor::Busy);
    let roster = LicenseRoster::empty();
    let resolver = ConstraintResolver::new(&fleet, &roster);
    let query = BookingSearchQuery {
        window: TimeWindow::around(now, Duration::hours(3), Duration::hours(1)),
        booking_types: Vec::new(),
    };

    let by_status = vec![
        with_vehicle_constraint(booking(1, now, 5, BookingType::Advanced), 385),
        with_vehicle_constraint(booking(2, now, -60, BookingType::Active), 385),
        with_vehicle_constraint(booking(3, now, 1, BookingType::Dispatched), 385),
    ];
    let picked = pick_current_job(by_status, &query, &callsign("997"), &resolver, now)
        .expect("a candidate");
    assert_eq!(picked.booking_id, BookingId(2));

    let by_proximity = vec![
        with_vehicle_constraint(booking(4, now, -30, BookingType::Active), 385),
        with_vehicle_constraint(booking(5, now, 10, BookingType::Active), 385),
        with_vehicle_constraint(booking(6, now, -90, BookingType::Active), 385),
    ];
    let picked = pick_current_job(by_proximity, &query, &callsign("997"), &resolver, now)
        .expect("a candidate");
    assert_eq!(picked.booking_id, BookingId(5));

    let recent_beats_upcoming = vec![
        with_vehicle_constraint(booking(7, now, 60, BookingType::Active), 385),
        with_vehicle_constraint(booking(8, now, -10, BookingType::Active), 385),
    ];
    let picked = pick_current_job(recent_beats_upcoming, &query, &callsign("997"), &resolver, now)
        .expect("a candidate");
    assert_eq!(picked.booking_id, BookingId(8));
}

#[tokio::test]
async fn test_broadened_search_finds_older_bookings_of_any_type() {
    let now = Utc::now();
    let fleet = fleet_with_997(StatusColor::Available);
    let roster = LicenseRoster::empty();
    let backend = InMemoryBackend::new(
        vec![with_vehicle_constraint(booking(50, now, -6 * 60, BookingType::Completed), 385)],
        fleet.to_owned(),
    );

    let job = CurrentJobLocator::new(&backend, CurrentJobConfig::default())
        .find_current_job(&callsign("997"), &fleet, &roster, now)
        .await;

    assert_eq!(booked_id(&job), Some(BookingId(50)));
    let queries = backend.queries();
    assert_eq!(queries.len(), 2);
    assert!(queries[1].booking_types.is_empty());
    assert_eq!(
        queries[1].window,
        TimeWindow::around(now, Duration::hours(12), Duration::hours(12))
    );
}

#[tokio::test]
async fn test_failed_searches_count_as_no_evidence() {
    let now = Utc::now();
    let roster = LicenseRoster::empty();

    let busy = fleet_with_997(StatusColor::Busy);
    let backend = InMemoryBackend::failing(busy.to_owned());
    let job = CurrentJobLocator::new(&backend, CurrentJobConfig::default())
        .find_current_job(&callsign("997"), &busy, &roster, now)
        .await;
    assert!(matches!(job, CurrentJob::StreetJob { .. }));

    let available = fleet_with_997(StatusColor::Available);
    let backend = InMemoryBackend::failing(available.to_owned());
    let job = CurrentJobLocator::new(&backend, CurrentJobConfig::default())
        .find_current_job(&callsign("997"), &available, &roster, now)
        .await;
    assert!(matches!(job, CurrentJob::NoJob { .. }));
}

#[tokio::test]
async fn test_timed_out_searches_count_as_no_evidence() {
    let now = Utc::now();
    let fleet = fleet_with_997(StatusColor::Available);
    let roster = LicenseRoster::empty();
    let backend = InMemoryBackend::slow(
        vec![with_vehicle_constraint(booking(60, now, -10, BookingType::Active), 385)],
        fleet.to_owned(),
        std::time::Duration::from_millis(500),
    );
    let cfg = CurrentJobConfig {
        search_timeout_ms: 20,
        ..CurrentJobConfig::default()
    };

    let job = CurrentJobLocator::new(&backend, cfg)
        .find_current_job(&callsign("997"), &fleet, &roster, now)
        .await;

    assert!(matches!(job, CurrentJob::NoJob { .. }));
    assert_eq!(backend.queries().len(), 2);
}

#[tokio::test]
async fn test_unknown_vehicle_has_no_job() {
    let now = Utc::now();
    let fleet = fleet_with_997(StatusColor::Busy);
    let roster = LicenseRoster::empty();
    let backend = InMemoryBackend::new(Vec::new(), fleet.to_owned());

    let job = CurrentJobLocator::new(&backend, CurrentJobConfig::default())
        .find_current_job(&callsign("X1"), &fleet, &roster, now)
        .await;

    assert!(matches!(job, CurrentJob::NoJob { .. }));
}
