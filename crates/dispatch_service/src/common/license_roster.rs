/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use super::types::*;
use crate::tools::{error::AppError, prometheus::FLEET_DATA_ANOMALIES};
use rustc_hash::FxHashMap;
use std::{fs::File, io::Read, path::Path};
use tracing::{info, warn};

const DRIVER_CALLSIGN_HEADERS: [&str; 3] = ["drivercallsign", "driver", "drivercs"];
const DRIVER_NAME_HEADERS: [&str; 2] = ["drivername", "name"];
const VEHICLE_CALLSIGN_HEADERS: [&str; 3] = ["vehiclecallsign", "vehicle", "vehiclecs"];

/// Offline driver/vehicle table used when an entity is missing from the live fleet.
#[derive(Debug, Clone, Default)]
pub struct LicenseRoster {
    records: Vec<LicenseRecord>,
    by_driver_callsign: FxHashMap<Callsign, usize>,
    by_vehicle_callsign: FxHashMap<Callsign, usize>,
}

impl LicenseRoster {
    pub fn new(records: Vec<LicenseRecord>) -> LicenseRoster {
        let mut by_driver_callsign = FxHashMap::default();
        let mut by_vehicle_callsign = FxHashMap::default();

        for (idx, record) in records.iter().enumerate() {
            if by_driver_callsign.contains_key(&record.driver_callsign) {
                warn!(tag = "[License Roster - Duplicate Driver]", driver_callsign = %record.driver_callsign, row = idx);
                FLEET_DATA_ANOMALIES
                    .with_label_values(&["license_roster", "duplicate_driver_callsign"])
                    .inc();
            }
            by_driver_callsign
                .entry(record.driver_callsign.to_owned())
                .or_insert(idx);
            by_vehicle_callsign
                .entry(record.vehicle_callsign.to_owned())
                .or_insert(idx);
        }

        LicenseRoster {
            records,
            by_driver_callsign,
            by_vehicle_callsign,
        }
    }

    pub fn empty() -> LicenseRoster {
        LicenseRoster::default()
    }

    /// Parses a roster CSV: a header row followed by comma-delimited, optionally quoted fields.
    ///
    /// Columns are located by header name (case, space and underscore insensitive), so column
    /// order in the export does not matter. Rows missing a callsign are skipped and counted.
    pub fn from_reader<R: Read>(reader: R) -> Result<LicenseRoster, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|err| AppError::RosterLoadFailed(err.to_string()))?
            .clone();

        let driver_callsign_col = find_column(&headers, &DRIVER_CALLSIGN_HEADERS).ok_or(
            AppError::RosterLoadFailed("Missing driver callsign column".to_string()),
        )?;
        let vehicle_callsign_col = find_column(&headers, &VEHICLE_CALLSIGN_HEADERS).ok_or(
            AppError::RosterLoadFailed("Missing vehicle callsign column".to_string()),
        )?;
        let driver_name_col = find_column(&headers, &DRIVER_NAME_HEADERS);

        let mut records = Vec::new();
        for (row_idx, row) in reader.records().enumerate() {
            // header is line 1
            let line = row_idx + 2;
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    skip_row(line, &err.to_string());
                    continue;
                }
            };

            let driver_callsign = row.get(driver_callsign_col).and_then(Callsign::parse);
            let vehicle_callsign = row.get(vehicle_callsign_col).and_then(Callsign::parse);
            let driver_name = driver_name_col
                .and_then(|col| row.get(col))
                .unwrap_or_default()
                .to_string();

            match (driver_callsign, vehicle_callsign) {
                (Some(driver_callsign), Some(vehicle_callsign)) => records.push(LicenseRecord {
                    driver_callsign,
                    driver_name,
                    vehicle_callsign,
                }),
                _ => skip_row(line, "missing driver or vehicle callsign"),
            }
        }

        Ok(LicenseRoster::new(records))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<LicenseRoster, AppError> {
        let file = File::open(path.as_ref()).map_err(|err| {
            AppError::RosterLoadFailed(format!("{} : {err}", path.as_ref().display()))
        })?;
        let roster = LicenseRoster::from_reader(file)?;
        info!(tag = "[License Roster Loaded]", path = %path.as_ref().display(), records = roster.len());
        Ok(roster)
    }

    pub fn by_driver_callsign(&self, callsign: &Callsign) -> Option<&LicenseRecord> {
        self.by_driver_callsign
            .get(callsign)
            .and_then(|idx| self.records.get(*idx))
    }

    pub fn by_vehicle_callsign(&self, callsign: &Callsign) -> Option<&LicenseRecord> {
        self.by_vehicle_callsign
            .get(callsign)
            .and_then(|idx| self.records.get(*idx))
    }

    pub fn records(&self) -> &[LicenseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn find_column(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|candidate| {
        headers
            .iter()
            .position(|header| normalize_header(header) == *candidate)
    })
}

fn skip_row(line: usize, reason: &str) {
    warn!(tag = "[License Roster - Skipped Row]", line = line, reason = reason);
    FLEET_DATA_ANOMALIES
        .with_label_values(&["license_roster", "malformed_row"])
        .inc();
}
