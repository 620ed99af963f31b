/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use super::fleet::fleet_snapshot;
use crate::common::{current_job::CurrentJobLocator, types::*};
use crate::environment::AppState;
use crate::tools::error::AppError;
use actix_web::web::Data;
use chrono::Utc;

pub async fn current_job(data: Data<AppState>, callsign: String) -> Result<CurrentJob, AppError> {
    let vehicle = Callsign::parse(&callsign)
        .ok_or(AppError::InvalidRequest("Vehicle callsign is empty".to_string()))?;

    let fleet = fleet_snapshot(&data).await?;

    Ok(CurrentJobLocator::new(data.backend.as_ref(), data.current_job_cfg)
        .find_current_job(&vehicle, &fleet, &data.roster, Utc::now())
        .await)
}
