/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use super::fleet::fleet_snapshot;
use crate::common::{constraint_resolver::ConstraintResolver, types::*};
use crate::domain::types::internal::constraint::*;
use crate::environment::AppState;
use crate::tools::error::AppError;
use actix_web::web::Data;

pub async fn resolve_constraint(
    data: Data<AppState>,
    request_body: ResolveConstraintRequest,
) -> Result<ConstraintResolution, AppError> {
    let fleet = fleet_snapshot(&data).await?;

    Ok(ConstraintResolver::new(&fleet, &data.roster).resolve(Constraint::new(
        request_body.kind,
        request_body.constraint_id,
    )))
}
