/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::{
    http::{header::ContentType, StatusCode},
    HttpResponse, ResponseError,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    error_message: String,
    pub error_code: String,
}

#[derive(Debug, Serialize, thiserror::Error)]
pub enum AppError {
    #[error("INTERNAL_ERROR")]
    InternalError(String),
    #[error("INVALID_REQUEST")]
    InvalidRequest(String),
    #[error("UNPROCESSIBLE_REQUEST")]
    UnprocessibleRequest(String),
    #[error("LARGE_PAYLOAD_SIZE")]
    LargePayloadSize(usize, usize),
    #[error("EXTERNAL_API_CALL_ERROR")]
    ExternalAPICallError(String),
    #[error("SERIALIZATION_ERROR")]
    SerializationError(String),
    #[error("DESERIALIZATION_ERROR")]
    DeserializationError(String),
    #[error("UPSTREAM_UNAVAILABLE")]
    UpstreamUnavailable(String),
    #[error("MALFORMED_RECORD")]
    MalformedRecord(String),
    #[error("ROSTER_LOAD_FAILED")]
    RosterLoadFailed(String),
    #[error("CACHE_FAILED")]
    CacheFailed(String),
    #[error("INVALID_CONFIGURATION")]
    InvalidConfiguration(String),
    #[error("REQUEST_TIMEOUT")]
    RequestTimeout,
}

impl AppError {
    fn error_message(&self) -> ErrorBody {
        ErrorBody {
            error_message: self.message(),
            error_code: self.code(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::InternalError(err) => err.to_string(),
            AppError::InvalidRequest(err) => err.to_string(),
            AppError::UnprocessibleRequest(err) => err.to_string(),
            AppError::LargePayloadSize(length, limit) => {
                format!("Content length ({length} Bytes) greater than allowed maximum limit : ({limit} Bytes)")
            }
            AppError::ExternalAPICallError(err) => err.to_string(),
            AppError::SerializationError(err) => err.to_string(),
            AppError::DeserializationError(err) => err.to_string(),
            AppError::UpstreamUnavailable(source) => {
                format!("Dispatch backend unavailable : {source}")
            }
            AppError::MalformedRecord(reason) => format!("Malformed record : {reason}"),
            AppError::RosterLoadFailed(reason) => {
                format!("License roster could not be loaded : {reason}")
            }
            AppError::CacheFailed(reason) => format!("Cache Error : {reason}"),
            AppError::InvalidConfiguration(reason) => format!("Invalid configuration : {reason}"),
            AppError::RequestTimeout => "Request timed out".to_string(),
        }
    }

    pub fn code(&self) -> String {
        self.to_string()
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(self.error_message())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnprocessibleRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::LargePayloadSize(_, _) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::ExternalAPICallError(_) => StatusCode::BAD_GATEWAY,
            AppError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DeserializationError(_) => StatusCode::BAD_GATEWAY,
            AppError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::MalformedRecord(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::RosterLoadFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::CacheFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidConfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
        }
    }
}
