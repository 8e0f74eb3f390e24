use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use snafu::Snafu;
use std::num::ParseIntError;

pub type RollbookResult<T> = Result<T, RollbookError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RollbookError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    Migrate { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse IP port"))]
    ParsePort { source: ParseIntError },
    #[snafu(display("Id is required"))]
    MissingStudentId,
    #[snafu(display("Unable to parse student id {:?}", original))]
    ParseStudentId {
        source: ParseIntError,
        original: String,
    },
    #[snafu(display("Unable to find student with id {}", id))]
    MissingStudent { id: i32 },
}

impl IntoResponse for RollbookError {
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR;
        const NF: StatusCode = StatusCode::NOT_FOUND;
        const BI: StatusCode = StatusCode::BAD_REQUEST;

        let status_code = match &self {
            Self::OpenDatabase { .. } | Self::GetDatabaseConnection { .. } => ISE,
            Self::MakeQuery { .. } | Self::Migrate { .. } => ISE,
            Self::BadEnvVar { .. } | Self::ParsePort { .. } => ISE,
            Self::MissingStudentId | Self::ParseStudentId { .. } => BI,
            Self::MissingStudent { .. } => NF,
        };

        error!(?self, "Error!");

        //the underlying cause stays in the logs, callers only get the display string
        let message = if status_code == ISE {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status_code, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: RollbookError) -> StatusCode {
        error.into_response().status()
    }

    #[test]
    fn missing_student_maps_to_not_found() {
        assert_eq!(
            status_of(RollbookError::MissingStudent { id: 42 }),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn bad_ids_map_to_bad_request() {
        assert_eq!(
            status_of(RollbookError::MissingStudentId),
            StatusCode::BAD_REQUEST
        );

        let source = "abc".parse::<i32>().unwrap_err();
        assert_eq!(
            status_of(RollbookError::ParseStudentId {
                source,
                original: "abc".to_string()
            }),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn storage_errors_map_to_internal_server_error() {
        assert_eq!(
            status_of(RollbookError::MakeQuery {
                source: sqlx::Error::PoolClosed
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
