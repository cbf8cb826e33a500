use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use snafu::Snafu;
use std::num::ParseIntError;
use uuid::Uuid;

pub type StudentsResult<T> = Result<T, StudentsError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StudentsError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    MigrateError { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse IP port"))]
    ParsePort { source: ParseIntError },
    #[snafu(display("Unable to parse maximum number of DB connections"))]
    ParseMaxConnections { source: ParseIntError },
    #[snafu(display("Unknown storage backend {:?}, expected `postgres` or `memory`", found))]
    UnknownStorageBackend { found: String },
    #[snafu(display("The {} field is required.", name))]
    MissingField { name: &'static str },
    #[snafu(display("Unable to read JSON body: {}", source.body_text()))]
    JsonBody { source: JsonRejection },
    #[snafu(display("Unable to find student with UUID: {}", id))]
    MissingStudent { id: Uuid },
}

impl IntoResponse for StudentsError {
    #[allow(clippy::match_same_arms)]
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        let status_code = match &self {
            Self::OpenDatabase { .. } | Self::GetDatabaseConnection { .. } => ISE,
            Self::MakeQuery { .. } | Self::MigrateError { .. } => ISE,
            Self::BadEnvVar { .. } => ISE,
            Self::ParsePort { .. } | Self::ParseMaxConnections { .. } => ISE,
            Self::UnknownStorageBackend { .. } => ISE,
            Self::MissingField { .. } => BI,
            Self::JsonBody { source } => match source {
                JsonRejection::MissingJsonContentType(_) | JsonRejection::BytesRejection(_) => {
                    source.status()
                }
                _ => BI,
            },
            Self::MissingStudent { .. } => NF,
        };

        if status_code.is_server_error() {
            error!(?self, "Error!");
        } else {
            warn!(error = %self, %status_code, "Rejected request");
        }
        (status_code, self.to_string()).into_response()
    }
}
