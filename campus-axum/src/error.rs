use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use campus_core::errors::CampusError;

#[derive(Debug)]
pub struct CampusAxumError(pub anyhow::Error);

impl From<anyhow::Error> for CampusAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<CampusError> for CampusAxumError {
    fn from(e: CampusError) -> Self {
        Self(e.into_anyhow())
    }
}

impl IntoResponse for CampusAxumError {
    fn into_response(self) -> Response {
        // If it's a CampusError (even wrapped in anyhow contexts), keep its
        // status and client payload.
        if let Some(campus) = self.0.chain().find_map(|e| e.downcast_ref::<CampusError>()) {
            let safe = campus.sanitize_for_client();
            let status =
                StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return (status, Json(safe.to_json())).into_response();
        }

        // Anything else becomes a GeneralError
        let campus = CampusError::general_error(self.0.to_string());
        let safe = campus.sanitize_for_client();
        let status =
            StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(safe.to_json())).into_response()
    }
}
