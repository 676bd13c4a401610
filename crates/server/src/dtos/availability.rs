use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Form fields of the room availability check
#[derive(Debug, Deserialize, ToSchema)]
pub struct AvailabilityRequest {
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub room_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityResponse {
    pub ok: bool,
    pub message: String,
    pub room_id: String,
    pub start_date: String,
    pub end_date: String,
}

impl AvailabilityResponse {
    pub fn failure(request: &AvailabilityRequest, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            room_id: request.room_id.clone(),
            start_date: request.start_date.clone(),
            end_date: request.end_date.clone(),
        }
    }
}
