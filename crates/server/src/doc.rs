use crate::{
    dtos::availability::{AvailabilityRequest, AvailabilityResponse},
    routes::{availability, health, root},
};
use utoipa::OpenApi;

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        root::root,
        health::health,
        availability::search_availability_json,
    ),
    components(schemas(AvailabilityRequest, AvailabilityResponse)),
    tags(
        (name = "Pages", description = "Page payloads"),
        (name = "Availability", description = "Room availability checks"),
        (name = "Health", description = "Service health"),
    ),
    info(
        title = "Bed & Breakfast API",
        version = "1.0.0",
        description = "Room search, booking and reservation administration",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;
