use std::sync::Arc;
use tourbook_agent::TourAgent;
use tourbook_core::{BookingService, TourQueryService};

#[derive(Clone)]
pub struct AppState {
    pub tours: TourQueryService,
    pub bookings: BookingService,
    /// `None` when the chat agent is disabled or has no API key.
    pub agent: Option<Arc<TourAgent>>,
    pub version: String,
    pub cors_origins: Vec<String>,
}
