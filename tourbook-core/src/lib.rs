pub mod booking;
pub mod models;
pub mod pii;
pub mod query;
pub mod repository;
pub mod search;

pub use booking::{plan_booking, BookingPlan, BookingService};
pub use models::{Booking, BookingStatus, CreateBookingRequest, FilterOptions, NewTour, Tour};
pub use query::TourQueryService;
pub use repository::{BookingRepository, TourRepository};
pub use search::{PageRequest, TourFilter, TourPage};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl CoreError {
    pub fn tour_not_found(id: i64) -> Self {
        CoreError::NotFound(format!("Tour with id {} not found", id))
    }

    pub fn booking_not_found(id: i64) -> Self {
        CoreError::NotFound(format!("Booking with id {} not found", id))
    }

    /// Transient failures may be retried by the caller; nothing else should be.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::StoreUnavailable(_))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
