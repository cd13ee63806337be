use async_trait::async_trait;

use crate::models::{Booking, CreateBookingRequest, FilterOptions, NewTour, Tour};
use crate::search::{PageRequest, TourFilter};
use crate::CoreResult;

/// Read/write access to tours.
#[async_trait]
pub trait TourRepository: Send + Sync {
    /// Returns the requested page and the total match count for `filter`.
    async fn list_tours(
        &self,
        filter: &TourFilter,
        page: PageRequest,
    ) -> CoreResult<(Vec<Tour>, i64)>;

    async fn get_tour(&self, id: i64) -> CoreResult<Option<Tour>>;

    async fn create_tour(&self, tour: &NewTour) -> CoreResult<Tour>;

    async fn count_tours(&self) -> CoreResult<i64>;

    async fn filter_options(&self) -> CoreResult<FilterOptions>;
}

/// Booking persistence.
///
/// `create_booking` must look up the tour, run [`crate::plan_booking`] and
/// persist the booking together with the slot decrement as one atomic unit,
/// serialized against other bookings for the same tour.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(&self, request: &CreateBookingRequest) -> CoreResult<Booking>;

    async fn get_booking(&self, id: i64) -> CoreResult<Option<Booking>>;

    /// Exact email match, newest first.
    async fn list_bookings_by_email(&self, email: &str) -> CoreResult<Vec<Booking>>;
}
