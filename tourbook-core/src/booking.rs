use std::sync::Arc;
use tracing::{error, info, warn};

use crate::models::{Booking, BookingStatus, CreateBookingRequest, Tour};
use crate::pii::Masked;
use crate::repository::BookingRepository;
use crate::{CoreError, CoreResult};

/// Outcome of checking a request against a tour's current availability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookingPlan {
    pub total_price: f64,
    pub remaining_slots: i32,
    pub status: BookingStatus,
}

/// Availability check and price capture.
///
/// Stores call this while holding their per-tour lock, so `tour` must be the
/// locked, current row. The price is captured here and never re-derived.
pub fn plan_booking(tour: &Tour, request: &CreateBookingRequest) -> CoreResult<BookingPlan> {
    if request.number_of_people <= 0 {
        return Err(CoreError::InvalidRequest(
            "number_of_people must be at least 1".into(),
        ));
    }
    if request.number_of_people > tour.available_slots {
        return Err(CoreError::InvalidRequest(format!(
            "Not enough available slots. Only {} slots left",
            tour.available_slots
        )));
    }

    Ok(BookingPlan {
        total_price: tour.price * request.number_of_people as f64,
        remaining_slots: tour.available_slots - request.number_of_people,
        status: BookingStatus::Confirmed,
    })
}

#[derive(Clone)]
pub struct BookingService {
    repo: Arc<dyn BookingRepository>,
}

impl BookingService {
    pub fn new(repo: Arc<dyn BookingRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_booking(&self, request: CreateBookingRequest) -> CoreResult<Booking> {
        request.check()?;

        match self.repo.create_booking(&request).await {
            Ok(booking) => {
                info!(
                    booking_id = booking.id,
                    tour_id = booking.tour_id,
                    people = booking.number_of_people,
                    total_price = booking.total_price,
                    email = %Masked(&booking.customer_email),
                    "booking confirmed"
                );
                Ok(booking)
            }
            Err(e) if e.is_retryable() => {
                error!(tour_id = request.tour_id, error = %e, "booking failed in store");
                Err(e)
            }
            Err(e) => {
                warn!(tour_id = request.tour_id, people = request.number_of_people, error = %e, "booking rejected");
                Err(e)
            }
        }
    }

    pub async fn get_booking(&self, id: i64) -> CoreResult<Booking> {
        self.repo
            .get_booking(id)
            .await?
            .ok_or_else(|| CoreError::booking_not_found(id))
    }

    pub async fn list_bookings_by_email(&self, email: &str) -> CoreResult<Vec<Booking>> {
        self.repo.list_bookings_by_email(email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tour(price: f64, slots: i32) -> Tour {
        let now = Utc::now();
        Tour {
            id: 1,
            title: "Istanbul".into(),
            country: "Turkey".into(),
            city: "Istanbul".into(),
            description: "Blue Mosque".into(),
            price,
            duration_days: 3,
            max_people: 15,
            image_url: None,
            start_date: now,
            end_date: now,
            available_slots: slots,
            created_at: now,
            updated_at: now,
        }
    }

    fn request(people: i32) -> CreateBookingRequest {
        CreateBookingRequest {
            tour_id: 1,
            customer_name: "Alex".into(),
            customer_email: "alex@example.com".into(),
            customer_phone: "555".into(),
            number_of_people: people,
            notes: None,
        }
    }

    #[test]
    fn test_plan_captures_price_and_remaining() {
        let plan = plan_booking(&tour(450.0, 10), &request(3)).unwrap();
        assert_eq!(plan.total_price, 1350.0);
        assert_eq!(plan.remaining_slots, 7);
        assert_eq!(plan.status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_plan_allows_taking_every_slot() {
        let plan = plan_booking(&tour(100.0, 4), &request(4)).unwrap();
        assert_eq!(plan.remaining_slots, 0);
    }

    #[test]
    fn test_plan_rejects_overbooking_with_slot_count() {
        let err = plan_booking(&tour(450.0, 7), &request(8)).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidRequest("Not enough available slots. Only 7 slots left".into())
        );
    }

    #[test]
    fn test_plan_rejects_non_positive_people() {
        assert!(plan_booking(&tour(450.0, 7), &request(0)).is_err());
    }
}
