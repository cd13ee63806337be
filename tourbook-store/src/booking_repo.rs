use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tourbook_core::models::{Booking, CreateBookingRequest, Tour};
use tourbook_core::repository::BookingRepository;
use tourbook_core::{plan_booking, CoreError, CoreResult};
use tracing::debug;

use crate::database::store_err;
use crate::tour_repo::{tour_columns, TourRow};

const BOOKING_COLUMNS: &str = "id, tour_id, customer_name, customer_email, customer_phone, \
     number_of_people, total_price, booking_date, status, notes, created_at";

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    tour_id: i64,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    number_of_people: i32,
    total_price: f64,
    booking_date: DateTime<Utc>,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = CoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            tour_id: row.tour_id,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            number_of_people: row.number_of_people,
            total_price: row.total_price,
            booking_date: row.booking_date,
            status: row.status.parse()?,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn create_booking(&self, request: &CreateBookingRequest) -> CoreResult<Booking> {
        // Dropping `tx` on any early return rolls everything back.
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        // Row lock serializes check-and-decrement per tour only.
        let tour: Tour = sqlx::query_as::<_, TourRow>(concat!(
            "SELECT ",
            tour_columns!(),
            " FROM tours WHERE id = $1 FOR UPDATE"
        ))
        .bind(request.tour_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_err)?
        .map(Tour::from)
        .ok_or_else(|| CoreError::tour_not_found(request.tour_id))?;

        let plan = plan_booking(&tour, request)?;

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            INSERT INTO bookings (tour_id, customer_name, customer_email, customer_phone, number_of_people, total_price, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(tour.id)
        .bind(&request.customer_name)
        .bind(&request.customer_email)
        .bind(&request.customer_phone)
        .bind(request.number_of_people)
        .bind(plan.total_price)
        .bind(plan.status.as_str())
        .bind(&request.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?;

        sqlx::query("UPDATE tours SET available_slots = $1, updated_at = NOW() WHERE id = $2")
            .bind(plan.remaining_slots)
            .bind(tour.id)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;

        debug!(tour_id = tour.id, remaining = plan.remaining_slots, "slots decremented");
        Booking::try_from(row)
    }

    async fn get_booking(&self, id: i64) -> CoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_bookings_by_email(&self, email: &str) -> CoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE customer_email = $1 ORDER BY created_at DESC, id DESC",
            BOOKING_COLUMNS
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.into_iter().map(Booking::try_from).collect()
    }
}
