use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tourbook_core::models::{Booking, CreateBookingRequest, FilterOptions, NewTour, Tour};
use tourbook_core::repository::{BookingRepository, TourRepository};
use tourbook_core::search::{PageRequest, TourFilter};
use tourbook_core::{plan_booking, CoreError, CoreResult};

/// In-process store for development (`database.url = "memory://"`) and tests.
///
/// Each tour sits behind its own mutex; a booking holds that mutex across
/// check, insert and decrement, so bookings on different tours never contend.
#[derive(Default)]
pub struct MemoryStore {
    tours: RwLock<BTreeMap<i64, Arc<Mutex<Tour>>>>,
    bookings: RwLock<Vec<Booking>>,
    next_tour_id: AtomicI64,
    next_booking_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn snapshot(&self) -> Vec<Tour> {
        let tours = self.tours.read().await;
        let mut out = Vec::with_capacity(tours.len());
        for slot in tours.values() {
            out.push(slot.lock().await.clone());
        }
        out
    }
}

#[async_trait]
impl TourRepository for MemoryStore {
    async fn list_tours(
        &self,
        filter: &TourFilter,
        page: PageRequest,
    ) -> CoreResult<(Vec<Tour>, i64)> {
        let mut matching: Vec<Tour> = self
            .snapshot()
            .await
            .into_iter()
            .filter(|t| filter.matches(t))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let tours = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((tours, total))
    }

    async fn get_tour(&self, id: i64) -> CoreResult<Option<Tour>> {
        let slot = self.tours.read().await.get(&id).cloned();
        match slot {
            Some(slot) => Ok(Some(slot.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn create_tour(&self, tour: &NewTour) -> CoreResult<Tour> {
        tour.check()?;

        let now = Utc::now();
        let id = self.next_tour_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = Tour {
            id,
            title: tour.title.clone(),
            country: tour.country.clone(),
            city: tour.city.clone(),
            description: tour.description.clone(),
            price: tour.price,
            duration_days: tour.duration_days,
            max_people: tour.max_people,
            image_url: tour.image_url.clone(),
            start_date: tour.start_date,
            end_date: tour.end_date,
            available_slots: tour.available_slots,
            created_at: now,
            updated_at: now,
        };
        self.tours
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(created.clone())));
        Ok(created)
    }

    async fn count_tours(&self) -> CoreResult<i64> {
        Ok(self.tours.read().await.len() as i64)
    }

    async fn filter_options(&self) -> CoreResult<FilterOptions> {
        let tours = self.snapshot().await;

        let mut countries: Vec<String> = tours.iter().map(|t| t.country.clone()).collect();
        countries.sort();
        countries.dedup();

        let prices = tours.iter().map(|t| t.price);
        let min_price = prices.clone().reduce(f64::min).unwrap_or(0.0);
        let max_price = prices.reduce(f64::max).unwrap_or(0.0);

        Ok(FilterOptions { countries, min_price, max_price })
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn create_booking(&self, request: &CreateBookingRequest) -> CoreResult<Booking> {
        let slot = self
            .tours
            .read()
            .await
            .get(&request.tour_id)
            .cloned()
            .ok_or_else(|| CoreError::tour_not_found(request.tour_id))?;

        let mut tour = slot.lock().await;
        let plan = plan_booking(&tour, request)?;

        let now = Utc::now();
        let booking = Booking {
            id: self.next_booking_id.fetch_add(1, Ordering::SeqCst) + 1,
            tour_id: tour.id,
            customer_name: request.customer_name.clone(),
            customer_email: request.customer_email.clone(),
            customer_phone: request.customer_phone.clone(),
            number_of_people: request.number_of_people,
            total_price: plan.total_price,
            booking_date: now,
            status: plan.status,
            notes: request.notes.clone(),
            created_at: now,
        };

        // Nothing below can fail, so the insert and decrement land together.
        self.bookings.write().await.push(booking.clone());
        tour.available_slots = plan.remaining_slots;
        tour.updated_at = now;

        Ok(booking)
    }

    async fn get_booking(&self, id: i64) -> CoreResult<Option<Booking>> {
        Ok(self.bookings.read().await.iter().find(|b| b.id == id).cloned())
    }

    async fn list_bookings_by_email(&self, email: &str) -> CoreResult<Vec<Booking>> {
        let mut found: Vec<Booking> = self
            .bookings
            .read()
            .await
            .iter()
            .filter(|b| b.customer_email == email)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }
}
