use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationErrors};

use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub id: i64,
    pub title: String,
    pub country: String,
    pub city: String,
    pub description: String,
    pub price: f64,
    pub duration_days: i32,
    pub max_people: i32,
    pub image_url: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub available_slots: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for the seed/admin path that creates tours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTour {
    pub title: String,
    pub country: String,
    pub city: String,
    pub description: String,
    pub price: f64,
    pub duration_days: i32,
    pub max_people: i32,
    pub image_url: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub available_slots: i32,
}

impl NewTour {
    pub fn check(&self) -> CoreResult<()> {
        let blank = [
            ("title", &self.title),
            ("country", &self.country),
            ("city", &self.city),
            ("description", &self.description),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        if let Some((field, _)) = blank {
            return Err(CoreError::InvalidRequest(format!("{} must not be empty", field)));
        }
        if !(self.price > 0.0) {
            return Err(CoreError::InvalidRequest("price must be positive".into()));
        }
        if self.duration_days <= 0 || self.max_people <= 0 {
            return Err(CoreError::InvalidRequest(
                "duration_days and max_people must be positive".into(),
            ));
        }
        if self.available_slots < 0 || self.available_slots > self.max_people {
            return Err(CoreError::InvalidRequest(format!(
                "available_slots must be between 0 and {}",
                self.max_people
            )));
        }
        if self.start_date > self.end_date {
            return Err(CoreError::InvalidRequest("start_date must not be after end_date".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(CoreError::StoreUnavailable(format!("unknown booking status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub tour_id: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub number_of_people: i32,
    pub total_price: f64,
    pub booking_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[validate(range(min = 1, message = "must be a positive tour id"))]
    pub tour_id: i64,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub customer_name: String,
    #[validate(
        email(message = "must be a valid email address"),
        length(max = 100, message = "must be at most 100 characters")
    )]
    pub customer_email: String,
    #[validate(length(min = 1, max = 20, message = "must be between 1 and 20 characters"))]
    pub customer_phone: String,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub number_of_people: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateBookingRequest {
    /// Field-level checks that run before the store is touched.
    pub fn check(&self) -> CoreResult<()> {
        self.validate()
            .map_err(|errors| CoreError::InvalidRequest(describe(&errors)))
    }
}

fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let reason = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}: {}", field, reason)
        })
        .collect();
    fields.sort();
    format!("Invalid booking request: {}", fields.join("; "))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub countries: Vec<String>,
    pub min_price: f64,
    pub max_price: f64,
}
