use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Tour;
use crate::{CoreError, CoreResult};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query string accepted by the tour listing, before validation.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TourListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub country: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl TourListQuery {
    pub fn into_parts(self) -> CoreResult<(TourFilter, PageRequest)> {
        for (name, value) in [("min_price", self.min_price), ("max_price", self.max_price)] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(CoreError::InvalidRequest(format!(
                        "{} must be a non-negative number",
                        name
                    )));
                }
            }
        }

        let filter = TourFilter {
            country: self
                .country
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            min_price: self.min_price,
            max_price: self.max_price,
            start_date: parse_date_param("start_date", self.start_date.as_deref())?,
            end_date: parse_date_param("end_date", self.end_date.as_deref())?,
        };

        Ok((filter, PageRequest::new(self.page, self.page_size)))
    }
}

fn parse_date_param(name: &str, raw: Option<&str>) -> CoreResult<Option<DateTime<Utc>>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_iso_datetime(s).map(Some).ok_or_else(|| {
            CoreError::InvalidRequest(format!("{} must be an ISO-8601 date or timestamp, got '{}'", name, s))
        }),
    }
}

/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` (UTC) and bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_iso_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // A literal '+' in a query string arrives decoded as a space.
    if let Ok(dt) = DateTime::parse_from_rfc3339(&s.replace(' ', "+")) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Conjunctive tour predicates. `None` means "not filtered".
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourFilter {
    pub country: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl TourFilter {
    pub fn matches(&self, tour: &Tour) -> bool {
        if let Some(country) = &self.country {
            if !tour.country.to_lowercase().contains(&country.to_lowercase()) {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| tour.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| tour.price > max) {
            return false;
        }
        if self.start_date.is_some_and(|from| tour.start_date < from) {
            return false;
        }
        if self.end_date.is_some_and(|to| tour.end_date > to) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Out-of-range values are clamped rather than rejected.
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = page.unwrap_or(1).clamp(1, u32::MAX as i64) as u32;
        let page_size = page_size
            .unwrap_or(DEFAULT_PAGE_SIZE as i64)
            .clamp(1, MAX_PAGE_SIZE as i64) as u32;
        Self { page, page_size }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourPage {
    pub tours: Vec<Tour>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: i64,
}

impl TourPage {
    pub fn new(tours: Vec<Tour>, total: i64, page: PageRequest) -> Self {
        Self {
            tours,
            total,
            page: page.page,
            page_size: page.page_size,
            total_pages: total_pages(total, page.page_size),
        }
    }
}

pub fn total_pages(total: i64, page_size: u32) -> i64 {
    if total <= 0 {
        return 0;
    }
    let size = page_size.max(1) as i64;
    (total + size - 1) / size
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tour(country: &str, price: f64, start_day: u32, end_day: u32) -> Tour {
        let now = Utc::now();
        Tour {
            id: 1,
            title: "t".into(),
            country: country.into(),
            city: "c".into(),
            description: "d".into(),
            price,
            duration_days: 3,
            max_people: 10,
            image_url: None,
            start_date: Utc.with_ymd_and_hms(2025, 6, start_day, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2025, 6, end_day, 0, 0, 0).unwrap(),
            available_slots: 10,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(250, 100), 3);
    }

    #[test]
    fn test_page_request_clamps() {
        let p = PageRequest::new(Some(0), Some(500));
        assert_eq!(p, PageRequest { page: 1, page_size: 100 });

        let p = PageRequest::new(Some(3), Some(0));
        assert_eq!(p.page_size, 1);
        assert_eq!(p.offset(), 2);

        let p = PageRequest::default();
        assert_eq!((p.page, p.page_size, p.offset(), p.limit()), (1, 10, 0, 10));
    }

    #[test]
    fn test_parse_iso_datetime_variants() {
        let midnight = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_iso_datetime("2025-06-01"), Some(midnight));
        assert_eq!(parse_iso_datetime("2025-06-01T00:00:00"), Some(midnight));
        assert_eq!(parse_iso_datetime("2025-06-01T00:00:00Z"), Some(midnight));
        assert_eq!(parse_iso_datetime("2025-06-01T03:00:00+03:00"), Some(midnight));
        assert_eq!(parse_iso_datetime("2025-06-01T03:00:00 03:00"), Some(midnight));
        assert_eq!(parse_iso_datetime("2025-06-01T00:00:00.000"), Some(midnight));
        assert_eq!(parse_iso_datetime("next tuesday"), None);
    }

    #[test]
    fn test_query_into_parts_rejects_malformed_values() {
        let q = TourListQuery { min_price: Some(-1.0), ..Default::default() };
        assert!(matches!(q.into_parts(), Err(CoreError::InvalidRequest(_))));

        let q = TourListQuery { start_date: Some("01/06/2025".into()), ..Default::default() };
        match q.into_parts() {
            Err(CoreError::InvalidRequest(msg)) => assert!(msg.contains("start_date")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_query_into_parts_normalizes() {
        let q = TourListQuery {
            page: Some(2),
            page_size: Some(5),
            country: Some("   ".into()),
            end_date: Some("2025-06-30".into()),
            ..Default::default()
        };
        let (filter, page) = q.into_parts().unwrap();
        assert_eq!(filter.country, None);
        assert!(filter.end_date.is_some());
        assert_eq!(page.offset(), 5);
    }

    #[test]
    fn test_filter_is_conjunctive_and_case_insensitive() {
        let t = tour("France", 890.0, 10, 15);

        assert!(TourFilter::default().matches(&t));
        assert!(TourFilter { country: Some("fRaN".into()), ..Default::default() }.matches(&t));
        assert!(!TourFilter { country: Some("Italy".into()), ..Default::default() }.matches(&t));

        let both = TourFilter {
            country: Some("france".into()),
            max_price: Some(500.0),
            ..Default::default()
        };
        assert!(!both.matches(&t));

        let window = TourFilter {
            start_date: Some(Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap()),
            min_price: Some(890.0),
            ..Default::default()
        };
        assert!(window.matches(&t));

        let late_start = TourFilter {
            start_date: Some(Utc.with_ymd_and_hms(2025, 6, 11, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(!late_start.matches(&t));
    }
}
