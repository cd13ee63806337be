use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tourbook_core::models::{FilterOptions, NewTour, Tour};
use tourbook_core::repository::TourRepository;
use tourbook_core::search::{PageRequest, TourFilter};
use tourbook_core::CoreResult;

use crate::database::store_err;

macro_rules! tour_columns {
    () => {
        "id, title, country, city, description, price, duration_days, max_people, image_url, \
         start_date, end_date, available_slots, created_at, updated_at"
    };
}
pub(crate) use tour_columns;

pub struct PgTourRepository {
    pool: PgPool,
}

impl PgTourRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct TourRow {
    id: i64,
    title: String,
    country: String,
    city: String,
    description: String,
    price: f64,
    duration_days: i32,
    max_people: i32,
    image_url: Option<String>,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    available_slots: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TourRow> for Tour {
    fn from(row: TourRow) -> Self {
        Tour {
            id: row.id,
            title: row.title,
            country: row.country,
            city: row.city,
            description: row.description,
            price: row.price,
            duration_days: row.duration_days,
            max_people: row.max_people,
            image_url: row.image_url,
            start_date: row.start_date,
            end_date: row.end_date,
            available_slots: row.available_slots,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `%`, `_` and `\` in user input match literally.
fn like_pattern(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    escaped.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &TourFilter) {
    qb.push(" WHERE TRUE");
    if let Some(country) = &filter.country {
        qb.push(" AND country ILIKE ").push_bind(like_pattern(country));
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND price <= ").push_bind(max);
    }
    if let Some(from) = filter.start_date {
        qb.push(" AND start_date >= ").push_bind(from);
    }
    if let Some(to) = filter.end_date {
        qb.push(" AND end_date <= ").push_bind(to);
    }
}

#[async_trait]
impl TourRepository for PgTourRepository {
    async fn list_tours(
        &self,
        filter: &TourFilter,
        page: PageRequest,
    ) -> CoreResult<(Vec<Tour>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tours");
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?;

        let mut select = QueryBuilder::<Postgres>::new(concat!("SELECT ", tour_columns!(), " FROM tours"));
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows: Vec<TourRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        Ok((rows.into_iter().map(Tour::from).collect(), total))
    }

    async fn get_tour(&self, id: i64) -> CoreResult<Option<Tour>> {
        let row = sqlx::query_as::<_, TourRow>(concat!(
            "SELECT ",
            tour_columns!(),
            " FROM tours WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(row.map(Tour::from))
    }

    async fn create_tour(&self, tour: &NewTour) -> CoreResult<Tour> {
        tour.check()?;

        let row = sqlx::query_as::<_, TourRow>(concat!(
            r#"
            INSERT INTO tours (title, country, city, description, price, duration_days, max_people, image_url, start_date, end_date, available_slots)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING "#,
            tour_columns!()
        ))
        .bind(&tour.title)
        .bind(&tour.country)
        .bind(&tour.city)
        .bind(&tour.description)
        .bind(tour.price)
        .bind(tour.duration_days)
        .bind(tour.max_people)
        .bind(&tour.image_url)
        .bind(tour.start_date)
        .bind(tour.end_date)
        .bind(tour.available_slots)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(row.into())
    }

    async fn count_tours(&self) -> CoreResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM tours")
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)
    }

    async fn filter_options(&self) -> CoreResult<FilterOptions> {
        let countries: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT country FROM tours ORDER BY country")
                .fetch_all(&self.pool)
                .await
                .map_err(store_err)?;

        let (min_price, max_price): (Option<f64>, Option<f64>) =
            sqlx::query_as("SELECT MIN(price), MAX(price) FROM tours")
                .fetch_one(&self.pool)
                .await
                .map_err(store_err)?;

        Ok(FilterOptions {
            countries,
            min_price: min_price.unwrap_or(0.0),
            max_price: max_price.unwrap_or(0.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("fra"), "%fra%");
        assert_eq!(like_pattern("100%_\\"), "%100\\%\\_\\\\%");
    }

    #[test]
    fn test_filter_sql_only_mentions_supplied_predicates() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tours");
        push_filter(
            &mut qb,
            &TourFilter {
                country: Some("ita".into()),
                max_price: Some(800.0),
                ..Default::default()
            },
        );
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM tours WHERE TRUE AND country ILIKE $1 AND price <= $2"
        );
    }
}
