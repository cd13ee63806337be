use std::sync::Arc;
use tracing::debug;

use crate::models::{FilterOptions, Tour};
use crate::repository::TourRepository;
use crate::search::{PageRequest, TourFilter, TourPage};
use crate::{CoreError, CoreResult};

/// Read-only view over tours: filtering, pagination, point lookups.
#[derive(Clone)]
pub struct TourQueryService {
    repo: Arc<dyn TourRepository>,
}

impl TourQueryService {
    pub fn new(repo: Arc<dyn TourRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_tours(&self, filter: &TourFilter, page: PageRequest) -> CoreResult<TourPage> {
        let (tours, total) = self.repo.list_tours(filter, page).await?;
        debug!(total, page = page.page, page_size = page.page_size, "tours listed");
        Ok(TourPage::new(tours, total, page))
    }

    pub async fn get_tour(&self, id: i64) -> CoreResult<Tour> {
        self.repo
            .get_tour(id)
            .await?
            .ok_or_else(|| CoreError::tour_not_found(id))
    }

    pub async fn filter_options(&self) -> CoreResult<FilterOptions> {
        self.repo.filter_options().await
    }
}
