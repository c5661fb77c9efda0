use serde::{Deserialize, Serialize};

use crate::models::{BookingStatus, BookingType};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Filters and paging for a user's booking history.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingQuery {
    pub status: Option<BookingStatus>,
    #[serde(rename = "type")]
    pub booking_type: Option<BookingType>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl BookingQuery {
    pub fn page(&self) -> u32 {
        self.page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> u32 {
        self.limit
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT)
    }

    pub fn offset(&self) -> u32 {
        (self.page() - 1).saturating_mul(self.limit())
    }

    pub fn matches(&self, status: BookingStatus, booking_type: BookingType) -> bool {
        self.status.map_or(true, |s| s == status)
            && self.booking_type.map_or(true, |t| t == booking_type)
    }
}

/// One page of results plus the unpaged total.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit as u64)
    }

    /// Slice an already-filtered, already-sorted list.
    pub fn from_sorted(all: Vec<T>, query: &BookingQuery) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect();
        Self {
            items,
            total,
            page: query.page(),
            limit: query.limit(),
        }
    }
}
