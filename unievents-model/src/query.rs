//! Listing queries: filtering, sorting and pagination.

use crate::error::ModelError;
use crate::event::{Event, EventId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Events per page on the public listing.
pub const PUBLIC_PAGE_SIZE: usize = 6;
/// Events per page in the admin table.
pub const ADMIN_PAGE_SIZE: usize = 10;

/// Sort order for the public listing.
///
/// The wire names are kept as the listing pages send them: `date` is
/// soonest-first and `date-asc` is latest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "date-asc")]
    DateReversed,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "title-desc")]
    TitleDesc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Date => "date",
            SortOrder::DateReversed => "date-asc",
            SortOrder::Title => "title",
            SortOrder::TitleDesc => "title-desc",
        }
    }

    fn compare(&self, a: &Event, b: &Event) -> Ordering {
        match self {
            SortOrder::Date => a.date.cmp(&b.date),
            SortOrder::DateReversed => b.date.cmp(&a.date),
            SortOrder::Title => compare_titles(&a.title, &b.title),
            SortOrder::TitleDesc => compare_titles(&b.title, &a.title),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" | "" => Ok(SortOrder::Date),
            "date-asc" => Ok(SortOrder::DateReversed),
            "title" => Ok(SortOrder::Title),
            "title-desc" => Ok(SortOrder::TitleDesc),
            other => Err(ModelError::UnknownSort(other.to_string())),
        }
    }
}

fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Public listing query. Only published events are ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQuery {
    pub page: usize,
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: SortOrder,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            page: 1,
            category: None,
            search: None,
            sort: SortOrder::Date,
        }
    }
}

impl EventQuery {
    /// First page, default sort. This is what the offline cache is seeded from.
    pub fn first_page() -> Self {
        Self::default()
    }

    pub fn page(page: usize) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    /// Runs the query over a full event collection.
    pub fn apply(&self, events: &[Event]) -> EventPage {
        let needle = normalized(&self.search).map(str::to_lowercase);
        let category = normalized(&self.category);

        let mut matched: Vec<Event> = events
            .iter()
            .filter(|e| e.published)
            .filter(|e| category.is_none_or(|c| e.has_category(c)))
            .filter(|e| needle.as_deref().is_none_or(|n| e.matches_search(n)))
            .cloned()
            .collect();

        matched.sort_by(|a, b| self.sort.compare(a, b));
        EventPage::paginate(matched, self.page, PUBLIC_PAGE_SIZE)
    }
}

/// Publication filter for the admin table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Published,
    Draft,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "",
            StatusFilter::Published => "published",
            StatusFilter::Draft => "draft",
        }
    }

    fn admits(&self, event: &Event) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Published => event.published,
            StatusFilter::Draft => !event.published,
        }
    }
}

/// Admin listing query. Includes drafts and always sorts soonest-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminQuery {
    pub page: usize,
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: StatusFilter,
}

impl Default for AdminQuery {
    fn default() -> Self {
        Self {
            page: 1,
            search: None,
            category: None,
            status: StatusFilter::All,
        }
    }
}

impl AdminQuery {
    pub fn apply(&self, events: &[Event]) -> EventPage {
        let needle = normalized(&self.search).map(str::to_lowercase);
        let category = normalized(&self.category);

        let mut matched: Vec<Event> = events
            .iter()
            .filter(|e| needle.as_deref().is_none_or(|n| e.matches_search(n)))
            .filter(|e| category.is_none_or(|c| e.has_category(c)))
            .filter(|e| self.status.admits(e))
            .cloned()
            .collect();

        matched.sort_by(|a, b| a.date.cmp(&b.date));
        EventPage::paginate(matched, self.page, ADMIN_PAGE_SIZE)
    }
}

fn normalized(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPage {
    pub events: Vec<Event>,
    pub total_pages: usize,
    pub total_events: usize,
}

impl EventPage {
    /// Slices `events` to the 1-based `page`. Page 0 is treated as page 1.
    pub fn paginate(events: Vec<Event>, page: usize, page_size: usize) -> Self {
        let total_events = events.len();
        let total_pages = total_events.div_ceil(page_size);
        let start = (page.max(1) - 1).saturating_mul(page_size);
        let events = events.into_iter().skip(start).take(page_size).collect();
        Self {
            events,
            total_pages,
            total_events,
        }
    }
}

/// Acknowledgement returned by a remote delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
}
