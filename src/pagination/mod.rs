//! Page-number pagination shared by every list endpoint.
//!
//! A [`PageRequest`] is validated against a [`PaginationConfig`] when it is
//! built; [`paginate`] then cuts one page out of any [`Sliceable`] source and
//! attaches the navigation [`Link`]. Requests past the last page are not an
//! error: they yield an empty page whose `next` is absent and whose `prev`
//! points back at the last real page.

mod query;

pub use query::QuerySource;

use std::convert::Infallible;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("invalid page request: {0}")]
    InvalidPageRequest(String),
    #[error("invalid pagination config: {0}")]
    InvalidConfig(String),
}

/// Default and maximum page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub default_size: u64,
    pub max_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_size: 10,
            max_size: 100,
        }
    }
}

impl PaginationConfig {
    pub fn new(default_size: u64, max_size: u64) -> Result<Self, PaginationError> {
        if default_size == 0 || default_size > max_size {
            return Err(PaginationError::InvalidConfig(format!(
                "default size {default_size} must be between 1 and max size {max_size}"
            )));
        }
        Ok(Self {
            default_size,
            max_size,
        })
    }
}

/// Raw `?page=&size=` query parameters, before validation.
///
/// Signed so that `page=-1` reaches validation and gets a proper
/// `InvalidPageRequest` instead of a deserializer error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// A validated (page, size) pair. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u64,
    size: u64,
}

impl PageRequest {
    pub fn new(page: u64, size: u64, config: &PaginationConfig) -> Result<Self, PaginationError> {
        if page < 1 {
            return Err(PaginationError::InvalidPageRequest(format!(
                "page must be at least 1, got {page}"
            )));
        }
        if size < 1 || size > config.max_size {
            return Err(PaginationError::InvalidPageRequest(format!(
                "size must be between 1 and {}, got {size}",
                config.max_size
            )));
        }
        Ok(Self { page, size })
    }

    pub fn from_query(query: &PageQuery, config: &PaginationConfig) -> Result<Self, PaginationError> {
        let page = non_negative("page", query.page.unwrap_or(1))?;
        let size = non_negative(
            "size",
            query.size.unwrap_or(config.default_size as i64),
        )?;
        Self::new(page, size, config)
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of items that precede this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.size)
    }
}

fn non_negative(field: &str, value: i64) -> Result<u64, PaginationError> {
    u64::try_from(value).map_err(|_| {
        PaginationError::InvalidPageRequest(format!("{field} must be at least 1, got {value}"))
    })
}

/// Navigation metadata for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub first: u64,
    pub last: u64,
    pub current: u64,
    pub next: Option<u64>,
    pub prev: Option<u64>,
}

impl Link {
    pub fn new(current: u64, last: u64) -> Self {
        let next = current.checked_add(1).filter(|n| *n <= last);
        // Past the end, `prev` still leads back to a page that has data.
        let prev = current
            .checked_sub(1)
            .filter(|p| *p >= 1)
            .map(|p| p.min(last));

        Self {
            first: 1,
            last,
            current,
            next,
            prev,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub pages: Link,
}

impl<T> PageResponse<T> {
    pub fn new(data: Vec<T>, pages: Link) -> Self {
        Self { data, pages }
    }

    /// Convert the items (e.g. entity models into response DTOs), keeping the links.
    pub fn map<U, F>(self, f: F) -> PageResponse<U>
    where
        F: FnMut(T) -> U,
    {
        PageResponse {
            data: self.data.into_iter().map(f).collect(),
            pages: self.pages,
        }
    }
}

/// Total number of pages. An empty collection still has one (empty) page.
pub fn page_count(total: u64, size: u64) -> u64 {
    if total == 0 {
        1
    } else {
        total.div_ceil(size)
    }
}

/// Anything that can report its length and hand out a bounded window of items.
#[allow(async_fn_in_trait)]
pub trait Sliceable {
    type Item;
    type Error;

    async fn total(&self) -> Result<u64, Self::Error>;

    /// Up to `limit` items starting at `offset`. Windows past the end are empty.
    async fn fetch(&self, offset: u64, limit: u64) -> Result<Vec<Self::Item>, Self::Error>;
}

impl<T: Clone> Sliceable for [T] {
    type Item = T;
    type Error = Infallible;

    async fn total(&self) -> Result<u64, Infallible> {
        Ok(self.len() as u64)
    }

    async fn fetch(&self, offset: u64, limit: u64) -> Result<Vec<T>, Infallible> {
        Ok(window(self, offset, limit).to_vec())
    }
}

impl<T: Clone> Sliceable for Vec<T> {
    type Item = T;
    type Error = Infallible;

    async fn total(&self) -> Result<u64, Infallible> {
        self.as_slice().total().await
    }

    async fn fetch(&self, offset: u64, limit: u64) -> Result<Vec<T>, Infallible> {
        self.as_slice().fetch(offset, limit).await
    }
}

fn window<T>(items: &[T], offset: u64, limit: u64) -> &[T] {
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(items.len());
    let len = usize::try_from(limit).unwrap_or(usize::MAX);
    let end = start.saturating_add(len).min(items.len());
    &items[start..end]
}

/// Cut the requested page out of `source`.
///
/// Only the count and, when the page exists, a single window are read from
/// the source.
pub async fn paginate<S>(
    request: &PageRequest,
    source: &S,
) -> Result<PageResponse<S::Item>, S::Error>
where
    S: Sliceable + ?Sized,
{
    let total = source.total().await?;
    let last = page_count(total, request.size());

    let data = if total == 0 || request.page() > last {
        Vec::new()
    } else {
        source.fetch(request.offset(), request.size()).await?
    };

    Ok(PageResponse::new(data, Link::new(request.page(), last)))
}

/// Synchronous shortcut for in-memory collections.
pub fn paginate_slice<T: Clone>(request: &PageRequest, items: &[T]) -> PageResponse<T> {
    let last = page_count(items.len() as u64, request.size());
    let data = if request.page() > last {
        Vec::new()
    } else {
        window(items, request.offset(), request.size()).to_vec()
    };

    PageResponse::new(data, Link::new(request.page(), last))
}
