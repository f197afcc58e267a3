//! Skip/limit pagination

use serde::Deserialize;
use thiserror::Error;

/// `skip` and `limit` as they arrive on the query string.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PageError {
    #[error("limit must be at least 1")]
    ZeroLimit,
}

/// Resolved window over a result set: skip first, then take up to `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Page {
    /// Missing limit falls back to `default_limit`; oversized limits are
    /// clamped to `max_limit`.
    pub fn resolve(params: PageParams, default_limit: u32, max_limit: u32) -> Result<Self, PageError> {
        let limit = match params.limit {
            Some(0) => return Err(PageError::ZeroLimit),
            Some(limit) => limit.min(max_limit),
            None => default_limit,
        };
        Ok(Self {
            skip: params.skip.unwrap_or(0),
            limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let page = Page::resolve(PageParams::default(), 100, 1000).unwrap();
        assert_eq!(page, Page { skip: 0, limit: 100 });
    }

    #[test]
    fn clamps_limit() {
        let params = PageParams {
            skip: Some(5),
            limit: Some(5000),
        };
        assert_eq!(
            Page::resolve(params, 100, 1000).unwrap(),
            Page { skip: 5, limit: 1000 }
        );
    }

    #[test]
    fn zero_limit_is_rejected() {
        let params = PageParams {
            skip: None,
            limit: Some(0),
        };
        assert_eq!(Page::resolve(params, 100, 1000), Err(PageError::ZeroLimit));
    }
}
