//! This modules defines the common functionality for paging data.

use serde::Deserialize;

/// The config for pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    /// The number of records to return when the request does not specify a limit.
    pub default_limit: u64,
    /// The most records a single request may return.
    pub max_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 100,
            max_limit: 1000,
        }
    }
}

/// The `skip`/`limit` query parameters of a list request.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct PageQuery {
    /// The number of records to skip.
    pub skip: Option<u64>,
    /// The maximum number of records to return.
    pub limit: Option<u64>,
}

/// A validated window into a list of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

impl PageQuery {
    /// Fill in missing values from `config` and cap the limit at
    /// [PaginationConfig::max_limit].
    pub fn resolve(self, config: &PaginationConfig) -> Page {
        let limit = self
            .limit
            .unwrap_or(config.default_limit)
            .min(config.max_limit);

        Page {
            offset: self.skip.unwrap_or(0),
            limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Page, PageQuery, PaginationConfig};

    #[test]
    fn uses_defaults_when_empty() {
        let page = PageQuery::default().resolve(&PaginationConfig::default());

        assert_eq!(
            page,
            Page {
                offset: 0,
                limit: 100
            }
        );
    }

    #[test]
    fn caps_limit() {
        let query = PageQuery {
            skip: Some(5),
            limit: Some(1_000_000),
        };

        let page = query.resolve(&PaginationConfig::default());

        assert_eq!(
            page,
            Page {
                offset: 5,
                limit: 1000
            }
        );
    }

    #[test]
    fn keeps_zero_limit() {
        let query = PageQuery {
            skip: None,
            limit: Some(0),
        };

        let page = query.resolve(&PaginationConfig::default());

        assert_eq!(page.limit, 0);
    }
}
