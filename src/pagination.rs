// Copyright (c) Fizzgrid Team
// SPDX-License-Identifier: Apache-2.0

use crate::error::ApiError;

/// Resolved page window over an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Effective 1-based page number after clamping.
    pub page: i64,
    pub num_pages: i64,
    pub offset: i64,
    pub limit: i64,
}

/// Compute the window for a 1-based `requested` page. `num_pages` is
/// `ceil(total / per_page)` with a floor of one page; out-of-range requests
/// are clamped into `[1, num_pages]`.
pub fn paginate(total: i64, per_page: i64, requested: i64) -> Page {
    let num_pages = ((total + per_page - 1) / per_page).max(1);
    let page = requested.clamp(1, num_pages);

    Page {
        page,
        num_pages,
        offset: (page - 1) * per_page,
        limit: per_page,
    }
}

/// Parse an optional `page` query value, defaulting to page 1.
pub fn parse_page(raw: Option<&str>) -> Result<i64, ApiError> {
    match raw {
        None | Some("") => Ok(1),
        Some(s) => s
            .parse::<i64>()
            .map_err(|_| ApiError::BadRequest("page must be an integer".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_still_has_one_page() {
        let page = paginate(0, 10, 1);
        assert_eq!(page.num_pages, 1);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn num_pages_is_ceiling_of_total_over_size() {
        assert_eq!(paginate(60, 6, 1).num_pages, 10);
        assert_eq!(paginate(61, 6, 1).num_pages, 11);
        assert_eq!(paginate(5, 6, 1).num_pages, 1);
    }

    #[test]
    fn page_n_covers_the_expected_slice() {
        // Page N of size 6 must start at (N-1)*6.
        let page = paginate(100, 6, 3);
        assert_eq!(page.offset, 12);
        assert_eq!(page.limit, 6);
    }

    #[test]
    fn out_of_range_pages_are_clamped() {
        assert_eq!(paginate(25, 10, 99).page, 3);
        assert_eq!(paginate(25, 10, 0).page, 1);
        assert_eq!(paginate(25, 10, -4).page, 1);
    }

    #[test]
    fn parse_page_defaults_and_rejects() {
        assert_eq!(parse_page(None).unwrap(), 1);
        assert_eq!(parse_page(Some("")).unwrap(), 1);
        assert_eq!(parse_page(Some("7")).unwrap(), 7);
        assert!(parse_page(Some("seven")).is_err());
        assert!(parse_page(Some("2.5")).is_err());
    }
}
