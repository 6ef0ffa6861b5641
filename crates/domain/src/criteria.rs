use std::collections::BTreeSet;

use permitra_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Page size applied when a search request does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Produces the set of non-blank, trimmed, de-duplicated identifiers.
///
/// Returns `None` when the input is absent or contains only blank entries, so
/// an all-blank list and a missing list are indistinguishable downstream. For
/// search this means "no filter"; for grant it means "no targets".
#[must_use]
pub fn normalize_identifiers(values: Option<&[String]>) -> Option<BTreeSet<String>> {
    let normalized: BTreeSet<String> = values?
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .collect();

    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Caller-supplied assignment search criteria, before normalization.
///
/// Never persisted; tenant scope is carried separately by the caller context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSearchCriteria {
    /// Optional role identifier filter.
    pub role_ids: Option<Vec<String>>,
    /// Optional permission identifier filter.
    pub permission_ids: Option<Vec<String>>,
    /// Optional application identifier filter, matched through permissions.
    pub app_ids: Option<Vec<String>>,
    /// Optional product name filter, matched through permissions.
    pub product_names: Option<Vec<String>>,
}

impl AssignmentSearchCriteria {
    /// Normalizes every dimension into a filter evaluated by the store.
    #[must_use]
    pub fn normalize(&self) -> AssignmentFilter {
        AssignmentFilter {
            role_ids: normalize_identifiers(self.role_ids.as_deref()),
            permission_ids: normalize_identifiers(self.permission_ids.as_deref()),
            app_ids: normalize_identifiers(self.app_ids.as_deref()),
            product_names: normalize_identifiers(self.product_names.as_deref()),
        }
    }
}

/// Normalized search filter: present dimensions are conjunctive, each one a
/// disjunction over its value set. Absent dimensions impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentFilter {
    /// Role identifiers to match, if constrained.
    pub role_ids: Option<BTreeSet<String>>,
    /// Permission identifiers to match, if constrained.
    pub permission_ids: Option<BTreeSet<String>>,
    /// Application identifiers to match through the permission, if constrained.
    pub app_ids: Option<BTreeSet<String>>,
    /// Product names to match through the permission, if constrained.
    pub product_names: Option<BTreeSet<String>>,
}

impl AssignmentFilter {
    /// Returns `true` when no dimension constrains the result.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.role_ids.is_none()
            && self.permission_ids.is_none()
            && self.app_ids.is_none()
            && self.product_names.is_none()
    }
}

/// Zero-based page request with a positive page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    number: u32,
    size: u32,
}

impl PageRequest {
    /// Creates a page request, rejecting a zero page size.
    pub fn new(number: u32, size: u32) -> AppResult<Self> {
        if size == 0 {
            return Err(AppError::Validation(
                "page size must be greater than zero".to_owned(),
            ));
        }

        Ok(Self { number, size })
    }

    /// Returns the zero-based page number.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Returns the page size.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Returns the number of rows skipped before this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.number) * u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            number: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results with the total match count across all pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page, in stable order.
    pub items: Vec<T>,
    /// Total matching rows independent of pagination.
    pub total_count: u64,
    /// Zero-based page number.
    pub number: u32,
    /// Requested page size.
    pub size: u32,
}
