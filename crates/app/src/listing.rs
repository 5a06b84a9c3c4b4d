//! Search, sort and pagination over loaded customers.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rubico_core::Customer;

/// Customers shown per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Order of the customer list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest first.
    #[default]
    Recent,
    /// Oldest first.
    Oldest,
    /// By name, A to Z.
    NameAsc,
    /// By name, Z to A.
    NameDesc,
}

impl SortOrder {
    pub const ALL: [Self; 4] = [Self::Recent, Self::Oldest, Self::NameAsc, Self::NameDesc];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Oldest => "oldest",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Recent => "Most Recent",
            Self::Oldest => "Oldest First",
            Self::NameAsc => "Name (A-Z)",
            Self::NameDesc => "Name (Z-A)",
        }
    }

    fn compare(self, a: &Customer, b: &Customer) -> Ordering {
        match self {
            Self::Recent => b.created_at.cmp(&a.created_at),
            Self::Oldest => a.created_at.cmp(&b.created_at),
            Self::NameAsc => compare_names(a, b),
            Self::NameDesc => compare_names(b, a),
        }
    }
}

fn compare_names(a: &Customer, b: &Customer) -> Ordering {
    a.full_name
        .to_lowercase()
        .cmp(&b.full_name.to_lowercase())
        .then_with(|| a.full_name.cmp(&b.full_name))
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown sort order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort order {0:?} (expected recent, oldest, name-asc or name-desc)")]
pub struct ParseSortOrderError(String);

impl FromStr for SortOrder {
    type Err = ParseSortOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|order| order.as_str() == s)
            .ok_or_else(|| ParseSortOrderError(s.to_owned()))
    }
}

/// What part of the customer list to show.
///
/// Changing the search text or the sort order goes back to page 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerQuery {
    search: String,
    sort: SortOrder,
    page: usize,
    page_size: usize,
}

impl Default for CustomerQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl CustomerQuery {
    /// First page, no search, newest first. A zero page size is treated as 1.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            sort: SortOrder::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    #[must_use]
    pub const fn sort(&self) -> SortOrder {
        self.sort
    }

    /// The requested page, 1-based. May be past the end; see [`CustomerQuery::apply`].
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub const fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
        self.page = 1;
    }

    /// Request a page. Zero is treated as 1.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.set_search(search);
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.set_sort(sort);
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: usize) -> Self {
        self.set_page(page);
        self
    }

    /// Whether `customer` matches the search text.
    ///
    /// Name and email match case-insensitively; phone matches the raw text.
    /// An empty search matches everything.
    #[must_use]
    pub fn matches(&self, customer: &Customer) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();

        customer.full_name.to_lowercase().contains(&needle)
            || customer
                .email
                .as_ref()
                .is_some_and(|e| e.as_str().to_lowercase().contains(&needle))
            || customer
                .phone
                .as_ref()
                .is_some_and(|p| p.as_str().contains(&self.search))
    }

    /// Filter, sort and slice `customers`.
    ///
    /// A page past the end is clamped to the last page.
    #[must_use]
    pub fn apply<'a>(&self, customers: &'a [Customer]) -> CustomerPage<'a> {
        let mut matched: Vec<&Customer> = customers.iter().filter(|c| self.matches(c)).collect();
        matched.sort_by(|a, b| self.sort.compare(a, b));

        let total_matches = matched.len();
        let total_pages = total_matches.div_ceil(self.page_size);
        let page = self.page.clamp(1, total_pages.max(1));

        let items = matched
            .into_iter()
            .skip((page - 1) * self.page_size)
            .take(self.page_size)
            .collect();

        CustomerPage {
            items,
            page,
            total_pages,
            total_matches,
        }
    }
}

/// One page of the customer list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerPage<'a> {
    pub items: Vec<&'a Customer>,
    /// The page actually shown, 1-based.
    pub page: usize,
    /// Zero when nothing matches.
    pub total_pages: usize,
    pub total_matches: usize,
}

impl CustomerPage<'_> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// "Showing X of Y customers".
    #[must_use]
    pub fn summary(&self) -> String {
        let noun = if self.total_matches == 1 {
            "customer"
        } else {
            "customers"
        };
        format!("Showing {} of {} {noun}", self.items.len(), self.total_matches)
    }
}
