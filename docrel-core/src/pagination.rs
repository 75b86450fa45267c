//! Skip/limit windows for list queries

/// Page size of the book listing.
pub const BOOKS_PER_PAGE: u64 = 10;

/// Default `first` for the dealer listing.
pub const DEFAULT_FIRST: u64 = 10;

/// How many matching documents to skip and return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    /// Documents skipped from the start of the result
    pub skip: u64,
    /// Maximum returned, `None` for all remaining
    pub limit: Option<u64>,
}

impl Pagination {
    /// Everything.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Skip `after`, return at most `first`.
    pub fn window(after: u64, first: u64) -> Self {
        Self {
            skip: after,
            limit: Some(first),
        }
    }

    /// Zero-indexed fixed-size page. A fractional page starts at the floor of
    /// `page * per_page`.
    pub fn page(page: f64, per_page: u64) -> Self {
        Self {
            skip: (page * per_page as f64).floor() as u64,
            limit: Some(per_page),
        }
    }

    /// Apply to an already-ordered sequence.
    pub fn apply<T>(&self, items: impl Iterator<Item = T>) -> Vec<T> {
        let skipped = items.skip(usize::try_from(self.skip).unwrap_or(usize::MAX));
        match self.limit {
            Some(limit) => skipped
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .collect(),
            None => skipped.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offset_calculation() {
        assert_eq!(Pagination::page(0.0, 10).skip, 0);
        assert_eq!(Pagination::page(2.0, 10).skip, 20);
        assert_eq!(Pagination::page(3.0, 25).skip, 75);
    }

    #[test]
    fn fractional_page_floors_offset() {
        assert_eq!(Pagination::page(1.55, 10), Pagination::window(15, 10));
        assert_eq!(Pagination::page(0.05, 10).skip, 0);
    }

    #[test]
    fn page_offset_saturates() {
        assert_eq!(Pagination::page(f64::MAX, 10).skip, u64::MAX);
    }

    #[test]
    fn window_applies() {
        let items = Pagination::window(2, 3).apply(0..10);
        assert_eq!(items, vec![2, 3, 4]);
    }

    #[test]
    fn unbounded_returns_rest() {
        let items = Pagination::unbounded().apply(0..4);
        assert_eq!(items, vec![0, 1, 2, 3]);

        let items = Pagination { skip: 3, limit: None }.apply(0..4);
        assert_eq!(items, vec![3]);
    }
}
