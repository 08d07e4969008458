//! Page selection
//!
//! Parses user-facing page specifications (`"1-3,4-5"`, `"2,1,3"`, `"2,4"`) into
//! typed [`PageSpec`] values and resolves them against a document's page count
//! into a [`PagePlan`]: the 0-based, bounds-checked list of pages that make up
//! an output document.
//!
//! User input is always 1-based. Conversion to 0-based indices happens only in
//! `resolve`, after every page number has been checked against the document.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing or resolving a page specification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageSpecError {
    /// The specification string could not be parsed into page numbers
    #[error("Malformed page specification: {0}")]
    Malformed(String),

    /// A range whose start page comes after its end page
    #[error("Invalid page range {start}-{end}: start is greater than end")]
    ReversedRange { start: i64, end: i64 },

    /// A page number below 1 or beyond the last page
    #[error("Page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: i64, page_count: usize },
}

/// Inclusive, 1-based page range as typed by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: i64,
    pub end: i64,
}

impl PageRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    fn resolve(&self, page_count: usize) -> Result<PagePlan, PageSpecError> {
        if self.start > self.end {
            return Err(PageSpecError::ReversedRange {
                start: self.start,
                end: self.end,
            });
        }
        let first = to_index(self.start, page_count)?;
        let last = to_index(self.end, page_count)?;
        Ok(PagePlan((first..=last).collect()))
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Ordered list of page ranges, e.g. `"1-3,4-5"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeList(Vec<PageRange>);

impl RangeList {
    pub fn new(ranges: Vec<PageRange>) -> Self {
        Self(ranges)
    }

    /// Parse a comma-separated list of `start-end` entries
    pub fn parse(s: &str) -> Result<Self, PageSpecError> {
        let ranges = split_entries(s)?
            .map(|entry| {
                let bounds: Vec<&str> = entry.split('-').collect();
                match bounds.as_slice() {
                    [start, end] => Ok(PageRange::new(parse_page(start)?, parse_page(end)?)),
                    _ => Err(PageSpecError::Malformed(format!(
                        "expected `start-end`, got `{}`",
                        entry.trim()
                    ))),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(ranges))
    }

    pub fn ranges(&self) -> &[PageRange] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve every range, concatenated in input order
    pub fn resolve(&self, page_count: usize) -> Result<PagePlan, PageSpecError> {
        let mut plan = Vec::new();
        for part in self.resolve_parts(page_count)? {
            plan.extend(part.0);
        }
        Ok(PagePlan(plan))
    }

    /// Resolve each range into its own plan, one per output document
    pub fn resolve_parts(&self, page_count: usize) -> Result<Vec<PagePlan>, PageSpecError> {
        self.0
            .iter()
            .map(|range| range.resolve(page_count))
            .collect()
    }
}

impl FromStr for RangeList {
    type Err = PageSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Explicit output order, e.g. `"3,1,2"`. Repeated pages are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderList(Vec<i64>);

impl OrderList {
    pub fn new(pages: Vec<i64>) -> Self {
        Self(pages)
    }

    pub fn parse(s: &str) -> Result<Self, PageSpecError> {
        Ok(Self(split_entries(s)?.map(parse_page).collect::<Result<_, _>>()?))
    }

    pub fn pages(&self) -> &[i64] {
        &self.0
    }

    pub fn resolve(&self, page_count: usize) -> Result<PagePlan, PageSpecError> {
        self.0
            .iter()
            .map(|&page| to_index(page, page_count))
            .collect::<Result<Vec<_>, _>>()
            .map(PagePlan)
    }
}

impl FromStr for OrderList {
    type Err = PageSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Pages to drop from the output, e.g. `"2,4"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteSet(BTreeSet<i64>);

impl DeleteSet {
    pub fn new(pages: impl IntoIterator<Item = i64>) -> Self {
        Self(pages.into_iter().collect())
    }

    pub fn parse(s: &str) -> Result<Self, PageSpecError> {
        Ok(Self(split_entries(s)?.map(parse_page).collect::<Result<_, _>>()?))
    }

    pub fn pages(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }

    /// Keep every page not listed, in ascending order
    pub fn resolve(&self, page_count: usize) -> Result<PagePlan, PageSpecError> {
        let excluded = self
            .0
            .iter()
            .map(|&page| to_index(page, page_count))
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(PagePlan(
            (0..page_count)
                .filter(|index| !excluded.contains(index))
                .collect(),
        ))
    }
}

impl FromStr for DeleteSet {
    type Err = PageSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A user-supplied page selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSpec {
    Ranges(RangeList),
    Order(OrderList),
    Delete(DeleteSet),
}

impl PageSpec {
    pub fn resolve(&self, page_count: usize) -> Result<PagePlan, PageSpecError> {
        match self {
            PageSpec::Ranges(ranges) => ranges.resolve(page_count),
            PageSpec::Order(order) => order.resolve(page_count),
            PageSpec::Delete(pages) => pages.resolve(page_count),
        }
    }
}

impl From<RangeList> for PageSpec {
    fn from(ranges: RangeList) -> Self {
        PageSpec::Ranges(ranges)
    }
}

impl From<OrderList> for PageSpec {
    fn from(order: OrderList) -> Self {
        PageSpec::Order(order)
    }
}

impl From<DeleteSet> for PageSpec {
    fn from(pages: DeleteSet) -> Self {
        PageSpec::Delete(pages)
    }
}

/// Resolved, 0-based page indices, each `< page_count` of the document it was
/// resolved against
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PagePlan(Vec<usize>);

impl PagePlan {
    /// Every page in original order
    pub fn full(page_count: usize) -> Self {
        Self((0..page_count).collect())
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }
}

fn split_entries(s: &str) -> Result<impl Iterator<Item = &str>, PageSpecError> {
    if s.trim().is_empty() {
        return Err(PageSpecError::Malformed("empty specification".to_string()));
    }
    Ok(s.split(','))
}

fn parse_page(token: &str) -> Result<i64, PageSpecError> {
    let token = token.trim();
    token
        .parse::<i64>()
        .map_err(|_| PageSpecError::Malformed(format!("`{token}` is not a page number")))
}

fn to_index(page: i64, page_count: usize) -> Result<usize, PageSpecError> {
    if page < 1 || page as u64 > page_count as u64 {
        return Err(PageSpecError::PageOutOfRange { page, page_count });
    }
    Ok((page - 1) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_range_list_parsing() {
        let ranges = RangeList::parse("1-3,4-5").unwrap();
        assert_eq!(
            ranges.ranges(),
            &[PageRange::new(1, 3), PageRange::new(4, 5)]
        );

        let ranges: RangeList = " 2 - 2 , 7-9 ".parse().unwrap();
        assert_eq!(
            ranges.ranges(),
            &[PageRange::new(2, 2), PageRange::new(7, 9)]
        );
    }

    #[test]
    fn test_malformed_ranges() {
        for input in ["", "  ", "1", "1-", "-3", "1-2-3", "a-b", "1-3,", "1-3,,4-5", "1..3"] {
            assert!(
                matches!(RangeList::parse(input), Err(PageSpecError::Malformed(_))),
                "`{input}` should be malformed"
            );
        }
    }

    #[test]
    fn test_range_resolution() {
        let plan = RangeList::parse("1-2,3-3").unwrap().resolve(3).unwrap();
        assert_eq!(plan.indices(), &[0, 1, 2]);

        let parts = RangeList::parse("1-2,3-3").unwrap().resolve_parts(3).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].indices(), &[0, 1]);
        assert_eq!(parts[1].indices(), &[2]);
    }

    #[test]
    fn test_ranges_keep_order_and_overlaps() {
        let plan = RangeList::parse("3-4,1-2,2-3").unwrap().resolve(4).unwrap();
        assert_eq!(plan.indices(), &[2, 3, 0, 1, 1, 2]);
    }

    #[test]
    fn test_range_out_of_bounds() {
        let err = RangeList::parse("5-6").unwrap().resolve(3).unwrap_err();
        assert_eq!(
            err,
            PageSpecError::PageOutOfRange {
                page: 5,
                page_count: 3
            }
        );

        let err = RangeList::parse("0-2").unwrap().resolve(3).unwrap_err();
        assert!(matches!(err, PageSpecError::PageOutOfRange { page: 0, .. }));

        let err = RangeList::parse("2-4").unwrap().resolve(3).unwrap_err();
        assert!(matches!(err, PageSpecError::PageOutOfRange { page: 4, .. }));
    }

    #[test]
    fn test_reversed_range() {
        let err = RangeList::parse("3-1").unwrap().resolve(5).unwrap_err();
        assert_eq!(err, PageSpecError::ReversedRange { start: 3, end: 1 });
    }

    #[test]
    fn test_order_list() {
        let plan = OrderList::parse("3,1,2").unwrap().resolve(3).unwrap();
        assert_eq!(plan.indices(), &[2, 0, 1]);

        let plan = OrderList::parse("1, 1 ,2").unwrap().resolve(2).unwrap();
        assert_eq!(plan.indices(), &[0, 0, 1]);

        assert!(matches!(
            OrderList::parse("2,x"),
            Err(PageSpecError::Malformed(_))
        ));
        assert!(matches!(
            OrderList::parse("0,1").unwrap().resolve(2),
            Err(PageSpecError::PageOutOfRange { page: 0, .. })
        ));
        assert!(matches!(
            OrderList::parse("-1").unwrap().resolve(2),
            Err(PageSpecError::PageOutOfRange { page: -1, .. })
        ));
    }

    #[test]
    fn test_delete_set() {
        let plan = DeleteSet::parse("2").unwrap().resolve(3).unwrap();
        assert_eq!(plan.indices(), &[0, 2]);

        let repeated = DeleteSet::parse("2,2").unwrap().resolve(3).unwrap();
        assert_eq!(repeated, plan);

        let plan = DeleteSet::parse("1,2,3").unwrap().resolve(3).unwrap();
        assert!(plan.is_empty());

        assert!(matches!(
            DeleteSet::parse("4").unwrap().resolve(3),
            Err(PageSpecError::PageOutOfRange { page: 4, .. })
        ));
    }

    #[test]
    fn test_page_spec_dispatch() {
        let spec = PageSpec::from(OrderList::new(vec![2, 1]));
        assert_eq!(spec.resolve(2).unwrap().indices(), &[1, 0]);

        let spec = PageSpec::from(DeleteSet::new([1]));
        assert_eq!(spec.resolve(2).unwrap().indices(), &[1]);

        let spec = PageSpec::from(RangeList::new(vec![PageRange::new(1, 2)]));
        assert_eq!(spec.resolve(2).unwrap(), PagePlan::full(2));
    }

    #[test]
    fn test_empty_document() {
        assert!(RangeList::parse("1-1").unwrap().resolve(0).is_err());
        assert!(DeleteSet::parse("1").unwrap().resolve(0).is_err());
    }

    mod properties {
        use crate::pages::{DeleteSet, OrderList, PageRange, RangeList};
        use proptest::prelude::*;
        use std::collections::BTreeSet;

        fn ranges_within(page_count: usize) -> impl Strategy<Value = Vec<(i64, i64)>> {
            prop::collection::vec(
                (1..=page_count as i64).prop_flat_map(move |start| {
                    (Just(start), start..=page_count as i64)
                }),
                1..8,
            )
        }

        proptest! {
            #[test]
            fn range_plan_length_is_sum_of_ranges(
                (page_count, ranges) in (1usize..40).prop_flat_map(|n| (Just(n), ranges_within(n)))
            ) {
                let list = RangeList::new(
                    ranges.iter().map(|&(s, e)| PageRange::new(s, e)).collect(),
                );
                let plan = list.resolve(page_count).unwrap();

                let expected: usize = ranges.iter().map(|&(s, e)| (e - s + 1) as usize).sum();
                prop_assert_eq!(plan.len(), expected);

                let mut offset = 0;
                for &(start, end) in &ranges {
                    for (i, page) in (start..=end).enumerate() {
                        prop_assert_eq!(plan.indices()[offset + i], (page - 1) as usize);
                    }
                    offset += (end - start + 1) as usize;
                }
            }

            #[test]
            fn order_plan_preserves_input(
                (page_count, order) in (1usize..40).prop_flat_map(|n| {
                    (Just(n), prop::collection::vec(1..=n as i64, 1..30))
                })
            ) {
                let plan = OrderList::new(order.clone()).resolve(page_count).unwrap();
                prop_assert_eq!(plan.len(), order.len());
                for (index, page) in plan.iter().zip(&order) {
                    prop_assert_eq!(index as i64, page - 1);
                }
            }

            #[test]
            fn delete_plan_is_ascending_complement(
                (page_count, deleted) in (1usize..40).prop_flat_map(|n| {
                    (Just(n), prop::collection::vec(1..=n as i64, 0..30))
                })
            ) {
                let set = DeleteSet::new(deleted.iter().copied());
                let plan = set.resolve(page_count).unwrap();

                let distinct: BTreeSet<i64> = deleted.iter().copied().collect();
                prop_assert_eq!(plan.len(), page_count - distinct.len());
                prop_assert!(plan.indices().windows(2).all(|w| w[0] < w[1]));
                for index in plan.iter() {
                    prop_assert!(!distinct.contains(&(index as i64 + 1)));
                }
            }

            #[test]
            fn out_of_range_pages_are_rejected(page_count in 0usize..20, extra in 1i64..10) {
                let page = page_count as i64 + extra;
                prop_assert!(OrderList::new(vec![page]).resolve(page_count).is_err());
                prop_assert!(DeleteSet::new([page]).resolve(page_count).is_err());
                prop_assert!(RangeList::new(vec![PageRange::new(1, page)]).resolve(page_count).is_err());
            }
        }
    }
}
