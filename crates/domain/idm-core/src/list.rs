//! Client side ordering and pagination of the domain list.

use std::cmp::Ordering;

use crate::Domain;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Type,
    AutoJoin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

pub const AUTO_JOIN_ENABLED: &str = "Enabled";
pub const AUTO_JOIN_DISABLED: &str = "Disabled";

pub fn auto_join_label(domain: &Domain) -> &'static str {
    if domain.auto_join() {
        AUTO_JOIN_ENABLED
    } else {
        AUTO_JOIN_DISABLED
    }
}

fn sort_key(domain: &Domain, column: SortColumn) -> &str {
    match column {
        SortColumn::Name => domain.title_or_empty(),
        SortColumn::Type => domain.domain_type.as_str(),
        SortColumn::AutoJoin => auto_join_label(domain),
    }
}

pub fn compare(a: &Domain, b: &Domain, column: SortColumn, direction: SortDirection) -> Ordering {
    let ord = sort_key(a, column).cmp(sort_key(b, column));
    match direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

/// Stable sort, so rows with equal keys keep the server's order.
pub fn sort_domains(domains: &mut [Domain], column: SortColumn, direction: SortDirection) {
    domains.sort_by(|a, b| compare(a, b, column, direction));
}

/// One page request against the list endpoint. `number` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub per_page: u32,
}

impl Page {
    pub fn new(number: u32, per_page: u32) -> Self {
        Self {
            number: number.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn offset(&self) -> u32 {
        self.number.saturating_sub(1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> u32 {
        self.per_page
    }

    /// Changing the page size always starts over at the first page.
    pub fn with_per_page(self, per_page: u32) -> Self {
        Self::new(1, per_page)
    }

    pub fn with_number(self, number: u32) -> Self {
        Self::new(number, self.per_page)
    }

    pub fn page_count(&self, total: i64) -> u32 {
        if total <= 0 {
            return 0;
        }
        let total = total as u64;
        let per = u64::from(self.per_page);
        total.div_ceil(per) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(id: &str, title: Option<&str>, auto: Option<bool>) -> Domain {
        Domain {
            domain_id: id.into(),
            title: title.map(Into::into),
            auto_enrollment_enabled: auto,
            ..Default::default()
        }
    }

    #[test]
    fn sorts_by_title_with_missing_titles_first() {
        let mut v = vec![
            domain("1", Some("beta"), None),
            domain("2", None, None),
            domain("3", Some("alpha"), None),
        ];
        sort_domains(&mut v, SortColumn::Name, SortDirection::Asc);
        let ids: Vec<_> = v.iter().map(|d| d.domain_id.as_str()).collect();
        assert_eq!(ids, ["2", "3", "1"]);

        sort_domains(&mut v, SortColumn::Name, SortDirection::Desc);
        let ids: Vec<_> = v.iter().map(|d| d.domain_id.as_str()).collect();
        assert_eq!(ids, ["1", "3", "2"]);
    }

    #[test]
    fn auto_join_sorts_by_label() {
        let mut v = vec![
            domain("on", Some("a"), Some(true)),
            domain("off", Some("b"), Some(false)),
            domain("unset", Some("c"), None),
        ];
        sort_domains(&mut v, SortColumn::AutoJoin, SortDirection::Asc);
        let ids: Vec<_> = v.iter().map(|d| d.domain_id.as_str()).collect();
        assert_eq!(ids, ["off", "unset", "on"]);
    }

    #[test]
    fn page_offsets() {
        let p = Page::new(3, 10);
        assert_eq!(p.offset(), 20);
        assert_eq!(p.limit(), 10);
        let resized = p.with_per_page(50);
        assert_eq!(resized.number, 1);
        assert_eq!(resized.offset(), 0);
        assert_eq!(Page::new(0, 0), Page::new(1, 1));
    }

    #[test]
    fn huge_page_numbers_saturate() {
        assert_eq!(Page::new(u32::MAX, 10).offset(), u32::MAX);
        assert_eq!(Page::new(u32::MAX, 1).offset(), u32::MAX - 1);
    }

    #[test]
    fn page_count_rounds_up() {
        let p = Page::new(1, 10);
        assert_eq!(p.page_count(0), 0);
        assert_eq!(p.page_count(10), 1);
        assert_eq!(p.page_count(11), 2);
    }
}
