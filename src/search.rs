//! Client-side search over the materialized page.
//!
//! Search never leaves the rows it is given: it is local to the page the
//! [`PageCache`](crate::cache::PageCache) currently holds.
use crate::dataset::{CellValue, Dataset, Row};
use either::Either;
use std::collections::HashSet;

/// Criteria for selecting rows from a page.
#[derive(Clone, Debug)]
pub struct SearchCriteria {
    /// Lowercased query; `None` (blank input) selects every row.
    query: Option<String>,

    /// Null literals excluded from matching (default: empty string).
    nulls: HashSet<String>,
}

impl SearchCriteria {
    pub fn new(query: &str) -> Self {
        Self {
            query: (!query.trim().is_empty()).then(|| query.to_lowercase()),
            nulls: HashSet::from([String::new()]),
        }
    }

    /// Adds literals that should count as missing, such as `"NULL"` or `"n/a"`.
    pub fn with_nulls<I, S>(mut self, nulls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nulls.extend(nulls.into_iter().map(Into::into));
        self
    }

    /// Returns true if the criteria keep every row.
    pub fn is_identity(&self) -> bool {
        self.query.is_none()
    }

    /// Checks if any non-missing value in `cells` contains the query, ignoring case.
    fn matches<'v>(&self, cells: impl Iterator<Item = &'v CellValue>) -> bool {
        match &self.query {
            None => true,
            Some(query) => cells
                .filter_map(CellValue::display_text)
                .filter(|text| !self.nulls.contains(text))
                .any(|text| text.to_lowercase().contains(query.as_str())),
        }
    }

    /// Checks if any non-missing field of `row` contains the query, ignoring case.
    pub fn accept(&self, row: &Row) -> bool {
        self.matches(row.values())
    }

    /// Same as [`SearchCriteria::accept`], looking only at the columns in `headers`.
    pub fn accept_columns(&self, headers: &[String], row: &Row) -> bool {
        self.matches(headers.iter().map(|column| row.get(column)))
    }

    /// Lazily yields the accepted rows in their original order.
    pub fn filter_iter<'s, 'a: 's>(&'s self, rows: &'a [Row]) -> impl Iterator<Item = &'a Row> + 's {
        if self.is_identity() {
            Either::Left(rows.iter())
        } else {
            Either::Right(rows.iter().filter(move |row| self.accept(row)))
        }
    }
}

/// Rows of `rows` matching `query`, order preserved; an empty or blank query returns all rows.
pub fn filter<'a>(rows: &'a [Row], query: &str) -> Vec<&'a Row> {
    let criteria = SearchCriteria::new(query);
    rows.iter().filter(|row| criteria.accept(row)).collect()
}

/// Rows of `page` matching `query` in one of its header columns.
///
/// Keys a row carries outside `page.headers` are not displayed and never match.
pub fn filter_page<'a>(page: &'a Dataset, query: &str) -> Vec<&'a Row> {
    let criteria = SearchCriteria::new(query);
    page.rows
        .iter()
        .filter(|row| criteria.accept_columns(&page.headers, row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn rows() -> Vec<Row> {
        vec![
            Row::from_iter([("id", CellValue::from(1)), ("city", CellValue::from("Lima")), ("revenue", CellValue::from(100))]),
            Row::from_iter([("id", CellValue::from(2)), ("city", CellValue::Null), ("revenue", CellValue::from(250.5))]),
            Row::from_iter([("id", CellValue::from(3)), ("city", CellValue::from("Quito")), ("revenue", CellValue::from(""))]),
        ]
    }

    #[test]
    fn empty_query_is_identity() {
        let rows = rows();
        assert_eq!(filter(&rows, ""), rows.iter().collect::<Vec<_>>());
        assert_eq!(filter(&rows, "   "), rows.iter().collect::<Vec<_>>());
    }

    #[test]
    fn case_insensitive_substring_on_any_field() {
        let rows = rows();
        assert_eq!(filter(&rows, "LIM"), vec![&rows[0]]);
        assert_eq!(filter(&rows, "ito"), vec![&rows[2]]);
        assert_eq!(filter(&rows, "250"), vec![&rows[1]]);
        assert_eq!(filter(&rows, "1"), vec![&rows[0]]);
        assert!(filter(&rows, "bogota").is_empty());
    }

    #[test]
    fn surrounding_spaces_are_part_of_the_query() {
        let rows = rows();
        assert!(filter(&rows, " quito").is_empty());
        assert_eq!(filter(&rows, "quito"), vec![&rows[2]]);
    }

    #[test]
    fn missing_values_never_match() {
        let rows = vec![Row::from_iter([("note", CellValue::from("NULL")), ("x", CellValue::Null)])];
        let criteria = SearchCriteria::new("null").with_nulls(["NULL"]);
        assert_eq!(criteria.filter_iter(&rows).count(), 0);
        assert_eq!(filter(&rows, "null").len(), 1);
    }

    #[test]
    fn results_outlive_criteria() {
        let rows = rows();
        let found = {
            let criteria = SearchCriteria::new("quito");
            criteria.filter_iter(&rows).collect::<Vec<_>>()
        };
        assert_eq!(found, vec![&rows[2]]);
    }

    #[test]
    fn page_search_ignores_columns_outside_headers() {
        let page = Dataset::new(
            vec!["city".into()],
            vec![
                Row::from_iter([("city", CellValue::from("Lima")), ("internal", CellValue::from("secret"))]),
                Row::from_iter([("city", CellValue::from("Secretaria"))]),
            ],
        );
        assert_eq!(filter_page(&page, "secret"), vec![&page.rows[1]]);
        assert_eq!(filter_page(&page, "").len(), 2);
        assert_eq!(filter(&page.rows, "secret").len(), 2);
    }

    fn arb_cell() -> impl Strategy<Value = CellValue> {
        prop_oneof![
            Just(CellValue::Null),
            (-1000i32..1000).prop_map(CellValue::from),
            "[a-zA-Z ]{0,8}".prop_map(CellValue::Text),
        ]
    }

    fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
        proptest::collection::vec(
            (arb_cell(), arb_cell()).prop_map(|(a, b)| Row::from_iter([("a", a), ("b", b)])),
            0..20,
        )
    }

    proptest! {
        #[test]
        fn filter_is_ordered_subset(rows in arb_rows(), query in "[a-zA-Z0-9]{1,3}") {
            let found = filter(&rows, &query);
            let needle = query.to_lowercase();

            let mut cursor = 0;
            for row in &found {
                let position = rows[cursor..].iter().position(|candidate| std::ptr::eq(candidate, *row));
                prop_assert!(position.is_some());
                cursor += position.unwrap_or(0) + 1;
                prop_assert!(row
                    .values()
                    .filter_map(|value| value.display_text())
                    .any(|text| text.to_lowercase().contains(&needle)));
            }
        }
    }
}
