//! Filter, sort and paginate
//!
//! The visible row set is a pure function of the source rows and a
//! [`ViewQuery`]. Every stage returns a fresh sequence of row references; the
//! source collection is never reordered.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::model::Row;
use crate::model::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// The single active sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

/// Everything that shapes the visible rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewQuery {
    /// Case-insensitive substring matched against every field.
    pub global_filter: String,
    /// Column accessor to the accepted values. Empty sets are inactive.
    pub column_filters: BTreeMap<String, BTreeSet<String>>,
    pub sort: Option<SortKey>,
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
}

impl Default for ViewQuery {
    fn default() -> Self {
        Self {
            global_filter: String::new(),
            column_filters: BTreeMap::new(),
            sort: None,
            page: 1,
            page_size: 50,
        }
    }
}

impl ViewQuery {
    /// Cycles the sort on `column`: a new column sorts ascending, the active
    /// column goes ascending, descending, then unsorted.
    pub fn toggle_sort(&mut self, column: &str) {
        self.sort = match self.sort.take() {
            Some(SortKey {
                column: active,
                direction: SortDirection::Ascending,
            }) if active == column => Some(SortKey {
                column: active,
                direction: SortDirection::Descending,
            }),
            Some(SortKey {
                column: active,
                direction: SortDirection::Descending,
            }) if active == column => None,
            _ => Some(SortKey {
                column: column.to_string(),
                direction: SortDirection::Ascending,
            }),
        };
    }

    /// Columns with a non-empty value filter.
    pub fn active_filter_columns(&self) -> Vec<String> {
        self.column_filters
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(column, _)| column.clone())
            .collect()
    }
}

/// Returns `true` if any field with a truthy value contains `query`, ignoring case.
pub fn matches_global(row: &Row, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    row.fields()
        .values()
        .filter(|value| value.is_truthy())
        .any(|value| value.to_string().to_lowercase().contains(&needle))
}

/// Returns `true` if the row satisfies every active column filter.
pub fn matches_columns(row: &Row, filters: &BTreeMap<String, BTreeSet<String>>) -> bool {
    filters
        .iter()
        .filter(|(_, accepted)| !accepted.is_empty())
        .all(|(column, accepted)| accepted.contains(&row.value(column).as_filter_key()))
}

/// Applies the global and column filters, keeping source order.
pub fn filter_rows<'a>(rows: &'a [Row], query: &ViewQuery) -> Vec<&'a Row> {
    rows.iter()
        .filter(|row| matches_global(row, &query.global_filter))
        .filter(|row| matches_columns(row, &query.column_filters))
        .collect()
}

/// Orders two values for a sort.
///
/// Null placeholders sort last when ascending and first when descending.
pub fn compare_for_sort(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    match (a.is_null_sentinel(), b.is_null_sentinel()) {
        (true, true) => Ordering::Equal,
        (true, false) => match direction {
            SortDirection::Ascending => Ordering::Greater,
            SortDirection::Descending => Ordering::Less,
        },
        (false, true) => match direction {
            SortDirection::Ascending => Ordering::Less,
            SortDirection::Descending => Ordering::Greater,
        },
        (false, false) => match direction {
            SortDirection::Ascending => a.compare(b),
            SortDirection::Descending => b.compare(a),
        },
    }
}

/// Stable sort by one column.
pub fn sort_rows(rows: &mut [&Row], sort: &SortKey) {
    rows.sort_by(|a, b| {
        compare_for_sort(a.value(&sort.column), b.value(&sort.column), sort.direction)
    });
}

/// Filters then sorts.
pub fn filtered<'a>(rows: &'a [Row], query: &ViewQuery) -> Vec<&'a Row> {
    let mut result = filter_rows(rows, query);
    if let Some(sort) = &query.sort {
        sort_rows(&mut result, sort);
    }
    result
}

/// Number of pages needed for `total` rows. Never less than one.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// Clamps a 1-based page number into range.
pub fn clamp_page(page: usize, total: usize, page_size: usize) -> usize {
    page.clamp(1, page_count(total, page_size))
}

/// The rows on one page.
pub fn paginate<'r, 'a>(rows: &'r [&'a Row], page: usize, page_size: usize) -> &'r [&'a Row] {
    let page_size = page_size.max(1);
    let page = clamp_page(page, rows.len(), page_size);
    let start = ((page - 1) * page_size).min(rows.len());
    let end = (start + page_size).min(rows.len());
    &rows[start..end]
}

/// Distinct values of a column offered as filter choices, sorted.
///
/// Nulls, empty strings and the placeholder are left out.
pub fn filter_options(rows: &[Row], column: &str) -> Vec<String> {
    rows.iter()
        .map(|row| row.value(column))
        .filter(|value| !value.is_blank())
        .map(|value| value.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Row> {
        vec![
            Row::new().set("id", 1).set("name", "Clemenceau").set("beds", "200"),
            Row::new().set("id", 2).set("name", "aub").set("beds", Value::na()),
            Row::new().set("id", 3).set("name", "Bellevue").set("beds", 35),
            Row::new().set("id", 4).set("name", Value::Null).set("beds", 1200),
        ]
    }

    fn ids(rows: &[&Row]) -> Vec<String> {
        rows.iter().map(|r| r.id_key("id")).collect()
    }

    #[test]
    fn test_toggle_sort_cycle() {
        let mut query = ViewQuery::default();
        query.toggle_sort("name");
        assert_eq!(query.sort.as_ref().unwrap().direction, SortDirection::Ascending);
        query.toggle_sort("name");
        assert_eq!(query.sort.as_ref().unwrap().direction, SortDirection::Descending);
        query.toggle_sort("name");
        assert_eq!(query.sort, None);

        query.toggle_sort("name");
        query.toggle_sort("beds");
        assert_eq!(
            query.sort,
            Some(SortKey {
                column: "beds".to_string(),
                direction: SortDirection::Ascending
            })
        );
    }

    #[test]
    fn test_numeric_sort_with_nulls_pinned() {
        let rows = rows();
        let mut query = ViewQuery::default();
        query.toggle_sort("beds");
        assert_eq!(ids(&filtered(&rows, &query)), vec!["3", "1", "4", "2"]);

        query.toggle_sort("beds");
        assert_eq!(ids(&filtered(&rows, &query)), vec!["2", "4", "1", "3"]);
    }

    #[test]
    fn test_text_sort_case_insensitive() {
        let rows = rows();
        let mut query = ViewQuery::default();
        query.toggle_sort("name");
        assert_eq!(ids(&filtered(&rows, &query)), vec!["2", "3", "1", "4"]);
    }

    #[test]
    fn test_mixed_column_sort_is_ordered_and_stable() {
        use rand::SeedableRng;
        use rand::rngs::StdRng;
        use rand::seq::IndexedRandom;

        let pool = [
            "2", "10", "1a", "3", "20", "2b", "100", "1", "9z", "05", "1e", "11", "1 ", "N/A",
        ];
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..400 {
            let rows: Vec<Row> = (0..24)
                .map(|i| Row::new().set("id", i).set("x", *pool.choose(&mut rng).unwrap()))
                .collect();

            for direction in [SortDirection::Ascending, SortDirection::Descending] {
                let mut query = ViewQuery::default();
                query.toggle_sort("x");
                if direction == SortDirection::Descending {
                    query.toggle_sort("x");
                }
                let sorted = filtered(&rows, &query);
                assert_eq!(sorted.len(), rows.len());

                for pair in sorted.windows(2) {
                    let order = compare_for_sort(pair[0].value("x"), pair[1].value("x"), direction);
                    assert_ne!(order, Ordering::Greater);
                    if order == Ordering::Equal {
                        let (a, b) = (pair[0].value("id"), pair[1].value("id"));
                        assert_eq!(a.compare(b), Ordering::Less);
                    }
                }
            }
        }
    }

    #[test]
    fn test_mixed_column_numbers_first() {
        let rows: Vec<Row> = ["1a", "10", "2", "b", "2"]
            .iter()
            .enumerate()
            .map(|(i, x)| Row::new().set("id", i as i64).set("x", *x))
            .collect();
        let mut query = ViewQuery::default();
        query.toggle_sort("x");
        assert_eq!(ids(&filtered(&rows, &query)), vec!["2", "4", "1", "0", "3"]);
    }

    #[test]
    fn test_global_filter_skips_falsy_values() {
        let rows = vec![
            Row::new().set("id", 1).set("active", false),
            Row::new().set("id", 2).set("active", true),
            Row::new().set("id", 3).set("count", 0),
        ];
        let query = ViewQuery {
            global_filter: "fals".to_string(),
            ..ViewQuery::default()
        };
        assert!(filtered(&rows, &query).is_empty());

        let query = ViewQuery {
            global_filter: "0".to_string(),
            ..ViewQuery::default()
        };
        assert!(filtered(&rows, &query).is_empty());
    }

    #[test]
    fn test_global_filter() {
        let rows = rows();
        let query = ViewQuery {
            global_filter: "BELLE".to_string(),
            ..ViewQuery::default()
        };
        assert_eq!(ids(&filtered(&rows, &query)), vec!["3"]);
    }

    #[test]
    fn test_column_filters_and_or() {
        let rows = vec![
            Row::new().set("id", 1).set("type", "A").set("region", "North"),
            Row::new().set("id", 2).set("type", "B").set("region", "North"),
            Row::new().set("id", 3).set("type", "A").set("region", "South"),
            Row::new().set("id", 4).set("type", "C").set("region", "North"),
        ];
        let mut query = ViewQuery::default();
        query
            .column_filters
            .insert("type".into(), ["A", "B"].iter().map(|s| s.to_string()).collect());
        query
            .column_filters
            .insert("region".into(), ["North"].iter().map(|s| s.to_string()).collect());
        query.column_filters.insert("ignored".into(), BTreeSet::new());

        assert_eq!(ids(&filtered(&rows, &query)), vec!["1", "2"]);
        assert_eq!(query.active_filter_columns(), vec!["region", "type"]);
    }

    #[test]
    fn test_pagination() {
        let rows: Vec<Row> = (1..=7).map(|i| Row::new().set("id", i)).collect();
        let all: Vec<&Row> = rows.iter().collect();

        assert_eq!(page_count(7, 3), 3);
        assert_eq!(page_count(0, 3), 1);
        assert_eq!(ids(paginate(&all, 3, 3)), vec!["7"]);
        assert_eq!(ids(paginate(&all, 9, 3)), vec!["7"]);
        assert_eq!(ids(paginate(&all, 0, 3)), vec!["1", "2", "3"]);
        assert!(paginate(&[], 1, 3).is_empty());
    }

    #[test]
    fn test_filter_options() {
        let rows = vec![
            Row::new().set("type", "B"),
            Row::new().set("type", "A"),
            Row::new().set("type", "B"),
            Row::new().set("type", Value::na()),
            Row::new().set("type", ""),
            Row::new(),
            Row::new().set("type", 0),
        ];
        assert_eq!(filter_options(&rows, "type"), vec!["0", "A", "B"]);
    }
}
