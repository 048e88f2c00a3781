//! Column type inference from a bounded sample of rows

use ahash::AHashSet;
use ds_core::{ColumnType, ColumnTypeMap, Header};
use tracing::debug;

use crate::config::NullConfig;
use crate::patterns::{matches_date_pattern, parse_bool_token, parse_number};

/// Collects raw values per column until the sample is full
#[derive(Debug)]
pub struct InferenceSampler {
    sample_size: usize,
    columns: Vec<Vec<String>>,
    rows: usize,
}

/// Statistics about a sampled column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnStats {
    pub null_count: usize,
    pub distinct_count: usize,
}

impl InferenceSampler {
    /// Create a sampler for `column_count` columns
    pub fn new(column_count: usize, sample_size: usize) -> Self {
        Self {
            sample_size,
            columns: vec![Vec::new(); column_count],
            rows: 0,
        }
    }

    /// Record one row of raw fields. Returns true once the sample is full.
    pub fn observe(&mut self, fields: &[String]) -> bool {
        if !self.is_full() {
            for (column, value) in self.columns.iter_mut().zip(fields) {
                column.push(value.clone());
            }
            self.rows += 1;
        }
        self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.rows >= self.sample_size
    }

    pub fn rows_sampled(&self) -> usize {
        self.rows
    }

    /// Classify every column. Consumes the sampler, releasing the sample.
    pub fn infer(self, header: &Header, null_config: &NullConfig) -> ColumnTypeMap {
        let rows = self.rows;

        header
            .iter()
            .zip(self.columns)
            .map(|(name, values)| {
                let present: Vec<&str> = values
                    .iter()
                    .map(String::as_str)
                    .filter(|v| !null_config.is_null(v))
                    .collect();
                let column_type = classify_column(present.iter().copied());

                let stats = ColumnStats {
                    null_count: values.len() - present.len(),
                    distinct_count: present.iter().collect::<AHashSet<_>>().len(),
                };
                debug!(
                    column = name,
                    %column_type,
                    sampled = rows,
                    nulls = stats.null_count,
                    distinct = stats.distinct_count,
                    "Inferred column type"
                );

                (name.to_string(), column_type)
            })
            .collect()
    }
}

/// Decide a column type from its non-null values.
///
/// Number is tried first, then date, then boolean, so numeric columns are never
/// read as dates or 0/1 flags. A rule wins when at least 80% of values match.
pub fn classify_column<'a, I>(values: I) -> ColumnType
where
    I: IntoIterator<Item = &'a str>,
{
    let values: Vec<&str> = values
        .into_iter()
        .filter(|v| !v.trim().is_empty())
        .collect();

    if values.is_empty() {
        return ColumnType::String;
    }

    let total = values.len();
    let count = |pred: fn(&str) -> bool| values.iter().filter(|v| pred(v)).count();

    if meets_threshold(count(|v| parse_number(v).is_some()), total) {
        ColumnType::Number
    } else if meets_threshold(count(matches_date_pattern), total) {
        ColumnType::Date
    } else if meets_threshold(count(|v| parse_bool_token(v).is_some()), total) {
        ColumnType::Boolean
    } else {
        ColumnType::String
    }
}

/// At least 80% of `total`, in integer arithmetic
fn meets_threshold(matches: usize, total: usize) -> bool {
    total > 0 && matches * 5 >= total * 4
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_of(numeric: usize, other: &str, total: usize) -> Vec<String> {
        (0..total)
            .map(|i| if i < numeric { i.to_string() } else { other.to_string() })
            .collect()
    }

    fn classify(values: &[String]) -> ColumnType {
        classify_column(values.iter().map(String::as_str))
    }

    #[test]
    fn test_number_column() {
        assert_eq!(classify_column(["1", "2.5", "-3", "1e4"]), ColumnType::Number);
    }

    #[test]
    fn test_number_threshold_boundary() {
        assert_eq!(classify(&column_of(80, "x", 100)), ColumnType::Number);
        assert_eq!(classify(&column_of(79, "x", 100)), ColumnType::String);
    }

    #[test]
    fn test_79_percent_numeric_falls_to_boolean() {
        // 0/1 are numbers and booleans; "yes" is only boolean
        let values: Vec<String> = (0..100)
            .map(|i| if i < 79 { (i % 2).to_string() } else { "yes".to_string() })
            .collect();
        assert_eq!(classify(&values), ColumnType::Boolean);
    }

    #[test]
    fn test_79_percent_numeric_falls_to_date() {
        let values: Vec<String> = (0..100)
            .map(|i| if i < 79 { "2020".to_string() } else { "2021-06-01".to_string() })
            .collect();
        assert_eq!(classify(&values), ColumnType::Date);
    }

    #[test]
    fn test_date_column() {
        assert_eq!(
            classify_column(["2024-01-01", "01/02/2024", "2024/01/03", "2024-01-04T08:00:00", "oops"]),
            ColumnType::Date
        );
    }

    #[test]
    fn test_years_are_numbers_first() {
        assert_eq!(classify_column(["1999", "2000", "2001"]), ColumnType::Number);
    }

    #[test]
    fn test_boolean_column() {
        assert_eq!(classify_column(["yes", "No", "Y", "n", "TRUE"]), ColumnType::Boolean);
    }

    #[test]
    fn test_zero_one_column_is_number() {
        assert_eq!(classify_column(["0", "1", "1", "0"]), ColumnType::Number);
    }

    #[test]
    fn test_empty_or_blank_column_is_string() {
        assert_eq!(classify_column(std::iter::empty()), ColumnType::String);
        assert_eq!(classify_column(["", "  "]), ColumnType::String);
    }

    #[test]
    fn test_blanks_do_not_count_against_threshold() {
        assert_eq!(classify_column(["1", "", "", "", "2"]), ColumnType::Number);
    }

    #[test]
    fn test_sampler_stops_at_sample_size() {
        let header = Header::from_fields(["a", "b"]);
        let mut sampler = InferenceSampler::new(2, 2);

        assert!(!sampler.observe(&["1".to_string(), "x".to_string()]));
        assert!(sampler.observe(&["2".to_string(), "y".to_string()]));
        assert!(sampler.observe(&["z".to_string(), "z".to_string()]));
        assert_eq!(sampler.rows_sampled(), 2);

        let types = sampler.infer(&header, &NullConfig::default());
        assert_eq!(types["a"], ColumnType::Number);
        assert_eq!(types["b"], ColumnType::String);
        assert_eq!(types.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_sampler_honors_null_tokens() {
        let header = Header::from_fields(["score"]);
        let mut sampler = InferenceSampler::new(1, 10);
        for value in ["1", "N/A", "N/A", "N/A", "2"] {
            sampler.observe(&[value.to_string()]);
        }

        let strict = InferenceSampler {
            sample_size: 10,
            columns: sampler.columns.clone(),
            rows: sampler.rows,
        };
        assert_eq!(strict.infer(&header, &NullConfig::default())["score"], ColumnType::String);
        assert_eq!(sampler.infer(&header, &NullConfig::common())["score"], ColumnType::Number);
    }
}
