use super::dispatch::{DispatchOutcome, TimingTable};
use crate::core::models::table::ScoreTable;
use crate::core::utils::stats::{nan_max, nan_mean, nan_min};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Labels of the summary rows, in the order they are appended.
pub const SUMMARY_LABELS: [&str; 3] = ["Min", "Max", "Mean"];

/// NaN-last ascending order.
fn compare_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}

/// Stable ascending sort of the rows by `column`, NaN last.
///
/// Returns `false`, leaving the table untouched, when the column does not exist.
pub fn sort_rows(table: &mut ScoreTable, column: &str) -> bool {
    let Some(index) = table.column_index(column) else {
        return false;
    };
    table
        .rows_mut()
        .sort_by(|a, b| compare_nan_last(a.values[index], b.values[index]));
    true
}

/// Column-wise Min, Max and Mean over the current rows, ignoring NaN.
pub fn summary_rows(table: &ScoreTable) -> Vec<(&'static str, Vec<f64>)> {
    let reducers: [fn(Vec<f64>) -> f64; 3] = [
        |v| nan_min(v),
        |v| nan_max(v),
        |v| nan_mean(v),
    ];
    SUMMARY_LABELS
        .iter()
        .zip(reducers)
        .map(|(label, reduce)| {
            let values = (0..table.columns().len())
                .map(|col| reduce(table.column_values(col).collect()))
                .collect();
            (*label, values)
        })
        .collect()
}

/// Builds the candidate by sub-metric table.
///
/// Rows are sorted by `sort_by` when that column exists; summary rows are appended
/// afterwards and always trail the candidates.
pub fn build_score_table(
    outcome: &DispatchOutcome,
    sort_by: Option<&str>,
    include_summary: bool,
) -> ScoreTable {
    let mut table = ScoreTable::new(outcome.columns.clone());
    for candidate in outcome.results.candidates() {
        let values = outcome
            .columns
            .iter()
            .map(|metric| outcome.results.get(candidate, metric).unwrap_or(f64::NAN))
            .collect();
        table.push_row(candidate.clone(), values);
    }

    if let Some(column) = sort_by {
        if sort_rows(&mut table, column) {
            info!(column, "Rows sorted");
        } else {
            info!(column, "Sort column not found in the results, keeping candidate order");
        }
    }

    if include_summary {
        for (label, values) in summary_rows(&table) {
            table.push_row(label, values);
        }
    }
    table
}

/// Builds the candidate by sub-metric timing table, in seconds.
///
/// Only timed sub-metrics get a column and the table never carries summary rows.
pub fn build_timing_table(outcome: &DispatchOutcome) -> ScoreTable {
    let timings = &outcome.timings;
    let columns: Vec<String> = outcome
        .columns
        .iter()
        .filter(|c| timings.metrics().contains(*c))
        .cloned()
        .collect();

    let mut table = ScoreTable::new(columns.clone());
    for candidate in outcome.results.candidates() {
        let values = columns
            .iter()
            .map(|metric| {
                timings
                    .duration(metric, candidate)
                    .map_or(f64::NAN, |d| d.as_secs_f64())
            })
            .collect();
        table.push_row(candidate.clone(), values);
    }
    table
}

/// Logs the time spent on each sub-metric across all candidates.
pub fn log_total_times(timings: &TimingTable) {
    for metric in timings.metrics() {
        debug!(
            metric = %metric,
            seconds = timings.total(metric).as_secs_f64(),
            "Total time for metric"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn outcome(rows: Vec<(&str, Vec<f64>)>, columns: &[&str]) -> DispatchOutcome {
        let mut outcome = DispatchOutcome {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        };
        for (candidate, values) in &rows {
            for (metric, value) in columns.iter().zip(values.iter()) {
                outcome.results.insert(candidate, metric, *value);
                outcome
                    .timings
                    .record(metric, candidate, Duration::from_millis(500));
            }
        }
        outcome
    }

    fn labels(table: &ScoreTable) -> Vec<&str> {
        table.row_labels().collect()
    }

    #[test]
    fn summary_of_column_with_nan() {
        let o = outcome(vec![("a", vec![2.0]), ("b", vec![f64::NAN]), ("c", vec![4.0])], &["X"]);
        let table = build_score_table(&o, None, true);

        assert_eq!(labels(&table), vec!["a", "b", "c", "Min", "Max", "Mean"]);
        assert_eq!(table.value("Min", "X"), Some(2.0));
        assert_eq!(table.value("Max", "X"), Some(4.0));
        assert_eq!(table.value("Mean", "X"), Some(3.0));
    }

    #[test]
    fn summary_of_all_nan_column_is_nan() {
        let o = outcome(vec![("a", vec![f64::NAN, 1.0]), ("b", vec![f64::NAN, 3.0])], &["X", "Y"]);
        let table = build_score_table(&o, None, true);
        for label in SUMMARY_LABELS {
            assert!(table.value(label, "X").unwrap().is_nan());
        }
        assert_eq!(table.value("Mean", "Y"), Some(2.0));
    }

    #[test]
    fn sort_is_ascending_with_nan_last_and_stable() {
        let o = outcome(
            vec![
                ("a", vec![3.0]),
                ("b", vec![f64::NAN]),
                ("c", vec![1.0]),
                ("d", vec![3.0]),
                ("e", vec![2.0]),
            ],
            &["RMSD"],
        );
        let table = build_score_table(&o, Some("RMSD"), false);
        assert_eq!(labels(&table), vec!["c", "e", "a", "d", "b"]);
    }

    #[test]
    fn missing_sort_column_keeps_order() {
        let o = outcome(vec![("b", vec![2.0]), ("a", vec![1.0])], &["X"]);
        let table = build_score_table(&o, Some("RMSD"), false);
        assert_eq!(labels(&table), vec!["b", "a"]);
    }

    #[test]
    fn summary_rows_trail_sorted_candidates() {
        let o = outcome(vec![("a", vec![5.0]), ("b", vec![1.0])], &["X"]);
        let table = build_score_table(&o, Some("X"), true);
        assert_eq!(labels(&table), vec!["b", "a", "Min", "Max", "Mean"]);
    }

    #[test]
    fn missing_cells_are_nan_in_the_union_table() {
        let mut o = outcome(vec![("a", vec![1.0, 2.0])], &["X", "Y"]);
        o.results.insert("b", "Y", 7.0);
        let table = build_score_table(&o, None, false);
        assert!(table.value("b", "X").unwrap().is_nan());
        assert_eq!(table.value("b", "Y"), Some(7.0));
    }

    #[test]
    fn timing_table_has_seconds_and_no_summary_rows() {
        let o = outcome(vec![("a", vec![1.0]), ("b", vec![2.0])], &["X"]);
        let table = build_timing_table(&o);
        assert_eq!(labels(&table), vec!["a", "b"]);
        assert_eq!(table.value("a", "X"), Some(0.5));
    }

    #[test]
    fn timing_table_only_has_timed_columns() {
        let mut o = outcome(vec![("a", vec![1.0])], &["X"]);
        o.columns.push("UNTIMED".into());
        let table = build_timing_table(&o);
        assert_eq!(table.columns(), &["X"]);
    }
}
