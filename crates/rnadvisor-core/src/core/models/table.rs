/// One labelled row of a [`ScoreTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub label: String,
    pub values: Vec<f64>,
}

/// A rectangular table of scores: labelled rows, named columns, NaN for missing cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreTable {
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl ScoreTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn row_labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.label.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row(&self, label: &str) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Returns the cell at (`row`, `column`), `None` if either label is unknown.
    pub fn value(&self, row: &str, column: &str) -> Option<f64> {
        let col = self.column_index(column)?;
        self.row(row).map(|r| r.values[col])
    }

    /// Appends a row; missing trailing cells are filled with NaN and extra ones are dropped.
    pub fn push_row(&mut self, label: impl Into<String>, mut values: Vec<f64>) {
        values.resize(self.columns.len(), f64::NAN);
        self.rows.push(TableRow {
            label: label.into(),
            values,
        });
    }

    pub fn column_values(&self, index: usize) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(move |r| r.values[index])
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<TableRow> {
        &mut self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_row_pads_missing_cells_with_nan() {
        let mut table = ScoreTable::new(vec!["RMSD".into(), "INF-ALL".into()]);
        table.push_row("a.pdb", vec![1.5]);

        assert_eq!(table.value("a.pdb", "RMSD"), Some(1.5));
        assert!(table.value("a.pdb", "INF-ALL").unwrap().is_nan());
        assert_eq!(table.value("a.pdb", "MCQ"), None);
        assert_eq!(table.value("b.pdb", "RMSD"), None);
    }

    #[test]
    fn column_values_follow_row_order() {
        let mut table = ScoreTable::new(vec!["X".into()]);
        table.push_row("a", vec![3.0]);
        table.push_row("b", vec![1.0]);
        let values: Vec<f64> = table.column_values(0).collect();
        assert_eq!(values, vec![3.0, 1.0]);
        assert_eq!(table.row_labels().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
