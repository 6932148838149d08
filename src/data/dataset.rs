use crate::error::SplitterError;
use nalgebra::DMatrix;
use num_traits::{Float, FromPrimitive, Num, ToPrimitive};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt::{self, Display};
use std::fmt::{Debug, Formatter};
use std::io;
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};
use std::path::Path;

pub trait DataValue:
    Debug
    + Clone
    + Copy
    + Num
    + FromPrimitive
    + ToPrimitive
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Send
    + Sync
    + Display
    + 'static
{
}

impl<T> DataValue for T where
    T: Debug
        + Clone
        + Copy
        + Num
        + FromPrimitive
        + ToPrimitive
        + AddAssign
        + SubAssign
        + MulAssign
        + DivAssign
        + Send
        + Sync
        + Display
        + 'static
{
}

pub trait Number: DataValue + PartialOrd {}
impl<T> Number for T where T: DataValue + PartialOrd {}

pub trait RealNumber: Number + Float {}
impl<T> RealNumber for T where T: Number + Float {}

/// A table of named numeric columns.
///
/// Every column, the target included, is stored in one `n_rows × n_columns`
/// matrix. The order of `columns` is the order in which
/// features are considered for splitting.
#[derive(Clone, PartialEq)]
pub struct Dataset<T: RealNumber> {
    columns: Vec<String>,
    pub x: DMatrix<T>,
}

impl<T: RealNumber> Debug for Dataset<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset {{\n    columns: {:?},\n    rows: [\n", self.columns)?;

        for i in 0..self.x.nrows() {
            write!(f, "        [")?;
            for j in 0..self.x.ncols() {
                write!(f, "{:?}, ", self.x[(i, j)])?;
            }
            writeln!(f, "],")?;
        }

        write!(f, "    ]\n}}")
    }
}

impl<T: RealNumber> Dataset<T> {
    /// Builds a dataset from column names and a matrix holding one row per sample.
    ///
    /// # Errors
    ///
    /// Fails when the number of names differs from the number of matrix columns,
    /// when a name is repeated, or when any value is NaN or infinite.
    pub fn new(columns: Vec<String>, x: DMatrix<T>) -> Result<Self, SplitterError> {
        if columns.len() != x.ncols() {
            return Err(SplitterError::ShapeMismatch {
                expected: columns.len(),
                found: x.ncols(),
            });
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(SplitterError::DuplicateColumn(name.clone()));
            }
        }

        for (row, values) in x.row_iter().enumerate() {
            if let Some(col) = values.iter().position(|value| !value.is_finite()) {
                return Err(SplitterError::NonFinite {
                    row,
                    column: columns[col].clone(),
                });
            }
        }

        Ok(Self { columns, x })
    }

    /// Builds a dataset from a list of rows, each listing its values in column order.
    pub fn from_rows<S: Into<String>>(
        columns: Vec<S>,
        rows: &[Vec<T>],
    ) -> Result<Self, SplitterError> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if let Some(row) = rows.iter().find(|row| row.len() != columns.len()) {
            return Err(SplitterError::ShapeMismatch {
                expected: columns.len(),
                found: row.len(),
            });
        }

        let x = DMatrix::from_row_slice(rows.len(), columns.len(), &rows.concat());
        Self::new(columns, x)
    }

    /// Reads a CSV document with a header line naming the columns.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, SplitterError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();

        for result in reader.records() {
            let record = result?;
            let line = record.position().map_or(0, |position| position.line());
            let mut row = Vec::with_capacity(columns.len());

            for (field, column) in record.iter().zip(columns.iter()) {
                let value = field
                    .parse::<f64>()
                    .ok()
                    .and_then(T::from_f64)
                    .ok_or_else(|| SplitterError::Parse {
                        line,
                        column: column.clone(),
                        value: field.to_string(),
                    })?;
                row.push(value);
            }
            rows.push(row);
        }

        Self::from_rows(columns, &rows)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SplitterError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(io::BufReader::new(file))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.x.ncols()
    }

    pub fn is_not_empty(&self) -> bool {
        self.x.nrows() > 0
    }

    /// Arithmetic mean of one column, summed in row order.
    ///
    /// Returns NaN for an empty dataset.
    pub fn mean(&self, column: usize) -> T {
        let sum = self
            .x
            .column(column)
            .iter()
            .fold(T::zero(), |acc, value| acc + *value);
        sum / T::from_usize(self.nrows()).unwrap_or_else(T::nan)
    }

    /// Distinct values of one column, ascending.
    pub fn sorted_unique(&self, column: usize) -> Vec<T> {
        let mut unique_values: Vec<_> = self.x.column(column).iter().copied().collect();
        unique_values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        unique_values.dedup();
        unique_values
    }

    /// Partitions the rows into `value <= threshold` and `value > threshold`.
    ///
    /// Both halves keep the original relative row order.
    pub fn split_on_threshold(&self, column: usize, threshold: T) -> (Self, Self) {
        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) =
            (0..self.nrows()).partition(|&row| self.x[(row, column)] <= threshold);

        (self.select(&left_indices), self.select(&right_indices))
    }

    fn select(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            x: self.x.select_rows(indices),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn sample() -> Dataset<f64> {
        Dataset::from_rows(
            vec!["a", "b", "y"],
            &[
                vec![1.0, 2.0, 9.0],
                vec![3.0, 4.0, 10.0],
                vec![5.0, 6.0, 11.0],
                vec![7.0, 8.0, 12.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_dataset_from_rows() {
        let dataset = sample();
        assert_eq!(dataset.nrows(), 4);
        assert_eq!(dataset.ncols(), 3);
        assert_eq!(dataset.columns(), &["a", "b", "y"]);
        assert_eq!(dataset.x[(2, 1)], 6.0);
    }

    #[test]
    fn test_dataset_rejects_ragged_rows() {
        let result = Dataset::from_rows(vec!["a", "y"], &[vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(
            result,
            Err(SplitterError::ShapeMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn test_dataset_rejects_duplicate_columns() {
        let result = Dataset::from_rows(vec!["a", "a"], &[vec![1.0, 2.0]]);
        assert!(matches!(result, Err(SplitterError::DuplicateColumn(name)) if name == "a"));
    }

    #[test]
    fn test_dataset_rejects_non_finite_values() {
        let result = Dataset::from_rows(vec!["a", "y"], &[vec![1.0, 2.0], vec![f64::NAN, 1.0]]);
        assert!(matches!(
            result,
            Err(SplitterError::NonFinite { row: 1, column }) if column == "a"
        ));
    }

    #[test]
    fn test_dataset_formatting() {
        let dataset = Dataset::from_rows(vec!["a", "y"], &[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();

        let expected_str = "\
Dataset {
    columns: [\"a\", \"y\"],
    rows: [
        [1.0, 2.0, ],
        [3.0, 4.0, ],
    ]
}";

        assert_eq!(format!("{:?}", dataset), expected_str);
    }

    #[test]
    fn test_dataset_column_index() {
        let dataset = sample();
        assert_eq!(dataset.column_index("b"), Some(1));
        assert_eq!(dataset.column_index("missing"), None);
    }

    #[test]
    fn test_dataset_mean() {
        let dataset = sample();
        assert_relative_eq!(dataset.mean(2), 10.5);
        assert_relative_eq!(dataset.mean(0), 4.0);
    }

    #[test]
    fn test_dataset_sorted_unique() {
        let dataset = Dataset::from_rows(
            vec!["a", "y"],
            &[vec![3.0, 0.0], vec![1.0, 0.0], vec![3.0, 0.0], vec![2.0, 0.0]],
        )
        .unwrap();
        assert_eq!(dataset.sorted_unique(0), vec![1.0, 2.0, 3.0]);
        assert_eq!(dataset.sorted_unique(1), vec![0.0]);
    }

    #[test]
    fn test_dataset_split_on_threshold() {
        let dataset = sample();

        let (left_dataset, right_dataset) = dataset.split_on_threshold(0, 4.0);
        assert_eq!(left_dataset.nrows(), 2);
        assert_eq!(right_dataset.nrows(), 2);
        assert_eq!(left_dataset.x[(1, 2)], 10.0);
        assert_eq!(right_dataset.x[(0, 2)], 11.0);
        assert_eq!(left_dataset.columns(), dataset.columns());
    }

    #[test]
    fn test_dataset_split_on_threshold_is_inclusive_on_the_left() {
        let dataset = sample();

        let (left_dataset, right_dataset) = dataset.split_on_threshold(0, 3.0);
        assert_eq!(left_dataset.nrows(), 2);
        assert_eq!(right_dataset.nrows(), 2);
    }

    #[test]
    fn test_dataset_split_on_threshold_left_empty() {
        let dataset = sample();

        let (left_dataset, right_dataset) = dataset.split_on_threshold(0, -1.0);
        assert!(!left_dataset.is_not_empty());
        assert_eq!(left_dataset.ncols(), 3);
        assert_eq!(right_dataset.nrows(), 4);
    }

    #[test]
    fn test_dataset_split_on_threshold_right_empty() {
        let dataset = sample();

        let (left_dataset, right_dataset) = dataset.split_on_threshold(0, 9.0);
        assert_eq!(left_dataset.nrows(), 4);
        assert_eq!(right_dataset.nrows(), 0);
    }

    #[test]
    fn test_dataset_from_reader() {
        let csv = "x, y\n1, 0.5\n2,1.5\n";
        let dataset: Dataset<f64> = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(dataset.columns(), &["x", "y"]);
        assert_eq!(dataset.nrows(), 2);
        assert_relative_eq!(dataset.mean(1), 1.0);
    }

    #[test]
    fn test_dataset_from_reader_rejects_text() {
        let csv = "x,y\n1,0.5\nabc,1.5\n";
        let result: Result<Dataset<f64>, _> = Dataset::from_reader(csv.as_bytes());
        assert!(matches!(
            result,
            Err(SplitterError::Parse { line: 3, column, value }) if column == "x" && value == "abc"
        ));
    }
}
