use serde::{Deserialize, Serialize};

/// Training data as seen by the network: standardized numeric rows plus
/// their expected outputs.
pub trait DataInput {
    fn feature_count(&self) -> usize;

    fn train_size(&self) -> usize;

    fn train_row(&self, index: usize) -> Vec<f64>;

    fn train_expected_row(&self, index: usize) -> Vec<f64>;

    /// Whether the raw value at (`row`, `col`) is text rather than a number.
    fn feature_is_text(&self, _row: usize, _col: usize) -> bool {
        false
    }

    fn is_categorical(&self, _col: usize) -> bool {
        false
    }
}

/// Raw feature value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn as_f64(&self) -> f64 {
        match self {
            Cell::Number(v) => *v,
            Cell::Text(_) => 0.0,
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

/// In-memory [`DataInput`] backed by row vectors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VecDataInput {
    rows: Vec<Vec<Cell>>,
    expected: Vec<Vec<f64>>,
    #[serde(default)]
    categorical: Vec<bool>,
}

impl VecDataInput {
    pub fn new(rows: Vec<Vec<Cell>>, expected: Vec<Vec<f64>>) -> VecDataInput {
        VecDataInput { rows, expected, categorical: Vec::new() }
    }

    pub fn from_numeric(rows: Vec<Vec<f64>>, expected: Vec<Vec<f64>>) -> VecDataInput {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Cell::Number).collect())
            .collect();
        VecDataInput::new(rows, expected)
    }

    /// Marks column `col` as categorical; text values are then accepted there.
    pub fn with_categorical(mut self, col: usize) -> VecDataInput {
        if self.categorical.len() <= col {
            self.categorical.resize(col + 1, false);
        }
        self.categorical[col] = true;
        self
    }
}

impl DataInput for VecDataInput {
    fn feature_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    fn train_size(&self) -> usize {
        self.rows.len()
    }

    fn train_row(&self, index: usize) -> Vec<f64> {
        self.rows
            .get(index)
            .map(|row| row.iter().map(Cell::as_f64).collect())
            .unwrap_or_default()
    }

    fn train_expected_row(&self, index: usize) -> Vec<f64> {
        self.expected.get(index).cloned().unwrap_or_default()
    }

    fn feature_is_text(&self, row: usize, col: usize) -> bool {
        matches!(self.rows.get(row).and_then(|r| r.get(col)), Some(Cell::Text(_)))
    }

    fn is_categorical(&self, col: usize) -> bool {
        self.categorical.get(col).copied().unwrap_or(false)
    }
}
