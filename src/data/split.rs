use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::math::matrix::{Matrix, MatrixView};

/// One labelled partition of a dataset: an `N × n_features` input matrix and
/// `N` class labels. All rows live in one buffer; batches are views into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub inputs: Matrix,
    pub labels: Vec<u8>,
}

impl Split {
    pub fn new(inputs: Matrix, labels: Vec<u8>) -> Result<Split> {
        let split = Split { inputs, labels };
        split.check_rows()?;
        Ok(split)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.inputs.cols
    }

    /// Number of full batches; trailing rows that do not fill a batch are dropped.
    pub fn n_batches(&self, batch_size: usize) -> usize {
        self.len() / batch_size
    }

    /// Inputs and labels of batch `index`, borrowed from the split.
    pub fn batch(&self, index: usize, batch_size: usize) -> (MatrixView<'_>, &[u8]) {
        let start = index * batch_size;
        let end = start + batch_size;
        (self.inputs.rows_view(start, end), &self.labels[start..end])
    }

    /// Copies rows `start..end` into a new split.
    pub fn slice(&self, start: usize, end: usize) -> Split {
        Split {
            inputs: self.inputs.rows_view(start, end).to_matrix(),
            labels: self.labels[start..end].to_vec(),
        }
    }

    /// Checks the row count against the labels and every label against `n_classes`.
    pub fn validate(&self, n_classes: usize) -> Result<()> {
        self.check_rows()?;
        if let Some((row, &label)) = self
            .labels
            .iter()
            .enumerate()
            .find(|&(_, &l)| l as usize >= n_classes)
        {
            return Err(Error::LabelOutOfRange { row, label, n_classes });
        }
        Ok(())
    }

    fn check_rows(&self) -> Result<()> {
        if self.inputs.rows != self.labels.len()
            || self.inputs.data.len() != self.inputs.rows * self.inputs.cols
        {
            return Err(Error::ShapeMismatch(format!(
                "{} input rows ({} values for {} columns) but {} labels",
                self.inputs.rows,
                self.inputs.data.len(),
                self.inputs.cols,
                self.labels.len()
            )));
        }
        Ok(())
    }
}
