//! Sparse binary-label datasets.
//!
//! Instances are stored in compressed sparse row form: the feature indices
//! and values of all instances are concatenated, and `instance_starts[i]..
//! instance_starts[i + 1]` delimits instance `i`.
//!
//! # Text format
//!
//! One instance per line. The first token is the label (`1` or `0`),
//! followed by whitespace-separated `index:value` pairs with 1-based
//! feature indices:
//!
//! ```text
//! 1	1:0.5	4:1.25
//! 0	2:-1.0
//! ```
//!
//! Blank lines are skipped.

use crate::error::{DatasetError, Result};
use owlqn_core::types::{DVector, Scalar};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Binary-labelled instances over a fixed number of features, in CSR form.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SparseDataset<T> {
    indices: Vec<usize>,
    values: Vec<T>,
    instance_starts: Vec<usize>,
    labels: Vec<bool>,
    num_features: usize,
}

impl<T: Scalar> SparseDataset<T> {
    /// Creates an empty dataset over `num_features` features.
    pub fn new(num_features: usize) -> Self {
        Self {
            indices: Vec::new(),
            values: Vec::new(),
            instance_starts: vec![0],
            labels: Vec::new(),
            num_features,
        }
    }

    /// Reads a dataset in the text format from `reader`.
    pub fn from_reader<R: BufRead>(reader: R, num_features: usize) -> Result<Self> {
        let mut dataset = Self::new(num_features);
        let mut feature_indices = Vec::new();
        let mut feature_values = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line_no = line_no + 1;
            let line = line?;
            let mut tokens = line.split_whitespace();
            let Some(label_token) = tokens.next() else {
                continue;
            };

            let label = match label_token.parse::<i64>() {
                Ok(1) => true,
                Ok(0) => false,
                _ => {
                    return Err(DatasetError::InvalidLabel {
                        line: line_no,
                        label: label_token.to_string(),
                    })
                }
            };

            feature_indices.clear();
            feature_values.clear();
            for pair in tokens {
                let (index, value) = parse_pair::<T>(pair, line_no, num_features)?;
                feature_indices.push(index);
                feature_values.push(value);
            }

            dataset.push_unchecked(&feature_indices, &feature_values, label);
        }

        log::debug!(
            "read {} instances ({} non-zeros, {} features)",
            dataset.num_instances(),
            dataset.num_nonzeros(),
            num_features
        );
        Ok(dataset)
    }

    /// Reads a dataset in the text format from a file.
    pub fn from_path<P: AsRef<Path>>(path: P, num_features: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => DatasetError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => DatasetError::Io(err),
        })?;
        let dataset = Self::from_reader(BufReader::new(file), num_features)?;
        log::info!(
            "loaded {} instances from {}",
            dataset.num_instances(),
            path.display()
        );
        Ok(dataset)
    }

    /// Parses a dataset held in memory.
    pub fn parse_str(text: &str, num_features: usize) -> Result<Self> {
        Self::from_reader(text.as_bytes(), num_features)
    }

    /// Appends an instance with 0-based feature indices.
    pub fn add_instance(&mut self, indices: &[usize], values: &[T], label: bool) -> Result<()> {
        if indices.len() != values.len() {
            return Err(DatasetError::LengthMismatch {
                indices: indices.len(),
                values: values.len(),
            });
        }
        if let Some(&index) = indices.iter().find(|&&index| index >= self.num_features) {
            return Err(DatasetError::FeatureIndexOutOfRange {
                line: self.num_instances() + 1,
                index: index + 1,
                num_features: self.num_features,
            });
        }
        self.push_unchecked(indices, values, label);
        Ok(())
    }

    fn push_unchecked(&mut self, indices: &[usize], values: &[T], label: bool) {
        self.indices.extend_from_slice(indices);
        self.values.extend_from_slice(values);
        self.instance_starts.push(self.indices.len());
        self.labels.push(label);
    }

    /// Number of instances.
    pub fn num_instances(&self) -> usize {
        self.labels.len()
    }

    /// Number of features every weight vector must have.
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Total number of stored feature entries.
    pub fn num_nonzeros(&self) -> usize {
        self.indices.len()
    }

    /// Label of instance `i`.
    pub fn label(&self, i: usize) -> bool {
        self.labels[i]
    }

    /// Feature indices (0-based) and values of instance `i`.
    pub fn instance(&self, i: usize) -> (&[usize], &[T]) {
        let range = self.instance_starts[i]..self.instance_starts[i + 1];
        (&self.indices[range.clone()], &self.values[range])
    }

    /// Raw linear score `w·x_i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range or `weights` is shorter than
    /// [`num_features`](Self::num_features).
    pub fn margin(&self, i: usize, weights: &DVector<T>) -> T {
        let (indices, values) = self.instance(i);
        indices
            .iter()
            .zip(values)
            .fold(T::zero(), |score, (&index, &value)| score + weights[index] * value)
    }

    /// Label-signed score: `w·x_i` for label 1, `−w·x_i` for label 0.
    pub fn score_of(&self, i: usize, weights: &DVector<T>) -> T {
        let score = self.margin(i, weights);
        if self.labels[i] {
            score
        } else {
            -score
        }
    }

    /// Adds `±mult·x_i` to `vec`, with the sign negated for label 1.
    pub fn add_mult_to(&self, i: usize, mult: T, vec: &mut DVector<T>) {
        let mult = if self.labels[i] { -mult } else { mult };
        let (indices, values) = self.instance(i);
        for (&index, &value) in indices.iter().zip(values) {
            vec[index] += mult * value;
        }
    }
}

fn parse_pair<T: Scalar>(pair: &str, line: usize, num_features: usize) -> Result<(usize, T)> {
    let (index, value) = pair
        .split_once(':')
        .ok_or_else(|| {
            DatasetError::invalid_format(line, format!("expected index:value, got '{pair}'"))
        })?;

    let index: usize = index.parse().map_err(|_| {
        DatasetError::invalid_format(line, format!("cannot parse feature index '{index}'"))
    })?;
    if index == 0 || index > num_features {
        return Err(DatasetError::FeatureIndexOutOfRange {
            line,
            index,
            num_features,
        });
    }

    let value = value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .and_then(<T as Scalar>::try_from_f64)
        .ok_or_else(|| {
            DatasetError::invalid_format(line, format!("cannot parse feature value '{value}'"))
        })?;

    Ok((index - 1, value))
}
