//! CSV loader for dense feature matrices
//!
//! Supports files where:
//! - Each line is one example, each column one feature
//! - The first row can be a header (automatically detected)
//! - Blank lines and lines starting with `#` are skipped

use crate::core::{Result, SimilarityError};
use ndarray::Array2;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Feature matrix loaded from a CSV file
#[derive(Debug, Clone)]
pub struct CSVFeatures {
    matrix: Array2<f64>,
    header: Option<Vec<String>>,
}

impl CSVFeatures {
    /// Load a feature matrix from a CSV file
    ///
    /// Headers are automatically detected if present.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SimilarityError::IoError)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Load a feature matrix from a reader, detecting headers
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, true)
    }

    /// Load a feature matrix from a reader with explicit header option
    pub fn from_reader_with_options<R: BufRead>(reader: R, auto_detect_header: bool) -> Result<Self> {
        let mut header = None;
        let mut values = Vec::new();
        let mut n_features = None;
        let mut n_examples = 0;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(SimilarityError::IoError)?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // Only the first data-bearing line may be a header
            if n_examples == 0 && header.is_none() && auto_detect_header && Self::is_header_line(line)
            {
                let names: Vec<String> = line.split(',').map(|f| f.trim().to_string()).collect();
                n_features = Some(names.len());
                header = Some(names);
                continue;
            }

            let row = Self::parse_data_line(line, line_no + 1)?;
            match n_features {
                None => n_features = Some(row.len()),
                Some(expected) if expected != row.len() => {
                    return Err(SimilarityError::ParseError(format!(
                        "Line {} has {} columns, expected {expected}",
                        line_no + 1,
                        row.len()
                    )));
                }
                Some(_) => {}
            }
            values.extend(row);
            n_examples += 1;
        }

        if n_examples == 0 {
            return Err(SimilarityError::EmptyInput);
        }

        let n_features = values.len() / n_examples;
        let matrix = Array2::from_shape_vec((n_examples, n_features), values)
            .map_err(|e| SimilarityError::ParseError(e.to_string()))?;

        Ok(Self { matrix, header })
    }

    /// Check if a line appears to be a header
    fn is_header_line(line: &str) -> bool {
        let fields: Vec<&str> = line.split(',').collect();

        // Check if most fields are non-numeric (likely headers)
        let non_numeric_count = fields
            .iter()
            .filter(|field| field.trim().parse::<f64>().is_err())
            .count();

        non_numeric_count * 2 > fields.len()
    }

    /// Parse a CSV data line into a row of features
    fn parse_data_line(line: &str, line_no: usize) -> Result<Vec<f64>> {
        line.split(',')
            .enumerate()
            .map(|(col, field)| {
                let field = field.trim();
                field.parse::<f64>().map_err(|_| {
                    SimilarityError::ParseError(format!(
                        "Invalid value at line {line_no}, column {}: {field:?}",
                        col + 1
                    ))
                })
            })
            .collect()
    }

    /// The loaded matrix (examples x features)
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Consume and return the matrix
    pub fn into_matrix(self) -> Array2<f64> {
        self.matrix
    }

    /// Column names, if the file had a header
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Number of examples (rows)
    pub fn n_examples(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of features (columns)
    pub fn n_features(&self) -> usize {
        self.matrix.ncols()
    }
}
