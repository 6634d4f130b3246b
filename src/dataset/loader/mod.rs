//! Text loaders for the sparse data, query and label file formats.
//!
//! - data file: `<label> <idx>:<val> <idx>:<val> ...`, one sample per line,
//!   feature indices starting at 1. Lines whose first token already is an
//!   `idx:val` pair carry no label; labels then come from a label file.
//! - query file: one group size per line.
//! - label file: one label per line.

use crate::core::error::{LambdaMartError, Result};
use crate::core::types::{FeatureIndex, Label};
use crate::dataset::{boundaries_from_group_sizes, RawDataset};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Parsed content of a data file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFile {
    /// Labels, present only if every line carried one
    pub labels: Option<Vec<Label>>,
    /// Zero-based `(feature, value)` pairs per sample
    pub rows: Vec<Vec<(FeatureIndex, f64)>>,
}

/// Loader combining a data file, a query file and an optional label file
/// into a [`RawDataset`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLoader;

impl TextLoader {
    /// Create a new loader
    pub fn new() -> Self {
        TextLoader
    }

    /// Loads and validates a dataset. A label file, when given, overrides
    /// labels from the data file.
    pub fn load<P: AsRef<Path>>(
        &self,
        data_path: P,
        query_path: P,
        label_path: Option<P>,
    ) -> Result<RawDataset> {
        let data_path = data_path.as_ref();
        let data = self.load_data_file(data_path)?;
        let group_sizes = self.load_query_file(query_path.as_ref())?;

        let labels = match label_path {
            Some(path) => self.load_label_file(path.as_ref())?,
            None => data.labels.ok_or_else(|| {
                LambdaMartError::data_loading(format!(
                    "{} has no label column and no label file was given",
                    data_path.display()
                ))
            })?,
        };

        RawDataset::from_rows(&data.rows, labels, &group_sizes)
    }

    /// Reads a data file
    pub fn load_data_file<P: AsRef<Path>>(&self, path: P) -> Result<DataFile> {
        let path = path.as_ref();
        parse_data(open(path)?, &path.display().to_string())
    }

    /// Reads group sizes from a query file
    pub fn load_query_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<usize>> {
        let path = path.as_ref();
        parse_query(open(path)?, &path.display().to_string())
    }

    /// Reads labels from a label file
    pub fn load_label_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Label>> {
        let path = path.as_ref();
        parse_labels(open(path)?, &path.display().to_string())
    }

    /// Converts group sizes into cumulative query boundaries
    pub fn boundaries(&self, group_sizes: &[usize]) -> Result<Vec<usize>> {
        boundaries_from_group_sizes(group_sizes)
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| {
        LambdaMartError::data_loading(format!("Unable to open {}: {}", path.display(), e))
    })?;
    Ok(BufReader::new(file))
}

fn loading_error(source: &str, line: usize, message: String) -> LambdaMartError {
    LambdaMartError::data_loading(format!("{}:{}: {}", source, line + 1, message))
}

/// Parses a relevance label such as `2` or `2.0`.
fn parse_label(token: &str) -> std::result::Result<Label, String> {
    let value: f64 = token
        .parse()
        .map_err(|_| format!("invalid label \"{}\"", token))?;
    if value < 0.0 || value.fract() != 0.0 || value > Label::MAX as f64 {
        return Err(format!("label must be a non-negative integer, got \"{}\"", token));
    }
    Ok(value as Label)
}

/// Parses data file content from any reader.
pub fn parse_data<R: Read>(reader: R, source: &str) -> Result<DataFile> {
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    let mut labelled_lines = 0usize;

    for (line_number, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let mut tokens = line.split_whitespace().peekable();
        let first = match tokens.peek() {
            Some(first) => *first,
            None => continue,
        };

        if !first.contains(':') {
            let label = parse_label(first).map_err(|m| loading_error(source, line_number, m))?;
            labels.push(label);
            labelled_lines += 1;
            tokens.next();
        }

        let mut row = Vec::new();
        for token in tokens {
            let (index, value) = token.split_once(':').ok_or_else(|| {
                loading_error(source, line_number, format!("expected idx:val, got \"{}\"", token))
            })?;
            let index: usize = index.parse().map_err(|_| {
                loading_error(source, line_number, format!("invalid feature index \"{}\"", index))
            })?;
            if index == 0 {
                return Err(loading_error(
                    source,
                    line_number,
                    "feature indices start at 1".to_string(),
                ));
            }
            let value: f64 = value.parse().map_err(|_| {
                loading_error(source, line_number, format!("invalid feature value \"{}\"", value))
            })?;
            row.push((index - 1, value));
        }
        rows.push(row);
    }

    let labels = if labelled_lines == rows.len() && !rows.is_empty() {
        Some(labels)
    } else if labelled_lines == 0 {
        None
    } else {
        return Err(LambdaMartError::data_loading(format!(
            "{}: {} of {} lines carry a label",
            source,
            labelled_lines,
            rows.len()
        )));
    };

    Ok(DataFile { labels, rows })
}

/// Parses query file content from any reader.
pub fn parse_query<R: Read>(reader: R, source: &str) -> Result<Vec<usize>> {
    let mut sizes = Vec::new();
    for (line_number, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        let size: usize = token.parse().map_err(|_| {
            loading_error(source, line_number, format!("invalid group size \"{}\"", token))
        })?;
        if size == 0 {
            return Err(loading_error(source, line_number, "empty query group".to_string()));
        }
        sizes.push(size);
    }
    Ok(sizes)
}

/// Parses label file content from any reader.
pub fn parse_labels<R: Read>(reader: R, source: &str) -> Result<Vec<Label>> {
    let mut labels = Vec::new();
    for (line_number, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        labels.push(parse_label(token).map_err(|m| loading_error(source, line_number, m))?);
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_with_labels() {
        let content = "2 1:0.5 3:1.5\n0 2:-1\n\n1\n";
        let data = parse_data(content.as_bytes(), "train.txt").unwrap();
        assert_eq!(data.labels, Some(vec![2, 0, 1]));
        assert_eq!(
            data.rows,
            vec![vec![(0, 0.5), (2, 1.5)], vec![(1, -1.0)], vec![]]
        );
    }

    #[test]
    fn test_parse_data_without_labels() {
        let data = parse_data("1:1 2:2\n3:3\n".as_bytes(), "train.txt").unwrap();
        assert_eq!(data.labels, None);
        assert_eq!(data.rows.len(), 2);
    }

    #[test]
    fn test_parse_data_errors_name_the_line() {
        let err = parse_data("1 1:0.5\n1 0:2\n".as_bytes(), "train.txt").unwrap_err();
        assert!(err.to_string().contains("train.txt:2"), "{}", err);

        assert!(parse_data("1 1-0.5\n".as_bytes(), "t").is_err());
        assert!(parse_data("1 1:abc\n".as_bytes(), "t").is_err());
        assert!(parse_data("-1 1:1\n".as_bytes(), "t").is_err());
        assert!(parse_data("1 1:1\n2:1\n".as_bytes(), "t").is_err());
    }

    #[test]
    fn test_parse_query_and_labels() {
        assert_eq!(parse_query("6\n3\n\n2\n".as_bytes(), "q").unwrap(), vec![6, 3, 2]);
        assert!(parse_query("3\n0\n".as_bytes(), "q").is_err());
        assert_eq!(parse_labels("1\n2.0\n0\n".as_bytes(), "l").unwrap(), vec![1, 2, 0]);
        assert!(parse_labels("1.5\n".as_bytes(), "l").is_err());
    }
}
