//! Prediction output.
//!
//! Scores are written one per line in sample order, printed with Rust's
//! shortest round-trip formatting so reading them back yields the same
//! `f64` values.

use crate::core::error::{LambdaMartError, Result};
use crate::core::types::Score;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Writes one score per line to any writer.
pub fn write_scores<W: Write>(mut writer: W, scores: &[Score]) -> Result<()> {
    for score in scores {
        writeln!(writer, "{}", score)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `scores` to `path`, replacing any existing file.
pub fn write_predictions<P: AsRef<Path>>(path: P, scores: &[Score]) -> Result<()> {
    let file = File::create(path)?;
    write_scores(BufWriter::new(file), scores)
}

/// Reads a prediction file written by [`write_predictions`].
pub fn read_predictions<P: AsRef<Path>>(path: P) -> Result<Vec<Score>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut scores = Vec::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        let score = token.parse().map_err(|_| {
            LambdaMartError::data_loading(format!(
                "{}:{}: invalid score \"{}\"",
                path.display(),
                line_number + 1,
                token
            ))
        })?;
        scores.push(score);
    }
    Ok(scores)
}
