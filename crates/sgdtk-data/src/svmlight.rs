//! SVM-Light text format reader.
//!
//! Each non-empty line holds one example:
//!
//! ```text
//! <label> <index>:<value> <index>:<value> ... [# comment]
//! ```
//!
//! Indices are used exactly as written, so a file whose largest index is `k`
//! needs a model of width `k + 1`. Lines that are blank or start with `#` are
//! skipped, and `qid:` tokens are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use sgdtk_core::FeatureVector;

use crate::{DataError, Result};

/// Shape of a dataset: feature-space width and number of examples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims {
    /// Largest feature index plus one.
    pub width: usize,
    /// Number of examples.
    pub height: usize,
}

/// What to do with a feature whose index is not below the reader width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutOfRange {
    /// Fail the load with [`DataError::IndexOutOfRange`].
    #[default]
    Reject,
    /// Skip the feature and keep the rest of the example.
    Drop,
}

/// Scans an SVM-Light file once to find its dimensions.
pub fn find_dims<P: AsRef<Path>>(path: P) -> Result<Dims> {
    let file = File::open(path.as_ref())?;
    find_dims_from(BufReader::new(file))
}

/// Scans SVM-Light text from a reader to find its dimensions.
pub fn find_dims_from<R: BufRead>(reader: R) -> Result<Dims> {
    let mut dims = Dims {
        width: 0,
        height: 0,
    };
    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some((_, features)) = parse_line(&line, line_idx + 1)? {
            dims.height += 1;
            if let Some(max) = features.iter().map(|(index, _)| *index).max() {
                dims.width = dims.width.max(max + 1);
            }
        }
    }
    Ok(dims)
}

/// Loads SVM-Light files into feature vectors of a fixed width.
#[derive(Debug, Clone)]
pub struct SvmLightReader {
    width: usize,
    out_of_range: OutOfRange,
}

impl SvmLightReader {
    /// Creates a reader for a feature space of `width` features.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            out_of_range: OutOfRange::default(),
        }
    }

    /// Sets how features beyond the width are handled.
    pub fn with_out_of_range(mut self, policy: OutOfRange) -> Self {
        self.out_of_range = policy;
        self
    }

    /// Returns the feature-space width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Loads every example of the file at `path`, in file order.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Vec<FeatureVector>> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let examples = self.load_from(BufReader::new(file))?;
        tracing::info!(
            path = %path.display(),
            examples = examples.len(),
            width = self.width,
            "Loaded dataset"
        );
        Ok(examples)
    }

    /// Loads every example from SVM-Light text, in order.
    pub fn load_from<R: BufRead>(&self, reader: R) -> Result<Vec<FeatureVector>> {
        let mut examples = Vec::new();
        let mut dropped = 0usize;

        for (line_idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = line_idx + 1;
            let Some((label, features)) = parse_line(&line, line_no)? else {
                continue;
            };

            let mut kept = Vec::with_capacity(features.len());
            for (index, value) in features {
                if index < self.width {
                    kept.push((index, value));
                    continue;
                }
                match self.out_of_range {
                    OutOfRange::Reject => {
                        return Err(DataError::IndexOutOfRange {
                            line: line_no,
                            index,
                            width: self.width,
                        })
                    }
                    OutOfRange::Drop => dropped += 1,
                }
            }

            let fv = FeatureVector::from_pairs(label, kept).map_err(|source| {
                DataError::InvalidExample {
                    line: line_no,
                    source,
                }
            })?;
            examples.push(fv);
        }

        if dropped > 0 {
            tracing::warn!(
                dropped,
                width = self.width,
                "Dropped features outside the model width"
            );
        }
        Ok(examples)
    }
}

/// Parses one line into a label and its features.
///
/// Returns `Ok(None)` for blank and comment lines.
fn parse_line(line: &str, line_no: usize) -> Result<Option<(f64, Vec<(usize, f64)>)>> {
    let content = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };
    let mut tokens = content.split_whitespace();
    let Some(label_token) = tokens.next() else {
        return Ok(None);
    };

    let label: f64 = label_token.parse().map_err(|_| DataError::Parse {
        line: line_no,
        message: format!("invalid label '{}'", label_token),
    })?;

    let mut features = Vec::new();
    for token in tokens {
        let (index, value) = token.split_once(':').ok_or_else(|| DataError::Parse {
            line: line_no,
            message: format!("expected index:value, got '{}'", token),
        })?;
        if index == "qid" {
            continue;
        }
        let index: usize = index.parse().map_err(|_| DataError::Parse {
            line: line_no,
            message: format!("invalid feature index '{}'", index),
        })?;
        let value: f64 = value.parse().map_err(|_| DataError::Parse {
            line: line_no,
            message: format!("invalid feature value '{}'", value),
        })?;
        features.push((index, value));
    }

    Ok(Some((label, features)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
# header comment
+1 1:0.5 4:1.25
-1 2:1.0 qid:3 3:-0.5 # trailing comment

+1 0:2.0
";

    #[test]
    fn test_find_dims() {
        let dims = find_dims_from(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dims, Dims { width: 5, height: 3 });
    }

    #[test]
    fn test_load_preserves_order_and_values() {
        let examples = SvmLightReader::new(5).load_from(SAMPLE.as_bytes()).unwrap();
        assert_eq!(examples.len(), 3);

        assert_eq!(examples[0].label(), 1.0);
        assert_eq!(examples[0].iter().collect::<Vec<_>>(), vec![(1, 0.5), (4, 1.25)]);

        assert_eq!(examples[1].label(), -1.0);
        assert_eq!(examples[1].iter().collect::<Vec<_>>(), vec![(2, 1.0), (3, -0.5)]);

        assert_eq!(examples[2].length(), 1);
    }

    #[test]
    fn test_reject_out_of_range() {
        let err = SvmLightReader::new(4)
            .load_from(SAMPLE.as_bytes())
            .expect_err("index 4 exceeds width 4");
        assert!(matches!(
            err,
            DataError::IndexOutOfRange {
                line: 2,
                index: 4,
                width: 4
            }
        ));
    }

    #[test]
    fn test_drop_out_of_range() {
        let examples = SvmLightReader::new(3)
            .with_out_of_range(OutOfRange::Drop)
            .load_from(SAMPLE.as_bytes())
            .unwrap();
        assert_eq!(examples[0].iter().collect::<Vec<_>>(), vec![(1, 0.5)]);
        assert_eq!(examples[1].iter().collect::<Vec<_>>(), vec![(2, 1.0)]);
    }

    #[test]
    fn test_parse_errors() {
        let err = SvmLightReader::new(10)
            .load_from("+1 1:0.5\nabc 1:1\n".as_bytes())
            .expect_err("bad label");
        assert!(matches!(err, DataError::Parse { line: 2, .. }));

        let err = SvmLightReader::new(10)
            .load_from("+1 1-0.5\n".as_bytes())
            .expect_err("missing colon");
        assert!(matches!(err, DataError::Parse { line: 1, .. }));

        let err = SvmLightReader::new(10)
            .load_from("+1 -1:0.5\n".as_bytes())
            .expect_err("negative index");
        assert!(matches!(err, DataError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_duplicate_index_rejected() {
        let err = SvmLightReader::new(10)
            .load_from("+1 2:0.5 2:1.0\n".as_bytes())
            .expect_err("duplicate index");
        assert!(matches!(err, DataError::InvalidExample { line: 1, .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let dims = find_dims(file.path()).unwrap();
        let examples = SvmLightReader::new(dims.width).load(file.path()).unwrap();
        assert_eq!(examples.len(), dims.height);
    }

    #[test]
    fn test_missing_file() {
        let result = SvmLightReader::new(3).load("/nonexistent/train.svm");
        assert!(matches!(result, Err(DataError::Io(_))));
    }
}
