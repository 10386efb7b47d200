//! JSON run log: the records of every finished index, rewritten whole after each index.

use std::path::Path;

use canopy::IndexRecord;
use serde::Serialize;

use crate::CliError;

/// Records collected so far, serialized as a JSON array.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct RunLog {
    records: Vec<IndexRecord>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: IndexRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Writes JSON to stdout or to the given file. When pretty is true, multi-line; else one line.
pub fn write_json_output<T: Serialize>(
    value: &T,
    file: Option<&Path>,
    pretty: bool,
) -> Result<(), CliError> {
    let s = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    match file {
        Some(path) => std::fs::write(path, format!("{}\n", s)).map_err(|source| {
            CliError::Write {
                path: path.to_path_buf(),
                source,
            }
        }),
        None => {
            println!("{}", s);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_compact_and_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        let value = serde_json::json!({ "idx": 0, "ys": ["a"] });

        write_json_output(&value, Some(&path), false).unwrap();
        let compact = std::fs::read_to_string(&path).unwrap();
        assert_eq!(compact, "{\"idx\":0,\"ys\":[\"a\"]}\n");

        write_json_output(&value, Some(&path), true).unwrap();
        let pretty = std::fs::read_to_string(&path).unwrap();
        assert!(pretty.lines().count() > 1);
    }

    #[test]
    fn empty_log_is_an_empty_array() {
        let log = RunLog::new();
        assert!(log.is_empty());
        assert_eq!(serde_json::to_string(&log).unwrap(), "[]");
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("log.json");
        assert!(matches!(
            write_json_output(&1, Some(&path), false),
            Err(CliError::Write { .. })
        ));
    }
}
