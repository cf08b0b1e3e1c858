//! This module provides the `TableLoader` struct, responsible for loading transition tables
//! from files and strings and saving them back.

use crate::encoder::encode;
use crate::parser::parse;
use crate::table::{StateTransitions, TransitionTable};
use crate::types::TuringMachineError;
use std::fs;
use std::path::{Path, PathBuf};

/// The extension of table files picked up by [`TableLoader::load_tables`].
pub const TABLE_EXTENSION: &str = "tm";

/// `TableLoader` is a utility struct for loading and saving transition tables.
///
/// Files ending in `.json` use the serde JSON form of `TransitionTable`; every other file
/// uses the line-per-state text format.
pub struct TableLoader;

impl TableLoader {
    /// Loads a transition table from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(TransitionTable)` if the file is successfully read and parsed.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read or is not JSON of
    ///   the expected shape.
    /// * `Err(TuringMachineError::ParseError)` or `Err(TuringMachineError::InvalidTable)` if
    ///   the content is not a valid table.
    pub fn load(path: &Path) -> Result<TransitionTable, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        if is_json(path) {
            let states: Vec<StateTransitions> = serde_json::from_str(&content).map_err(|e| {
                TuringMachineError::FileError(format!(
                    "Failed to decode JSON table {}: {}",
                    path.display(),
                    e
                ))
            })?;
            return TransitionTable::new(states);
        }

        parse(&content)
    }

    /// Loads a transition table from the provided text content.
    pub fn load_from_string(content: &str) -> Result<TransitionTable, TuringMachineError> {
        parse(content)
    }

    /// Saves a transition table to the specified file path.
    ///
    /// Loading the written file yields an equal table.
    pub fn save(table: &TransitionTable, path: &Path) -> Result<(), TuringMachineError> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(table).map_err(|e| {
                TuringMachineError::FileError(format!("Failed to encode table as JSON: {}", e))
            })?
        } else {
            encode(table)
        };

        fs::write(path, content).map_err(|e| {
            TuringMachineError::FileError(format!(
                "Failed to write file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Loads all table files (`.tm` extension) from a given directory.
    ///
    /// Directories and other files are skipped. Each loaded file yields its own result so a
    /// single bad table does not hide the others. Results are sorted by path.
    pub fn load_tables(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, TransitionTable), TuringMachineError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths = Vec::new();
        let mut results = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(e) => results.push(Err(TuringMachineError::FileError(format!(
                    "Failed to read directory entry: {}",
                    e
                )))),
            }
        }

        paths.retain(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == TABLE_EXTENSION)
        });
        paths.sort();

        results.extend(paths.into_iter().map(|path| match Self::load(&path) {
            Ok(table) => Ok((path, table)),
            Err(e) => Err(TuringMachineError::FileError(format!(
                "Failed to load table from {}: {}",
                path.display(),
                e
            ))),
        }));

        results
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}
