//! This module provides the `DefinitionLoader` struct, responsible for loading automaton
//! definitions from files, directories, and strings.

use crate::parser::parse;
use crate::types::{Automaton, AutomatonError, DEFINITION_EXTENSION, MAX_DEFINITION_SIZE};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `DefinitionLoader` is a utility struct for loading automata.
/// It provides methods to load a definition from a file or from string content,
/// and to discover and load all `.dfa` files within a specified directory.
pub struct DefinitionLoader;

impl DefinitionLoader {
    /// Loads a single automaton from the specified file path.
    ///
    /// Files that are not valid UTF-8 are decoded as Latin-1.
    ///
    /// # Returns
    ///
    /// * `Ok(Automaton)` if the file is successfully read and parsed.
    /// * `Err(AutomatonError::File)` if the file cannot be read or is too large.
    /// * Any reader or builder error if the content is not a valid definition.
    pub fn load(path: &Path) -> Result<Automaton, AutomatonError> {
        let bytes = fs::read(path).map_err(|e| {
            AutomatonError::File(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        if bytes.len() > MAX_DEFINITION_SIZE {
            return Err(AutomatonError::File(format!(
                "File {} is {} bytes, the limit is {} bytes",
                path.display(),
                bytes.len(),
                MAX_DEFINITION_SIZE
            )));
        }

        debug!(path = %path.display(), bytes = bytes.len(), "loading definition");
        parse(&decode(bytes))
    }

    /// Loads a single automaton from the provided string content.
    pub fn load_from_string(content: &str) -> Result<Automaton, AutomatonError> {
        if content.len() > MAX_DEFINITION_SIZE {
            return Err(AutomatonError::File(format!(
                "Definition is {} bytes, the limit is {} bytes",
                content.len(),
                MAX_DEFINITION_SIZE
            )));
        }

        parse(content)
    }

    /// Loads all definition files (`.dfa` extension) from a given directory.
    ///
    /// Directories and other files are skipped. Results are sorted by path so the
    /// output does not depend on directory iteration order.
    pub fn load_dir(directory: &Path) -> Vec<Result<(PathBuf, Automaton), AutomatonError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(AutomatonError::File(format!(
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
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file()
                        && path
                            .extension()
                            .is_some_and(|ext| ext == DEFINITION_EXTENSION)
                    {
                        paths.push(path);
                    }
                }
                Err(e) => results.push(Err(AutomatonError::File(format!(
                    "Failed to read directory entry: {}",
                    e
                )))),
            }
        }

        paths.sort();
        results.extend(
            paths
                .into_iter()
                .map(|path| Self::load(&path).map(|automaton| (path, automaton))),
        );

        results
    }
}

/// Decodes file content as UTF-8, falling back to Latin-1.
fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const VALID: &str = "states: q0\nalphabet: 0\ninitial: q0\ntransitions:\n  q0, 0 -> q0\n";

    #[test]
    fn test_load_valid_definition() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("loop.dfa");
        File::create(&file_path)
            .unwrap()
            .write_all(VALID.as_bytes())
            .unwrap();

        let automaton = DefinitionLoader::load(&file_path).unwrap();
        assert_eq!(automaton.initial(), "q0");
        assert_eq!(automaton.next("q0", "0"), Some("q0"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = DefinitionLoader::load(&dir.path().join("nope.dfa"));

        assert!(matches!(result, Err(AutomatonError::File(_))));
    }

    #[test]
    fn test_load_latin1_definition() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("latin1.dfa");

        // "état" with a Latin-1 encoded 'é' (0xE9) as a state name.
        let mut content = b"states: ".to_vec();
        content.extend_from_slice(&[0xE9]);
        content.extend_from_slice(b"tat\nalphabet: a\ninitial: \xE9tat\n");
        File::create(&file_path)
            .unwrap()
            .write_all(&content)
            .unwrap();

        let automaton = DefinitionLoader::load(&file_path).unwrap();
        assert_eq!(automaton.initial(), "état");
    }

    #[test]
    fn test_load_too_large() {
        let content = format!("{VALID}{}", "#".repeat(MAX_DEFINITION_SIZE));
        let result = DefinitionLoader::load_from_string(&content);

        assert!(matches!(result, Err(AutomatonError::File(_))));
    }

    #[test]
    fn test_load_dir() {
        let dir = tempdir().unwrap();

        let mut valid = File::create(dir.path().join("a_valid.dfa")).unwrap();
        valid.write_all(VALID.as_bytes()).unwrap();

        let mut invalid = File::create(dir.path().join("b_invalid.dfa")).unwrap();
        invalid.write_all(b"This is not a valid definition").unwrap();

        let mut ignored = File::create(dir.path().join("ignored.txt")).unwrap();
        ignored.write_all(b"This file should be ignored").unwrap();

        let results = DefinitionLoader::load_dir(dir.path());

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(AutomatonError::Syntax(_))));
    }

    #[test]
    fn test_load_dir_missing() {
        let dir = tempdir().unwrap();
        let results = DefinitionLoader::load_dir(&dir.path().join("missing"));

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(AutomatonError::File(_))));
    }
}
