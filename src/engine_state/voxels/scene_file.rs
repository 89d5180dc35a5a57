//! # Scene File Module
//!
//! Plain-text scene lists and the store that loads and persists them by name.
//!
//! ## Format
//!
//! One cube per line, whitespace separated, two decimals per field:
//!
//! - static cubes: `x y z r g b`
//! - live cubes: `x y z dx dy dz r g b`, where `(dx, dy, dz)` is the motion
//!   vector (direction times amplitude)
//!
//! Positions are world-space cube centers. The reader ignores line structure:
//! it parses every whitespace separated number and groups them into records.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::SandboxError;

/// Fields per static cube record.
pub const STATIC_RECORD_LEN: usize = 6;
/// Fields per live cube record.
pub const LIVE_RECORD_LEN: usize = 9;

/// Parses scene text into a flat list of numbers.
///
/// # Errors
/// `MalformedNumber` for a token that is not a float, `FieldCount` when the
/// number of fields is not a multiple of `per_record`.
pub fn parse_records(text: &str, per_record: usize) -> Result<Vec<f32>, SandboxError> {
    let values = text
        .split_whitespace()
        .enumerate()
        .map(|(field, token)| {
            token.parse::<f32>().map_err(|_| SandboxError::MalformedNumber {
                field,
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<f32>, _>>()?;

    if values.len() % per_record != 0 {
        return Err(SandboxError::FieldCount {
            per_record,
            found: values.len(),
        });
    }
    Ok(values)
}

/// Formats a flat list of numbers as one record per line, two decimals each.
///
/// A trailing partial record is dropped.
pub fn format_records(values: &[f32], per_record: usize) -> String {
    let mut text = String::new();
    for record in values.chunks_exact(per_record) {
        let line = record
            .iter()
            .map(|v| format!("{:.2}", v))
            .collect::<Vec<_>>()
            .join(" ");
        text.push_str(&line);
        text.push('\n');
    }
    text
}

/// Loads and persists scene text by name.
pub trait SceneStore {
    /// Returns the text of the named scene.
    fn load(&self, name: &str) -> Result<String, SandboxError>;

    /// Replaces the named scene with `contents`.
    fn persist(&self, name: &str, contents: &str) -> Result<(), SandboxError>;
}

/// Scenes stored as `<root>/data/<name>.scene` files.
#[derive(Debug, Clone)]
pub struct FileSceneStore {
    root: PathBuf,
}

impl FileSceneStore {
    /// Creates a store rooted at a resource directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the file backing a scene.
    pub fn scene_path(&self, name: &str) -> PathBuf {
        self.root.join("data").join(format!("{}.scene", name))
    }
}

impl SceneStore for FileSceneStore {
    fn load(&self, name: &str) -> Result<String, SandboxError> {
        std::fs::read_to_string(self.scene_path(name)).map_err(|source| SandboxError::SceneRead {
            name: name.to_string(),
            source,
        })
    }

    fn persist(&self, name: &str, contents: &str) -> Result<(), SandboxError> {
        let path = self.scene_path(name);
        let write_err = |source| SandboxError::SceneWrite {
            name: name.to_string(),
            source,
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(write_err)?;
        }
        std::fs::write(&path, contents).map_err(write_err)
    }
}

/// Scenes kept in memory, for headless runs and tests.
#[derive(Debug, Default)]
pub struct MemorySceneStore {
    scenes: RefCell<HashMap<String, String>>,
}

impl MemorySceneStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a scene, returning the store for chaining.
    pub fn with_scene(self, name: &str, contents: &str) -> Self {
        self.scenes
            .borrow_mut()
            .insert(name.to_string(), contents.to_string());
        self
    }
}

impl SceneStore for MemorySceneStore {
    fn load(&self, name: &str) -> Result<String, SandboxError> {
        self.scenes
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| SandboxError::SceneMissing {
                name: name.to_string(),
            })
    }

    fn persist(&self, name: &str, contents: &str) -> Result<(), SandboxError> {
        self.scenes
            .borrow_mut()
            .insert(name.to_string(), contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_two_decimals_per_field() {
        let text = format_records(&[1.0, -2.5, 0.5, 0.123, 0.5, 1.0], STATIC_RECORD_LEN);
        assert_eq!(text, "1.00 -2.50 0.50 0.12 0.50 1.00\n");
    }

    #[test]
    fn reader_ignores_line_structure() {
        let values = parse_records("0 0 0.5\n1 0 0   0 0 1.5 0 1 0\n", STATIC_RECORD_LEN).unwrap();
        assert_eq!(values.len(), 12);
        assert_eq!(values[8], 1.5);
    }

    #[test]
    fn rejects_partial_records() {
        let err = parse_records("0 0 0.5 1 1", STATIC_RECORD_LEN).unwrap_err();
        assert!(matches!(
            err,
            SandboxError::FieldCount { per_record: 6, found: 5 }
        ));
    }

    #[test]
    fn rejects_non_numeric_tokens() {
        let err = parse_records("0 0 zero 1 1 1", STATIC_RECORD_LEN).unwrap_err();
        match err {
            SandboxError::MalformedNumber { field, token } => {
                assert_eq!(field, 2);
                assert_eq!(token, "zero");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemorySceneStore::new();
        assert!(matches!(store.load("cubes0"), Err(SandboxError::SceneMissing { .. })));
        store.persist("cubes0", "0 0 0.5 1 1 1\n").unwrap();
        assert_eq!(store.load("cubes0").unwrap(), "0 0 0.5 1 1 1\n");
    }

    #[test]
    fn file_store_layout() {
        let store = FileSceneStore::new("resources");
        assert_eq!(
            store.scene_path("live"),
            PathBuf::from("resources").join("data").join("live.scene")
        );
    }
}
