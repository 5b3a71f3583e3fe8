//! The kernel-to-suite mapping file.
//!
//! A JSON array of `{ "kernel": <path>, "test": <suite name> }` entries,
//! sorted by kernel path. The generator merges the on-disk kernel listing
//! with the existing mapping so hand-filled suite names survive regeneration.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diagnostic::Diagnostic;

/// File extension of kernel sources picked up by the generator.
pub const KERNEL_EXTENSION: &str = "wgsl";

/// Default mapping file name, next to the kernels directory.
pub const DEFAULT_MAPPING_FILE: &str = "kernel_test_mapping.json";

/// One kernel-to-suite association.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Kernel source path, relative to the kernels directory.
    pub kernel: String,
    /// Registered suite name; empty until filled in by hand.
    #[serde(default)]
    pub test: String,
}

/// What `regenerate` did to the mapping file.
#[derive(Debug, Default)]
pub struct RegenSummary {
    pub added: Vec<String>,
    pub kept: usize,
    pub dropped: Vec<String>,
}

/// Load a mapping file. A missing or malformed file is an error.
pub fn load(path: &Path) -> Result<Vec<MappingEntry>, Diagnostic> {
    let content = fs::read_to_string(path).map_err(|e| {
        Diagnostic::error(format!("cannot read '{}': {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Diagnostic::error(format!("malformed mapping file '{}': {}", path.display(), e))
            .with_help("regenerate it with `kernelcheck generate`".to_string())
    })
}

/// Write a mapping file, pretty-printed with a trailing newline.
pub fn save(path: &Path, entries: &[MappingEntry]) -> Result<(), Diagnostic> {
    let mut json = serde_json::to_string_pretty(entries).map_err(|e| {
        Diagnostic::error(format!("cannot serialize mapping: {}", e))
    })?;
    json.push('\n');
    fs::write(path, json).map_err(|e| {
        Diagnostic::error(format!("cannot write '{}': {}", path.display(), e))
    })
}

/// Scan `kernels_dir` for kernel sources and merge with the existing mapping.
///
/// Unchanged kernel paths keep their suite names, new kernels get an empty
/// one, and entries whose kernel file disappeared are dropped. A mapping
/// file that fails to parse is warned about and treated as empty rather
/// than aborting the regeneration.
pub fn regenerate(kernels_dir: &Path, mapping_path: &Path) -> Result<RegenSummary, Diagnostic> {
    let existing: BTreeMap<String, String> = if mapping_path.exists() {
        match load(mapping_path) {
            Ok(entries) => entries.into_iter().map(|e| (e.kernel, e.test)).collect(),
            Err(_) => {
                Diagnostic::warning(format!(
                    "'{}' is corrupted or empty, starting with an empty mapping",
                    mapping_path.display()
                ))
                .render_plain();
                BTreeMap::new()
            }
        }
    } else {
        BTreeMap::new()
    };

    let discovered = list_kernels(kernels_dir)?;

    let mut summary = RegenSummary::default();
    let mut entries = Vec::with_capacity(discovered.len());
    for kernel in &discovered {
        let test = match existing.get(kernel) {
            Some(test) => {
                summary.kept += 1;
                test.clone()
            }
            None => {
                summary.added.push(kernel.clone());
                String::new()
            }
        };
        entries.push(MappingEntry {
            kernel: kernel.clone(),
            test,
        });
    }

    summary.dropped = existing
        .keys()
        .filter(|k| !discovered.contains(k))
        .cloned()
        .collect();

    save(mapping_path, &entries)?;
    Ok(summary)
}

/// List kernel file names in a directory, sorted. Non-recursive.
pub fn list_kernels(kernels_dir: &Path) -> Result<Vec<String>, Diagnostic> {
    let read_dir = fs::read_dir(kernels_dir).map_err(|e| {
        Diagnostic::error(format!(
            "cannot read kernels directory '{}': {}",
            kernels_dir.display(),
            e
        ))
    })?;

    let mut names = Vec::new();
    for dir_entry in read_dir {
        let dir_entry = dir_entry.map_err(|e| {
            Diagnostic::error(format!(
                "cannot read kernels directory '{}': {}",
                kernels_dir.display(),
                e
            ))
        })?;
        let path = dir_entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().is_some_and(|ext| ext == KERNEL_EXTENSION) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_without_test_field_deserializes_empty() {
        let entry: MappingEntry = serde_json::from_str(r#"{"kernel": "relu.wgsl"}"#).unwrap();
        assert_eq!(entry.kernel, "relu.wgsl");
        assert_eq!(entry.test, "");
    }

    #[test]
    fn test_mapping_serialization_shape() {
        let entries = vec![
            MappingEntry {
                kernel: "relu.wgsl".to_string(),
                test: "relu".to_string(),
            },
            MappingEntry {
                kernel: "vector_add.wgsl".to_string(),
                test: String::new(),
            },
        ];
        insta::assert_snapshot!(serde_json::to_string_pretty(&entries).unwrap(), @r#"
        [
          {
            "kernel": "relu.wgsl",
            "test": "relu"
          },
          {
            "kernel": "vector_add.wgsl",
            "test": ""
          }
        ]
        "#);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.message.contains("cannot read"));
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.json");
        let entries = vec![MappingEntry {
            kernel: "sigmoid.wgsl".to_string(),
            test: "sigmoid".to_string(),
        }];
        save(&path, &entries).unwrap();
        assert_eq!(load(&path).unwrap(), entries);
    }

    #[test]
    fn test_list_kernels_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.wgsl"), "").unwrap();
        std::fs::write(dir.path().join("a.wgsl"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("sub.wgsl")).unwrap();

        let names = list_kernels(dir.path()).unwrap();
        assert_eq!(names, vec!["a.wgsl".to_string(), "b.wgsl".to_string()]);
    }
}
