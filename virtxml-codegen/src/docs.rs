//! Documentation registry.
//!
//! Human-written descriptions are kept in YAML files keyed by dotted output
//! path (`domain.memory_unit`). The registry overlays them onto the IR by
//! exact path match.

use crate::error::DocError;
use crate::ir::{StructGraph, StructId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// One documentation snippet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocEntry {
    /// Dotted output path.
    #[serde(default)]
    pub path: String,
    /// Plain description.
    #[serde(default)]
    pub description: String,
    /// Reference link.
    #[serde(default)]
    pub reference: String,
}

impl DocEntry {
    /// Returns the markdown rendering used for fields.
    #[must_use]
    pub fn markdown(&self) -> String {
        if self.reference.is_empty() {
            self.description.clone()
        } else {
            format!("{}\n\nSee: <{}>", self.description, self.reference)
        }
    }
}

#[derive(Debug, Deserialize)]
struct DocFile {
    #[serde(default)]
    entries: Vec<DocEntry>,
}

/// Documentation entries keyed by path.
#[derive(Debug, Clone, Default)]
pub struct DocRegistry {
    entries: BTreeMap<String, DocEntry>,
    sources: BTreeMap<String, PathBuf>,
}

impl DocRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.yaml` and `*.yml` file of a directory.
    ///
    /// A missing directory yields an empty registry. Files are read in name
    /// order.
    ///
    /// # Errors
    /// Returns `DocError` if a file cannot be read or parsed, an entry has a
    /// blank path, or two entries share a path.
    pub fn load(dir: &Path) -> Result<Self, DocError> {
        let mut registry = Self::new();

        let read_dir = match std::fs::read_dir(dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No doc directory at {}", dir.display());
                return Ok(registry);
            }
            Err(source) => {
                return Err(DocError::ReadDir {
                    path: dir.to_path_buf(),
                    source,
                });
            }
        };

        let mut files = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|source| DocError::ReadDir {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            let is_yaml = matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("yaml" | "yml")
            );
            if is_yaml && path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        for path in files {
            let contents = std::fs::read_to_string(&path).map_err(|source| DocError::ReadFile {
                path: path.clone(),
                source,
            })?;
            registry.add_yaml(&contents, &path)?;
            tracing::debug!("Loaded doc file {}", path.display());
        }

        Ok(registry)
    }

    /// Adds the entries of one YAML document.
    ///
    /// # Errors
    /// Returns `DocError` if the document does not parse, an entry has a blank
    /// path, or an entry path is already registered.
    pub fn add_yaml(&mut self, contents: &str, source: &Path) -> Result<(), DocError> {
        let parsed: DocFile =
            serde_yaml::from_str(contents).map_err(|e| DocError::ParseFile {
                path: source.to_path_buf(),
                source: e,
            })?;

        for (index, mut entry) in parsed.entries.into_iter().enumerate() {
            entry.path = entry.path.trim().to_string();
            if entry.path.is_empty() {
                return Err(DocError::MissingPath {
                    path: source.to_path_buf(),
                    index,
                });
            }
            self.insert(entry, source)?;
        }
        Ok(())
    }

    /// Registers one entry.
    ///
    /// # Errors
    /// Returns `DocError::DuplicatePath` if the path is already registered.
    pub fn insert(&mut self, entry: DocEntry, source: &Path) -> Result<(), DocError> {
        if self.entries.contains_key(&entry.path) {
            return Err(DocError::DuplicatePath {
                entry: entry.path,
                path: source.to_path_buf(),
            });
        }
        self.sources.insert(entry.path.clone(), source.to_path_buf());
        self.entries.insert(entry.path.clone(), entry);
        Ok(())
    }

    /// Returns the entry for a path.
    #[must_use]
    pub fn entry(&self, path: &str) -> Option<&DocEntry> {
        self.entries.get(path)
    }

    /// Returns the file an entry was loaded from.
    #[must_use]
    pub fn source(&self, path: &str) -> Option<&Path> {
        self.sources.get(path).map(PathBuf::as_path)
    }

    /// Returns true if a path is documented.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Returns the documented paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the registry holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overlays descriptions onto the struct tree rooted at `root`.
    ///
    /// The root struct matches `root_path` itself; each field matches
    /// `<parent path>.<output name>`. Nested structs are descended through
    /// non-cycle links, and no path is visited twice.
    pub fn apply(&self, graph: &mut StructGraph, root: StructId, root_path: &str) {
        let root_path = root_path.trim();
        if self.entries.is_empty() || root_path.is_empty() {
            return;
        }
        let mut visited = HashSet::new();
        self.apply_struct(graph, root, root_path.to_string(), &mut visited);
    }

    fn apply_struct(
        &self,
        graph: &mut StructGraph,
        id: StructId,
        path: String,
        visited: &mut HashSet<String>,
    ) {
        if !visited.insert(path.clone()) {
            return;
        }
        let Some(ir) = graph.get_mut(id) else {
            return;
        };

        if let Some(entry) = self.entries.get(&path) {
            if !entry.description.is_empty() {
                ir.description = entry.description.clone();
                ir.markdown_description = entry.description.clone();
            }
        }

        let mut children = Vec::new();
        for field in &mut ir.fields {
            let child_path = format!("{path}.{}", field.output_name);
            if let Some(entry) = self.entries.get(&child_path) {
                if !entry.description.is_empty() {
                    field.description = entry.description.clone();
                    field.markdown_description = entry.markdown();
                }
            }
            if field.is_nested {
                if let Some(nested) = field.nested() {
                    children.push((nested, child_path));
                }
            }
        }

        for (nested, child_path) in children {
            self.apply_struct(graph, nested, child_path, visited);
        }
    }
}
