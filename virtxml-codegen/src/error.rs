//! Error types for IR generation.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for the type-graph reflector.
#[derive(Debug, Error)]
pub enum ReflectError {
    /// The type is a scalar or a list rather than a record.
    #[error("expected record, got {kind} '{name}'")]
    NotARecord {
        /// Rendered type.
        name: String,
        /// Kind of type found.
        kind: &'static str,
    },

    /// The record has no name to label it with.
    #[error("record has no name (anonymous records are not supported)")]
    Anonymous,

    /// The record is not declared in the catalog.
    #[error("unknown record '{name}'")]
    UnknownRecord {
        /// Record name.
        name: String,
    },

    /// Analysis of a field failed.
    #[error("analyzing field '{field}' of '{record}'")]
    Field {
        /// Enclosing record.
        record: String,
        /// Field name.
        field: String,
        /// Underlying failure.
        source: Box<ReflectError>,
    },

    /// Analysis of an embedded record failed.
    #[error("analyzing embedded record '{embedded}' of '{record}'")]
    Embedded {
        /// Enclosing record.
        record: String,
        /// Embedded type.
        embedded: String,
        /// Underlying failure.
        source: Box<ReflectError>,
    },
}

impl ReflectError {
    /// Wraps an error with the field it occurred in.
    pub fn field(record: impl Into<String>, field: impl Into<String>, source: Self) -> Self {
        Self::Field {
            record: record.into(),
            field: field.into(),
            source: Box::new(source),
        }
    }

    /// Wraps an error with the embedded record it occurred in.
    pub fn embedded(record: impl Into<String>, embedded: impl Into<String>, source: Self) -> Self {
        Self::Embedded {
            record: record.into(),
            embedded: embedded.into(),
            source: Box::new(source),
        }
    }

    /// Returns the innermost error of a context chain.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Field { source, .. } | Self::Embedded { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Error type for the documentation registry.
#[derive(Debug, Error)]
pub enum DocError {
    /// The documentation directory could not be listed.
    #[error("reading doc directory {}: {source}", path.display())]
    ReadDir {
        /// Directory.
        path: PathBuf,
        /// IO error.
        source: std::io::Error,
    },

    /// A documentation file could not be read.
    #[error("reading doc file {}: {source}", path.display())]
    ReadFile {
        /// File.
        path: PathBuf,
        /// IO error.
        source: std::io::Error,
    },

    /// A documentation file is not valid YAML.
    #[error("parsing doc file {}: {source}", path.display())]
    ParseFile {
        /// File.
        path: PathBuf,
        /// YAML error.
        source: serde_yaml::Error,
    },

    /// An entry has a blank path.
    #[error("doc file {} entry {index} is missing a path", path.display())]
    MissingPath {
        /// File.
        path: PathBuf,
        /// Entry index within the file.
        index: usize,
    },

    /// Two entries share a path.
    #[error("duplicate documentation entry for {entry} (file {})", path.display())]
    DuplicatePath {
        /// Duplicated documentation path.
        entry: String,
        /// File holding the second entry.
        path: PathBuf,
    },
}

/// Error type for generation runs.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Catalog parsing error.
    #[error("catalog parse error: {0}")]
    Parse(#[from] virtxml_schema::ParseError),

    /// Catalog validation error.
    #[error("catalog error: {0}")]
    Schema(#[from] virtxml_schema::SchemaError),

    /// Reflection error.
    #[error("reflection error: {0}")]
    Reflect(#[from] ReflectError),

    /// Documentation registry error.
    #[error("documentation error: {0}")]
    Docs(#[from] DocError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A resource kind failed to reflect.
    #[error("reflecting {resource}")]
    Resource {
        /// Resource name.
        resource: String,
        /// Underlying failure.
        source: ReflectError,
    },

    /// Invalid generator configuration.
    #[error("configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },
}

impl CodegenError {
    /// Creates a configuration error with the given message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wraps a reflection error with the resource it occurred in.
    pub fn resource(resource: impl Into<String>, source: ReflectError) -> Self {
        Self::Resource {
            resource: resource.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_error_chain() {
        let err = ReflectError::field(
            "Domain",
            "Devices",
            ReflectError::field(
                "DomainDeviceList",
                "Disks",
                ReflectError::UnknownRecord {
                    name: "DomainDisk".to_string(),
                },
            ),
        );

        assert_eq!(err.to_string(), "analyzing field 'Devices' of 'Domain'");

        let chain: Vec<String> = std::iter::successors(
            Some(&err as &(dyn std::error::Error + 'static)),
            |e| std::error::Error::source(*e),
        )
        .map(ToString::to_string)
        .collect();
        assert_eq!(
            chain,
            [
                "analyzing field 'Devices' of 'Domain'",
                "analyzing field 'Disks' of 'DomainDeviceList'",
                "unknown record 'DomainDisk'",
            ]
        );
        assert!(matches!(
            err.root_cause(),
            ReflectError::UnknownRecord { name } if name == "DomainDisk"
        ));
    }

    #[test]
    fn test_resource_error_names_resource_once() {
        let err = CodegenError::resource(
            "domain",
            ReflectError::UnknownRecord {
                name: "Domain".to_string(),
            },
        );
        assert_eq!(err.to_string(), "reflecting domain");
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("unknown record 'Domain'"));
    }

    #[test]
    fn test_codegen_error_from_reflect() {
        let err: CodegenError = ReflectError::Anonymous.into();
        assert!(matches!(err, CodegenError::Reflect(ReflectError::Anonymous)));
    }
}
