//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```ignore
//! use virtxml::prelude::*;
//! ```

// Catalog types
pub use virtxml_schema::{
    Catalog, FieldDecl, RecordDecl, ScalarKind, TypeExpr, XmlNode, XmlRecord, XmlTag, XmlType,
};
pub use virtxml_schema::{parse_catalog, parse_catalog_file, to_snake_case, validate_catalog};

// IR types
pub use virtxml_codegen::{
    AttributeKind, FieldIR, FieldPattern, NestedLink, Optionality, PlanHint, StructGraph,
    StructIR, StructId, StructPattern, ValueType,
};

// Pipeline types
pub use virtxml_codegen::{
    Batch, CodegenError, DocEntry, DocRegistry, FieldContext, GenerationRun, Generator,
    GeneratorBuilder, Reflector, Resource,
};

// Bundled catalog
pub use crate::catalog::libvirt_catalog;

// Derive macro
pub use virtxml_derive::XmlRecord;
