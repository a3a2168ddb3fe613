//! # VirtXML Schema
//!
//! Declarative record catalog for libvirt-style XML configuration types.
//!
//! This crate provides:
//! - Record, field and type declarations describing an XML binding schema
//! - Catalog parsing from XML descriptor files
//! - Catalog validation
//! - Registration of Rust types through the [`XmlType`] and [`XmlRecord`] traits
//! - Snake case naming shared by every consumer of the catalog

pub mod declare;
pub mod error;
pub mod naming;
pub mod parser;
pub mod types;
pub mod validation;

pub use declare::{XmlRecord, XmlType};
pub use error::{ParseError, SchemaError};
pub use naming::to_snake_case;
pub use parser::{parse_catalog, parse_catalog_file};
pub use types::{Catalog, FieldDecl, RecordDecl, ScalarKind, TypeExpr, XmlNode, XmlTag};
pub use validation::validate_catalog;
