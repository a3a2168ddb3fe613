//! # VirtXML
//!
//! Intermediate representation generator for libvirt XML record types.
//!
//! VirtXML reflects over the record types describing libvirt's XML documents
//! (domains, networks, storage pools and volumes) and produces a
//! language-neutral IR that schema, model and conversion emitters consume.
//!
//! ## Features
//!
//! - **Cycle-safe reflection** - Recursive types become marked back-edges
//! - **Pattern detection** - Value-with-unit elements, presence-only flags, yes/no strings
//! - **Flattening** - `<memory unit='KiB'>524288</memory>` becomes `memory` + `memory_unit`
//! - **Documentation overlay** - YAML descriptions keyed by output path
//! - **Coverage batches** - Undocumented fields grouped for writing
//!
//! ## Quick Start
//!
//! ```ignore
//! use virtxml::prelude::*;
//!
//! let catalog = libvirt_catalog()?;
//! let run = Generator::builder()
//!     .exclude("DomainSecLabel", "managed by the host")
//!     .build()
//!     .run(&catalog)?;
//!
//! for ir in run.structs().filter(|s| !s.is_excluded()) {
//!     println!("{} ({} fields)", ir.name, ir.fields.len());
//! }
//! ```
//!
//! Records can also be declared in Rust. Types deriving [`XmlRecord`] refer
//! to `::virtxml_schema`, so that crate must be a direct dependency:
//!
//! ```ignore
//! use virtxml::XmlRecord;
//!
//! #[derive(XmlRecord)]
//! #[xml(element = "pool")]
//! pub struct StoragePool {
//!     #[xml(attr = "type")]
//!     pub r#type: String,
//!     #[xml(element = "name")]
//!     pub name: String,
//! }
//!
//! let catalog = virtxml::Catalog::from_type::<StoragePool>("libvirtxml");
//! ```
//!
//! ## Crate Organization
//!
//! - [`schema`] - Record catalog, XML parsing and validation
//! - [`codegen`] - Reflection, patterns, overrides, docs and coverage
//! - [`catalog`] - Bundled libvirt catalog

pub mod catalog;
pub mod prelude;

/// Record catalog, parsing and validation.
pub mod schema {
    pub use virtxml_schema::*;
}

/// IR generation from record catalogs.
pub mod codegen {
    pub use virtxml_codegen::*;
}

pub use catalog::{LIBVIRT_CATALOG, libvirt_catalog};

// Re-export commonly used items at the crate root
pub use virtxml_schema::{
    Catalog, FieldDecl, ParseError, RecordDecl, SchemaError, TypeExpr, XmlRecord, XmlTag,
    XmlType, parse_catalog, parse_catalog_file,
};

pub use virtxml_codegen::{
    CodegenError, DocRegistry, GenerationRun, Generator, GeneratorBuilder, Resource,
};

pub use virtxml_derive::XmlRecord;
