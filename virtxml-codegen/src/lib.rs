//! # VirtXML Codegen
//!
//! Intermediate representation generation from record catalogs.
//!
//! This crate provides:
//! - The type-graph reflector with cycle-safe recursion
//! - Structural pattern detection (value with unit, presence, yes/no flags)
//! - Field expansion and semantic override passes
//! - The documentation registry and coverage batches
//! - A driver running the pipeline over every resource kind

pub mod coverage;
pub mod cycle;
pub mod docs;
pub mod error;
pub mod expand;
pub mod generator;
pub mod ir;
pub mod overrides;
pub mod paths;
pub mod patterns;
pub mod reflector;

pub use coverage::{Batch, FieldContext};
pub use cycle::CycleGuard;
pub use docs::{DocEntry, DocRegistry};
pub use error::{CodegenError, DocError, ReflectError};
pub use generator::{GenerationRun, Generator, GeneratorBuilder, Resource};
pub use ir::{
    AttributeKind, FieldIR, FieldPattern, NestedLink, Optionality, PlanHint, StructGraph,
    StructIR, StructId, StructPattern, ValueType,
};
pub use reflector::Reflector;

/// Generates IR from a catalog XML string with the default resource kinds.
///
/// # Arguments
/// * `xml` - Catalog XML content
///
/// # Returns
/// The generation run.
///
/// # Errors
/// Returns `CodegenError` if parsing, validation, or reflection fails.
pub fn generate_from_xml(xml: &str) -> Result<GenerationRun, CodegenError> {
    let catalog = virtxml_schema::parse_catalog(xml)?;
    Generator::default().run(&catalog)
}

/// Generates IR from a catalog XML file with the default resource kinds.
///
/// # Errors
/// Returns `CodegenError` if reading, parsing, validation, or reflection fails.
pub fn generate_from_file(path: &std::path::Path) -> Result<GenerationRun, CodegenError> {
    let xml = std::fs::read_to_string(path)?;
    generate_from_xml(&xml)
}
