//! Documentation coverage.
//!
//! Enumerates the field paths the documentation registry does not cover yet,
//! with enough context (document path, optionality, patterns, valid values)
//! for someone to write the missing descriptions, and splits them into
//! batches.

use crate::docs::DocRegistry;
use crate::ir::{FieldIR, StructGraph, StructId};
use crate::paths::{output_path, xml_path};
use serde::Serialize;
use std::collections::HashSet;

/// Default number of fields per batch.
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Context of one undocumented field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldContext {
    /// Dotted output path.
    pub path: String,
    /// Dotted document path.
    pub xml_path: String,
    /// Optional in the generated schema.
    pub optional: bool,
    /// Required in the generated schema.
    pub required: bool,
    /// Computed in the generated schema.
    pub computed: bool,
    /// Collapsed presence-only element.
    pub presence_boolean: bool,
    /// Yes/no string exposed as a boolean.
    pub string_to_bool: bool,
    /// Token meaning true, when `string_to_bool` is set.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub string_to_bool_true: String,
    /// Token meaning false, when `string_to_bool` is set.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub string_to_bool_false: String,
    /// Attribute a flattened field represents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flattened_attribute: Option<String>,
    /// Enumerated valid values.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub valid_values: Vec<String>,
}

impl FieldContext {
    fn new(field: &FieldIR, path: String, xml_path: String) -> Self {
        let (true_token, false_token) = field
            .string_to_bool
            .as_ref()
            .map(|t| (t.true_token.clone(), t.false_token.clone()))
            .unwrap_or_default();

        Self {
            path,
            xml_path,
            optional: field.is_optional(),
            required: field.is_required(),
            computed: field.is_computed(),
            presence_boolean: field.is_presence_boolean(),
            string_to_bool: field.string_to_bool.is_some(),
            string_to_bool_true: true_token,
            string_to_bool_false: false_token,
            flattened_attribute: field.flattened_attribute().map(str::to_string),
            valid_values: field.valid_values.clone(),
        }
    }
}

/// A group of fields to document together.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Batch {
    /// Fields in path order.
    pub fields: Vec<FieldContext>,
}

/// Collects every field reachable from `root` whose path is not documented.
///
/// Documented fields are skipped but still descended, so their undocumented
/// children are reported.
pub fn collect_fields(
    graph: &StructGraph,
    root: StructId,
    root_path: &str,
    xml_root: &str,
    registry: Option<&DocRegistry>,
    out: &mut Vec<FieldContext>,
) {
    let mut visited = HashSet::new();
    collect_struct(graph, root, root_path, xml_root, registry, &mut visited, out);
}

fn collect_struct(
    graph: &StructGraph,
    id: StructId,
    path: &str,
    xml: &str,
    registry: Option<&DocRegistry>,
    visited: &mut HashSet<String>,
    out: &mut Vec<FieldContext>,
) {
    let Some(ir) = graph.get(id) else {
        return;
    };

    for field in &ir.fields {
        let field_path = output_path(path, field);
        if !visited.insert(field_path.clone()) {
            continue;
        }
        let field_xml = xml_path(xml, field);

        let documented = registry.is_some_and(|r| r.contains(&field_path));
        if !documented {
            out.push(FieldContext::new(field, field_path.clone(), field_xml.clone()));
        }

        if field.is_nested {
            if let Some(nested) = field.nested() {
                collect_struct(graph, nested, &field_path, &field_xml, registry, visited, out);
            }
        }
    }
}

/// Sorts fields by path and splits them into batches.
///
/// A batch size of zero is treated as one.
#[must_use]
pub fn build_batches(mut fields: Vec<FieldContext>, batch_size: usize) -> Vec<Batch> {
    fields.sort_by(|a, b| a.path.cmp(&b.path));
    fields
        .chunks(batch_size.max(1))
        .map(|chunk| Batch {
            fields: chunk.to_vec(),
        })
        .collect()
}
