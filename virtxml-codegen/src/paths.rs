//! Dotted output and document paths.
//!
//! A field's output path is its ancestors' output names joined with `.`,
//! starting at the resource root (`domain.os.type`). The document path uses
//! element names instead and prefixes attributes with `@`
//! (`domain.memory.@unit`).

use crate::ir::{FieldIR, StructGraph, StructId};
use std::collections::HashSet;

/// Joins a parent output path and a field's output name.
#[must_use]
pub fn output_path(parent: &str, field: &FieldIR) -> String {
    format!("{parent}.{}", field.output_name)
}

/// Joins a parent document path and the node a field maps onto.
#[must_use]
pub fn xml_path(parent: &str, field: &FieldIR) -> String {
    let name = if field.xml_name.is_empty() {
        &field.output_name
    } else {
        &field.xml_name
    };

    match field.flattened_attribute() {
        Some(attribute) => format!("{parent}.{name}.@{attribute}"),
        None if field.is_attr => format!("{parent}.@{name}"),
        None => format!("{parent}.{name}"),
    }
}

/// Records output and document paths on every field reachable from `root`.
///
/// Structs shared between parents keep the paths of the first parent that
/// reached them.
pub fn assign_paths(graph: &mut StructGraph, root: StructId, root_path: &str, xml_root: &str) {
    let mut visited = HashSet::new();
    assign_struct(
        graph,
        root,
        root_path.to_string(),
        xml_root.to_string(),
        &mut visited,
    );
}

/// Records paths for several resource roots, given as
/// `(root, root path, document root)`.
///
/// A root reached from inside another resource is not descended there, so
/// its fields and the structs below it take paths under its own resource.
pub fn assign_root_paths(graph: &mut StructGraph, roots: &[(StructId, &str, &str)]) {
    for &(root, root_path, xml_root) in roots {
        let mut visited: HashSet<StructId> = roots
            .iter()
            .map(|&(id, _, _)| id)
            .filter(|&id| id != root)
            .collect();
        assign_struct(
            graph,
            root,
            root_path.to_string(),
            xml_root.to_string(),
            &mut visited,
        );
    }
}

fn assign_struct(
    graph: &mut StructGraph,
    id: StructId,
    path: String,
    xml: String,
    visited: &mut HashSet<StructId>,
) {
    if !visited.insert(id) {
        return;
    }
    let Some(ir) = graph.get_mut(id) else {
        return;
    };

    let mut children = Vec::new();
    for field in &mut ir.fields {
        let field_path = output_path(&path, field);
        let field_xml = xml_path(&xml, field);
        if field.path.is_empty() {
            field.path = field_path.clone();
            field.xml_path = field_xml.clone();
        }
        if field.is_nested {
            if let Some(nested) = field.nested() {
                children.push((nested, field_path, field_xml));
            }
        }
    }

    for (nested, field_path, field_xml) in children {
        assign_struct(graph, nested, field_path, field_xml, visited);
    }
}
