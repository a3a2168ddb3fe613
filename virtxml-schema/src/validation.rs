//! Catalog validation utilities.
//!
//! This module checks a parsed or registered catalog for dangling record
//! references and for field declarations that cannot be serialized.

use crate::error::SchemaError;
use crate::types::{Catalog, FieldDecl, RecordDecl, TypeExpr, XmlNode};
use std::collections::HashSet;

/// Validates a catalog for correctness.
///
/// # Arguments
/// * `catalog` - The catalog to validate
///
/// # Returns
/// Ok(()) if valid, or SchemaError describing the first issue found.
///
/// # Errors
/// Returns `SchemaError` if validation fails.
pub fn validate_catalog(catalog: &Catalog) -> Result<(), SchemaError> {
    for record in catalog.records() {
        validate_record(catalog, record, &record.name)?;
    }
    Ok(())
}

/// Validates one record; `label` names it in diagnostics.
fn validate_record(catalog: &Catalog, record: &RecordDecl, label: &str) -> Result<(), SchemaError> {
    let mut seen_names = HashSet::new();
    let mut chardata_seen = false;

    for field in &record.fields {
        if !field.name.is_empty() && !seen_names.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateField {
                record: label.to_string(),
                field: field.name.clone(),
            });
        }

        validate_tag(label, field)?;

        if field.exported && field.node() == Some(XmlNode::CharData) {
            if chardata_seen {
                return Err(SchemaError::invalid_tag(
                    label,
                    &field.name,
                    "record already has a character data field",
                ));
            }
            chardata_seen = true;
        }

        validate_type(catalog, &field.ty, label, &field.name)?;
    }

    Ok(())
}

/// Validates that a field's tag fits its declared type.
fn validate_tag(record: &str, field: &FieldDecl) -> Result<(), SchemaError> {
    if field.embedded {
        if field.tag.is_some() {
            return Err(SchemaError::invalid_tag(
                record,
                &field.name,
                "embedded fields carry no tag",
            ));
        }
        return Ok(());
    }

    match field.node() {
        Some(XmlNode::Attribute) | Some(XmlNode::CharData) if field.ty.as_scalar().is_none() => {
            Err(SchemaError::invalid_tag(
                record,
                &field.name,
                format!("{} cannot hold a {}", describe(field), field.ty.kind_name()),
            ))
        }
        _ => Ok(()),
    }
}

fn describe(field: &FieldDecl) -> &'static str {
    match field.node() {
        Some(XmlNode::Attribute) => "an attribute",
        Some(XmlNode::CharData) => "character data",
        _ => "an element",
    }
}

/// Resolves every record reference reachable from a type expression.
fn validate_type(
    catalog: &Catalog,
    ty: &TypeExpr,
    record: &str,
    field: &str,
) -> Result<(), SchemaError> {
    match ty {
        TypeExpr::Scalar(_) => Ok(()),
        TypeExpr::Named(name) => {
            if catalog.has_record(name) {
                Ok(())
            } else {
                Err(SchemaError::TypeNotFound {
                    name: name.clone(),
                    record: record.to_string(),
                    field: field.to_string(),
                })
            }
        }
        TypeExpr::Inline(inline) => {
            validate_record(catalog, inline, &format!("{record}.{field}"))
        }
        TypeExpr::Optional(inner) | TypeExpr::List(inner) => {
            validate_type(catalog, inner, record, field)
        }
    }
}
