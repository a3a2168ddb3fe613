//! Structural pattern detectors.
//!
//! Every detector is a pure function over a record's declared fields. The
//! struct-level detectors are combined by [`detect_struct_pattern`], which
//! checks value-with-unit first so a struct never carries both patterns.

use crate::ir::{AttributeInfo, StringToBool, StructPattern, ValueWithUnitPattern};
use virtxml_schema::{FieldDecl, ScalarKind, TypeExpr, XmlNode};

/// Field names that hold yes/no style flags.
const YES_NO_FIELDS: &[&str] = &[
    "readonly",
    "ReadOnly",
    "Readonly",
    "autoport",
    "AutoPort",
    "Autoport",
    "managed",
    "Managed",
    "migratable",
    "Migratable",
];

/// Detects a record holding one character data value and only attributes
/// besides it, e.g. `<memory unit='KiB'>524288</memory>`.
///
/// Untagged, ignored and unexported fields do not participate. A record with
/// child elements or more than one character data field does not qualify.
#[must_use]
pub fn detect_value_with_unit(fields: &[FieldDecl]) -> Option<ValueWithUnitPattern> {
    let mut value: Option<(&str, ScalarKind)> = None;
    let mut attributes = Vec::new();

    for field in fields.iter().filter(|f| f.is_serialized() && !f.embedded) {
        let tag = field.tag.as_ref()?;
        match tag.node {
            XmlNode::CharData => {
                if value.is_some() {
                    return None;
                }
                value = Some((field.name.as_str(), field.ty.as_scalar()?));
            }
            XmlNode::Attribute => attributes.push(AttributeInfo {
                name: field.name.clone(),
                xml_name: tag.name.clone(),
                ty: field.ty.as_scalar()?,
                valid_values: field.valid_values.clone(),
            }),
            XmlNode::Element | XmlNode::Ignored => return None,
        }
    }

    let (value_field, value_type) = value?;
    Some(ValueWithUnitPattern {
        value_field: value_field.to_string(),
        value_type,
        attributes,
    })
}

/// Detects a record with no exported fields, whose element only encodes
/// presence, e.g. `<acpi/>`.
#[must_use]
pub fn detect_presence_only(fields: &[FieldDecl]) -> bool {
    !fields.iter().any(|f| f.exported)
}

/// Runs both struct-level detectors.
#[must_use]
pub fn detect_struct_pattern(fields: &[FieldDecl]) -> StructPattern {
    if let Some(pattern) = detect_value_with_unit(fields) {
        StructPattern::ValueWithUnit(pattern)
    } else if detect_presence_only(fields) {
        StructPattern::PresenceOnly
    } else {
        StructPattern::None
    }
}

/// Detects a string field that is really a yes/no flag.
///
/// Only string scalars qualify; optional strings count, lists and records
/// never do.
#[must_use]
pub fn detect_string_to_bool(name: &str, ty: &TypeExpr) -> Option<StringToBool> {
    if ty.as_scalar() != Some(ScalarKind::String) {
        return None;
    }
    YES_NO_FIELDS
        .contains(&name)
        .then(|| StringToBool::new("yes", "no"))
}
