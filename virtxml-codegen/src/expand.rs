//! Expansion of value-with-unit fields.
//!
//! A field whose nested struct holds a character data value and attributes is
//! replaced by one value field and one field per attribute, e.g.
//! `<memory unit='KiB'>524288</memory>` becomes `memory` and `memory_unit`.

use crate::ir::{
    AttributeInfo, FieldIR, FieldPattern, Optionality, StructGraph, ValueType,
    ValueWithUnitPattern,
};
use virtxml_schema::to_snake_case;

/// Separator between the parent output name and the attribute name.
pub const FLATTEN_SEPARATOR: &str = "_";

/// Replaces every flatten-marked field by its value and attribute fields.
///
/// Unmarked fields pass through in order. A marker whose nested struct has no
/// value-with-unit pattern is left as is, so running the pass again over its
/// own output changes nothing.
#[must_use]
pub fn expand_fields(graph: &StructGraph, fields: Vec<FieldIR>) -> Vec<FieldIR> {
    let mut expanded = Vec::with_capacity(fields.len());

    for field in fields {
        let pattern = field
            .is_flatten_marker()
            .then(|| graph.nested(&field))
            .flatten()
            .and_then(|nested| nested.value_with_unit());

        match pattern {
            Some(pattern) => {
                let attributes: Vec<_> = pattern
                    .attributes
                    .iter()
                    .map(|attribute| attribute_field(&field, attribute))
                    .collect();
                expanded.push(value_field(field, pattern));
                expanded.extend(attributes);
            }
            None => expanded.push(field),
        }
    }

    expanded
}

/// Builds the field carrying the character data, reusing the marker's names
/// and optionality.
fn value_field(marker: FieldIR, pattern: &ValueWithUnitPattern) -> FieldIR {
    FieldIR {
        value_type: ValueType::from_scalar(pattern.value_type),
        is_nested: false,
        pattern: FieldPattern::FlattenedValue,
        ..marker
    }
}

/// Builds the field carrying one attribute of the nested element.
fn attribute_field(marker: &FieldIR, attribute: &AttributeInfo) -> FieldIR {
    let output_name = format!(
        "{}{}{}",
        marker.output_name,
        FLATTEN_SEPARATOR,
        to_snake_case(&attribute.xml_name)
    );

    let mut field = FieldIR::new(
        format!("{}{}", marker.name, attribute.name),
        marker.xml_name.clone(),
        output_name,
    );
    field.source_type = attribute.ty.to_string();
    field.value_type = ValueType::from_scalar(attribute.ty);
    field.is_attr = true;
    field.is_pointer = marker.is_pointer;
    field.link = marker.link.clone();
    field.optionality = Optionality::Optional;
    field.preserve_user_intent = true;
    field.omit_empty = true;
    field.pattern = FieldPattern::FlattenedAttribute {
        attribute: attribute.xml_name.clone(),
    };
    field.valid_values = attribute.valid_values.clone();
    field
}
