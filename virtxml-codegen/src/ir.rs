//! Intermediate representation produced by the reflector.
//!
//! Struct nodes live in a [`StructGraph`] arena and are addressed by copyable
//! [`StructId`] handles. A field never owns the struct it refers to; it holds a
//! [`NestedLink`] which is either a handle or a recorded cycle back-edge.

use serde::Serialize;
use std::collections::HashMap;
use std::ops::{Index, IndexMut};
use virtxml_schema::ScalarKind;

/// Handle of a struct node inside a [`StructGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StructId(usize);

impl StructId {
    /// Returns the arena index of this handle.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Run-scoped arena of struct nodes keyed by type name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StructGraph {
    structs: Vec<StructIR>,
    #[serde(skip)]
    by_name: HashMap<String, StructId>,
}

impl StructGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a struct node, or returns the existing handle for its name.
    pub fn insert(&mut self, ir: StructIR) -> StructId {
        if let Some(&id) = self.by_name.get(&ir.name) {
            return id;
        }
        let id = StructId(self.structs.len());
        self.by_name.insert(ir.name.clone(), id);
        self.structs.push(ir);
        id
    }

    /// Drops every struct inserted after the graph held `len` structs.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.structs.len() {
            return;
        }
        for ir in self.structs.drain(len..) {
            self.by_name.remove(&ir.name);
        }
    }

    /// Looks up a struct by type name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<StructId> {
        self.by_name.get(name).copied()
    }

    /// Returns the struct for a handle, if the handle belongs to this graph.
    #[must_use]
    pub fn get(&self, id: StructId) -> Option<&StructIR> {
        self.structs.get(id.0)
    }

    /// Returns the struct for a handle mutably.
    pub fn get_mut(&mut self, id: StructId) -> Option<&mut StructIR> {
        self.structs.get_mut(id.0)
    }

    /// Returns the struct registered under a type name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&StructIR> {
        self.lookup(name).and_then(|id| self.get(id))
    }

    /// Returns the number of structs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.structs.len()
    }

    /// Returns true if the graph holds no structs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }

    /// Iterates structs with their handles in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (StructId, &StructIR)> {
        self.structs
            .iter()
            .enumerate()
            .map(|(idx, ir)| (StructId(idx), ir))
    }

    /// Returns the struct a field links to, skipping cycle back-edges.
    #[must_use]
    pub fn nested(&self, field: &FieldIR) -> Option<&StructIR> {
        field.nested().and_then(|id| self.get(id))
    }
}

impl Index<StructId> for StructGraph {
    type Output = StructIR;

    fn index(&self, id: StructId) -> &StructIR {
        &self.structs[id.0]
    }
}

impl IndexMut<StructId> for StructGraph {
    fn index_mut(&mut self, id: StructId) -> &mut StructIR {
        &mut self.structs[id.0]
    }
}

/// One compound record type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructIR {
    /// Type name, unique across the graph.
    pub name: String,
    /// Package the record was declared in.
    pub package: String,
    /// Element name the record serializes as when it is a document root.
    pub element: Option<String>,
    /// Fields in output order.
    pub fields: Vec<FieldIR>,
    /// Struct-level pattern.
    pub pattern: StructPattern,
    /// Whether this is a top-level resource.
    pub is_top_level: bool,
    /// Reason the struct is excluded from emission, if it is.
    pub exclusion: Option<String>,
    /// Plain description.
    pub description: String,
    /// Markdown description.
    pub markdown_description: String,
}

impl StructIR {
    /// Creates an empty struct node.
    #[must_use]
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            element: None,
            fields: Vec::new(),
            pattern: StructPattern::None,
            is_top_level: false,
            exclusion: None,
            description: String::new(),
            markdown_description: String::new(),
        }
    }

    /// Returns true if emitters must skip this struct.
    #[must_use]
    pub fn is_excluded(&self) -> bool {
        self.exclusion.is_some()
    }

    /// Returns the value-with-unit pattern, if detected.
    #[must_use]
    pub fn value_with_unit(&self) -> Option<&ValueWithUnitPattern> {
        match &self.pattern {
            StructPattern::ValueWithUnit(pattern) => Some(pattern),
            _ => None,
        }
    }

    /// Returns true if the struct only encodes presence.
    #[must_use]
    pub fn is_presence_only(&self) -> bool {
        matches!(self.pattern, StructPattern::PresenceOnly)
    }

    /// Returns true if any field still carries the flatten marker.
    #[must_use]
    pub fn has_flatten_markers(&self) -> bool {
        self.fields.iter().any(FieldIR::is_flatten_marker)
    }

    /// Looks up a field by output name.
    #[must_use]
    pub fn field(&self, output_name: &str) -> Option<&FieldIR> {
        self.fields.iter().find(|f| f.output_name == output_name)
    }
}

/// Struct-level pattern. At most one applies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructPattern {
    /// No pattern.
    #[default]
    None,
    /// Character data value plus attributes; always flattened into the parent.
    ValueWithUnit(ValueWithUnitPattern),
    /// Empty element whose presence encodes a boolean.
    PresenceOnly,
}

/// Character data value plus attribute fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueWithUnitPattern {
    /// Declared name of the character data field.
    pub value_field: String,
    /// Scalar type of the character data.
    pub value_type: ScalarKind,
    /// Attribute fields in declaration order.
    pub attributes: Vec<AttributeInfo>,
}

/// One attribute of a value-with-unit struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeInfo {
    /// Declared field name.
    pub name: String,
    /// XML attribute name.
    pub xml_name: String,
    /// Scalar type.
    pub ty: ScalarKind,
    /// Enumerated valid values.
    pub valid_values: Vec<String>,
}

/// Link from a field to another struct.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NestedLink {
    /// Scalar or scalar list.
    #[default]
    None,
    /// Non-owning reference to a struct in the same graph.
    Struct {
        /// Target struct.
        id: StructId,
    },
    /// Recursion back-edge; the target is never descended.
    Cycle {
        /// Rendered trace, e.g. `A → B → A`.
        trace: String,
    },
}

/// Field-level pattern.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldPattern {
    /// Regular field.
    #[default]
    Plain,
    /// Nested value-with-unit struct awaiting expansion.
    FlattenValueWithUnit,
    /// Nested presence-only struct collapsed to a boolean.
    PresenceBoolean,
    /// Character data part of an expanded value-with-unit field.
    FlattenedValue,
    /// Attribute part of an expanded value-with-unit field.
    FlattenedAttribute {
        /// XML name of the attribute this field represents.
        attribute: String,
    },
}

/// Literal tokens a string flag uses for true and false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringToBool {
    /// Token meaning true.
    pub true_token: String,
    /// Token meaning false.
    pub false_token: String,
}

impl StringToBool {
    /// Creates a token pair.
    #[must_use]
    pub fn new(true_token: impl Into<String>, false_token: impl Into<String>) -> Self {
        Self {
            true_token: true_token.into(),
            false_token: false_token.into(),
        }
    }
}

/// Who owns a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Optionality {
    /// The caller must supply it.
    #[default]
    Required,
    /// The caller may supply it.
    Optional,
    /// Only the platform supplies it.
    Computed,
}

/// Planning hint attached by the override pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanHint {
    /// Adopt the prior state value when re-planning.
    KeepPriorState,
    /// Changing the value recreates the resource.
    RequiresReplace,
}

/// Output value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// String.
    #[default]
    String,
    /// 64-bit integer.
    Int64,
    /// 64-bit float.
    Float64,
    /// Boolean.
    Bool,
    /// List.
    List,
    /// Nested object.
    Object,
}

impl ValueType {
    /// Maps a scalar onto its output value type.
    #[must_use]
    pub const fn from_scalar(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Bool => Self::Bool,
            _ if kind.is_float() => Self::Float64,
            _ if kind.is_integer() => Self::Int64,
            _ => Self::String,
        }
    }
}

/// Schema attribute classification consumed by emitters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// List of nested objects.
    ListNested,
    /// List of scalars.
    List,
    /// Single nested object.
    SingleNested,
    /// String.
    String,
    /// 64-bit integer.
    Int64,
    /// Boolean.
    Bool,
    /// 64-bit float.
    Float64,
}

/// One field of a struct.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldIR {
    /// Declared field name.
    pub name: String,
    /// Element or attribute name in the document.
    pub xml_name: String,
    /// Snake case output name.
    pub output_name: String,
    /// Declared type as written in the catalog.
    pub source_type: String,
    /// Output value type.
    pub value_type: ValueType,
    /// Element value type of scalar lists.
    pub element_type: Option<ValueType>,
    /// Whether the field is an attribute rather than an element.
    pub is_attr: bool,
    /// Whether the declared type was optional.
    pub is_pointer: bool,
    /// Whether the field repeats.
    pub is_list: bool,
    /// Whether the field is rendered as a nested object.
    pub is_nested: bool,
    /// Link to the referenced struct.
    pub link: NestedLink,
    /// Who owns the value.
    pub optionality: Optionality,
    /// Planning hint.
    pub plan_hint: Option<PlanHint>,
    /// Echo the value back only when the caller supplied it.
    pub preserve_user_intent: bool,
    /// Whether an empty value is left out of the document.
    pub omit_empty: bool,
    /// Field-level pattern.
    pub pattern: FieldPattern,
    /// Yes/no style tokens when the string is really a flag.
    pub string_to_bool: Option<StringToBool>,
    /// Enumerated valid values.
    pub valid_values: Vec<String>,
    /// Dotted output path from the resource root where the field was first reached.
    pub path: String,
    /// Dotted document path; attributes are prefixed with `@`.
    pub xml_path: String,
    /// Plain description.
    pub description: String,
    /// Markdown description.
    pub markdown_description: String,
    /// Reason the field is excluded from emission, if it is.
    pub exclusion: Option<String>,
}

impl FieldIR {
    /// Creates a required, plain string field.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        xml_name: impl Into<String>,
        output_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            xml_name: xml_name.into(),
            output_name: output_name.into(),
            source_type: String::new(),
            value_type: ValueType::String,
            element_type: None,
            is_attr: false,
            is_pointer: false,
            is_list: false,
            is_nested: false,
            link: NestedLink::None,
            optionality: Optionality::Required,
            plan_hint: None,
            preserve_user_intent: false,
            omit_empty: false,
            pattern: FieldPattern::Plain,
            string_to_bool: None,
            valid_values: Vec::new(),
            path: String::new(),
            xml_path: String::new(),
            description: String::new(),
            markdown_description: String::new(),
            exclusion: None,
        }
    }

    /// Returns the linked struct, unless the link is absent or a cycle.
    #[must_use]
    pub fn nested(&self) -> Option<StructId> {
        match self.link {
            NestedLink::Struct { id } => Some(id),
            _ => None,
        }
    }

    /// Returns true if the field closes a recursion cycle.
    #[must_use]
    pub fn is_cycle(&self) -> bool {
        matches!(self.link, NestedLink::Cycle { .. })
    }

    /// Returns the cycle trace, if the field closes a cycle.
    #[must_use]
    pub fn cycle_trace(&self) -> Option<&str> {
        match &self.link {
            NestedLink::Cycle { trace } => Some(trace),
            _ => None,
        }
    }

    /// Returns true if the field still awaits expansion.
    #[must_use]
    pub fn is_flatten_marker(&self) -> bool {
        matches!(self.pattern, FieldPattern::FlattenValueWithUnit)
    }

    /// Returns true if the field is a collapsed presence-only struct.
    #[must_use]
    pub fn is_presence_boolean(&self) -> bool {
        matches!(self.pattern, FieldPattern::PresenceBoolean)
    }

    /// Returns the attribute name of a flattened attribute field.
    #[must_use]
    pub fn flattened_attribute(&self) -> Option<&str> {
        match &self.pattern {
            FieldPattern::FlattenedAttribute { attribute } => Some(attribute),
            _ => None,
        }
    }

    /// Returns true if the caller must supply the value.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.optionality == Optionality::Required
    }

    /// Returns true if the caller may supply the value.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optionality == Optionality::Optional
    }

    /// Returns true if only the platform supplies the value.
    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.optionality == Optionality::Computed
    }

    /// Returns true if emitters must skip this field.
    #[must_use]
    pub fn is_excluded(&self) -> bool {
        self.exclusion.is_some()
    }

    /// Classifies the field for schema emitters.
    #[must_use]
    pub fn attribute_kind(&self) -> AttributeKind {
        if self.is_list {
            return if self.is_nested {
                AttributeKind::ListNested
            } else {
                AttributeKind::List
            };
        }
        if self.is_nested {
            return AttributeKind::SingleNested;
        }
        match self.value_type {
            ValueType::Int64 => AttributeKind::Int64,
            ValueType::Bool => AttributeKind::Bool,
            ValueType::Float64 => AttributeKind::Float64,
            _ => AttributeKind::String,
        }
    }
}
