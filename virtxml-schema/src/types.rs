//! Record catalog type definitions.
//!
//! This module contains the declarative descriptors that stand in for the
//! record types of an XML configuration schema: records, their fields, the
//! type expressions those fields carry, and the serialization tags that say
//! how each field maps onto elements, attributes, or character data.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Complete record catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Package name (namespace) the records originate from.
    pub package: String,
    /// Named record declarations, in declaration order.
    records: Vec<RecordDecl>,
    /// Record lookup map (built while records are inserted).
    record_map: HashMap<String, usize>,
}

impl Catalog {
    /// Creates a new empty catalog.
    #[must_use]
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            records: Vec::new(),
            record_map: HashMap::new(),
        }
    }

    /// Inserts a named record declaration.
    ///
    /// Returns `false` and leaves the catalog untouched when a record with the
    /// same name is already present.
    pub fn insert_record(&mut self, record: RecordDecl) -> bool {
        if self.record_map.contains_key(&record.name) {
            return false;
        }
        let index = self.records.len();
        self.record_map.insert(record.name.clone(), index);
        self.records.push(record);
        true
    }

    /// Looks up a record by name.
    #[must_use]
    pub fn get_record(&self, name: &str) -> Option<&RecordDecl> {
        self.record_map.get(name).map(|&idx| &self.records[idx])
    }

    /// Returns the records in declaration order.
    #[must_use]
    pub fn records(&self) -> &[RecordDecl] {
        &self.records
    }

    /// Returns true if a record with the given name exists.
    #[must_use]
    pub fn has_record(&self, name: &str) -> bool {
        self.record_map.contains_key(name)
    }

    /// Returns the number of records in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the catalog holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Declaration of one compound record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDecl {
    /// Record name. Empty for anonymous inline records.
    pub name: String,
    /// Package the record was declared in.
    pub package: String,
    /// Element name the record serializes as when it is a document root.
    pub element: Option<String>,
    /// Declared fields, in declaration order.
    pub fields: Vec<FieldDecl>,
}

impl RecordDecl {
    /// Creates a new named record with no fields.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: String::new(),
            element: None,
            fields: Vec::new(),
        }
    }

    /// Creates an anonymous record from its fields.
    #[must_use]
    pub fn anonymous(fields: Vec<FieldDecl>) -> Self {
        Self {
            name: String::new(),
            package: String::new(),
            element: None,
            fields,
        }
    }

    /// Sets the package.
    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    /// Sets the root element name.
    #[must_use]
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// Appends a field.
    #[must_use]
    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a field to the record.
    pub fn add_field(&mut self, field: FieldDecl) {
        self.fields.push(field);
    }

    /// Returns true if the record has no name.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    /// Looks up a field by declared name.
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Declaration of one record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Declared field name.
    pub name: String,
    /// Declared type.
    pub ty: TypeExpr,
    /// Serialization tag. Untagged fields are invisible to the serializer.
    pub tag: Option<XmlTag>,
    /// Whether the field is visible outside its record.
    pub exported: bool,
    /// Whether the field is an embedded record whose fields belong to the parent.
    pub embedded: bool,
    /// Enumerated valid values, if the schema restricts them.
    pub valid_values: Vec<String>,
}

impl FieldDecl {
    /// Creates a new exported, untagged field.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            tag: None,
            exported: true,
            embedded: false,
            valid_values: Vec::new(),
        }
    }

    /// Creates an embedded field for the given record type.
    #[must_use]
    pub fn embedded(ty: TypeExpr) -> Self {
        let name = match &ty {
            TypeExpr::Named(name) => name.clone(),
            _ => String::new(),
        };
        Self {
            name,
            ty,
            tag: None,
            exported: true,
            embedded: true,
            valid_values: Vec::new(),
        }
    }

    /// Sets the serialization tag.
    #[must_use]
    pub fn with_tag(mut self, tag: XmlTag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Marks the field as unexported.
    #[must_use]
    pub fn unexported(mut self) -> Self {
        self.exported = false;
        self
    }

    /// Sets the enumerated valid values.
    #[must_use]
    pub fn with_valid_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.valid_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the node kind of the tag, if tagged.
    #[must_use]
    pub fn node(&self) -> Option<XmlNode> {
        self.tag.as_ref().map(|t| t.node)
    }

    /// Returns true if the field takes part in serialization.
    #[must_use]
    pub fn is_serialized(&self) -> bool {
        self.exported && matches!(&self.tag, Some(tag) if tag.node != XmlNode::Ignored)
    }
}

/// How a field maps onto the XML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum XmlNode {
    /// Child element.
    Element,
    /// Attribute of the enclosing element.
    Attribute,
    /// Character data inside the enclosing element.
    CharData,
    /// Explicitly excluded from serialization.
    Ignored,
}

impl XmlNode {
    /// Parses a node kind from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "element" | "elem" => Some(Self::Element),
            "attribute" | "attr" => Some(Self::Attribute),
            "chardata" | "text" => Some(Self::CharData),
            "ignored" | "skip" => Some(Self::Ignored),
            _ => None,
        }
    }
}

/// Serialization tag of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlTag {
    /// Element or attribute name. Empty for character data.
    pub name: String,
    /// Node kind.
    pub node: XmlNode,
    /// Whether an empty value is left out of the document.
    pub omit_empty: bool,
}

impl XmlTag {
    /// Creates an element tag.
    #[must_use]
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node: XmlNode::Element,
            omit_empty: false,
        }
    }

    /// Creates an attribute tag.
    #[must_use]
    pub fn attribute(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node: XmlNode::Attribute,
            omit_empty: false,
        }
    }

    /// Creates a character data tag.
    #[must_use]
    pub fn chardata() -> Self {
        Self {
            name: String::new(),
            node: XmlNode::CharData,
            omit_empty: false,
        }
    }

    /// Creates an ignored tag.
    #[must_use]
    pub fn ignored() -> Self {
        Self {
            name: String::new(),
            node: XmlNode::Ignored,
            omit_empty: false,
        }
    }

    /// Sets the omit-empty flag.
    #[must_use]
    pub fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    /// Returns true for attribute tags.
    #[must_use]
    pub const fn is_attribute(&self) -> bool {
        matches!(self.node, XmlNode::Attribute)
    }

    /// Returns true for character data tags.
    #[must_use]
    pub const fn is_chardata(&self) -> bool {
        matches!(self.node, XmlNode::CharData)
    }
}

/// Declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// Built-in scalar.
    Scalar(ScalarKind),
    /// Reference to a named record in the catalog.
    Named(String),
    /// Anonymous record declared in place.
    Inline(Box<RecordDecl>),
    /// Optional value (absent when not set).
    Optional(Box<TypeExpr>),
    /// Repeated value.
    List(Box<TypeExpr>),
}

impl TypeExpr {
    /// Creates a named record reference.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Wraps a type as optional.
    #[must_use]
    pub fn optional(inner: TypeExpr) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Wraps a type as a list.
    #[must_use]
    pub fn list(inner: TypeExpr) -> Self {
        Self::List(Box::new(inner))
    }

    /// Strips every optional wrapper.
    #[must_use]
    pub fn strip_optional(&self) -> &TypeExpr {
        let mut ty = self;
        while let Self::Optional(inner) = ty {
            ty = inner;
        }
        ty
    }

    /// Returns true if the outermost wrapper is optional.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Returns the scalar kind once optional wrappers are stripped.
    #[must_use]
    pub fn as_scalar(&self) -> Option<ScalarKind> {
        match self.strip_optional() {
            Self::Scalar(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Returns the referenced record name, if this is a named reference.
    #[must_use]
    pub fn record_name(&self) -> Option<&str> {
        match self.strip_optional() {
            Self::Named(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the short kind name used in diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Named(_) => "record",
            Self::Inline(_) => "anonymous record",
            Self::Optional(_) => "optional",
            Self::List(_) => "list",
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => f.write_str(kind.name()),
            Self::Named(name) => f.write_str(name),
            Self::Inline(_) => f.write_str("record { .. }"),
            Self::Optional(inner) => write!(f, "?{inner}"),
            Self::List(inner) => write!(f, "[{inner}]"),
        }
    }
}

/// Built-in scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    /// UTF-8 string.
    String,
    /// Boolean.
    Bool,
    /// Platform-width signed integer.
    Int,
    /// Signed 8-bit integer.
    Int8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Platform-width unsigned integer.
    Uint,
    /// Unsigned 8-bit integer.
    Uint8,
    /// Unsigned 16-bit integer.
    Uint16,
    /// Unsigned 32-bit integer.
    Uint32,
    /// Unsigned 64-bit integer.
    Uint64,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
}

impl ScalarKind {
    /// Returns the catalog name of the scalar.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Parses a scalar kind from its catalog name.
    #[must_use]
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "string" => Some(Self::String),
            "bool" => Some(Self::Bool),
            "int" => Some(Self::Int),
            "int8" => Some(Self::Int8),
            "int16" => Some(Self::Int16),
            "int32" => Some(Self::Int32),
            "int64" => Some(Self::Int64),
            "uint" => Some(Self::Uint),
            "uint8" => Some(Self::Uint8),
            "uint16" => Some(Self::Uint16),
            "uint32" => Some(Self::Uint32),
            "uint64" => Some(Self::Uint64),
            "float32" => Some(Self::Float32),
            "float64" => Some(Self::Float64),
            _ => None,
        }
    }

    /// Returns true for signed and unsigned integers.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Uint
                | Self::Uint8
                | Self::Uint16
                | Self::Uint32
                | Self::Uint64
        )
    }

    /// Returns true for floating point kinds.
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_insert_and_lookup() {
        let mut catalog = Catalog::new("libvirt");
        assert!(catalog.is_empty());

        assert!(catalog.insert_record(RecordDecl::new("Domain")));
        assert!(catalog.insert_record(RecordDecl::new("Network")));
        assert!(!catalog.insert_record(RecordDecl::new("Domain")));

        assert_eq!(catalog.len(), 2);
        assert!(catalog.has_record("Network"));
        assert!(catalog.get_record("StoragePool").is_none());

        let names: Vec<_> = catalog.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Domain", "Network"]);
    }

    #[test]
    fn test_scalar_kind_names() {
        assert_eq!(ScalarKind::from_name("uint64"), Some(ScalarKind::Uint64));
        assert_eq!(ScalarKind::from_name("float32"), Some(ScalarKind::Float32));
        assert_eq!(ScalarKind::from_name("DomainMemory"), None);
        assert_eq!(ScalarKind::Int16.name(), "int16");
        assert!(ScalarKind::Uint.is_integer());
        assert!(!ScalarKind::String.is_integer());
        assert!(ScalarKind::Float64.is_float());
    }

    #[test]
    fn test_type_expr_helpers() {
        let ty = TypeExpr::optional(TypeExpr::named("DomainMemory"));
        assert!(ty.is_optional());
        assert_eq!(ty.record_name(), Some("DomainMemory"));
        assert_eq!(ty.as_scalar(), None);
        assert_eq!(ty.to_string(), "?DomainMemory");

        let list = TypeExpr::list(TypeExpr::Scalar(ScalarKind::String));
        assert_eq!(list.to_string(), "[string]");
        assert_eq!(list.kind_name(), "list");

        let opt_str = TypeExpr::optional(TypeExpr::Scalar(ScalarKind::String));
        assert_eq!(opt_str.as_scalar(), Some(ScalarKind::String));
    }

    #[test]
    fn test_field_decl_is_serialized() {
        let tagged = FieldDecl::new("Name", TypeExpr::Scalar(ScalarKind::String))
            .with_tag(XmlTag::element("name"));
        assert!(tagged.is_serialized());

        let untagged = FieldDecl::new("Cache", TypeExpr::Scalar(ScalarKind::String));
        assert!(!untagged.is_serialized());

        let ignored = FieldDecl::new("Cache", TypeExpr::Scalar(ScalarKind::String))
            .with_tag(XmlTag::ignored());
        assert!(!ignored.is_serialized());

        let hidden = FieldDecl::new("secret", TypeExpr::Scalar(ScalarKind::String))
            .with_tag(XmlTag::attribute("secret"))
            .unexported();
        assert!(!hidden.is_serialized());
    }

    #[test]
    fn test_embedded_field_takes_record_name() {
        let field = FieldDecl::embedded(TypeExpr::named("DomainCommon"));
        assert!(field.embedded);
        assert_eq!(field.name, "DomainCommon");
        assert!(field.tag.is_none());
    }

    #[test]
    fn test_xml_node_parse() {
        assert_eq!(XmlNode::parse("attr"), Some(XmlNode::Attribute));
        assert_eq!(XmlNode::parse("Element"), Some(XmlNode::Element));
        assert_eq!(XmlNode::parse("chardata"), Some(XmlNode::CharData));
        assert_eq!(XmlNode::parse("bogus"), None);
    }

    #[test]
    fn test_xml_tag_builders() {
        let tag = XmlTag::attribute("unit").omit_empty();
        assert!(tag.is_attribute());
        assert!(tag.omit_empty);
        assert!(XmlTag::chardata().is_chardata());
        assert!(XmlTag::chardata().name.is_empty());
    }
}
