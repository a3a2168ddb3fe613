//! Record catalog parser.
//!
//! This module parses catalog XML documents into the [`Catalog`]
//! representation. A catalog lists named records; each record lists its
//! fields with their declared type and serialization tag.

use crate::error::ParseError;
use crate::types::{Catalog, FieldDecl, RecordDecl, ScalarKind, TypeExpr, XmlNode, XmlTag};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::path::Path;

/// Parses a record catalog from a string.
///
/// # Arguments
/// * `xml` - Catalog XML content
///
/// # Returns
/// Parsed catalog or parse error.
///
/// # Errors
/// Returns `ParseError` if the XML is malformed, a record or field is missing
/// a required attribute, or a record name is declared twice.
pub fn parse_catalog(xml: &str) -> Result<Catalog, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut catalog: Option<Catalog> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = element_name(e)?;
                match name.as_str() {
                    "catalog" => catalog = Some(parse_catalog_element(e)?),
                    "record" => {
                        let catalog = catalog
                            .as_mut()
                            .ok_or_else(|| ParseError::structure("record outside of catalog"))?;
                        let mut record = parse_record_element(e, &catalog.package)?;
                        record.fields = parse_record_body(&mut reader)?;
                        insert_record(catalog, record)?;
                    }
                    other => return Err(ParseError::unknown_element(other, "catalog")),
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = element_name(e)?;
                match name.as_str() {
                    "catalog" => catalog = Some(parse_catalog_element(e)?),
                    "record" => {
                        let catalog = catalog
                            .as_mut()
                            .ok_or_else(|| ParseError::structure("record outside of catalog"))?;
                        let record = parse_record_element(e, &catalog.package)?;
                        insert_record(catalog, record)?;
                    }
                    other => return Err(ParseError::unknown_element(other, "catalog")),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    catalog.ok_or_else(|| ParseError::structure("No catalog element found"))
}

/// Parses a record catalog from a file.
///
/// # Errors
/// Returns `ParseError` if the file cannot be read or does not parse.
pub fn parse_catalog_file(path: &Path) -> Result<Catalog, ParseError> {
    let xml = std::fs::read_to_string(path)?;
    parse_catalog(&xml)
}

fn element_name(e: &BytesStart<'_>) -> Result<String, ParseError> {
    Ok(std::str::from_utf8(e.name().as_ref())?.to_string())
}

fn insert_record(catalog: &mut Catalog, record: RecordDecl) -> Result<(), ParseError> {
    let name = record.name.clone();
    if !catalog.insert_record(record) {
        return Err(ParseError::duplicate("record", name));
    }
    Ok(())
}

/// Parses the catalog element attributes.
fn parse_catalog_element(e: &BytesStart<'_>) -> Result<Catalog, ParseError> {
    let mut package = String::new();

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        if key == "package" {
            package = value.to_string();
        }
    }

    Ok(Catalog::new(package))
}

/// Parses the attributes of a top-level record element.
fn parse_record_element(e: &BytesStart<'_>, package: &str) -> Result<RecordDecl, ParseError> {
    let mut name = None;
    let mut element = None;
    let mut record_package = package.to_string();

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;

        match key {
            "name" => name = Some(value.to_string()),
            "element" => element = Some(value.to_string()),
            "package" => record_package = value.to_string(),
            _ => {}
        }
    }

    let name = name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ParseError::missing_attr("record", "name"))?;

    let mut record = RecordDecl::new(name).with_package(record_package);
    record.element = element;
    Ok(record)
}

/// Parses the fields of a record up to and including its end tag.
fn parse_record_body(reader: &mut Reader<&[u8]>) -> Result<Vec<FieldDecl>, ParseError> {
    let mut fields = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = element_name(e)?;
                match name.as_str() {
                    "field" | "embed" => {
                        let pending = PendingField::from_element(e, name == "embed")?;
                        fields.push(parse_field_body(reader, pending)?);
                    }
                    other => return Err(ParseError::unknown_element(other, "record")),
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = element_name(e)?;
                match name.as_str() {
                    "field" | "embed" => {
                        fields.push(PendingField::from_element(e, name == "embed")?.finish(None)?);
                    }
                    other => return Err(ParseError::unknown_element(other, "record")),
                }
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ParseError::structure(
                    "unexpected end of document inside record",
                ));
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(fields)
}

/// Parses the children of a field (inline record, choices) and its end tag.
fn parse_field_body(
    reader: &mut Reader<&[u8]>,
    mut pending: PendingField,
) -> Result<FieldDecl, ParseError> {
    let mut inline = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = element_name(e)?;
                match name.as_str() {
                    "record" => inline = Some(RecordDecl::anonymous(parse_record_body(reader)?)),
                    "choice" => pending.valid_values.push(read_text(reader)?),
                    other => return Err(ParseError::unknown_element(other, "field")),
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = element_name(e)?;
                match name.as_str() {
                    "record" => inline = Some(RecordDecl::anonymous(Vec::new())),
                    "choice" => {}
                    other => return Err(ParseError::unknown_element(other, "field")),
                }
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ParseError::structure(
                    "unexpected end of document inside field",
                ));
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    pending.finish(inline)
}

/// Reads the text content of the current element and its end tag.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String, ParseError> {
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Text(ref t)) => text.push_str(std::str::from_utf8(t.as_ref())?.trim()),
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ParseError::structure(
                    "unexpected end of document inside choice",
                ));
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

fn parse_flag(element: &str, key: &str, value: &str) -> Result<bool, ParseError> {
    match value {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ParseError::invalid_attr(element, key, value)),
    }
}

/// Field attributes collected before the field's children are read.
struct PendingField {
    element: &'static str,
    name: Option<String>,
    type_name: Option<String>,
    optional: bool,
    list: bool,
    node: Option<(XmlNode, String)>,
    omit_empty: bool,
    exported: bool,
    embedded: bool,
    valid_values: Vec<String>,
}

impl PendingField {
    fn from_element(e: &BytesStart<'_>, embedded: bool) -> Result<Self, ParseError> {
        let element = if embedded { "embed" } else { "field" };
        let mut pending = Self {
            element,
            name: None,
            type_name: None,
            optional: false,
            list: false,
            node: None,
            omit_empty: false,
            exported: true,
            embedded,
            valid_values: Vec::new(),
        };

        for attr in e.attributes().flatten() {
            let key = std::str::from_utf8(attr.key.as_ref())?;
            let value = std::str::from_utf8(&attr.value)?;

            match key {
                "name" => pending.name = Some(value.to_string()),
                "type" => pending.type_name = Some(value.to_string()),
                "optional" => pending.optional = parse_flag(element, key, value)?,
                "list" => pending.list = parse_flag(element, key, value)?,
                "omitempty" => pending.omit_empty = parse_flag(element, key, value)?,
                "exported" => pending.exported = parse_flag(element, key, value)?,
                "element" => pending.set_node(key, value, XmlNode::Element, value)?,
                "attr" => pending.set_node(key, value, XmlNode::Attribute, value)?,
                "chardata" => {
                    if parse_flag(element, key, value)? {
                        pending.set_node(key, value, XmlNode::CharData, "")?;
                    }
                }
                "ignored" => {
                    if parse_flag(element, key, value)? {
                        pending.set_node(key, value, XmlNode::Ignored, "")?;
                    }
                }
                _ => {}
            }
        }

        Ok(pending)
    }

    fn set_node(
        &mut self,
        key: &str,
        value: &str,
        node: XmlNode,
        xml_name: &str,
    ) -> Result<(), ParseError> {
        // A field maps onto exactly one node kind.
        if self.node.is_some() {
            return Err(ParseError::invalid_attr(self.element, key, value));
        }
        self.node = Some((node, xml_name.to_string()));
        Ok(())
    }

    fn finish(self, inline: Option<RecordDecl>) -> Result<FieldDecl, ParseError> {
        let base = match (self.type_name, inline) {
            (Some(type_name), None) => match ScalarKind::from_name(&type_name) {
                Some(kind) => TypeExpr::Scalar(kind),
                None => TypeExpr::Named(type_name),
            },
            (None, Some(record)) => TypeExpr::Inline(Box::new(record)),
            (Some(type_name), Some(_)) => {
                return Err(ParseError::invalid_attr(self.element, "type", type_name));
            }
            (None, None) => return Err(ParseError::missing_attr(self.element, "type")),
        };

        let mut ty = base;
        if self.list {
            ty = TypeExpr::list(ty);
        }
        if self.optional {
            ty = TypeExpr::optional(ty);
        }

        let mut field = if self.embedded {
            let mut field = FieldDecl::embedded(ty);
            if let Some(name) = self.name {
                field.name = name;
            }
            field
        } else {
            let name = self
                .name
                .filter(|n| !n.is_empty())
                .ok_or_else(|| ParseError::missing_attr(self.element, "name"))?;
            FieldDecl::new(name, ty)
        };

        field.tag = self.node.map(|(node, name)| XmlTag {
            name,
            node,
            omit_empty: self.omit_empty,
        });
        field.exported = self.exported;
        field.valid_values = self.valid_values;

        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<catalog package="libvirt.org/libvirtxml">
    <record name="Domain" element="domain">
        <field name="Type" type="string" attr="type" omitempty="true"/>
        <field name="Name" type="string" element="name" omitempty="true"/>
        <field name="Memory" type="DomainMemory" optional="true" element="memory"/>
        <field name="Disks" type="DomainDisk" list="true" element="disk"/>
        <field name="OnCrash" type="string" element="on_crash" omitempty="true">
            <choice>destroy</choice>
            <choice>restart</choice>
        </field>
        <field name="Metadata" element="metadata">
            <record>
                <field name="XML" type="string" chardata="true"/>
            </record>
        </field>
        <field name="cache" type="string" exported="false"/>
        <field name="Scratch" type="string" ignored="true"/>
        <embed type="DomainCommon"/>
    </record>
    <record name="DomainMemory">
        <field name="Value" type="uint64" chardata="true"/>
        <field name="Unit" type="string" attr="unit" omitempty="true"/>
    </record>
    <record name="DomainDisk">
        <field name="Device" type="string" attr="device"/>
    </record>
    <record name="DomainCommon">
        <field name="Title" type="string" element="title"/>
    </record>
    <record name="DomainFeatureACPI"/>
</catalog>"#;

    #[test]
    fn test_parse_simple_catalog() {
        let catalog = parse_catalog(SIMPLE_CATALOG).expect("Failed to parse catalog");

        assert_eq!(catalog.package, "libvirt.org/libvirtxml");
        assert_eq!(catalog.len(), 5);
        assert!(catalog.has_record("DomainFeatureACPI"));

        let domain = catalog.get_record("Domain").expect("Domain record");
        assert_eq!(domain.element.as_deref(), Some("domain"));
        assert_eq!(domain.package, "libvirt.org/libvirtxml");
        assert_eq!(domain.fields.len(), 9);
    }

    #[test]
    fn test_parse_field_types_and_tags() {
        let catalog = parse_catalog(SIMPLE_CATALOG).expect("Failed to parse catalog");
        let domain = catalog.get_record("Domain").expect("Domain record");

        let ty = domain.get_field("Type").expect("Type field");
        assert_eq!(ty.ty, TypeExpr::Scalar(ScalarKind::String));
        let tag = ty.tag.as_ref().expect("tag");
        assert!(tag.is_attribute());
        assert!(tag.omit_empty);
        assert_eq!(tag.name, "type");

        let memory = domain.get_field("Memory").expect("Memory field");
        assert_eq!(memory.ty, TypeExpr::optional(TypeExpr::named("DomainMemory")));

        let disks = domain.get_field("Disks").expect("Disks field");
        assert_eq!(disks.ty, TypeExpr::list(TypeExpr::named("DomainDisk")));

        let on_crash = domain.get_field("OnCrash").expect("OnCrash field");
        assert_eq!(on_crash.valid_values, vec!["destroy", "restart"]);
    }

    #[test]
    fn test_parse_inline_record() {
        let catalog = parse_catalog(SIMPLE_CATALOG).expect("Failed to parse catalog");
        let domain = catalog.get_record("Domain").expect("Domain record");

        let metadata = domain.get_field("Metadata").expect("Metadata field");
        match &metadata.ty {
            TypeExpr::Inline(record) => {
                assert!(record.is_anonymous());
                assert_eq!(record.fields.len(), 1);
                assert!(record.fields[0].tag.as_ref().expect("tag").is_chardata());
            }
            other => panic!("expected inline record, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_visibility_and_embedding() {
        let catalog = parse_catalog(SIMPLE_CATALOG).expect("Failed to parse catalog");
        let domain = catalog.get_record("Domain").expect("Domain record");

        let cache = domain.get_field("cache").expect("cache field");
        assert!(!cache.exported);
        assert!(cache.tag.is_none());

        let scratch = domain.get_field("Scratch").expect("Scratch field");
        assert_eq!(scratch.node(), Some(XmlNode::Ignored));

        let common = domain.fields.last().expect("embedded field");
        assert!(common.embedded);
        assert_eq!(common.name, "DomainCommon");
        assert_eq!(common.ty, TypeExpr::named("DomainCommon"));
    }

    #[test]
    fn test_parse_duplicate_record() {
        let xml = r#"<catalog package="x">
            <record name="Domain"/>
            <record name="Domain"/>
        </catalog>"#;

        let result = parse_catalog(xml);
        assert!(matches!(
            result,
            Err(ParseError::DuplicateDefinition { ref name, .. }) if name == "Domain"
        ));
    }

    #[test]
    fn test_parse_conflicting_tag() {
        let xml = r#"<catalog package="x">
            <record name="Domain">
                <field name="Name" type="string" element="name" attr="name"/>
            </record>
        </catalog>"#;

        assert!(matches!(
            parse_catalog(xml),
            Err(ParseError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn test_parse_missing_type() {
        let xml = r#"<catalog package="x">
            <record name="Domain">
                <field name="Name" element="name"/>
            </record>
        </catalog>"#;

        assert!(matches!(
            parse_catalog(xml),
            Err(ParseError::MissingAttribute { ref attribute, .. }) if attribute == "type"
        ));
    }

    #[test]
    fn test_parse_missing_catalog() {
        assert!(matches!(
            parse_catalog("<other/>"),
            Err(ParseError::UnknownElement { .. })
        ));
        assert!(matches!(
            parse_catalog(""),
            Err(ParseError::InvalidStructure { .. })
        ));
    }

    #[test]
    fn test_parse_catalog_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("catalog.xml");
        std::fs::write(&path, SIMPLE_CATALOG).expect("write catalog");

        let catalog = parse_catalog_file(&path).expect("Failed to parse catalog file");
        assert_eq!(catalog.len(), 5);

        assert!(matches!(
            parse_catalog_file(&dir.path().join("missing.xml")),
            Err(ParseError::Io(_))
        ));
    }
}
