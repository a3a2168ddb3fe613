//! Records declared with `#[derive(XmlRecord)]`.

#![allow(dead_code)]

use virtxml::codegen::{FieldPattern, ValueType};
use virtxml::{Catalog, Generator, Resource, XmlRecord};
use virtxml_schema::{TypeExpr, XmlNode, validate_catalog};

#[derive(XmlRecord)]
#[xml(element = "pool")]
pub struct StoragePool {
    #[xml(attr = "type", choices = "dir|fs|logical")]
    pub r#type: String,
    #[xml(element = "name")]
    pub name: String,
    #[xml(element = "uuid", omit_empty)]
    pub uuid: Option<String>,
    #[xml(element = "capacity")]
    pub capacity: Option<StoragePoolSize>,
    #[xml(element = "target")]
    pub target: Option<StoragePoolTarget>,
    #[xml(element = "cow")]
    pub cow: Option<StoragePoolFeatureCOW>,
    #[xml(flatten)]
    pub common: StoragePoolCommon,
    #[xml(skip)]
    pub refreshed: bool,
    generation: u32,
}

#[derive(XmlRecord)]
pub struct StoragePoolSize {
    #[xml(attr = "unit", omit_empty)]
    pub unit: String,
    #[xml(chardata)]
    pub value: u64,
}

#[derive(XmlRecord)]
pub struct StoragePoolTarget {
    #[xml(element)]
    pub path: String,
    #[xml(attr = "readonly", name = "ReadOnly", omit_empty)]
    pub read_only: String,
    #[xml(element = "backing")]
    pub backing: Option<Box<StoragePoolTarget>>,
    #[xml(element = "extent")]
    pub extents: Vec<u64>,
}

#[derive(XmlRecord)]
pub struct StoragePoolFeatureCOW;

#[derive(XmlRecord)]
pub struct StoragePoolCommon {
    #[xml(element = "description", omit_empty)]
    pub description: String,
}

#[test]
fn test_record_declaration() {
    assert_eq!(StoragePool::NAME, "StoragePool");

    let decl = StoragePool::declaration();
    assert_eq!(decl.name, "StoragePool");
    assert_eq!(decl.element.as_deref(), Some("pool"));
    assert!(!decl.package.is_empty());
    assert_eq!(decl.fields.len(), 9);

    let ty = decl.get_field("type").expect("Missing type");
    let tag = ty.tag.as_ref().expect("Missing tag");
    assert_eq!(tag.node, XmlNode::Attribute);
    assert_eq!(tag.name, "type");
    assert_eq!(ty.valid_values, ["dir", "fs", "logical"]);

    let uuid = decl.get_field("uuid").expect("Missing uuid");
    assert!(uuid.ty.is_optional());
    assert!(uuid.tag.as_ref().is_some_and(|t| t.omit_empty));

    let refreshed = decl.get_field("refreshed").expect("Missing refreshed");
    assert_eq!(refreshed.node(), Some(XmlNode::Ignored));

    let generation = decl.get_field("generation").expect("Missing generation");
    assert!(!generation.exported);
    assert!(generation.tag.is_none());

    let common = decl.fields.iter().find(|f| f.embedded).expect("Missing embedded");
    assert_eq!(common.ty, TypeExpr::named("StoragePoolCommon"));
}

#[test]
fn test_default_element_and_declared_name() {
    let decl = StoragePoolTarget::declaration();

    let path = decl.get_field("path").expect("Missing path");
    assert_eq!(path.tag.as_ref().map(|t| t.name.as_str()), Some("path"));

    assert!(decl.get_field("read_only").is_none());
    let read_only = decl.get_field("ReadOnly").expect("Missing ReadOnly");
    assert_eq!(read_only.node(), Some(XmlNode::Attribute));

    let backing = decl.get_field("backing").expect("Missing backing");
    assert_eq!(backing.ty, TypeExpr::optional(TypeExpr::named("StoragePoolTarget")));

    assert!(StoragePoolFeatureCOW::declaration().fields.is_empty());
}

#[test]
fn test_registration_is_recursive() {
    let catalog = Catalog::from_type::<StoragePool>("libvirtxml");

    for name in [
        "StoragePool",
        "StoragePoolSize",
        "StoragePoolTarget",
        "StoragePoolFeatureCOW",
        "StoragePoolCommon",
    ] {
        assert!(catalog.has_record(name), "missing {name}");
    }
    assert_eq!(catalog.len(), 5);
    validate_catalog(&catalog).expect("Derived catalog should validate");
}

#[test]
fn test_reflect_derived_records() {
    let catalog = Catalog::from_type::<StoragePool>("libvirtxml");
    let run = Generator::builder()
        .resources([Resource::new("storage_pool", "StoragePool")])
        .build()
        .run(&catalog)
        .expect("Failed to generate");

    let pool = run.root("storage_pool").expect("Missing root");
    let names: Vec<_> = pool.fields.iter().map(|f| f.output_name.as_str()).collect();
    assert_eq!(
        names,
        [
            "type",
            "name",
            "uuid",
            "capacity",
            "capacity_unit",
            "target",
            "cow",
            "description",
        ]
    );

    let capacity = pool.field("capacity").expect("Missing capacity");
    assert_eq!(capacity.value_type, ValueType::Int64);
    assert!(capacity.is_computed());

    let cow = pool.field("cow").expect("Missing cow");
    assert_eq!(cow.pattern, FieldPattern::PresenceBoolean);

    assert!(pool.field("type").expect("Missing type").is_required());
    assert!(pool.field("uuid").expect("Missing uuid").is_computed());

    let target = run.get("StoragePoolTarget").expect("Missing target");
    let read_only = target.field("read_only").expect("Missing read_only");
    assert!(read_only.string_to_bool.is_some());

    let backing = target.field("backing").expect("Missing backing");
    assert_eq!(
        backing.cycle_trace(),
        Some("StoragePoolTarget → StoragePoolTarget")
    );

    let extents = target.field("extents").expect("Missing extents");
    assert_eq!(extents.value_type, ValueType::List);
    assert_eq!(extents.element_type, Some(ValueType::Int64));
    assert!(!extents.is_nested);
}
