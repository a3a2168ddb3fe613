//! Driver configuration, documentation overlay and errors.

use std::fs;
use virtxml::codegen::{CodegenError, DocError, ReflectError};
use virtxml::{DocRegistry, Generator, Resource, libvirt_catalog, parse_catalog};

const DOMAIN_DOCS: &str = r#"
entries:
  - path: domain
    description: A virtual machine managed by libvirt.
  - path: domain.memory
    description: Maximum memory allocation at boot.
    reference: https://libvirt.org/formatdomain.html#memory-allocation
  - path: domain.devices.disks.source.file
    description: Host file backing the disk.
"#;

const NETWORK_DOCS: &str = r#"
entries:
  - path: network.ips
    description: IP addresses of the virtual network.
"#;

#[test]
fn test_docs_overlay_from_directory() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(dir.path().join("domain.yaml"), DOMAIN_DOCS).expect("Failed to write docs");
    fs::write(dir.path().join("network.yml"), NETWORK_DOCS).expect("Failed to write docs");
    fs::write(dir.path().join("notes.txt"), "not documentation").expect("Failed to write file");

    let registry = DocRegistry::load(dir.path()).expect("Failed to load docs");
    assert_eq!(registry.len(), 4);

    let catalog = libvirt_catalog().expect("Failed to parse bundled catalog");
    let run = Generator::builder()
        .docs(registry)
        .build()
        .run(&catalog)
        .expect("Failed to generate");

    let domain = run.root("domain").expect("Missing domain");
    assert_eq!(domain.description, "A virtual machine managed by libvirt.");

    let memory = domain.field("memory").expect("Missing memory");
    assert_eq!(memory.description, "Maximum memory allocation at boot.");
    assert_eq!(
        memory.markdown_description,
        "Maximum memory allocation at boot.\n\nSee: <https://libvirt.org/formatdomain.html#memory-allocation>"
    );

    let source = run.get("DomainDiskSource").expect("Missing DomainDiskSource");
    let file = source.field("file").expect("Missing file");
    assert_eq!(file.description, "Host file backing the disk.");
    assert_eq!(file.markdown_description, file.description);

    let network = run.root("network").expect("Missing network");
    let ips = network.field("ips").expect("Missing ips");
    assert_eq!(ips.description, "IP addresses of the virtual network.");

    let undocumented: Vec<_> = run
        .batches
        .iter()
        .flat_map(|b| b.fields.iter().map(|f| f.path.as_str()))
        .collect();
    assert!(!undocumented.contains(&"domain.memory"));
    assert!(!undocumented.contains(&"network.ips"));
    assert!(undocumented.contains(&"domain.memory_unit"));
    assert!(undocumented.contains(&"network.ips.address"));
}

#[test]
fn test_missing_docs_directory_is_empty() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let registry = DocRegistry::load(&dir.path().join("absent")).expect("Failed to load docs");
    assert!(registry.is_empty());
}

#[test]
fn test_duplicate_doc_path_across_files() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(dir.path().join("a.yaml"), NETWORK_DOCS).expect("Failed to write docs");
    fs::write(dir.path().join("b.yaml"), NETWORK_DOCS).expect("Failed to write docs");

    let err = DocRegistry::load(dir.path()).expect_err("Duplicate path should fail");
    assert!(matches!(err, DocError::DuplicatePath { .. }));
}

#[test]
fn test_blank_doc_path_rejected() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(
        dir.path().join("blank.yaml"),
        "entries:\n  - path: \"  \"\n    description: Nothing.\n",
    )
    .expect("Failed to write docs");

    let err = DocRegistry::load(dir.path()).expect_err("Blank path should fail");
    assert!(matches!(err, DocError::MissingPath { .. }));
}

#[test]
fn test_batch_size_configurable() {
    let catalog = libvirt_catalog().expect("Failed to parse bundled catalog");
    let run = Generator::builder()
        .resources([Resource::new("storage_volume", "StorageVolume")])
        .batch_size(4)
        .build()
        .run(&catalog)
        .expect("Failed to generate");

    let total: usize = run.batches.iter().map(|b| b.fields.len()).sum();
    assert!(run.batches.iter().all(|b| b.fields.len() <= 4));
    assert_eq!(run.batches.len(), total.div_ceil(4));
    assert_eq!(run.totals.top_level, 1);
}

#[test]
fn test_structs_shared_across_resources() {
    let catalog = parse_catalog(
        r#"<catalog package="libvirtxml">
    <record name="Domain" element="domain">
        <field name="Name" type="string" element="name"/>
        <field name="Network" type="Network" optional="true" element="network"/>
    </record>
    <record name="Network" element="network">
        <field name="Name" type="string" element="name"/>
    </record>
</catalog>"#,
    )
    .expect("Failed to parse catalog");

    let run = Generator::builder()
        .resources([
            Resource::new("domain", "Domain"),
            Resource::new("network", "Network"),
        ])
        .build()
        .run(&catalog)
        .expect("Failed to generate");

    let names: Vec<_> = run.structs().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Domain", "Network"]);
    assert_eq!(run.totals.top_level, 2);
    assert!(run.get("Network").is_some_and(|n| n.is_top_level));
}

#[test]
fn test_unknown_resource_record() {
    let catalog = libvirt_catalog().expect("Failed to parse bundled catalog");
    let err = Generator::builder()
        .resource("secret", "Secret")
        .build()
        .run(&catalog)
        .expect_err("Unknown record should fail");

    match err {
        CodegenError::Resource { resource, source } => {
            assert_eq!(resource, "secret");
            assert!(matches!(source, ReflectError::UnknownRecord { ref name } if name == "Secret"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_no_resources_configured() {
    let catalog = libvirt_catalog().expect("Failed to parse bundled catalog");
    let err = Generator::builder()
        .resources(Vec::new())
        .build()
        .run(&catalog)
        .expect_err("Empty configuration should fail");
    assert!(matches!(err, CodegenError::Config { .. }));
}

#[test]
fn test_invalid_catalog_rejected() {
    let catalog = parse_catalog(
        r#"<catalog package="libvirtxml">
    <record name="Domain" element="domain">
        <field name="OS" type="DomainOS" optional="true" element="os"/>
    </record>
</catalog>"#,
    )
    .expect("Failed to parse catalog");

    let err = Generator::builder()
        .resources([Resource::new("domain", "Domain")])
        .build()
        .run(&catalog)
        .expect_err("Unknown type should fail");
    assert!(matches!(err, CodegenError::Schema(_)));
}
