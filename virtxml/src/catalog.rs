//! Bundled libvirt catalog.
//!
//! Declares the four top-level resource kinds (`Domain`, `Network`,
//! `StoragePool`, `StorageVolume`) and the nested records they reach.

use virtxml_schema::{Catalog, ParseError, parse_catalog};

/// Catalog XML of the libvirt resource kinds.
pub const LIBVIRT_CATALOG: &str = include_str!("../catalogs/libvirt.xml");

/// Parses the bundled libvirt catalog.
///
/// # Errors
/// Returns `ParseError` if the bundled XML does not parse.
pub fn libvirt_catalog() -> Result<Catalog, ParseError> {
    parse_catalog(LIBVIRT_CATALOG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use virtxml_schema::validate_catalog;

    #[test]
    fn test_bundled_catalog_parses() {
        let catalog = libvirt_catalog().expect("Failed to parse bundled catalog");
        assert_eq!(catalog.package, "libvirtxml");
        for name in ["Domain", "Network", "StoragePool", "StorageVolume"] {
            assert!(catalog.has_record(name), "missing {name}");
        }
    }

    #[test]
    fn test_bundled_catalog_validates() {
        let catalog = libvirt_catalog().expect("Failed to parse bundled catalog");
        validate_catalog(&catalog).expect("Bundled catalog should validate");
    }

    #[test]
    fn test_root_elements() {
        let catalog = libvirt_catalog().expect("Failed to parse bundled catalog");
        let element = |name: &str| {
            catalog
                .get_record(name)
                .and_then(|r| r.element.clone())
                .expect("Missing root element")
        };
        assert_eq!(element("Domain"), "domain");
        assert_eq!(element("Network"), "network");
        assert_eq!(element("StoragePool"), "pool");
        assert_eq!(element("StorageVolume"), "volume");
    }
}
