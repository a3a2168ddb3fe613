//! Catalog builders for the VirtXML benchmarks.

use virtxml_schema::{Catalog, FieldDecl, RecordDecl, ScalarKind, TypeExpr, XmlTag};

/// Builds a catalog of `depth` records chained through an optional child
/// element, each with `width` string attributes and a `memory`-style
/// value-with-unit element. The last record points back at the first, so the
/// chain closes one cycle.
#[must_use]
pub fn chain_catalog(depth: usize, width: usize) -> Catalog {
    let depth = depth.max(1);
    let mut catalog = Catalog::new("bench");

    catalog.insert_record(
        RecordDecl::new("Size")
            .with_field(
                FieldDecl::new("Value", TypeExpr::Scalar(ScalarKind::Uint64))
                    .with_tag(XmlTag::chardata()),
            )
            .with_field(
                FieldDecl::new("Unit", TypeExpr::Scalar(ScalarKind::String))
                    .with_tag(XmlTag::attribute("unit").omit_empty()),
            ),
    );

    for level in 0..depth {
        let mut record = RecordDecl::new(record_name(level));
        if level == 0 {
            record = record.with_element("root");
        }
        for i in 0..width {
            record.add_field(
                FieldDecl::new(format!("Attr{i}"), TypeExpr::Scalar(ScalarKind::String))
                    .with_tag(XmlTag::attribute(format!("attr{i}")).omit_empty()),
            );
        }
        record.add_field(
            FieldDecl::new("Size", TypeExpr::optional(TypeExpr::named("Size")))
                .with_tag(XmlTag::element("size")),
        );
        let child = record_name((level + 1) % depth);
        record.add_field(
            FieldDecl::new("Child", TypeExpr::optional(TypeExpr::named(child)))
                .with_tag(XmlTag::element("child")),
        );
        catalog.insert_record(record);
    }

    catalog
}

/// Name of the record at a chain level.
#[must_use]
pub fn record_name(level: usize) -> String {
    format!("Level{level}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use virtxml_codegen::Reflector;
    use virtxml_schema::validate_catalog;

    #[test]
    fn test_chain_catalog_shape() {
        let catalog = chain_catalog(3, 2);
        assert_eq!(catalog.len(), 4);
        validate_catalog(&catalog).expect("Chain catalog should validate");
    }

    #[test]
    fn test_chain_closes_cycle() {
        let catalog = chain_catalog(3, 1);
        let mut reflector = Reflector::new(&catalog);
        reflector.reflect("Level0").expect("Failed to reflect");

        let last = reflector.graph().by_name("Level2").expect("Missing Level2");
        let child = last.field("child").expect("Missing child");
        assert_eq!(
            child.cycle_trace(),
            Some("Level0 → Level1 → Level2 → Level0")
        );
    }
}
