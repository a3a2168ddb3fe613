//! Catalog registration from Rust types.
//!
//! [`XmlType`] maps a Rust type onto a [`TypeExpr`] and registers any record
//! declarations it depends on. Records implement it through
//! `#[derive(XmlRecord)]`; scalars and the standard wrappers are covered here.

use crate::types::{Catalog, RecordDecl, ScalarKind, TypeExpr};

/// A Rust type that has a catalog type expression.
pub trait XmlType {
    /// Returns the type expression for this type.
    fn type_expr() -> TypeExpr;

    /// Registers the record declarations this type depends on.
    ///
    /// Implementations must insert their own declaration before registering
    /// field types so that self-referential records terminate.
    fn register(catalog: &mut Catalog) {
        let _ = catalog;
    }
}

/// A Rust type declared as a named record.
pub trait XmlRecord: XmlType {
    /// Record name.
    const NAME: &'static str;

    /// Returns the record declaration.
    fn declaration() -> RecordDecl;
}

impl Catalog {
    /// Registers `T` and every record reachable from it.
    pub fn register<T: XmlType>(&mut self) {
        T::register(self);
    }

    /// Builds a catalog holding `T` and every record reachable from it.
    #[must_use]
    pub fn from_type<T: XmlType>(package: impl Into<String>) -> Self {
        let mut catalog = Self::new(package);
        catalog.register::<T>();
        catalog
    }
}

macro_rules! impl_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl XmlType for $ty {
                fn type_expr() -> TypeExpr {
                    TypeExpr::Scalar(ScalarKind::$kind)
                }
            }
        )*
    };
}

impl_scalar! {
    String => String,
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    isize => Int,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    usize => Uint,
    f32 => Float32,
    f64 => Float64,
}

impl<T: XmlType> XmlType for Option<T> {
    fn type_expr() -> TypeExpr {
        TypeExpr::optional(T::type_expr())
    }

    fn register(catalog: &mut Catalog) {
        T::register(catalog);
    }
}

impl<T: XmlType> XmlType for Vec<T> {
    fn type_expr() -> TypeExpr {
        TypeExpr::list(T::type_expr())
    }

    fn register(catalog: &mut Catalog) {
        T::register(catalog);
    }
}

impl<T: XmlType> XmlType for Box<T> {
    fn type_expr() -> TypeExpr {
        T::type_expr()
    }

    fn register(catalog: &mut Catalog) {
        T::register(catalog);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldDecl, XmlTag};

    struct Node;

    impl XmlType for Node {
        fn type_expr() -> TypeExpr {
            TypeExpr::named(Self::NAME)
        }

        fn register(catalog: &mut Catalog) {
            if !catalog.insert_record(Self::declaration()) {
                return;
            }
            <Option<Box<Node>> as XmlType>::register(catalog);
            <Vec<String> as XmlType>::register(catalog);
        }
    }

    impl XmlRecord for Node {
        const NAME: &'static str = "Node";

        fn declaration() -> RecordDecl {
            RecordDecl::new(Self::NAME)
                .with_field(
                    FieldDecl::new("next", <Option<Box<Node>> as XmlType>::type_expr())
                        .with_tag(XmlTag::element("next")),
                )
                .with_field(
                    FieldDecl::new("labels", <Vec<String> as XmlType>::type_expr())
                        .with_tag(XmlTag::element("label")),
                )
        }
    }

    #[test]
    fn test_scalar_type_exprs() {
        assert_eq!(u64::type_expr(), TypeExpr::Scalar(ScalarKind::Uint64));
        assert_eq!(String::type_expr(), TypeExpr::Scalar(ScalarKind::String));
        assert_eq!(
            <Option<u32>>::type_expr(),
            TypeExpr::optional(TypeExpr::Scalar(ScalarKind::Uint32))
        );
        assert_eq!(
            <Vec<bool>>::type_expr(),
            TypeExpr::list(TypeExpr::Scalar(ScalarKind::Bool))
        );
        assert_eq!(<Box<i64>>::type_expr(), TypeExpr::Scalar(ScalarKind::Int64));
    }

    #[test]
    fn test_register_self_referential_record() {
        let catalog = Catalog::from_type::<Node>("test");

        assert_eq!(catalog.len(), 1);
        let node = catalog.get_record("Node").expect("Node registered");
        assert_eq!(
            node.fields[0].ty,
            TypeExpr::optional(TypeExpr::named("Node"))
        );
    }
}
