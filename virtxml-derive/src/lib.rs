//! # VirtXML Derive
//!
//! Procedural macro declaring Rust structs as catalog records.
//!
//! `#[derive(XmlRecord)]` implements `virtxml_schema::XmlType` and
//! `virtxml_schema::XmlRecord`, so a struct and every record it reaches can be
//! registered into a `Catalog` and reflected like a parsed catalog.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, LitStr, Visibility, parse_macro_input};

/// Derives the XmlRecord trait for a struct.
///
/// Every field type must implement `XmlType`. Fields without an `xml`
/// attribute are declared untagged and take no part in serialization; private
/// fields are declared unexported.
///
/// # Example
/// ```ignore
/// #[derive(XmlRecord)]
/// #[xml(element = "domain")]
/// pub struct Domain {
///     #[xml(attr = "type", choices = "kvm|qemu")]
///     pub r#type: String,
///     #[xml(element = "memory")]
///     pub memory: Option<DomainMemory>,
///     #[xml(flatten)]
///     pub common: DomainCommon,
/// }
///
/// #[derive(XmlRecord)]
/// pub struct DomainMemory {
///     #[xml(chardata)]
///     pub value: u64,
///     #[xml(attr = "unit", omit_empty)]
///     pub unit: String,
/// }
/// ```
#[proc_macro_derive(XmlRecord, attributes(xml))]
pub fn derive_xml_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    let record_name = ident.to_string();
    let container = ContainerAttrs::parse(input)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    ident,
                    "XmlRecord requires named fields or a unit struct",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "XmlRecord can only be derived for structs",
            ));
        }
    };

    let mut declarations = Vec::with_capacity(fields.len());
    let mut registrations = Vec::with_capacity(fields.len());
    for field in fields {
        let attrs = FieldAttrs::parse(field)?;
        let ty = &field.ty;
        declarations.push(field_declaration(field, &attrs)?);
        registrations.push(quote! {
            <#ty as ::virtxml_schema::XmlType>::register(catalog);
        });
    }

    let element = container.element.map(|element| {
        quote! { .with_element(#element) }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::virtxml_schema::XmlType for #ident #ty_generics #where_clause {
            fn type_expr() -> ::virtxml_schema::TypeExpr {
                ::virtxml_schema::TypeExpr::named(#record_name)
            }

            fn register(catalog: &mut ::virtxml_schema::Catalog) {
                if !catalog.insert_record(
                    <Self as ::virtxml_schema::XmlRecord>::declaration(),
                ) {
                    return;
                }
                #(#registrations)*
            }
        }

        impl #impl_generics ::virtxml_schema::XmlRecord for #ident #ty_generics #where_clause {
            const NAME: &'static str = #record_name;

            fn declaration() -> ::virtxml_schema::RecordDecl {
                ::virtxml_schema::RecordDecl::new(#record_name)
                    .with_package(::core::module_path!())
                    #element
                    #(.with_field(#declarations))*
            }
        }
    })
}

/// Builds the `FieldDecl` expression for one field.
fn field_declaration(field: &Field, attrs: &FieldAttrs) -> syn::Result<TokenStream2> {
    let ty = &field.ty;
    let type_expr = quote! { <#ty as ::virtxml_schema::XmlType>::type_expr() };
    let unexported = (!matches!(field.vis, Visibility::Public(_))).then(|| quote! { .unexported() });

    if attrs.flatten {
        return Ok(quote! {
            ::virtxml_schema::FieldDecl::embedded(#type_expr) #unexported
        });
    }

    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "field has no name"))?;
    let default_name = ident.to_string().trim_start_matches("r#").to_string();
    let name = attrs.name.clone().unwrap_or_else(|| default_name.clone());

    let tag = attrs.node.as_ref().map(|node| {
        let base = match node {
            Node::Element(xml) => {
                let xml = xml.clone().unwrap_or_else(|| default_name.clone());
                quote! { ::virtxml_schema::XmlTag::element(#xml) }
            }
            Node::Attribute(xml) => {
                let xml = xml.clone().unwrap_or_else(|| default_name.clone());
                quote! { ::virtxml_schema::XmlTag::attribute(#xml) }
            }
            Node::CharData => quote! { ::virtxml_schema::XmlTag::chardata() },
            Node::Ignored => quote! { ::virtxml_schema::XmlTag::ignored() },
        };
        let omit_empty = attrs.omit_empty.then(|| quote! { .omit_empty() });
        quote! { .with_tag(#base #omit_empty) }
    });

    let choices = (!attrs.choices.is_empty()).then(|| {
        let choices = &attrs.choices;
        quote! { .with_valid_values([#(#choices),*]) }
    });

    Ok(quote! {
        ::virtxml_schema::FieldDecl::new(#name, #type_expr) #tag #choices #unexported
    })
}

/// Container-level `#[xml(...)]` options.
#[derive(Default)]
struct ContainerAttrs {
    element: Option<String>,
}

impl ContainerAttrs {
    fn parse(input: &DeriveInput) -> syn::Result<Self> {
        let mut attrs = Self::default();
        for attr in input.attrs.iter().filter(|a| a.path().is_ident("xml")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("element") {
                    attrs.element = Some(meta.value()?.parse::<LitStr>()?.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported xml container attribute"))
                }
            })?;
        }
        Ok(attrs)
    }
}

enum Node {
    Element(Option<String>),
    Attribute(Option<String>),
    CharData,
    Ignored,
}

/// Field-level `#[xml(...)]` options.
#[derive(Default)]
struct FieldAttrs {
    name: Option<String>,
    node: Option<Node>,
    flatten: bool,
    omit_empty: bool,
    choices: Vec<String>,
}

impl FieldAttrs {
    fn parse(field: &Field) -> syn::Result<Self> {
        let mut attrs = Self::default();

        for attr in field.attrs.iter().filter(|a| a.path().is_ident("xml")) {
            attr.parse_nested_meta(|meta| {
                let node = if meta.path.is_ident("element") {
                    Some(Node::Element(optional_value(&meta)?))
                } else if meta.path.is_ident("attr") {
                    Some(Node::Attribute(optional_value(&meta)?))
                } else if meta.path.is_ident("chardata") {
                    Some(Node::CharData)
                } else if meta.path.is_ident("skip") {
                    Some(Node::Ignored)
                } else if meta.path.is_ident("flatten") {
                    attrs.flatten = true;
                    None
                } else if meta.path.is_ident("omit_empty") {
                    attrs.omit_empty = true;
                    None
                } else if meta.path.is_ident("name") {
                    attrs.name = Some(meta.value()?.parse::<LitStr>()?.value());
                    None
                } else if meta.path.is_ident("choices") {
                    let choices = meta.value()?.parse::<LitStr>()?.value();
                    attrs.choices = choices
                        .split('|')
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(str::to_string)
                        .collect();
                    None
                } else {
                    return Err(meta.error("unsupported xml field attribute"));
                };

                if let Some(node) = node {
                    if attrs.node.is_some() {
                        return Err(meta.error("a field maps onto exactly one xml node"));
                    }
                    attrs.node = Some(node);
                }
                Ok(())
            })?;
        }

        if attrs.flatten && attrs.node.is_some() {
            return Err(syn::Error::new_spanned(
                field,
                "flattened fields take no element, attr, chardata or skip option",
            ));
        }
        Ok(attrs)
    }
}

/// Reads `= "value"` if present.
fn optional_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<Option<String>> {
    if meta.input.peek(syn::Token![=]) {
        Ok(Some(meta.value()?.parse::<LitStr>()?.value()))
    } else {
        Ok(None)
    }
}
