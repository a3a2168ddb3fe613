//! Type-graph reflector.
//!
//! The reflector walks record declarations depth first and builds one
//! [`StructIR`] per distinct record name. Results are cached in the
//! reflector's [`StructGraph`] before recursing, and the [`CycleGuard`] turns
//! back-edges into cycle-marked fields instead of descending into them. A
//! record whose analysis fails leaves nothing behind in the cache.

use crate::cycle::CycleGuard;
use crate::error::ReflectError;
use crate::expand::expand_fields;
use crate::ir::{
    FieldIR, FieldPattern, NestedLink, Optionality, StructGraph, StructIR, StructId, ValueType,
};
use crate::overrides::apply_overrides;
use crate::patterns::{detect_string_to_bool, detect_struct_pattern};
use virtxml_schema::{Catalog, FieldDecl, RecordDecl, TypeExpr, XmlNode, to_snake_case};

/// Builds IR from the records of one catalog.
///
/// One reflector serves a whole generation run: every resource kind reflected
/// through it shares the struct cache, so records reachable from several
/// resources are analyzed once.
#[derive(Debug)]
pub struct Reflector<'a> {
    catalog: &'a Catalog,
    graph: StructGraph,
    guard: CycleGuard,
}

impl<'a> Reflector<'a> {
    /// Creates a reflector over a catalog.
    #[must_use]
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            graph: StructGraph::new(),
            guard: CycleGuard::new(),
        }
    }

    /// Returns the catalog being reflected.
    #[must_use]
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Returns the struct graph built so far.
    #[must_use]
    pub fn graph(&self) -> &StructGraph {
        &self.graph
    }

    /// Returns the struct graph mutably.
    pub fn graph_mut(&mut self) -> &mut StructGraph {
        &mut self.graph
    }

    /// Consumes the reflector and returns its struct graph.
    #[must_use]
    pub fn into_graph(self) -> StructGraph {
        self.graph
    }

    /// Reflects a record by name.
    ///
    /// # Errors
    /// Returns `ReflectError::UnknownRecord` if the catalog has no such record,
    /// or the first error met while analyzing it.
    pub fn reflect(&mut self, name: &str) -> Result<StructId, ReflectError> {
        if let Some(id) = self.graph.lookup(name) {
            return Ok(id);
        }
        let catalog = self.catalog;
        let record = catalog
            .get_record(name)
            .ok_or_else(|| ReflectError::UnknownRecord {
                name: name.to_string(),
            })?;
        self.reflect_record(record)
    }

    /// Reflects the record a type expression refers to.
    ///
    /// # Errors
    /// Returns `ReflectError::NotARecord` for scalars and lists and
    /// `ReflectError::Anonymous` for inline records.
    pub fn reflect_type(&mut self, ty: &TypeExpr) -> Result<StructId, ReflectError> {
        match ty.strip_optional() {
            TypeExpr::Named(name) => self.reflect(name),
            TypeExpr::Inline(_) => Err(ReflectError::Anonymous),
            other => Err(ReflectError::NotARecord {
                name: other.to_string(),
                kind: other.kind_name(),
            }),
        }
    }

    /// Reflects a record declaration.
    ///
    /// # Errors
    /// Returns `ReflectError::Anonymous` for unnamed records, or the first
    /// error met while analyzing the record's fields.
    pub fn reflect_record(&mut self, record: &RecordDecl) -> Result<StructId, ReflectError> {
        if record.is_anonymous() {
            return Err(ReflectError::Anonymous);
        }
        if let Some(id) = self.graph.lookup(&record.name) {
            return Ok(id);
        }

        let package = if record.package.is_empty() {
            self.catalog.package.clone()
        } else {
            record.package.clone()
        };
        let mut ir = StructIR::new(&record.name, package);
        ir.element = record.element.clone();
        ir.pattern = detect_struct_pattern(&record.fields);
        let mark = self.graph.len();
        let id = self.graph.insert(ir);

        let analyzed = self.in_frame(&record.name, |this| {
            this.analyze_fields(&record.name, &record.fields)
        });
        let mut fields = match analyzed {
            Ok(fields) => fields,
            Err(e) => {
                self.graph.truncate(mark);
                return Err(e);
            }
        };

        apply_overrides(&record.name, &mut fields);
        if fields.iter().any(FieldIR::is_flatten_marker) {
            fields = expand_fields(&self.graph, fields);
            apply_overrides(&record.name, &mut fields);
        }

        self.graph[id].fields = fields;
        Ok(id)
    }

    /// Runs `f` with `name` on the cycle guard, popping it on every exit.
    fn in_frame<T>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        self.guard.push(name);
        let out = f(self);
        self.guard.pop();
        out
    }

    /// Analyzes the fields of a record, splicing embedded records in place.
    fn analyze_fields(
        &mut self,
        owner: &str,
        fields: &[FieldDecl],
    ) -> Result<Vec<FieldIR>, ReflectError> {
        let mut analyzed = Vec::with_capacity(fields.len());

        for field in fields.iter().filter(|f| f.exported) {
            if field.embedded {
                self.splice_embedded(owner, field, &mut analyzed)?;
                continue;
            }

            if let Some(ir) = self
                .analyze_field(owner, field)
                .map_err(|e| ReflectError::field(owner, &field.name, e))?
            {
                analyzed.push(ir);
            }
        }

        Ok(analyzed)
    }

    /// Appends the fields of an embedded record to its parent's fields.
    ///
    /// Named records are reflected and cached like any other record. Inline
    /// records are analyzed in the parent's frame. Embedded scalars carry no
    /// fields and are ignored.
    fn splice_embedded(
        &mut self,
        owner: &str,
        field: &FieldDecl,
        analyzed: &mut Vec<FieldIR>,
    ) -> Result<(), ReflectError> {
        match field.ty.strip_optional() {
            TypeExpr::Named(name) => {
                let id = self
                    .reflect(name)
                    .map_err(|e| ReflectError::embedded(owner, name, e))?;
                analyzed.extend(self.graph[id].fields.iter().cloned());
            }
            TypeExpr::Inline(record) => {
                let fields = self
                    .analyze_fields(owner, &record.fields)
                    .map_err(|e| ReflectError::embedded(owner, field.ty.to_string(), e))?;
                analyzed.extend(fields);
            }
            _ => {
                tracing::debug!("Ignoring embedded {} in {}", field.ty, owner);
            }
        }
        Ok(())
    }

    /// Analyzes one field. Returns `None` for fields that produce no output.
    fn analyze_field(
        &mut self,
        owner: &str,
        field: &FieldDecl,
    ) -> Result<Option<FieldIR>, ReflectError> {
        let Some(tag) = field.tag.as_ref() else {
            return Ok(None);
        };
        if tag.node == XmlNode::Ignored {
            return Ok(None);
        }

        let mut ir = FieldIR::new(&field.name, &tag.name, to_snake_case(&field.name));
        ir.source_type = field.ty.to_string();
        ir.is_attr = tag.is_attribute();
        ir.omit_empty = tag.omit_empty;
        ir.is_pointer = field.ty.is_optional();
        ir.valid_values = field.valid_values.clone();

        let ty = field.ty.strip_optional();
        ir.is_list = matches!(ty, TypeExpr::List(_));

        if ir.omit_empty || ir.is_pointer || ir.is_list {
            ir.optionality = Optionality::Optional;
            ir.preserve_user_intent = true;
        } else {
            ir.optionality = Optionality::Required;
        }

        match ty {
            TypeExpr::Scalar(kind) => {
                ir.value_type = ValueType::from_scalar(*kind);
            }
            TypeExpr::List(element) => {
                ir.value_type = ValueType::List;
                match element.strip_optional() {
                    TypeExpr::Scalar(kind) => {
                        ir.element_type = Some(ValueType::from_scalar(*kind));
                    }
                    TypeExpr::List(_) => {
                        ir.element_type = Some(ValueType::List);
                    }
                    TypeExpr::Named(name) => {
                        if self.mark_cycle(owner, name, &mut ir) {
                            return Ok(Some(ir));
                        }
                        let id = self.reflect(name)?;
                        ir.is_nested = true;
                        ir.element_type = Some(ValueType::Object);
                        ir.link = NestedLink::Struct { id };
                    }
                    TypeExpr::Inline(_) | TypeExpr::Optional(_) => {
                        tracing::debug!(
                            "Dropping {}.{}: list of anonymous records",
                            owner,
                            field.name
                        );
                        return Ok(None);
                    }
                }
            }
            TypeExpr::Named(name) => {
                if self.mark_cycle(owner, name, &mut ir) {
                    return Ok(Some(ir));
                }
                let id = self.reflect(name)?;
                ir.link = NestedLink::Struct { id };

                let nested = &self.graph[id];
                if nested.is_presence_only() {
                    ir.value_type = ValueType::Bool;
                    ir.pattern = FieldPattern::PresenceBoolean;
                } else if nested.value_with_unit().is_some() {
                    ir.value_type = ValueType::Object;
                    ir.pattern = FieldPattern::FlattenValueWithUnit;
                } else {
                    ir.value_type = ValueType::Object;
                    ir.is_nested = true;
                }
            }
            TypeExpr::Inline(_) | TypeExpr::Optional(_) => {
                tracing::debug!("Dropping {}.{}: anonymous record", owner, field.name);
                return Ok(None);
            }
        }

        if !ir.is_nested && !ir.is_list {
            if let Some(tokens) = detect_string_to_bool(&field.name, &field.ty) {
                ir.string_to_bool = Some(tokens);
                ir.value_type = ValueType::Bool;
            }
        }

        Ok(Some(ir))
    }

    /// Marks `ir` as a cycle back-edge if `target` is under analysis.
    fn mark_cycle(&self, owner: &str, target: &str, ir: &mut FieldIR) -> bool {
        if !self.guard.contains(target) {
            return false;
        }
        let trace = self.guard.trace(target);
        tracing::debug!("Cycle detected at {}.{}: {}", owner, ir.name, trace);
        ir.link = NestedLink::Cycle { trace };
        true
    }
}
