//! Generation driver.
//!
//! A [`Generator`] reflects every configured resource kind through one
//! [`Reflector`], so records shared between resources are analyzed once. It
//! then applies exclusions, records paths, overlays documentation and
//! collects the deduplicated struct list emitters consume.

use crate::coverage::{Batch, DEFAULT_BATCH_SIZE, FieldContext, build_batches, collect_fields};
use crate::docs::DocRegistry;
use crate::error::CodegenError;
use crate::ir::{StructGraph, StructIR, StructId};
use crate::paths::assign_root_paths;
use crate::reflector::Reflector;
use serde::Serialize;
use std::collections::HashSet;
use virtxml_schema::{Catalog, validate_catalog};

/// Resource kinds of the platform, as `(root path, record name)`.
pub const DEFAULT_RESOURCES: &[(&str, &str)] = &[
    ("domain", "Domain"),
    ("network", "Network"),
    ("storage_pool", "StoragePool"),
    ("storage_volume", "StorageVolume"),
];

/// One top-level resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    /// Snake case resource name, also the root of output paths.
    pub name: String,
    /// Record the resource is built from.
    pub record: String,
}

impl Resource {
    /// Creates a resource.
    #[must_use]
    pub fn new(name: impl Into<String>, record: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record: record.into(),
        }
    }
}

/// A struct or field left out of emission.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Exclusion {
    record: String,
    field: Option<String>,
    reason: String,
}

/// Builder for configuring a [`Generator`].
#[derive(Debug, Clone)]
pub struct GeneratorBuilder {
    resources: Vec<Resource>,
    exclusions: Vec<Exclusion>,
    docs: Option<DocRegistry>,
    batch_size: usize,
}

impl GeneratorBuilder {
    /// Creates a builder with the default resource kinds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resources: DEFAULT_RESOURCES
                .iter()
                .map(|&(name, record)| Resource::new(name, record))
                .collect(),
            exclusions: Vec::new(),
            docs: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Replaces the resource kinds.
    #[must_use]
    pub fn resources<I>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = Resource>,
    {
        self.resources = resources.into_iter().collect();
        self
    }

    /// Adds a resource kind.
    #[must_use]
    pub fn resource(mut self, name: impl Into<String>, record: impl Into<String>) -> Self {
        self.resources.push(Resource::new(name, record));
        self
    }

    /// Excludes a struct from emission.
    #[must_use]
    pub fn exclude(mut self, record: impl Into<String>, reason: impl Into<String>) -> Self {
        self.exclusions.push(Exclusion {
            record: record.into(),
            field: None,
            reason: reason.into(),
        });
        self
    }

    /// Excludes one field, by output name, from emission.
    #[must_use]
    pub fn exclude_field(
        mut self,
        record: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        self.exclusions.push(Exclusion {
            record: record.into(),
            field: Some(field.into()),
            reason: reason.into(),
        });
        self
    }

    /// Sets the documentation registry.
    #[must_use]
    pub fn docs(mut self, registry: DocRegistry) -> Self {
        self.docs = Some(registry);
        self
    }

    /// Sets the coverage batch size.
    #[must_use]
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Builds the generator.
    #[must_use]
    pub fn build(self) -> Generator {
        Generator {
            resources: self.resources,
            exclusions: self.exclusions,
            docs: self.docs.unwrap_or_default(),
            batch_size: self.batch_size,
        }
    }
}

impl Default for GeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the reflection pipeline over a catalog.
#[derive(Debug, Clone)]
pub struct Generator {
    resources: Vec<Resource>,
    exclusions: Vec<Exclusion>,
    docs: DocRegistry,
    batch_size: usize,
}

impl Generator {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder::new()
    }

    /// Returns the configured resource kinds.
    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Returns the documentation registry.
    #[must_use]
    pub fn docs(&self) -> &DocRegistry {
        &self.docs
    }

    /// Validates the catalog and generates IR for every resource kind.
    ///
    /// # Errors
    /// Returns `CodegenError` if no resource is configured, the catalog does
    /// not validate, or a resource kind fails to reflect.
    pub fn run(&self, catalog: &Catalog) -> Result<GenerationRun, CodegenError> {
        if self.resources.is_empty() {
            return Err(CodegenError::config("no resources configured"));
        }
        validate_catalog(catalog)?;

        let mut reflector = Reflector::new(catalog);
        let mut roots = Vec::with_capacity(self.resources.len());

        for resource in &self.resources {
            let id = reflector
                .reflect(&resource.record)
                .map_err(|e| CodegenError::resource(&resource.name, e))?;
            reflector.graph_mut()[id].is_top_level = true;

            let xml_root = reflector.graph()[id]
                .element
                .clone()
                .unwrap_or_else(|| resource.name.clone());
            tracing::info!(
                "Reflected {} from {} ({} structs so far)",
                resource.name,
                resource.record,
                reflector.graph().len()
            );
            roots.push(ResourceRoot {
                resource: resource.clone(),
                id,
                xml_root,
            });
        }

        let mut graph = reflector.into_graph();
        self.apply_exclusions(&mut graph);

        let path_roots: Vec<_> = roots
            .iter()
            .map(|r| (r.id, r.resource.name.as_str(), r.xml_root.as_str()))
            .collect();
        assign_root_paths(&mut graph, &path_roots);
        for root in &roots {
            self.docs.apply(&mut graph, root.id, &root.resource.name);
        }

        let structs = collect_structs(&graph, &roots);
        let mut undocumented: Vec<FieldContext> = Vec::new();
        for root in &roots {
            collect_fields(
                &graph,
                root.id,
                &root.resource.name,
                &root.xml_root,
                Some(&self.docs),
                &mut undocumented,
            );
        }
        let batches = build_batches(undocumented, self.batch_size);

        let run = GenerationRun {
            totals: Totals::count(&graph, &structs),
            graph,
            roots,
            structs,
            batches,
        };
        tracing::info!(
            "Generated {} structs ({} top-level, {} total fields)",
            run.totals.structs,
            run.totals.top_level,
            run.totals.fields
        );
        Ok(run)
    }

    fn apply_exclusions(&self, graph: &mut StructGraph) {
        for exclusion in &self.exclusions {
            let Some(id) = graph.lookup(&exclusion.record) else {
                tracing::warn!("Exclusion for unknown struct {}", exclusion.record);
                continue;
            };
            let ir = &mut graph[id];
            match &exclusion.field {
                None => ir.exclusion = Some(exclusion.reason.clone()),
                Some(name) => match ir.fields.iter_mut().find(|f| &f.output_name == name) {
                    Some(field) => field.exclusion = Some(exclusion.reason.clone()),
                    None => {
                        tracing::warn!("Exclusion for unknown field {}.{}", exclusion.record, name);
                    }
                },
            }
        }
    }
}

impl Default for Generator {
    fn default() -> Self {
        GeneratorBuilder::new().build()
    }
}

/// Root struct of one resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRoot {
    /// Resource kind.
    pub resource: Resource,
    /// Root struct.
    pub id: StructId,
    /// Root of document paths.
    pub xml_root: String,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    /// Structs handed to emitters.
    pub structs: usize,
    /// Top-level structs among them.
    pub top_level: usize,
    /// Fields across those structs.
    pub fields: usize,
    /// Cycle back-edges across those structs.
    pub cycles: usize,
    /// Excluded structs among them.
    pub excluded: usize,
}

impl Totals {
    fn count(graph: &StructGraph, structs: &[StructId]) -> Self {
        let mut totals = Self::default();
        for ir in structs.iter().filter_map(|&id| graph.get(id)) {
            totals.structs += 1;
            totals.fields += ir.fields.len();
            totals.cycles += ir.fields.iter().filter(|f| f.is_cycle()).count();
            if ir.is_top_level {
                totals.top_level += 1;
            }
            if ir.is_excluded() {
                totals.excluded += 1;
            }
        }
        totals
    }
}

/// Output of one generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRun {
    /// Every struct reflected during the run.
    pub graph: StructGraph,
    /// One root per resource kind, in configuration order.
    pub roots: Vec<ResourceRoot>,
    /// Structs for emitters: deduplicated, in first-encounter order.
    pub structs: Vec<StructId>,
    /// Run totals.
    pub totals: Totals,
    /// Undocumented fields, sorted by path and batched.
    pub batches: Vec<Batch>,
}

impl GenerationRun {
    /// Returns the root struct of a resource kind.
    #[must_use]
    pub fn root(&self, resource: &str) -> Option<&StructIR> {
        self.roots
            .iter()
            .find(|r| r.resource.name == resource)
            .and_then(|r| self.graph.get(r.id))
    }

    /// Iterates the structs emitters consume.
    pub fn structs(&self) -> impl Iterator<Item = &StructIR> {
        self.structs.iter().filter_map(|&id| self.graph.get(id))
    }

    /// Returns a struct by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StructIR> {
        self.graph.by_name(name)
    }
}

/// Collects the structs reachable from the roots through nested links.
///
/// Presence and flattened fields keep a link for conversion code but are not
/// followed: their structs are never emitted on their own.
fn collect_structs(graph: &StructGraph, roots: &[ResourceRoot]) -> Vec<StructId> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for root in roots {
        collect_struct(graph, root.id, &mut seen, &mut result);
    }
    result
}

fn collect_struct(
    graph: &StructGraph,
    id: StructId,
    seen: &mut HashSet<StructId>,
    result: &mut Vec<StructId>,
) {
    if !seen.insert(id) {
        return;
    }
    result.push(id);

    let Some(ir) = graph.get(id) else {
        return;
    };
    for field in ir.fields.iter().filter(|f| f.is_nested) {
        if let Some(nested) = field.nested() {
            collect_struct(graph, nested, seen, result);
        }
    }
}
