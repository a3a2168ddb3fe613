use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use virtxml::codegen::coverage::DEFAULT_BATCH_SIZE;
use virtxml::codegen::generator::Totals;
use virtxml::{
    Catalog, DocRegistry, GenerationRun, Generator, Resource, libvirt_catalog, parse_catalog_file,
};

#[derive(Parser)]
#[command(name = "virtxml")]
#[command(about = "Generate IR from libvirt XML record types")]
#[command(version)]
pub struct Cli {
    /// Catalog XML file (defaults to the bundled libvirt catalog)
    #[arg(short, long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Directory of YAML documentation files
    #[arg(short, long, global = true)]
    pub docs: Option<PathBuf>,

    /// Resource kind as NAME=RECORD; replaces the default kinds
    #[arg(long = "resource", value_name = "NAME=RECORD", value_parser = parse_pair, global = true)]
    pub resources: Vec<(String, String)>,

    /// Struct exclusion as RECORD=REASON, or RECORD.FIELD=REASON for one field
    #[arg(long = "exclude", value_name = "RECORD=REASON", value_parser = parse_pair, global = true)]
    pub exclusions: Vec<(String, String)>,

    /// Number of undocumented fields per coverage batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, global = true)]
    pub batch_size: usize,

    /// Write output to a file instead of stdout
    #[arg(short, long, global = true)]
    pub out: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Print run totals and per-resource counts
    Summary,

    /// Dump the structs handed to emitters
    Ir,

    /// Print undocumented fields in batches
    Coverage,
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        let catalog = self.load_catalog()?;
        let generator = self.generator()?;
        let run = generator.run(&catalog).context("generation failed")?;

        let output = match self.command {
            Commands::Summary => serde_json::to_string_pretty(&Summary::new(&run))?,
            Commands::Ir => serde_json::to_string_pretty(&run.structs().collect::<Vec<_>>())?,
            Commands::Coverage => serde_json::to_string_pretty(&run.batches)?,
        };

        match &self.out {
            Some(path) => {
                std::fs::write(path, output)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::info!("Wrote {}", path.display());
            }
            None => println!("{output}"),
        }
        Ok(())
    }

    fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog {
            Some(path) => parse_catalog_file(path)
                .with_context(|| format!("failed to load catalog {}", path.display())),
            None => libvirt_catalog().context("failed to parse the bundled catalog"),
        }
    }

    fn generator(&self) -> Result<Generator> {
        let mut builder = Generator::builder().batch_size(self.batch_size);

        if !self.resources.is_empty() {
            builder = builder.resources(
                self.resources
                    .iter()
                    .map(|(name, record)| Resource::new(name, record)),
            );
        }

        for (target, reason) in &self.exclusions {
            builder = match target.split_once('.') {
                Some((record, field)) => builder.exclude_field(record, field, reason),
                None => builder.exclude(target, reason),
            };
        }

        if let Some(dir) = &self.docs {
            let registry = DocRegistry::load(dir)
                .with_context(|| format!("failed to load documentation from {}", dir.display()))?;
            tracing::info!("Loaded {} documentation entries", registry.len());
            builder = builder.docs(registry);
        }

        Ok(builder.build())
    }
}

/// Splits `KEY=VALUE`.
fn parse_pair(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
    if key.is_empty() {
        return Err(format!("empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Output of the `summary` command.
#[derive(Debug, Serialize)]
struct Summary<'a> {
    totals: Totals,
    resources: Vec<ResourceSummary<'a>>,
    undocumented: usize,
    batches: usize,
}

#[derive(Debug, Serialize)]
struct ResourceSummary<'a> {
    name: &'a str,
    record: &'a str,
    xml_root: &'a str,
    fields: usize,
}

impl<'a> Summary<'a> {
    fn new(run: &'a GenerationRun) -> Self {
        let resources = run
            .roots
            .iter()
            .map(|root| ResourceSummary {
                name: &root.resource.name,
                record: &root.resource.record,
                xml_root: &root.xml_root,
                fields: run.graph.get(root.id).map_or(0, |ir| ir.fields.len()),
            })
            .collect();

        Self {
            totals: run.totals,
            resources,
            undocumented: run.batches.iter().map(|b| b.fields.len()).sum(),
            batches: run.batches.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("domain=Domain").expect("Failed to parse pair"),
            ("domain".to_string(), "Domain".to_string())
        );
        assert_eq!(
            parse_pair("DomainSecLabel=not exposed").expect("Failed to parse pair"),
            ("DomainSecLabel".to_string(), "not exposed".to_string())
        );
        assert!(parse_pair("Domain").is_err());
        assert!(parse_pair("=Domain").is_err());
    }

    #[test]
    fn test_cli_arguments() {
        let cli = Cli::try_parse_from([
            "virtxml",
            "coverage",
            "--resource",
            "pool=StoragePool",
            "--exclude",
            "StoragePool.uuid=computed",
            "--batch-size",
            "5",
        ])
        .expect("Failed to parse arguments");

        assert_eq!(cli.command, Commands::Coverage);
        assert_eq!(cli.batch_size, 5);
        assert_eq!(
            cli.resources,
            [("pool".to_string(), "StoragePool".to_string())]
        );
        assert!(cli.catalog.is_none());
    }

    #[test]
    fn test_default_batch_size() {
        let cli = Cli::try_parse_from(["virtxml", "summary"]).expect("Failed to parse arguments");
        assert_eq!(cli.batch_size, DEFAULT_BATCH_SIZE);
        assert!(cli.resources.is_empty());
    }

    #[test]
    fn test_summary_of_bundled_catalog() {
        let cli = Cli::try_parse_from(["virtxml", "summary", "--resource", "pool=StoragePool"])
            .expect("Failed to parse arguments");
        let catalog = cli.load_catalog().expect("Failed to load catalog");
        let run = cli
            .generator()
            .expect("Failed to build generator")
            .run(&catalog)
            .expect("Failed to generate");

        let summary = Summary::new(&run);
        assert_eq!(summary.resources.len(), 1);
        assert_eq!(summary.resources[0].xml_root, "pool");
        assert_eq!(summary.totals.top_level, 1);
        assert!(summary.undocumented > 0);
    }

    #[test]
    fn test_field_exclusion_from_arguments() {
        let cli = Cli::try_parse_from([
            "virtxml",
            "ir",
            "--exclude",
            "Domain.uuid=assigned by libvirt",
            "--exclude",
            "DomainSecLabel=host policy",
        ])
        .expect("Failed to parse arguments");
        let catalog = cli.load_catalog().expect("Failed to load catalog");
        let run = cli
            .generator()
            .expect("Failed to build generator")
            .run(&catalog)
            .expect("Failed to generate");

        let domain = run.get("Domain").expect("Missing Domain");
        let uuid = domain.field("uuid").expect("Missing uuid");
        assert_eq!(uuid.exclusion.as_deref(), Some("assigned by libvirt"));
        let seclabel = run.get("DomainSecLabel").expect("Missing DomainSecLabel");
        assert!(seclabel.is_excluded());
    }
}
