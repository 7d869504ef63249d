//! `export` - write existing monitors as a YAML file

use crate::Context;
use crate::cli::ExportArgs;
use crate::config::CredentialArgs;
use crate::dialect;
use crate::{progress, ui};
use anyhow::{Context as _, Result, bail};
use reconcile::MonitorDescriptor;
use std::fs;
use std::path::Path;
use synq_client::{Backend, MonitorQuery, PathResolver};

pub fn run(
    ctx: &Context,
    creds: &CredentialArgs,
    config_path: &Path,
    args: ExportArgs,
) -> Result<()> {
    if args.output.exists() {
        bail!(
            "Output file {} already exists; choose another path",
            args.output.display()
        );
    }

    let backend = super::connect(ctx.quiet, creds, config_path)?;

    let pb = if ctx.quiet {
        progress::hidden()
    } else {
        progress::spinner("Fetching monitors...")
    };
    let exported = match export(&backend, &args) {
        Ok(exported) => {
            pb.finish_and_clear();
            exported
        }
        Err(e) => {
            progress::finish_error(&pb, "Export failed");
            return Err(e);
        }
    };

    let Some(Export { yaml, monitors }) = exported else {
        ui::warn("No monitors found for the given scope; nothing written.");
        return Ok(());
    };

    fs::write(&args.output, yaml)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    ui::success(&format!(
        "Exported {} to {}",
        ui::count(monitors, "monitor"),
        args.output.display()
    ));
    Ok(())
}

/// A generated document
#[derive(Debug)]
pub struct Export {
    pub yaml: String,
    pub monitors: usize,
}

/// Scope of the listing from the command line
pub fn build_query<B: Backend + ?Sized>(backend: &B, args: &ExportArgs) -> Result<MonitorQuery> {
    let monitored_paths = if args.monitored.is_empty() {
        Vec::new()
    } else {
        let resolved = PathResolver::new(backend)
            .resolve(&args.monitored)
            .context("Failed to resolve --monitored paths")?;
        let mut paths: Vec<String> = args
            .monitored
            .iter()
            .filter_map(|p| resolved.get(p).cloned())
            .collect();
        paths.dedup();
        paths
    };

    Ok(MonitorQuery {
        namespace: args.namespace.clone(),
        monitor_ids: args.monitors.clone(),
        integration_ids: args.integrations.clone(),
        monitored_paths,
        source: args.source.into(),
    })
}

/// List the monitors in scope and render them. `None` when nothing matched.
pub fn export<B: Backend + ?Sized>(backend: &B, args: &ExportArgs) -> Result<Option<Export>> {
    let query = build_query(backend, args)?;
    log::debug!("Listing monitors with {query:?}");

    let monitors: Vec<MonitorDescriptor> = backend
        .list_monitors(&query)
        .context("Failed to list monitors")?;
    if monitors.is_empty() {
        return Ok(None);
    }

    let mut canonical: Vec<String> = monitors.iter().map(|m| m.monitored_path.clone()).collect();
    canonical.sort();
    canonical.dedup();
    let simple = PathResolver::new(backend)
        .simplify(&canonical)
        .context("Failed to look up database coordinates")?;

    let namespace = args.namespace.as_deref().unwrap_or_default();
    let document = dialect::generate(namespace, &monitors, &simple);
    let yaml = dialect::to_yaml(&document)?;

    // The written file must deploy as-is.
    let reparsed = dialect::parse_document(&yaml).context("Generated YAML does not parse")?;
    if let Err(errors) = dialect::convert(&reparsed) {
        bail!("Generated YAML is invalid: {errors}");
    }

    Ok(Some(Export {
        yaml,
        monitors: monitors.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::SourceArg;
    use reconcile::{MonitorKind, Source};
    use std::path::PathBuf;
    use synq_client::{MockBackend, SourceFilter};

    fn args() -> ExportArgs {
        ExportArgs {
            output: PathBuf::from("out.yaml"),
            namespace: Some("sales".to_string()),
            integrations: Vec::new(),
            monitored: Vec::new(),
            monitors: Vec::new(),
            source: SourceArg::Api,
        }
    }

    fn backend() -> MockBackend {
        let backend = MockBackend::new();
        let mut fresh = MonitorDescriptor::new(
            "3f2504e0-4f89-11d3-9a0c-0305e82c3301",
            "sales",
            "bq::warehouse::orders",
        );
        fresh.name = "Orders freshness".to_string();
        fresh.kind = MonitorKind::Freshness {
            expression: "max(updated_at)".to_string(),
        };
        backend.add_monitor(fresh);

        let mut app = MonitorDescriptor::new("app-made", "sales", "bq::warehouse::orders");
        app.source = Source::App;
        backend.add_monitor(app);

        backend.add_monitor(MonitorDescriptor::new(
            "elsewhere",
            "finance",
            "bq::warehouse::ledger",
        ));
        backend.add_coordinate(
            "warehouse.orders",
            vec![vec!["bq::warehouse::orders".to_string()]],
        );
        backend
    }

    #[test]
    fn test_export_generates_deployable_yaml() {
        let backend = backend();
        let exported = export(&backend, &args()).unwrap().unwrap();

        assert_eq!(exported.monitors, 1);
        assert!(exported.yaml.contains("version: v1beta2"));
        assert!(exported.yaml.contains("namespace: sales"));
        assert!(exported.yaml.contains("id: warehouse.orders"));
        assert!(exported.yaml.contains("3f2504e0-4f89-11d3-9a0c-0305e82c3301"));
        assert!(exported.yaml.contains("Orders freshness"));

        let converted =
            dialect::convert(&dialect::parse_document(&exported.yaml).unwrap()).unwrap();
        assert_eq!(converted.monitors[0].monitored_path, "warehouse.orders");
    }

    #[test]
    fn test_export_all_sources() {
        let backend = backend();
        let exported = export(
            &backend,
            &ExportArgs {
                source: SourceArg::All,
                ..args()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(exported.monitors, 2);
    }

    #[test]
    fn test_export_nothing_in_scope() {
        let backend = backend();
        let result = export(
            &backend,
            &ExportArgs {
                namespace: Some("empty".to_string()),
                ..args()
            },
        )
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_build_query_resolves_monitored_paths() {
        let backend = MockBackend::new();
        backend.add_entity("bq::warehouse::orders", "table");

        let query = build_query(
            &backend,
            &ExportArgs {
                namespace: None,
                monitored: vec!["bq.warehouse.orders".to_string()],
                integrations: vec!["synq-1".to_string()],
                source: SourceArg::App,
                ..args()
            },
        )
        .unwrap();
        assert_eq!(query.monitored_paths, vec!["bq::warehouse::orders"]);
        assert_eq!(query.integration_ids, vec!["synq-1"]);
        assert_eq!(query.source, SourceFilter::App);
        assert!(query.namespace.is_none());
    }
}
