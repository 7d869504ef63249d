//! `deploy` - push YAML definitions to the service, one namespace at a time

use crate::Context;
use crate::cli::DeployArgs;
use crate::config::CredentialArgs;
use crate::dialect::{self, Document};
use crate::engine::{ExecuteOptions, Outcome, execute};
use crate::{paths, progress, ui};
use anyhow::{Context as _, Result, bail};
use reconcile::{Entity, IdentityGenerator, MonitorDescriptor, TestDescriptor, reconcile};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use synq_client::{Backend, PathResolver};

/// Everything to deploy into one namespace
#[derive(Debug, Default)]
pub struct NamespacePlan {
    pub namespace: String,
    pub files: Vec<PathBuf>,
    pub monitors: Vec<MonitorDescriptor>,
    pub tests: Vec<TestDescriptor>,
}

fn label(namespace: &str) -> &str {
    if namespace.is_empty() { "default" } else { namespace }
}

pub fn run(
    ctx: &Context,
    creds: &CredentialArgs,
    config_path: &Path,
    args: DeployArgs,
) -> Result<()> {
    let files = collect_files(&args.files)?;
    if files.is_empty() {
        ui::info("No YAML files found.");
        return Ok(());
    }

    let documents = load_documents(&files)?;
    let grouped = group_by_namespace(documents, &args.namespaces);
    if grouped.is_empty() {
        ui::warn("No namespace matched --namespace; nothing to deploy.");
        return Ok(());
    }

    // Everything is validated before the first network call.
    let mut invalid: Vec<String> = Vec::new();
    let mut plans = Vec::new();
    for (namespace, docs) in grouped {
        match build_plan(&namespace, docs) {
            Ok(plan) => plans.push(plan),
            Err(e) => {
                ui::error(&format!("Namespace '{}': {e:#}", label(&namespace)));
                invalid.push(namespace);
            }
        }
    }

    if plans.is_empty() {
        return report_failures(&invalid);
    }

    let backend = super::connect(ctx.quiet, creds, config_path)?;
    let opts = ExecuteOptions {
        dry_run: args.dry_run,
        auto_confirm: args.auto_confirm,
        quiet: ctx.quiet,
    };
    deploy_plans(&backend, plans, invalid, args.print_payload, &opts, ctx.verbose > 0)
}

/// Deploy every plan in turn.
///
/// A failing namespace is reported and the next one still runs. `failed`
/// holds namespaces that already failed validation; the result is an error
/// if any namespace failed.
pub fn deploy_plans<B: Backend + ?Sized>(
    backend: &B,
    plans: Vec<NamespacePlan>,
    mut failed: Vec<String>,
    print_payload: bool,
    opts: &ExecuteOptions,
    verbose: bool,
) -> Result<()> {
    let workspace = backend.workspace().context("Failed to fetch workspace")?;
    if verbose {
        ui::kv("Workspace", &workspace);
    }
    let identities = IdentityGenerator::new(&workspace)?;

    let total = plans.len();
    for (index, plan) in plans.into_iter().enumerate() {
        let namespace = plan.namespace.clone();
        println!();
        ui::step(
            index + 1,
            total,
            &format!(
                "Namespace '{}' ({})",
                label(&namespace),
                ui::count(plan.files.len(), "file")
            ),
        );

        match deploy_namespace(backend, &identities, plan, print_payload, opts) {
            Ok(Outcome::Declined) => ui::dim("Skipped"),
            Ok(_) => {}
            Err(e) => {
                ui::error(&format!("Namespace '{}': {e:#}", label(&namespace)));
                failed.push(namespace);
            }
        }
    }

    report_failures(&failed)
}

fn report_failures(failed: &[String]) -> Result<()> {
    if failed.is_empty() {
        return Ok(());
    }
    let names: Vec<&str> = failed.iter().map(|n| label(n)).collect();
    bail!(
        "{} failed: {}",
        ui::count(failed.len(), "namespace"),
        names.join(", ")
    );
}

/// Files named on the command line, expanding directories.
///
/// With no arguments the working directory is searched.
pub fn collect_files(args: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if args.is_empty() {
        let cwd = std::env::current_dir().context("Could not determine working directory")?;
        return paths::find_yaml_files(&cwd);
    }

    let mut found = BTreeSet::new();
    for arg in args {
        if arg.is_dir() {
            for file in paths::find_yaml_files(arg)? {
                found.insert(canonical(&file)?);
            }
        } else if arg.is_file() {
            found.insert(canonical(arg)?);
        } else {
            bail!("File not found: {}", arg.display());
        }
    }
    Ok(found.into_iter().collect())
}

/// A file named twice (directly and through its directory) is loaded once
fn canonical(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Failed to resolve {}", path.display()))
}

/// Read and version-check every file. Any unreadable file stops the deploy.
pub fn load_documents(files: &[PathBuf]) -> Result<Vec<(PathBuf, Document)>> {
    files
        .iter()
        .map(|path| {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let doc = dialect::parse_document(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            log::debug!("Parsed {} (namespace '{}')", path.display(), doc.namespace);
            Ok((path.clone(), doc))
        })
        .collect()
}

/// Group documents by namespace, keeping only `selected` ones when given
pub fn group_by_namespace(
    documents: Vec<(PathBuf, Document)>,
    selected: &[String],
) -> BTreeMap<String, Vec<(PathBuf, Document)>> {
    let mut grouped: BTreeMap<String, Vec<(PathBuf, Document)>> = BTreeMap::new();
    for (path, doc) in documents {
        if !selected.is_empty() && !selected.contains(&doc.namespace) {
            log::info!(
                "Skipping {} (namespace '{}' not selected)",
                path.display(),
                doc.namespace
            );
            continue;
        }
        grouped
            .entry(doc.namespace.clone())
            .or_default()
            .push((path, doc));
    }
    grouped
}

/// Convert every document of a namespace, reporting all errors together
pub fn build_plan(namespace: &str, docs: Vec<(PathBuf, Document)>) -> Result<NamespacePlan> {
    let mut plan = NamespacePlan {
        namespace: namespace.to_string(),
        ..NamespacePlan::default()
    };
    let mut problems = Vec::new();

    for (path, doc) in docs {
        match dialect::convert(&doc) {
            Ok(converted) => {
                plan.monitors.extend(converted.monitors);
                plan.tests.extend(converted.tests);
            }
            Err(errors) => problems.push(format!("{}: {errors}", path.display())),
        }
        plan.files.push(path);
    }

    if !problems.is_empty() {
        bail!("invalid definitions\n{}", problems.join("\n"));
    }
    Ok(plan)
}

/// Resolve, identify, fetch, reconcile and execute one namespace
pub fn deploy_namespace<B: Backend + ?Sized>(
    backend: &B,
    identities: &IdentityGenerator,
    mut plan: NamespacePlan,
    print_payload: bool,
    opts: &ExecuteOptions,
) -> Result<Outcome> {
    let namespace = plan.namespace.clone();

    resolve_paths(backend, &mut plan)?;
    identities.assign(&namespace, &mut plan.monitors)?;
    identities.assign(&namespace, &mut plan.tests)?;

    if print_payload {
        print_plan(&plan)?;
    }

    let pb = if opts.quiet {
        progress::hidden()
    } else {
        progress::spinner("Fetching current state...")
    };
    let (actual_monitors, actual_tests) = match fetch_remote(backend, &plan) {
        Ok(fetched) => {
            progress::finish_success(
                &pb,
                &format!(
                    "Fetched {} and {}",
                    ui::count(fetched.0.len(), "monitor"),
                    ui::count(fetched.1.len(), "SQL test")
                ),
            );
            fetched
        }
        Err(e) => {
            progress::finish_error(&pb, "Failed to fetch current state");
            return Err(e);
        }
    };

    let monitor_changes = reconcile(&namespace, &plan.monitors, &actual_monitors)?;
    let test_changes = reconcile(&namespace, &plan.tests, &actual_tests)?;

    execute(backend, &monitor_changes, &test_changes, opts)
}

/// Replace every monitored path with its canonical form
fn resolve_paths<B: Backend + ?Sized>(backend: &B, plan: &mut NamespacePlan) -> Result<()> {
    let mut inputs: Vec<String> = Vec::new();
    let written = plan
        .monitors
        .iter()
        .map(Entity::monitored_path)
        .chain(plan.tests.iter().map(Entity::monitored_path));
    for path in written {
        if !inputs.iter().any(|p| p == path) {
            inputs.push(path.to_string());
        }
    }

    log::debug!("Resolving {} entity paths", inputs.len());
    let resolved = PathResolver::new(backend)
        .resolve(&inputs)
        .context("Failed to resolve entity paths")?;

    rewrite_paths(&mut plan.monitors, &resolved);
    rewrite_paths(&mut plan.tests, &resolved);
    Ok(())
}

fn rewrite_paths<T: Entity>(entities: &mut [T], resolved: &HashMap<String, String>) {
    for entity in entities {
        if let Some(canonical) = resolved.get(entity.monitored_path()) {
            let canonical = canonical.clone();
            entity.set_monitored_path(canonical);
        }
    }
}

type Fetched = (
    HashMap<String, MonitorDescriptor>,
    HashMap<String, TestDescriptor>,
);

/// Remote state for the namespace plus any desired id that lives elsewhere
fn fetch_remote<B: Backend + ?Sized>(backend: &B, plan: &NamespacePlan) -> Result<Fetched> {
    let mut monitors = backend
        .fetch_monitors_by_namespace(&plan.namespace)
        .context("Failed to list monitors")?;
    let elsewhere = missing_ids(&plan.monitors, &monitors);
    monitors.extend(
        backend
            .fetch_monitors_by_ids(&elsewhere)
            .context("Failed to fetch monitors by id")?,
    );

    let mut tests = backend
        .fetch_tests_by_namespace(&plan.namespace)
        .context("Failed to list SQL tests")?;
    let elsewhere = missing_ids(&plan.tests, &tests);
    tests.extend(
        backend
            .fetch_tests_by_ids(&elsewhere)
            .context("Failed to fetch SQL tests by id")?,
    );

    log::debug!(
        "Namespace '{}': {} remote monitors, {} remote SQL tests",
        plan.namespace,
        monitors.len(),
        tests.len()
    );
    Ok((monitors, tests))
}

fn missing_ids<T: Entity>(desired: &[T], fetched: &HashMap<String, T>) -> Vec<String> {
    desired
        .iter()
        .map(Entity::id)
        .filter(|id| !fetched.contains_key(*id))
        .map(String::from)
        .collect()
}

#[derive(Serialize)]
struct Payload<'a> {
    namespace: &'a str,
    monitors: &'a [MonitorDescriptor],
    tests: &'a [TestDescriptor],
}

fn print_plan(plan: &NamespacePlan) -> Result<()> {
    let payload = Payload {
        namespace: &plan.namespace,
        monitors: &plan.monitors,
        tests: &plan.tests,
    };
    let json = serde_json::to_string_pretty(&payload).context("Failed to serialize payload")?;
    println!("{json}");
    Ok(())
}
