//! girbind — GIR → TypeScript binding generator.
//!
//! Parses GObject-Introspection XML and emits strongly-typed TypeScript
//! classes that call into a native library through a fixed FFI runtime
//! contract, plus per-widget metadata tables for a separate UI-binding
//! layer.
//!
//! # Quick start
//!
//! Generate bindings from a config (suitable for a build script):
//!
//! ```no_run
//! use std::path::Path;
//!
//! // Reads girbind.toml, loads the GIR files, writes the .ts files.
//! girbind::run(Path::new("girbind.toml"), None).unwrap();
//! ```
//!
//! Or get the generated sources without writing to disk:
//!
//! ```no_run
//! use std::path::Path;
//!
//! let (namespaces, report) = girbind::generate(Path::new("girbind.toml")).unwrap();
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

pub mod config;
pub mod context;
pub mod generators;
pub mod mapper;
pub mod model;
pub mod naming;
pub mod parser;
pub mod registry;
pub mod repository;
pub mod writers;

use generators::GeneratedFile;
use generators::class::{ClassGenerator, GenOptions};
use generators::enums::generate_enums_file;
use generators::interfaces::InterfaceGenerator;
use generators::meta::WidgetMeta;
use generators::records::RecordGenerator;
use mapper::TypeMapper;
use model::{Class, Namespace, TypeRef};
use registry::TypeRegistry;
use repository::Repository;

/// Everything generated for one namespace.
#[derive(Debug)]
pub struct GeneratedNamespace {
    pub name: String,
    pub files: Vec<GeneratedFile>,
    pub widget_metas: Vec<WidgetMeta>,
}

/// Per-class/record outcome surfaced to the caller — a failed unit is
/// omitted from output without aborting the batch.
#[derive(Debug)]
pub struct UnitReport {
    pub qualified_name: String,
    pub success: bool,
    pub reason: Option<String>,
}

/// Aggregate result of a generation run.
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub units: Vec<UnitReport>,
    pub unknown_types: Vec<UnresolvedTypeRef>,
}

impl GenerationReport {
    pub fn failed_units(&self) -> impl Iterator<Item = &UnitReport> {
        self.units.iter().filter(|u| !u.success)
    }
}

/// A single unresolvable type reference with context about where it was
/// found.
#[derive(Debug, Clone)]
pub struct UnresolvedTypeRef {
    pub type_name: String,
    pub namespace: String,
    pub context: String,
}

/// Run the full pipeline: load config, load GIR files, generate every
/// enabled namespace, and write the output tree.
///
/// `config_path` is the path to a `girbind.toml` configuration file.
/// `output` optionally overrides the output directory from the config.
pub fn run(config_path: &Path, output: Option<&Path>) -> Result<GenerationReport> {
    let cfg = config::load_config(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let (namespaces, report) = generate_from_config(&cfg, base_dir)?;

    let out_dir = match output {
        Some(p) => p.to_path_buf(),
        None => base_dir.join(&cfg.output.dir),
    };
    for ns in &namespaces {
        let ns_dir = out_dir.join(ns.name.to_lowercase());
        std::fs::create_dir_all(&ns_dir)
            .with_context(|| format!("creating output dir {}", ns_dir.display()))?;
        for file in &ns.files {
            let path = ns_dir.join(&file.file_name);
            std::fs::write(&path, &file.source)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        info!(
            namespace = %ns.name,
            files = ns.files.len(),
            widgets = ns.widget_metas.len(),
            dir = %ns_dir.display(),
            "wrote namespace"
        );
    }

    Ok(report)
}

/// Parse a `girbind.toml` config file, load the referenced GIR documents,
/// and return the generated namespaces without writing to disk.
pub fn generate(config_path: &Path) -> Result<(Vec<GeneratedNamespace>, GenerationReport)> {
    let cfg = config::load_config(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    generate_from_config(&cfg, base_dir)
}

/// Generate from an already-loaded [`config::Config`].
///
/// `base_dir` is the directory relative to which GIR paths in the config
/// are resolved (typically the parent directory of the TOML file).
pub fn generate_from_config(
    cfg: &config::Config,
    base_dir: &Path,
) -> Result<(Vec<GeneratedNamespace>, GenerationReport)> {
    info!(
        namespaces = cfg.namespaces.len(),
        widget_root = %cfg.widget_root,
        "loaded configuration"
    );

    let mut repo = Repository::new();
    let mut enabled: Vec<String> = Vec::new();
    for ns_cfg in &cfg.namespaces {
        let path = config::resolve_gir(&ns_cfg.gir, base_dir, &cfg.include_paths);
        let xml = std::fs::read_to_string(&path)
            .with_context(|| format!("reading GIR file {}", path.display()))?;
        let name = repo
            .load_from_xml(&xml)
            .with_context(|| format!("parsing GIR file {}", path.display()))?;
        if ns_cfg.generate {
            enabled.push(name);
        }
    }
    repo.resolve()?;

    let registry = TypeRegistry::from_namespaces(repo.namespaces());

    // Fail-open audit: unresolvable references degrade to the generic
    // gobject mapping, but each one is surfaced here so incomplete GIR sets
    // are diagnosable.
    let unknown_types = audit_unknown_types(&repo, &registry)?;
    report_unknown_types(&unknown_types);

    let libraries: BTreeMap<String, String> = repo
        .namespaces()
        .filter_map(|ns| Some((ns.name.clone(), ns.shared_library.clone()?)))
        .collect();

    let opts = GenOptions {
        runtime_module: cfg.output.runtime.clone(),
        glib_library: cfg.glib_library.clone(),
        widget_root: cfg.widget_root.clone(),
    };

    let mut report = GenerationReport {
        unknown_types,
        ..Default::default()
    };
    let mut generated = Vec::new();
    for ns in repo.namespaces() {
        if !enabled.iter().any(|e| e == &ns.name) {
            continue;
        }
        let unit = generate_namespace(&repo, &registry, ns, &libraries, &opts, &mut report)?;
        generated.push(unit);
    }

    let failures = report.failed_units().count();
    info!(
        namespaces = generated.len(),
        units = report.units.len(),
        failures,
        "generation complete"
    );

    Ok((generated, report))
}

/// Generate every output unit for one namespace.
fn generate_namespace(
    repo: &Repository,
    registry: &TypeRegistry,
    ns: &Namespace,
    libraries: &BTreeMap<String, String>,
    opts: &GenOptions,
    report: &mut GenerationReport,
) -> Result<GeneratedNamespace> {
    let mut mapper = TypeMapper::new(
        registry,
        &ns.name,
        ns.shared_library.clone(),
        libraries.clone(),
    );
    for en in ns.enums.values() {
        mapper.register_enum(&en.name);
    }
    for bf in ns.bitfields.values() {
        mapper.register_enum(&bf.name);
    }
    for record in ns.records.values() {
        if let Some(entry) = registry.resolve(&record.qualified_name) {
            mapper.register_record(
                &record.name,
                &entry.transformed_name,
                record
                    .glib_type_name
                    .as_deref()
                    .unwrap_or(record.name.as_str()),
            );
        }
    }

    let mut files: Vec<GeneratedFile> = Vec::new();
    let mut widget_metas: Vec<WidgetMeta> = Vec::new();

    if let Some(file) = generate_enums_file(ns) {
        files.push(file);
    }

    let record_gen = RecordGenerator::new(registry, &mapper, opts);
    for record in ns.records.values() {
        if registry.resolve(&record.qualified_name).is_none() {
            continue;
        }
        let result = record_gen.generate(ns, record)?;
        report.units.push(UnitReport {
            qualified_name: record.qualified_name.clone(),
            success: result.success,
            reason: result.skip_reason,
        });
        files.extend(result.file);
    }

    let iface_gen = InterfaceGenerator::new(&mapper, opts);
    for iface in ns.interfaces.values() {
        files.push(iface_gen.generate(ns, iface)?);
    }

    let class_gen = ClassGenerator::new(repo, registry, &mapper, opts);
    for class in ns.classes.values() {
        let result = class_gen.generate(ns, class)?;
        report.units.push(UnitReport {
            qualified_name: class.qualified_name.clone(),
            success: result.success,
            reason: result.skip_reason,
        });
        files.extend(result.file);
        widget_metas.extend(result.widget_meta);
    }

    if let Some(file) = generate_widget_meta_file(&widget_metas, opts) {
        files.push(file);
    }
    let index = generate_index_file(&files);
    files.push(index);

    info!(
        namespace = %ns.name,
        files = files.len(),
        widgets = widget_metas.len(),
        "generated namespace"
    );

    Ok(GeneratedNamespace {
        name: ns.name.clone(),
        files,
        widget_metas,
    })
}

/// The aggregated widget-metadata table for the UI-binding layer.
fn generate_widget_meta_file(metas: &[WidgetMeta], opts: &GenOptions) -> Option<GeneratedFile> {
    if metas.is_empty() {
        return None;
    }
    let mut source = format!(
        "import type {{ RuntimeWidgetMeta }} from \"{}\";\n\n",
        opts.runtime_module
    );
    source.push_str("export const WIDGET_METAS: RuntimeWidgetMeta[] = [\n");
    for meta in metas {
        source.push_str(&format!("  {},\n", meta.to_ts_literal("  ")));
    }
    source.push_str("];\n");
    Some(GeneratedFile {
        file_name: "widget-meta.ts".to_string(),
        source,
    })
}

/// The namespace index re-exporting every emitted module.
fn generate_index_file(files: &[GeneratedFile]) -> GeneratedFile {
    let mut source = String::new();
    for file in files {
        let stem = file.file_name.trim_end_matches(".ts");
        source.push_str(&format!("export * from \"./{stem}.js\";\n"));
    }
    GeneratedFile {
        file_name: "index.ts".to_string(),
        source,
    }
}

// ---------------------------------------------------------------------------
// Unknown-type audit
// ---------------------------------------------------------------------------

/// Walk every field/parameter/return type across all resolved namespaces
/// and collect references that neither the intrinsic table nor the registry
/// can resolve. Never fatal — the mapper degrades these to a generic
/// gobject descriptor — but surfaced so incomplete GIR sets are visible.
pub fn audit_unknown_types(
    repo: &Repository,
    registry: &TypeRegistry,
) -> Result<Vec<UnresolvedTypeRef>> {
    let mut unresolved = Vec::new();

    for ns in repo.namespaces() {
        for class in ns.classes.values() {
            audit_class(ns, class, registry, &mut unresolved);
        }
        for record in ns.records.values() {
            for method in &record.methods {
                audit_callable(
                    ns,
                    &method.return_type,
                    &method.parameters.iter().map(|p| &p.ty).collect::<Vec<_>>(),
                    registry,
                    &format!("method `{}` on record `{}`", method.name, record.qualified_name),
                    &mut unresolved,
                );
            }
        }
        for function in ns.functions.values() {
            audit_callable(
                ns,
                &function.return_type,
                &function.parameters.iter().map(|p| &p.ty).collect::<Vec<_>>(),
                registry,
                &format!("function `{}.{}`", ns.name, function.name),
                &mut unresolved,
            );
        }
    }

    Ok(unresolved)
}

fn audit_class(
    ns: &Namespace,
    class: &Class,
    registry: &TypeRegistry,
    out: &mut Vec<UnresolvedTypeRef>,
) {
    for method in &class.methods {
        audit_callable(
            ns,
            &method.return_type,
            &method.parameters.iter().map(|p| &p.ty).collect::<Vec<_>>(),
            registry,
            &format!("method `{}` on class `{}`", method.name, class.qualified_name),
            out,
        );
    }
    for ctor in &class.constructors {
        audit_callable(
            ns,
            &ctor.return_type,
            &ctor.parameters.iter().map(|p| &p.ty).collect::<Vec<_>>(),
            registry,
            &format!(
                "constructor `{}` on class `{}`",
                ctor.name, class.qualified_name
            ),
            out,
        );
    }
    for field in &class.fields {
        collect_unresolved(
            ns,
            &field.ty,
            registry,
            &format!("field `{}` of class `{}`", field.name, class.qualified_name),
            out,
        );
    }
}

fn audit_callable(
    ns: &Namespace,
    return_type: &TypeRef,
    param_types: &[&TypeRef],
    registry: &TypeRegistry,
    context: &str,
    out: &mut Vec<UnresolvedTypeRef>,
) {
    collect_unresolved(ns, return_type, registry, &format!("return type of {context}"), out);
    for ty in param_types {
        collect_unresolved(ns, ty, registry, context, out);
    }
}

/// Recursively walk a type reference and collect unresolvable names.
fn collect_unresolved(
    ns: &Namespace,
    ty: &TypeRef,
    registry: &TypeRegistry,
    context: &str,
    out: &mut Vec<UnresolvedTypeRef>,
) {
    if ty.is_array {
        if let Some(element) = &ty.element {
            collect_unresolved(ns, element, registry, context, out);
        }
        return;
    }
    if ty.is_intrinsic() {
        return;
    }
    if registry.resolve_in_namespace(&ty.name, &ns.name).is_none() {
        out.push(UnresolvedTypeRef {
            type_name: ty.name.clone(),
            namespace: ns.name.clone(),
            context: context.to_string(),
        });
    }
}

/// Deduplicate by type name for a concise summary, keeping the first usage
/// context for each name.
fn report_unknown_types(unresolved: &[UnresolvedTypeRef]) {
    let mut seen = std::collections::HashSet::new();
    for r in unresolved {
        if seen.insert(&r.type_name) {
            warn!(
                type_name = %r.type_name,
                namespace = %r.namespace,
                context = %r.context,
                "unresolved type reference, mapping as generic gobject"
            );
        }
    }
}

