//! Imports builder — a pure function of a fully-populated
//! [`GenerationContext`] plus file identity, emitting exactly the imports
//! the generated file actually uses.
//!
//! Every category is independently gated by a context flag or set, output
//! is alphabetically sorted within each category, and the class currently
//! being generated is never imported by its own name — the self-exclusion
//! invariant holds uniformly across every category.

use std::collections::BTreeSet;

use crate::context::GenerationContext;
use crate::naming;

/// Identity of the file being generated, for self/parent exclusion.
#[derive(Debug, Clone)]
pub struct FileIdentity<'a> {
    /// Generated (transformed) type name of this file's class.
    pub type_name: &'a str,
    pub namespace: &'a str,
    pub parent: Option<ParentRef>,
}

/// The generated class's parent, by transformed name and namespace.
#[derive(Debug, Clone)]
pub struct ParentRef {
    pub name: String,
    pub namespace: String,
}

/// Synthesize the complete import block. `runtime_module` is the module
/// specifier the fixed runtime contract is imported from.
pub fn build_imports(
    ctx: &GenerationContext,
    identity: &FileIdentity,
    runtime_module: &str,
) -> String {
    let mut lines: Vec<String> = Vec::new();
    let not_self = |name: &str| name != identity.type_name;

    // Runtime value imports.
    let mut runtime_values: Vec<&str> = Vec::new();
    if ctx.uses_alloc {
        runtime_values.push("alloc");
    }
    if ctx.uses_call {
        runtime_values.push("call");
    }
    if ctx.uses_get_native_class {
        runtime_values.push("getNativeClass");
    }
    if ctx.uses_get_native_object {
        runtime_values.push("getNativeObject");
    }
    if ctx.uses_native_error {
        runtime_values.push("NativeError");
    }
    if ctx.uses_native_object {
        runtime_values.push("NativeObject");
    }
    if ctx.uses_param_spec {
        runtime_values.push("ParamSpec");
    }
    if ctx.uses_read {
        runtime_values.push("read");
    }
    if ctx.uses_register_native_class {
        runtime_values.push("registerNativeClass");
    }
    if ctx.uses_resolve_signal_meta {
        runtime_values.push("resolveSignalMeta");
    }
    if ctx.uses_type {
        runtime_values.push("Type");
    }
    if ctx.uses_variant {
        runtime_values.push("Variant");
    }
    if ctx.uses_write {
        runtime_values.push("write");
    }
    runtime_values.sort_by_key(|s| s.to_ascii_lowercase());
    if !runtime_values.is_empty() {
        lines.push(format!(
            "import {{ {} }} from \"{runtime_module}\";",
            runtime_values.join(", ")
        ));
    }

    // Runtime type-only imports.
    let mut runtime_types: Vec<&str> = Vec::new();
    if ctx.uses_ref {
        runtime_types.push("Ref");
    }
    if ctx.uses_runtime_widget_meta {
        runtime_types.push("RuntimeWidgetMeta");
    }
    runtime_types.sort_by_key(|s| s.to_ascii_lowercase());
    if !runtime_types.is_empty() {
        lines.push(format!(
            "import type {{ {} }} from \"{runtime_module}\";",
            runtime_types.join(", ")
        ));
    }

    // Enum imports — always from ./enums.js, one grouped line.
    let enums: Vec<&String> = ctx.used_enums.iter().filter(|n| not_self(n)).collect();
    if !enums.is_empty() {
        let names: Vec<&str> = enums.iter().map(|s| s.as_str()).collect();
        lines.push(format!(
            "import {{ {} }} from \"./enums.js\";",
            names.join(", ")
        ));
    }

    // Record imports — kebab-case files, honoring explicit overrides.
    for record in ctx.used_records.iter().filter(|n| not_self(n)) {
        let path = match ctx.record_name_to_file.get(record) {
            Some(stem) => format!("./{stem}.js"),
            None => naming::module_path(record),
        };
        lines.push(format!("import {{ {record} }} from \"{path}\";"));
    }

    // Interface imports (type-only — interfaces have no runtime value).
    for (iface, path) in ctx.used_interfaces.iter().filter(|(n, _)| not_self(n)) {
        lines.push(format!("import type {{ {iface} }} from \"{path}\";"));
    }

    // Parent class import — only when the parent lives in this namespace;
    // a foreign parent is reached through its namespace import instead.
    let mut parent_name_local: Option<&str> = None;
    if let Some(parent) = &identity.parent {
        if parent.namespace == identity.namespace {
            parent_name_local = Some(parent.name.as_str());
            if not_self(&parent.name) {
                lines.push(format!(
                    "import {{ {} }} from \"{}\";",
                    parent.name,
                    naming::module_path(&parent.name)
                ));
            }
        }
    }

    // Sibling same-namespace class imports — excluding this class, the
    // parent, and anything a signal-class import already covers.
    let excluded: BTreeSet<&str> = ctx
        .signal_classes
        .iter()
        .map(String::as_str)
        .chain(parent_name_local)
        .collect();
    for class in ctx
        .used_same_namespace_classes
        .iter()
        .filter(|n| not_self(n) && !excluded.contains(n.as_str()))
    {
        lines.push(format!(
            "import {{ {class} }} from \"{}\";",
            naming::module_path(class)
        ));
    }

    // Signal-class imports.
    for class in ctx
        .signal_classes
        .iter()
        .filter(|n| not_self(n) && parent_name_local != Some(n.as_str()))
    {
        lines.push(format!(
            "import {{ {class} }} from \"{}\";",
            naming::module_path(class)
        ));
    }

    // Namespace imports for every distinct foreign namespace referenced,
    // plus the conditionally-added Gio/GObject namespaces.
    let mut foreign: BTreeSet<&str> = ctx
        .used_external_types
        .values()
        .map(|e| e.namespace.as_str())
        .collect();
    if let Some(parent) = &identity.parent {
        if parent.namespace != identity.namespace {
            foreign.insert(parent.namespace.as_str());
        }
    }
    if ctx.uses_gio_namespace {
        foreign.insert("Gio");
    }
    if ctx.uses_gobject_namespace {
        foreign.insert("GObject");
    }
    for ns in foreign {
        if ns == identity.namespace {
            continue;
        }
        lines.push(format!(
            "import * as {ns} from \"../{}/index.js\";",
            ns.to_lowercase()
        ));
    }

    if lines.is_empty() {
        String::new()
    } else {
        lines.join("\n") + "\n"
    }
}
