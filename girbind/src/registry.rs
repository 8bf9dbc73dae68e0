//! Type registry — flat lookup table over every loaded namespace.
//!
//! Built once from the resolved namespaces, then used by the type mapper for
//! cross-namespace resolution and rename policy.

use std::collections::HashMap;

use tracing::debug;

use crate::model::Namespace;

/// The kind of a registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Record,
    Enum,
    Flags,
    Callback,
}

/// A single registry entry, keyed by qualified name.
#[derive(Debug, Clone)]
pub struct TypeEntry {
    pub namespace: String,
    pub name: String,
    pub kind: TypeKind,
    /// The name used on the generated surface — usually `name`, except for
    /// the fixed ecosystem-collision renames.
    pub transformed_name: String,
    pub glib_type_name: Option<String>,
}

/// GObject internal plumbing struct suffixes — records with these names are
/// never bound.
const PLUMBING_SUFFIXES: &[&str] = &["Class", "Private", "Iface"];

/// Flat `Namespace.Name` → entry table.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    entries: HashMap<String, TypeEntry>,
}

impl TypeRegistry {
    /// Build the registry from the full set of resolved namespaces. Maps
    /// every class, interface, enum, bitfield and qualifying record (has a
    /// GLib type name, is not disguised, and is not internal plumbing).
    pub fn from_namespaces<'a>(namespaces: impl IntoIterator<Item = &'a Namespace>) -> Self {
        let mut registry = TypeRegistry::default();
        for ns in namespaces {
            for class in ns.classes.values() {
                registry.register(
                    &ns.name,
                    &class.name,
                    TypeKind::Class,
                    class.glib_type_name.clone(),
                );
            }
            for iface in ns.interfaces.values() {
                registry.register(
                    &ns.name,
                    &iface.name,
                    TypeKind::Interface,
                    iface.glib_type_name.clone(),
                );
            }
            for en in ns.enums.values() {
                registry.register(&ns.name, &en.name, TypeKind::Enum, en.glib_type_name.clone());
            }
            for bf in ns.bitfields.values() {
                registry.register(&ns.name, &bf.name, TypeKind::Flags, bf.glib_type_name.clone());
            }
            for record in ns.records.values() {
                if record.glib_type_name.is_none()
                    || record.disguised
                    || PLUMBING_SUFFIXES.iter().any(|s| record.name.ends_with(s))
                {
                    continue;
                }
                registry.register(
                    &ns.name,
                    &record.name,
                    TypeKind::Record,
                    record.glib_type_name.clone(),
                );
            }
            for cb in ns.callbacks.values() {
                registry.register(&ns.name, &cb.name, TypeKind::Callback, None);
            }
        }
        debug!(types = registry.entries.len(), "built type registry");
        registry
    }

    fn register(
        &mut self,
        namespace: &str,
        name: &str,
        kind: TypeKind,
        glib_type_name: Option<String>,
    ) {
        let qualified = format!("{namespace}.{name}");
        let entry = TypeEntry {
            namespace: namespace.to_string(),
            name: name.to_string(),
            kind,
            transformed_name: transformed_name(namespace, name),
            glib_type_name,
        };
        self.entries.insert(qualified, entry);
    }

    /// Exact qualified-name lookup.
    pub fn resolve(&self, qualified: &str) -> Option<&TypeEntry> {
        self.entries.get(qualified)
    }

    /// Resolve `name` from the viewpoint of `context_namespace`: first try it
    /// as already-qualified, else qualify with the context. Lets type-mapper
    /// code written against one namespace's unqualified names still resolve
    /// imported types.
    pub fn resolve_in_namespace(&self, name: &str, context_namespace: &str) -> Option<&TypeEntry> {
        if let Some(entry) = self.entries.get(name) {
            return Some(entry);
        }
        self.entries.get(&format!("{context_namespace}.{name}"))
    }
}

/// Fixed renames for ecosystem collisions: the wrapper conventions used on
/// the generated surface already claim these names.
fn transformed_name(namespace: &str, name: &str) -> String {
    match (namespace, name) {
        ("GObject", "Object") => "GObject".to_string(),
        ("GLib", "Error") => "GError".to_string(),
        _ => name.to_string(),
    }
}
