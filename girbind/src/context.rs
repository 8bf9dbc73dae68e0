//! Per-file generation context — the accumulator every writer feeds while
//! building structures, read exactly once at the end by the imports builder.
//!
//! One instance exists per class-generation unit. All flags and collections
//! are monotonic within a unit: only ever set true or added to, never
//! cleared.

use std::collections::{BTreeMap, BTreeSet};

use crate::mapper::{ExternalType, FfiType, MappedKind, MappedType};

/// Usage flags plus used-name collections for one generated file.
#[derive(Debug, Default)]
pub struct GenerationContext {
    // Runtime helper usage flags.
    pub uses_call: bool,
    pub uses_ref: bool,
    pub uses_alloc: bool,
    pub uses_read: bool,
    pub uses_write: bool,
    pub uses_type: bool,
    pub uses_native_error: bool,
    pub uses_get_native_object: bool,
    pub uses_native_object: bool,
    pub uses_register_native_class: bool,
    pub uses_get_native_class: bool,
    pub uses_resolve_signal_meta: bool,
    pub uses_runtime_widget_meta: bool,
    pub uses_variant: bool,
    pub uses_param_spec: bool,
    // Always-conditional namespace imports.
    pub uses_gio_namespace: bool,
    pub uses_gobject_namespace: bool,

    /// Locally-defined enums referenced by this file (imported from
    /// `./enums.js`).
    pub used_enums: BTreeSet<String>,
    /// Locally-defined records referenced by this file.
    pub used_records: BTreeSet<String>,
    /// Interface name → module path.
    pub used_interfaces: BTreeMap<String, String>,
    /// Same-namespace classes referenced outside of signals.
    pub used_same_namespace_classes: BTreeSet<String>,
    /// Same-namespace classes referenced from signal signatures.
    pub signal_classes: BTreeSet<String>,
    /// Qualified name → external type, for foreign-namespace imports.
    pub used_external_types: BTreeMap<String, ExternalType>,
    /// Overrides for record module files (record name → file stem).
    pub record_name_to_file: BTreeMap<String, String>,
    /// GIR name → generated name, for members whose name changed.
    pub method_renames: BTreeMap<String, String>,
}

impl GenerationContext {
    pub fn new() -> Self {
        GenerationContext::default()
    }

    /// Record every import-relevant aspect of a mapped type: which local
    /// enums/records/interfaces/classes it references, which foreign
    /// namespaces, and which runtime wrappers.
    pub fn note_type(&mut self, mapped: &MappedType) {
        self.note_ffi(&mapped.ffi);

        if let Some(external) = &mapped.external_type {
            let qualified = format!("{}.{}", external.namespace, external.name);
            self.used_external_types
                .entry(qualified)
                .or_insert_with(|| external.clone());
            return;
        }

        match mapped.kind {
            Some(MappedKind::Enum) | Some(MappedKind::Flags) => {
                self.used_enums.insert(base_type_name(&mapped.ts));
            }
            Some(MappedKind::Record) => {
                self.used_records.insert(base_type_name(&mapped.ts));
            }
            Some(MappedKind::Interface) => {
                let name = base_type_name(&mapped.ts);
                let path = crate::naming::module_path(&name);
                self.used_interfaces.insert(name, path);
            }
            Some(MappedKind::Class) => {
                self.used_same_namespace_classes
                    .insert(base_type_name(&mapped.ts));
            }
            _ => {}
        }
    }

    /// Like [`note_type`](Self::note_type) but attributes class references
    /// to signal signatures, which import separately.
    pub fn note_signal_type(&mut self, mapped: &MappedType) {
        if mapped.external_type.is_none() && mapped.kind == Some(MappedKind::Class) {
            self.note_ffi(&mapped.ffi);
            self.signal_classes.insert(base_type_name(&mapped.ts));
            return;
        }
        self.note_type(mapped);
    }

    fn note_ffi(&mut self, ffi: &FfiType) {
        match ffi {
            FfiType::Ref { inner } => {
                self.uses_ref = true;
                self.note_ffi(inner);
            }
            FfiType::Array { item: Some(item), .. } => self.note_ffi(item),
            FfiType::GVariant { .. } => self.uses_variant = true,
            FfiType::GParam { .. } => self.uses_param_spec = true,
            _ => {}
        }
    }
}

/// Strip `Ref<...>` and array suffixes off a TypeScript type string, leaving
/// the bare referenced type name.
fn base_type_name(ts: &str) -> String {
    let mut s = ts;
    if let Some(inner) = s.strip_prefix("Ref<").and_then(|r| r.strip_suffix('>')) {
        s = inner;
    }
    s.trim_end_matches("[]").to_string()
}
