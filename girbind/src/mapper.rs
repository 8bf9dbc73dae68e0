//! Type mapper — GIR type descriptors → TypeScript types plus FFI
//! call-argument descriptors.
//!
//! Pure mapping: no side effects beyond the mapper's own registration state
//! (which identifiers the current namespace's generator considers locally
//! defined). Unknown types map fail-open to a generic gobject descriptor,
//! tagged [`MappedKind::Unknown`] so consumers can audit without losing the
//! information.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::model::{Parameter, Transfer, TypeRef};
use crate::registry::{TypeKind, TypeRegistry};

/// GIR `transfer-ownership` as it appears in emitted FFI descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ownership {
    #[default]
    Full,
    None,
    Container,
}

impl Ownership {
    pub fn as_str(self) -> &'static str {
        match self {
            Ownership::Full => "full",
            Ownership::None => "none",
            Ownership::Container => "container",
        }
    }
}

impl From<Transfer> for Ownership {
    fn from(t: Transfer) -> Self {
        match t {
            Transfer::Full => Ownership::Full,
            Transfer::None => Ownership::None,
            Transfer::Container => Ownership::Container,
        }
    }
}

/// Backing collection kind for array descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListType {
    #[default]
    Array,
    GList,
    GSList,
    PtrArray,
}

impl ListType {
    pub fn as_str(self) -> &'static str {
        match self {
            ListType::Array => "array",
            ListType::GList => "glist",
            ListType::GSList => "gslist",
            ListType::PtrArray => "ptrarray",
        }
    }
}

/// The FFI type descriptor emitted into generated call sites — a tagged
/// union matching the runtime's marshalling contract exactly.
#[derive(Debug, Clone, PartialEq)]
pub enum FfiType {
    Undefined,
    Null,
    Boolean,
    Int {
        size: u8,
        unsigned: bool,
    },
    Float {
        size: u8,
    },
    String {
        ownership: Ownership,
    },
    GObject {
        ownership: Ownership,
    },
    GParam {
        ownership: Ownership,
    },
    GVariant {
        ownership: Ownership,
    },
    Boxed {
        ownership: Ownership,
        inner_type: String,
        lib: Option<String>,
        get_type_fn: Option<String>,
    },
    Struct {
        ownership: Ownership,
        inner_type: String,
    },
    /// Out/inout wrapper.
    Ref {
        inner: Box<FfiType>,
    },
    Array {
        item: Option<Box<FfiType>>,
        list_type: ListType,
        ownership: Ownership,
    },
    Callback {
        trampoline: String,
    },
    /// The promise-style async-ready callback.
    AsyncCallback,
}

impl FfiType {
    pub fn int32() -> FfiType {
        FfiType::Int {
            size: 32,
            unsigned: false,
        }
    }

    pub fn uint64() -> FfiType {
        FfiType::Int {
            size: 64,
            unsigned: true,
        }
    }

    /// Boxed descriptor constructor. A GVariant inner type collapses into
    /// the dedicated `gvariant` variant rather than a generic boxed.
    pub fn boxed(
        ownership: Ownership,
        inner_type: impl Into<String>,
        lib: Option<String>,
        get_type_fn: Option<String>,
    ) -> FfiType {
        let inner_type = inner_type.into();
        if inner_type == "GVariant" {
            return FfiType::GVariant { ownership };
        }
        FfiType::Boxed {
            ownership,
            inner_type,
            lib,
            get_type_fn,
        }
    }

    /// Apply a transfer ownership to the descriptor, where it carries one.
    pub fn with_ownership(self, ownership: Ownership) -> FfiType {
        match self {
            FfiType::String { .. } => FfiType::String { ownership },
            FfiType::GObject { .. } => FfiType::GObject { ownership },
            FfiType::GParam { .. } => FfiType::GParam { ownership },
            FfiType::GVariant { .. } => FfiType::GVariant { ownership },
            FfiType::Boxed {
                inner_type,
                lib,
                get_type_fn,
                ..
            } => FfiType::Boxed {
                ownership,
                inner_type,
                lib,
                get_type_fn,
            },
            FfiType::Struct { inner_type, .. } => FfiType::Struct {
                ownership,
                inner_type,
            },
            FfiType::Array { item, list_type, .. } => FfiType::Array {
                item,
                list_type,
                ownership,
            },
            other => other,
        }
    }
}

/// What the mapped type resolved to — preserved so downstream consumers can
/// distinguish genuinely-resolved gobject types from the fail-open unknown
/// mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedKind {
    Intrinsic,
    Enum,
    Flags,
    Record,
    Class,
    Interface,
    Callback,
    Unknown,
}

/// A type living in a foreign namespace, referenced through a namespace
/// import on the generated surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalType {
    pub namespace: String,
    pub name: String,
}

/// The pivot value produced once per GIR type and consumed by every writer.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedType {
    /// The TypeScript-facing type string.
    pub ts: String,
    pub ffi: FfiType,
    pub external_type: Option<ExternalType>,
    pub kind: Option<MappedKind>,
}

impl MappedType {
    fn new(ts: impl Into<String>, ffi: FfiType, kind: MappedKind) -> Self {
        MappedType {
            ts: ts.into(),
            ffi,
            external_type: None,
            kind: Some(kind),
        }
    }

    /// The returned native handle needs a gobject wrapper. Mutually
    /// exclusive with the other scalar wrap strategies.
    pub fn needs_gobject_wrap(&self) -> bool {
        matches!(self.ffi, FfiType::GObject { .. }) && self.kind != Some(MappedKind::Interface)
    }

    pub fn needs_interface_wrap(&self) -> bool {
        matches!(self.ffi, FfiType::GObject { .. }) && self.kind == Some(MappedKind::Interface)
    }

    pub fn needs_boxed_wrap(&self) -> bool {
        matches!(self.ffi, FfiType::Boxed { .. } | FfiType::Struct { .. })
    }

    pub fn needs_gvariant_wrap(&self) -> bool {
        matches!(self.ffi, FfiType::GVariant { .. })
    }

    /// Array whose items need wrapping; composes with any item kind.
    pub fn needs_array_item_wrap(&self) -> bool {
        match &self.ffi {
            FfiType::Array { item: Some(item), .. } => matches!(
                item.as_ref(),
                FfiType::GObject { .. }
                    | FfiType::Boxed { .. }
                    | FfiType::Struct { .. }
                    | FfiType::GVariant { .. }
            ),
            _ => false,
        }
    }
}

/// A locally-registered record — defined by the namespace currently being
/// generated, so references use the bare transformed name.
#[derive(Debug, Clone)]
struct LocalRecord {
    transformed_name: String,
    glib_type_name: String,
}

/// The single unsupported-callback signal: GLib.Closure-typed parameters
/// cannot be marshalled and cause the owning callable to be dropped.
pub fn is_unsupported_callback_type(ty: &TypeRef) -> bool {
    ty.name == "GObject.Closure" || ty.name == "GLib.Closure"
}

/// The async-ready callback type collapsed into promise-returning wrappers.
pub const ASYNC_READY_CALLBACK: &str = "Gio.AsyncReadyCallback";

/// GIR type descriptor → `{ts, ffi}` mapping engine, scoped to one
/// namespace's generation run.
pub struct TypeMapper<'r> {
    registry: &'r TypeRegistry,
    namespace: String,
    /// Shared library of the namespace being generated; lands in boxed
    /// descriptors for local records.
    shared_library: Option<String>,
    /// Namespace → shared library, for cross-namespace boxed `lib` hints.
    libraries: BTreeMap<String, String>,
    local_enums: BTreeSet<String>,
    local_records: BTreeMap<String, LocalRecord>,
}

impl<'r> TypeMapper<'r> {
    pub fn new(
        registry: &'r TypeRegistry,
        namespace: impl Into<String>,
        shared_library: Option<String>,
        libraries: BTreeMap<String, String>,
    ) -> Self {
        TypeMapper {
            registry,
            namespace: namespace.into(),
            shared_library,
            libraries,
            local_enums: BTreeSet::new(),
            local_records: BTreeMap::new(),
        }
    }

    /// Mark an enum/bitfield name as locally defined — references use the
    /// bare name instead of a namespace-qualified one.
    pub fn register_enum(&mut self, name: impl Into<String>) {
        self.local_enums.insert(name.into());
    }

    /// Mark a record as locally defined.
    pub fn register_record(
        &mut self,
        name: impl Into<String>,
        transformed_name: impl Into<String>,
        glib_type_name: impl Into<String>,
    ) {
        self.local_records.insert(
            name.into(),
            LocalRecord {
                transformed_name: transformed_name.into(),
                glib_type_name: glib_type_name.into(),
            },
        );
    }

    /// Map a GIR type descriptor. `is_return_borrowed` threads the
    /// `transfer-ownership="none"` return convention — it only affects
    /// gobject ownership.
    pub fn map_type(&self, ty: &TypeRef, is_return_borrowed: bool) -> MappedType {
        // 1. Void.
        if ty.is_void() {
            return MappedType::new("void", FfiType::Undefined, MappedKind::Intrinsic);
        }

        // 2. Arrays — recursive on the element type.
        if ty.is_array {
            if let Some(element) = &ty.element {
                let item = self.map_type(element, false);
                let list_type = match ty.name.as_str() {
                    "GLib.List" => ListType::GList,
                    "GLib.SList" => ListType::GSList,
                    "GLib.PtrArray" => ListType::PtrArray,
                    _ => ListType::Array,
                };
                return MappedType {
                    ts: format!("{}[]", item.ts),
                    ffi: FfiType::Array {
                        item: Some(Box::new(item.ffi.clone())),
                        list_type,
                        ownership: Ownership::Full,
                    },
                    external_type: item.external_type,
                    kind: item.kind,
                };
            }
        }

        // 3. Fixed intrinsic table.
        if let Some(mapped) = map_intrinsic(&ty.name) {
            return mapped;
        }

        let simple = ty.simple_name();
        let is_local = ty.namespace().is_none_or(|ns| ns == self.namespace);

        // 4. Locally-registered enum/record names.
        if is_local {
            if self.local_enums.contains(simple) {
                return MappedType::new(simple, FfiType::int32(), MappedKind::Enum);
            }
            if let Some(record) = self.local_records.get(simple) {
                return MappedType::new(
                    record.transformed_name.clone(),
                    FfiType::boxed(
                        Ownership::Full,
                        record.glib_type_name.clone(),
                        self.shared_library.clone(),
                        None,
                    ),
                    MappedKind::Record,
                );
            }
        }

        // 5. Cross-namespace resolution through the registry. Unknown types
        // map fail-open to a generic gobject so generation can proceed
        // against incomplete GIR metadata.
        let Some(entry) = self.registry.resolve_in_namespace(&ty.name, &self.namespace) else {
            trace!(name = %ty.name, "unknown type, mapping as generic gobject");
            return MappedType::new(
                "unknown",
                FfiType::GObject {
                    ownership: Ownership::Full,
                },
                MappedKind::Unknown,
            );
        };

        let foreign = entry.namespace != self.namespace;
        let ts = if foreign {
            format!("{}.{}", entry.namespace, entry.transformed_name)
        } else {
            entry.transformed_name.clone()
        };
        let external_type = foreign.then(|| ExternalType {
            namespace: entry.namespace.clone(),
            name: entry.transformed_name.clone(),
        });

        let mapped = match entry.kind {
            TypeKind::Class => MappedType {
                ts,
                ffi: FfiType::GObject {
                    ownership: if is_return_borrowed {
                        Ownership::None
                    } else {
                        Ownership::Full
                    },
                },
                external_type,
                kind: Some(MappedKind::Class),
            },
            TypeKind::Interface => MappedType {
                ts,
                ffi: FfiType::GObject {
                    ownership: if is_return_borrowed {
                        Ownership::None
                    } else {
                        Ownership::Full
                    },
                },
                external_type,
                kind: Some(MappedKind::Interface),
            },
            TypeKind::Enum | TypeKind::Flags => MappedType {
                ts,
                ffi: FfiType::int32(),
                external_type,
                kind: Some(if entry.kind == TypeKind::Enum {
                    MappedKind::Enum
                } else {
                    MappedKind::Flags
                }),
            },
            TypeKind::Record => {
                let lib = if foreign {
                    self.libraries.get(&entry.namespace).cloned()
                } else {
                    self.shared_library.clone()
                };
                MappedType {
                    ts,
                    ffi: FfiType::boxed(
                        Ownership::Full,
                        entry
                            .glib_type_name
                            .clone()
                            .unwrap_or_else(|| entry.name.clone()),
                        lib,
                        None,
                    ),
                    external_type,
                    kind: Some(MappedKind::Record),
                }
            }
            TypeKind::Callback => MappedType {
                ts: "(...args: unknown[]) => unknown".to_string(),
                ffi: FfiType::Callback {
                    trampoline: "closure".to_string(),
                },
                external_type,
                kind: Some(MappedKind::Callback),
            },
        };
        mapped
    }

    /// Map a parameter: applies the parameter's transfer ownership, wraps
    /// out/inout directions in a `ref` descriptor, and special-cases the
    /// async-ready callback.
    pub fn map_parameter(&self, param: &Parameter) -> MappedType {
        if param.ty.name == ASYNC_READY_CALLBACK {
            return MappedType {
                ts: "(sourceObject: unknown, result: number) => void".to_string(),
                ffi: FfiType::AsyncCallback,
                external_type: None,
                kind: None,
            };
        }

        let base = self.map_type(&param.ty, false);
        let ffi = base.ffi.with_ownership(param.transfer.into());

        if param.is_out() {
            return MappedType {
                ts: format!("Ref<{}>", base.ts),
                ffi: FfiType::Ref {
                    inner: Box::new(ffi),
                },
                external_type: base.external_type,
                kind: base.kind,
            };
        }

        MappedType { ffi, ..base }
    }

    /// GIR `nullable` and `optional` both surface as "caller may pass or
    /// receive null".
    pub fn is_nullable(param: &Parameter) -> bool {
        param.nullable || param.optional
    }

    /// Whether parameter `index` is referenced as another parameter's
    /// `closure` (user-data) target — excluded from generated signatures.
    pub fn is_closure_target(index: usize, params: &[Parameter]) -> bool {
        params.iter().any(|p| p.closure == Some(index))
    }

    /// Whether parameter `index` is referenced as another parameter's
    /// `destroy` (destroy-notify) target.
    pub fn is_destroy_target(index: usize, params: &[Parameter]) -> bool {
        params.iter().any(|p| p.destroy == Some(index))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn shared_library(&self) -> Option<&str> {
        self.shared_library.as_deref()
    }
}

/// The fixed intrinsic table — each entry has a context-independent
/// `{ts, ffi}` pair.
fn map_intrinsic(name: &str) -> Option<MappedType> {
    let mapped = match name {
        "gboolean" => MappedType::new("boolean", FfiType::Boolean, MappedKind::Intrinsic),
        "gint8" | "gchar" => MappedType::new(
            "number",
            FfiType::Int {
                size: 8,
                unsigned: false,
            },
            MappedKind::Intrinsic,
        ),
        "guint8" | "guchar" => MappedType::new(
            "number",
            FfiType::Int {
                size: 8,
                unsigned: true,
            },
            MappedKind::Intrinsic,
        ),
        "gint16" | "gshort" => MappedType::new(
            "number",
            FfiType::Int {
                size: 16,
                unsigned: false,
            },
            MappedKind::Intrinsic,
        ),
        "guint16" | "gushort" => MappedType::new(
            "number",
            FfiType::Int {
                size: 16,
                unsigned: true,
            },
            MappedKind::Intrinsic,
        ),
        "gint32" | "gint" => MappedType::new("number", FfiType::int32(), MappedKind::Intrinsic),
        "guint32" | "guint" | "gunichar" => MappedType::new(
            "number",
            FfiType::Int {
                size: 32,
                unsigned: true,
            },
            MappedKind::Intrinsic,
        ),
        "gint64" | "glong" | "gssize" => MappedType::new(
            "number",
            FfiType::Int {
                size: 64,
                unsigned: false,
            },
            MappedKind::Intrinsic,
        ),
        "guint64" | "gulong" | "gsize" => {
            MappedType::new("number", FfiType::uint64(), MappedKind::Intrinsic)
        }
        "gfloat" => MappedType::new("number", FfiType::Float { size: 32 }, MappedKind::Intrinsic),
        "gdouble" => MappedType::new("number", FfiType::Float { size: 64 }, MappedKind::Intrinsic),
        // Pointers and GTypes travel as 64-bit unsigned handles.
        "gpointer" | "gconstpointer" | "GType" => {
            MappedType::new("number", FfiType::uint64(), MappedKind::Intrinsic)
        }
        "utf8" | "filename" => MappedType::new(
            "string",
            FfiType::String {
                ownership: Ownership::Full,
            },
            MappedKind::Intrinsic,
        ),
        "GLib.Variant" => MappedType::new(
            "Variant",
            FfiType::GVariant {
                ownership: Ownership::Full,
            },
            MappedKind::Intrinsic,
        ),
        "GObject.ParamSpec" => MappedType::new(
            "ParamSpec",
            FfiType::GParam {
                ownership: Ownership::Full,
            },
            MappedKind::Intrinsic,
        ),
        _ => return None,
    };
    Some(mapped)
}
