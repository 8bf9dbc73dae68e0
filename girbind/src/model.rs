//! Normalized model types — the bridge between GIR XML parsing and
//! TypeScript emission.
//!
//! These types are XML-independent and emission-independent, making both the
//! parser and the generators easier to test in isolation. Entities are built
//! once during [`Repository::resolve`](crate::repository::Repository::resolve)
//! and never mutated afterwards.

use std::collections::BTreeMap;

/// GIR intrinsic type names — types the mapper handles without registry
/// lookup. Everything else must be namespace-qualified.
const INTRINSIC_NAMES: &[&str] = &[
    "none",
    "void",
    "gboolean",
    "gchar",
    "guchar",
    "gint8",
    "guint8",
    "gint16",
    "guint16",
    "gint32",
    "guint32",
    "gint64",
    "guint64",
    "gint",
    "guint",
    "gshort",
    "gushort",
    "glong",
    "gulong",
    "gsize",
    "gssize",
    "gfloat",
    "gdouble",
    "gunichar",
    "gpointer",
    "gconstpointer",
    "utf8",
    "filename",
    "GType",
    "GLib.Variant",
    "GObject.ParamSpec",
];

const NUMERIC_NAMES: &[&str] = &[
    "gchar", "guchar", "gint8", "guint8", "gint16", "guint16", "gint32", "guint32", "gint64",
    "guint64", "gint", "guint", "gshort", "gushort", "glong", "gulong", "gsize", "gssize",
    "gfloat", "gdouble", "gunichar", "gpointer", "gconstpointer", "GType",
];

/// Returns `true` if `name` is a GIR intrinsic type name.
pub fn is_intrinsic_name(name: &str) -> bool {
    INTRINSIC_NAMES.contains(&name)
}

/// A (possibly array) reference to a GIR type, as it appears on parameters,
/// return values, fields and properties.
///
/// Non-intrinsic names are always stored qualified (`Gtk.Widget`) after
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub name: String,
    pub is_array: bool,
    /// Element type for arrays; recursive.
    pub element: Option<Box<TypeRef>>,
    pub nullable: bool,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef {
            name: name.into(),
            is_array: false,
            element: None,
            nullable: false,
        }
    }

    pub fn array_of(element: TypeRef) -> Self {
        TypeRef {
            name: String::new(),
            is_array: true,
            element: Some(Box::new(element)),
            nullable: false,
        }
    }

    pub fn is_intrinsic(&self) -> bool {
        is_intrinsic_name(&self.name)
    }

    pub fn is_numeric(&self) -> bool {
        NUMERIC_NAMES.contains(&self.name.as_str())
    }

    pub fn is_string(&self) -> bool {
        matches!(self.name.as_str(), "utf8" | "filename")
    }

    pub fn is_boolean(&self) -> bool {
        self.name == "gboolean"
    }

    pub fn is_void(&self) -> bool {
        matches!(self.name.as_str(), "none" | "void")
    }

    pub fn is_variant(&self) -> bool {
        self.name == "GLib.Variant"
    }

    pub fn is_param_spec(&self) -> bool {
        self.name == "GObject.ParamSpec"
    }

    /// The namespace part of a qualified name, or `None` for unqualified
    /// (intrinsic) names.
    pub fn namespace(&self) -> Option<&str> {
        self.name.split_once('.').map(|(ns, _)| ns)
    }

    /// Everything after the first dot. A name with multiple dots returns the
    /// full dotted remainder — intentional for the one real nested-type case.
    pub fn simple_name(&self) -> &str {
        self.name
            .split_once('.')
            .map(|(_, rest)| rest)
            .unwrap_or(&self.name)
    }
}

/// Parameter direction, from the GIR `direction` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    In,
    Out,
    InOut,
}

/// GIR `transfer-ownership` semantics.
///
/// `Full` = callee/caller owns and must free, `None` = borrowed,
/// `Container` = free the container but not the elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transfer {
    Full,
    #[default]
    None,
    Container,
}

impl Transfer {
    pub fn parse(s: &str) -> Transfer {
        match s {
            "full" => Transfer::Full,
            "container" => Transfer::Container,
            _ => Transfer::None,
        }
    }
}

/// A normalized function/method/constructor parameter.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
    pub direction: Direction,
    pub transfer: Transfer,
    pub caller_allocates: bool,
    pub nullable: bool,
    pub optional: bool,
    /// Callback lifetime class (`call`, `async`, `notified`).
    pub scope: Option<String>,
    /// Index of the user-data parameter paired with this callback.
    pub closure: Option<usize>,
    /// Index of the destroy-notify parameter paired with this callback.
    pub destroy: Option<usize>,
}

impl Parameter {
    /// True for both `out` and `inout`.
    pub fn is_out(&self) -> bool {
        matches!(self.direction, Direction::Out | Direction::InOut)
    }

    /// A parameter named `"..."` or with an empty name is a variadic/void
    /// marker and is always excluded from generated signatures.
    pub fn is_variadic_marker(&self) -> bool {
        self.name.is_empty() || self.name == "..."
    }
}

/// A normalized method (instance function).
#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    /// The native symbol to call.
    pub c_identifier: String,
    pub return_type: TypeRef,
    /// True when the return value is `transfer-ownership="none"` (borrowed —
    /// the caller must not free).
    pub return_borrowed: bool,
    pub parameters: Vec<Parameter>,
    pub throws: bool,
    /// Name of the paired async-finish method, from `glib:finish-func` when
    /// present.
    pub finish_func: Option<String>,
}

impl Method {
    /// The async naming convention: `x_async` implies a sibling `x_finish`.
    pub fn is_async(&self) -> bool {
        self.finish_func.is_some() || self.name.ends_with("_async")
    }

    /// Expected finish-method name: the explicit `glib:finish-func` if
    /// present, else derived by suffix replacement. This is a naming
    /// convention, not a GIR guarantee — callers must verify the finish
    /// method actually exists before pairing.
    pub fn finish_method_name(&self) -> Option<String> {
        if let Some(f) = &self.finish_func {
            return Some(f.clone());
        }
        self.name
            .strip_suffix("_async")
            .map(|stem| format!("{stem}_finish"))
    }
}

/// A normalized constructor.
#[derive(Debug, Clone)]
pub struct Constructor {
    pub name: String,
    pub c_identifier: String,
    pub return_type: TypeRef,
    pub parameters: Vec<Parameter>,
    pub throws: bool,
}

/// A namespace-scope function (static function on the owning class, or a
/// free function on the namespace).
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub c_identifier: String,
    pub return_type: TypeRef,
    pub return_borrowed: bool,
    pub parameters: Vec<Parameter>,
    pub throws: bool,
    pub finish_func: Option<String>,
}

/// A GObject property.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub ty: TypeRef,
    pub readable: bool,
    pub writable: bool,
    pub construct_only: bool,
}

/// A GObject signal.
#[derive(Debug, Clone)]
pub struct Signal {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeRef,
}

/// A struct/record field.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
    pub writable: bool,
}

/// A normalized class. Parent forms a tree rooted at classes with
/// `parent = None`; GIR forbids cycles so they are not defended against.
#[derive(Debug, Clone)]
pub struct Class {
    pub name: String,
    /// `Namespace.Name` — the only cross-namespace identifier.
    pub qualified_name: String,
    pub c_type: Option<String>,
    /// Qualified name of the parent class, `None` at the root.
    pub parent: Option<String>,
    /// Qualified names of implemented interfaces.
    pub implements: Vec<String>,
    /// `None` ⇒ not a GObject.
    pub glib_type_name: Option<String>,
    /// The `*_get_type` native symbol, when GObject-backed.
    pub glib_get_type: Option<String>,
    pub abstract_: bool,
    pub constructors: Vec<Constructor>,
    pub methods: Vec<Method>,
    pub static_functions: Vec<Function>,
    pub properties: Vec<Property>,
    pub signals: Vec<Signal>,
    pub fields: Vec<Field>,
}

/// A normalized interface.
#[derive(Debug, Clone)]
pub struct Interface {
    pub name: String,
    pub qualified_name: String,
    pub c_type: Option<String>,
    pub glib_type_name: Option<String>,
    pub methods: Vec<Method>,
    pub properties: Vec<Property>,
    pub signals: Vec<Signal>,
}

/// A normalized record (plain C struct or boxed type).
#[derive(Debug, Clone)]
pub struct Record {
    pub name: String,
    pub qualified_name: String,
    pub c_type: Option<String>,
    /// `Some` ⇒ boxed (registered with the GObject type system).
    pub glib_type_name: Option<String>,
    pub glib_get_type: Option<String>,
    /// Disguised records are opaque pointer-only structs, never bound.
    pub disguised: bool,
    pub constructors: Vec<Constructor>,
    pub methods: Vec<Method>,
    pub fields: Vec<Field>,
}

/// A single enumeration member.
#[derive(Debug, Clone)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
    pub c_identifier: Option<String>,
}

/// A normalized enumeration or bitfield.
#[derive(Debug, Clone)]
pub struct Enumeration {
    pub name: String,
    pub qualified_name: String,
    pub c_type: Option<String>,
    pub glib_type_name: Option<String>,
    pub members: Vec<EnumMember>,
}

/// A normalized callback type.
#[derive(Debug, Clone)]
pub struct Callback {
    pub name: String,
    pub qualified_name: String,
    pub return_type: TypeRef,
    pub parameters: Vec<Parameter>,
}

/// Value of a namespace constant.
#[derive(Debug, Clone)]
pub enum ConstantValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
}

/// A normalized namespace constant.
#[derive(Debug, Clone)]
pub struct Constant {
    pub name: String,
    pub value: ConstantValue,
    pub ty: TypeRef,
}

/// A fully normalized namespace. Created once per loaded GIR document;
/// immutable after `resolve()`.
#[derive(Debug, Clone)]
pub struct Namespace {
    pub name: String,
    pub version: String,
    /// Shared library path from the GIR `shared-library` attribute
    /// (first entry when the attribute lists several).
    pub shared_library: Option<String>,
    pub classes: BTreeMap<String, Class>,
    pub interfaces: BTreeMap<String, Interface>,
    pub records: BTreeMap<String, Record>,
    pub enums: BTreeMap<String, Enumeration>,
    pub bitfields: BTreeMap<String, Enumeration>,
    pub callbacks: BTreeMap<String, Callback>,
    pub constants: BTreeMap<String, Constant>,
    pub functions: BTreeMap<String, Function>,
}

impl Namespace {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Namespace {
            name: name.into(),
            version: version.into(),
            shared_library: None,
            classes: BTreeMap::new(),
            interfaces: BTreeMap::new(),
            records: BTreeMap::new(),
            enums: BTreeMap::new(),
            bitfields: BTreeMap::new(),
            callbacks: BTreeMap::new(),
            constants: BTreeMap::new(),
            functions: BTreeMap::new(),
        }
    }

    /// Qualify a simple name with this namespace.
    pub fn qualify(&self, name: &str) -> String {
        if name.contains('.') || is_intrinsic_name(name) {
            name.to_string()
        } else {
            format!("{}.{}", self.name, name)
        }
    }
}
