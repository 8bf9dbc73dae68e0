//! Repository — multi-document GIR store with an explicit two-phase build.
//!
//! `load_from_xml` may be called once per GIR file, in any order. `resolve`
//! then (1) materializes normalized entities per namespace without following
//! cross-namespace references, and (2) links parent/implements/type names
//! against the full cross-namespace set, so forward references work
//! regardless of load order.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::model::*;
use crate::parser::{self, RawFunction, RawNamespace, RawParameter, RawTypeRef};
use crate::registry::TypeKind;

/// The cross-referenced store all generators query.
#[derive(Debug, Default)]
pub struct Repository {
    raw: Vec<RawNamespace>,
    namespaces: BTreeMap<String, Namespace>,
    resolved: bool,
}

impl Repository {
    pub fn new() -> Self {
        Repository::default()
    }

    /// Parse one GIR document and store its raw namespace. May be called
    /// multiple times, once per file, in any order. Returns the loaded
    /// namespace's name.
    pub fn load_from_xml(&mut self, xml: &str) -> Result<String> {
        let ns = parser::parse_gir(xml).context("loading GIR document")?;
        debug!(
            namespace = %ns.name,
            version = %ns.version,
            classes = ns.classes.len(),
            "loaded raw namespace"
        );
        let name = ns.name.clone();
        self.raw.push(ns);
        // New raw data invalidates a previous resolve; the next resolve()
        // rebuilds from scratch.
        self.resolved = false;
        Ok(name)
    }

    /// Two-phase build: materialize normalized entities, then link
    /// cross-namespace references. Idempotent — resolving twice yields the
    /// same namespaces and queries as resolving once.
    pub fn resolve(&mut self) -> Result<()> {
        if self.resolved {
            return Ok(());
        }

        // Phase 1: normalize each raw namespace in isolation. Duplicate
        // loads of the same namespace keep the first copy.
        let mut namespaces: BTreeMap<String, Namespace> = BTreeMap::new();
        for raw in &self.raw {
            if namespaces.contains_key(&raw.name) {
                warn!(namespace = %raw.name, "duplicate namespace load, keeping first");
                continue;
            }
            let ns = normalize_namespace(raw);
            info!(
                namespace = %ns.name,
                classes = ns.classes.len(),
                interfaces = ns.interfaces.len(),
                records = ns.records.len(),
                enums = ns.enums.len(),
                bitfields = ns.bitfields.len(),
                "normalized namespace"
            );
            namespaces.insert(ns.name.clone(), ns);
        }

        // Phase 2: link parents and implemented interfaces against the full
        // set. Dangling references are warned about, never fatal —
        // generation stays fail-open against incomplete GIR sets.
        let known: BTreeSet<String> = namespaces
            .values()
            .flat_map(|ns| {
                ns.classes
                    .values()
                    .map(|c| c.qualified_name.clone())
                    .chain(ns.interfaces.values().map(|i| i.qualified_name.clone()))
            })
            .collect();

        for ns in namespaces.values() {
            for class in ns.classes.values() {
                if let Some(parent) = &class.parent
                    && !known.contains(parent)
                {
                    warn!(
                        class = %class.qualified_name,
                        parent = %parent,
                        "parent class not found in any loaded namespace"
                    );
                }
                for iface in &class.implements {
                    if !known.contains(iface) {
                        warn!(
                            class = %class.qualified_name,
                            interface = %iface,
                            "implemented interface not found in any loaded namespace"
                        );
                    }
                }
            }
        }

        self.namespaces = namespaces;
        self.resolved = true;
        Ok(())
    }

    fn require_resolved(&self) -> Result<()> {
        if !self.resolved {
            anyhow::bail!("resolve() must be called first");
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Query surface — Ok(None) for "not found", error only for "not resolved"
    // -----------------------------------------------------------------------

    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.values()
    }

    pub fn namespace(&self, name: &str) -> Result<Option<&Namespace>> {
        self.require_resolved()?;
        Ok(self.namespaces.get(name))
    }

    pub fn resolve_class(&self, qualified: &str) -> Result<Option<&Class>> {
        self.require_resolved()?;
        Ok(self.lookup(qualified, |ns, name| ns.classes.get(name)))
    }

    pub fn resolve_interface(&self, qualified: &str) -> Result<Option<&Interface>> {
        self.require_resolved()?;
        Ok(self.lookup(qualified, |ns, name| ns.interfaces.get(name)))
    }

    pub fn resolve_record(&self, qualified: &str) -> Result<Option<&Record>> {
        self.require_resolved()?;
        Ok(self.lookup(qualified, |ns, name| ns.records.get(name)))
    }

    pub fn resolve_enum(&self, qualified: &str) -> Result<Option<&Enumeration>> {
        self.require_resolved()?;
        Ok(self.lookup(qualified, |ns, name| ns.enums.get(name)))
    }

    pub fn resolve_flags(&self, qualified: &str) -> Result<Option<&Enumeration>> {
        self.require_resolved()?;
        Ok(self.lookup(qualified, |ns, name| ns.bitfields.get(name)))
    }

    pub fn resolve_callback(&self, qualified: &str) -> Result<Option<&Callback>> {
        self.require_resolved()?;
        Ok(self.lookup(qualified, |ns, name| ns.callbacks.get(name)))
    }

    pub fn resolve_constant(&self, qualified: &str) -> Result<Option<&Constant>> {
        self.require_resolved()?;
        Ok(self.lookup(qualified, |ns, name| ns.constants.get(name)))
    }

    pub fn resolve_function(&self, qualified: &str) -> Result<Option<&Function>> {
        self.require_resolved()?;
        Ok(self.lookup(qualified, |ns, name| ns.functions.get(name)))
    }

    /// The kind of a qualified type name, or `None` for intrinsics and
    /// unknowns — callers needing the distinction query
    /// [`Repository::is_primitive`] separately.
    pub fn type_kind(&self, qualified: &str) -> Result<Option<TypeKind>> {
        self.require_resolved()?;
        let Some((ns_name, simple)) = qualified.split_once('.') else {
            return Ok(None);
        };
        let Some(ns) = self.namespaces.get(ns_name) else {
            return Ok(None);
        };
        Ok(if ns.classes.contains_key(simple) {
            Some(TypeKind::Class)
        } else if ns.interfaces.contains_key(simple) {
            Some(TypeKind::Interface)
        } else if ns.records.contains_key(simple) {
            Some(TypeKind::Record)
        } else if ns.enums.contains_key(simple) {
            Some(TypeKind::Enum)
        } else if ns.bitfields.contains_key(simple) {
            Some(TypeKind::Flags)
        } else if ns.callbacks.contains_key(simple) {
            Some(TypeKind::Callback)
        } else {
            None
        })
    }

    /// Intrinsic-name membership. Works pre- or post-resolve.
    pub fn is_primitive(name: &str) -> bool {
        is_intrinsic_name(name)
    }

    /// True when the qualified name resolves to a class carrying a GLib type
    /// name. False (not an error) for unknown names.
    pub fn is_gobject(&self, qualified: &str) -> Result<bool> {
        Ok(self
            .resolve_class(qualified)?
            .is_some_and(|c| c.glib_type_name.is_some()))
    }

    /// True when the qualified name resolves to a record carrying a GLib
    /// type name (a boxed type). False for unknown names.
    pub fn is_boxed(&self, qualified: &str) -> Result<bool> {
        Ok(self
            .resolve_record(qualified)?
            .is_some_and(|r| r.glib_type_name.is_some()))
    }

    pub fn find_classes(&self, mut predicate: impl FnMut(&Class) -> bool) -> Result<Vec<&Class>> {
        self.require_resolved()?;
        Ok(self
            .namespaces
            .values()
            .flat_map(|ns| ns.classes.values())
            .filter(|c| predicate(c))
            .collect())
    }

    pub fn find_interfaces(
        &self,
        mut predicate: impl FnMut(&Interface) -> bool,
    ) -> Result<Vec<&Interface>> {
        self.require_resolved()?;
        Ok(self
            .namespaces
            .values()
            .flat_map(|ns| ns.interfaces.values())
            .filter(|i| predicate(i))
            .collect())
    }

    pub fn find_records(&self, mut predicate: impl FnMut(&Record) -> bool) -> Result<Vec<&Record>> {
        self.require_resolved()?;
        Ok(self
            .namespaces
            .values()
            .flat_map(|ns| ns.records.values())
            .filter(|r| predicate(r))
            .collect())
    }

    /// Walk the parent chain of a class, starting at (and excluding) the
    /// class itself. Stops at the first parent that is not loaded.
    pub fn ancestors(&self, class: &Class) -> Result<Vec<&Class>> {
        self.require_resolved()?;
        let mut out = Vec::new();
        let mut current = class.parent.clone();
        while let Some(q) = current {
            match self.lookup(&q, |ns, name| ns.classes.get(name)) {
                Some(parent) => {
                    current = parent.parent.clone();
                    out.push(parent);
                }
                None => break,
            }
        }
        Ok(out)
    }

    /// True when `class` is `root` or transitively derives from it.
    pub fn is_subclass_of(&self, class: &Class, root: &str) -> Result<bool> {
        if class.qualified_name == root {
            return Ok(true);
        }
        Ok(self
            .ancestors(class)?
            .iter()
            .any(|a| a.qualified_name == root))
    }

    fn lookup<'a, T>(
        &'a self,
        qualified: &str,
        get: impl Fn(&'a Namespace, &str) -> Option<&'a T>,
    ) -> Option<&'a T> {
        let (ns_name, simple) = qualified.split_once('.')?;
        self.namespaces.get(ns_name).and_then(|ns| get(ns, simple))
    }
}

// ---------------------------------------------------------------------------
// Normalization — raw attribute strings → model entities
// ---------------------------------------------------------------------------

fn normalize_namespace(raw: &RawNamespace) -> Namespace {
    let mut ns = Namespace::new(&raw.name, &raw.version);
    ns.shared_library = raw.shared_library.clone();

    for rc in &raw.classes {
        let class = normalize_class(&ns, rc);
        ns.classes.insert(class.name.clone(), class);
    }
    for ri in &raw.interfaces {
        let iface = Interface {
            name: ri.name.clone(),
            qualified_name: format!("{}.{}", ns.name, ri.name),
            c_type: ri.c_type.clone(),
            glib_type_name: ri.glib_type_name.clone(),
            methods: ri.methods.iter().map(|m| normalize_method(&ns, m)).collect(),
            properties: ri.properties.iter().map(|p| normalize_property(&ns, p)).collect(),
            signals: ri.signals.iter().map(|s| normalize_signal(&ns, s)).collect(),
        };
        ns.interfaces.insert(iface.name.clone(), iface);
    }
    for rr in &raw.records {
        let record = Record {
            name: rr.name.clone(),
            qualified_name: format!("{}.{}", ns.name, rr.name),
            c_type: rr.c_type.clone(),
            glib_type_name: rr.glib_type_name.clone(),
            glib_get_type: rr.glib_get_type.clone(),
            disguised: rr.disguised,
            constructors: rr
                .constructors
                .iter()
                .map(|c| normalize_constructor(&ns, c))
                .collect(),
            methods: rr.methods.iter().map(|m| normalize_method(&ns, m)).collect(),
            fields: rr
                .fields
                .iter()
                .map(|f| Field {
                    name: f.name.clone(),
                    ty: normalize_type(&ns, f.ty.as_ref()),
                    writable: f.writable,
                })
                .collect(),
        };
        ns.records.insert(record.name.clone(), record);
    }
    for re in &raw.enums {
        let en = normalize_enum(&ns, re);
        ns.enums.insert(en.name.clone(), en);
    }
    for rb in &raw.bitfields {
        let en = normalize_enum(&ns, rb);
        ns.bitfields.insert(en.name.clone(), en);
    }
    for rc in &raw.callbacks {
        let cb = Callback {
            name: rc.name.clone(),
            qualified_name: format!("{}.{}", ns.name, rc.name),
            return_type: normalize_type(&ns, rc.return_type.as_ref()),
            parameters: normalize_parameters(&ns, &rc.parameters),
        };
        ns.callbacks.insert(cb.name.clone(), cb);
    }
    for rc in &raw.constants {
        if let Some(constant) = normalize_constant(&ns, rc) {
            ns.constants.insert(constant.name.clone(), constant);
        }
    }
    for rf in &raw.functions {
        let f = normalize_function(&ns, rf);
        ns.functions.insert(f.name.clone(), f);
    }

    ns
}

fn normalize_class(ns: &Namespace, raw: &parser::RawClass) -> Class {
    Class {
        name: raw.name.clone(),
        qualified_name: format!("{}.{}", ns.name, raw.name),
        c_type: raw.c_type.clone(),
        parent: raw.parent.as_deref().map(|p| ns.qualify(p)),
        implements: raw.implements.iter().map(|i| ns.qualify(i)).collect(),
        glib_type_name: raw.glib_type_name.clone(),
        glib_get_type: raw.glib_get_type.clone(),
        abstract_: raw.abstract_,
        constructors: raw
            .constructors
            .iter()
            .map(|c| normalize_constructor(ns, c))
            .collect(),
        methods: raw.methods.iter().map(|m| normalize_method(ns, m)).collect(),
        static_functions: raw.functions.iter().map(|f| normalize_function(ns, f)).collect(),
        properties: raw.properties.iter().map(|p| normalize_property(ns, p)).collect(),
        signals: raw.signals.iter().map(|s| normalize_signal(ns, s)).collect(),
        fields: raw
            .fields
            .iter()
            .map(|f| Field {
                name: f.name.clone(),
                ty: normalize_type(ns, f.ty.as_ref()),
                writable: f.writable,
            })
            .collect(),
    }
}

fn normalize_method(ns: &Namespace, raw: &RawFunction) -> Method {
    Method {
        name: raw.name.clone(),
        c_identifier: raw.c_identifier.clone().unwrap_or_else(|| raw.name.clone()),
        return_type: normalize_type(ns, raw.return_type.as_ref()),
        return_borrowed: raw.return_transfer.as_deref() == Some("none"),
        parameters: normalize_parameters(ns, &raw.parameters),
        throws: raw.throws,
        finish_func: raw.finish_func.clone(),
    }
}

fn normalize_function(ns: &Namespace, raw: &RawFunction) -> Function {
    Function {
        name: raw.name.clone(),
        c_identifier: raw.c_identifier.clone().unwrap_or_else(|| raw.name.clone()),
        return_type: normalize_type(ns, raw.return_type.as_ref()),
        return_borrowed: raw.return_transfer.as_deref() == Some("none"),
        parameters: normalize_parameters(ns, &raw.parameters),
        throws: raw.throws,
        finish_func: raw.finish_func.clone(),
    }
}

fn normalize_constructor(ns: &Namespace, raw: &RawFunction) -> Constructor {
    Constructor {
        name: raw.name.clone(),
        c_identifier: raw.c_identifier.clone().unwrap_or_else(|| raw.name.clone()),
        return_type: normalize_type(ns, raw.return_type.as_ref()),
        parameters: normalize_parameters(ns, &raw.parameters),
        throws: raw.throws,
    }
}

fn normalize_property(ns: &Namespace, raw: &parser::RawProperty) -> Property {
    Property {
        name: raw.name.clone(),
        ty: normalize_type(ns, raw.ty.as_ref()),
        readable: raw.readable,
        writable: raw.writable,
        construct_only: raw.construct_only,
    }
}

fn normalize_signal(ns: &Namespace, raw: &parser::RawSignal) -> Signal {
    Signal {
        name: raw.name.clone(),
        return_type: normalize_type(ns, raw.return_type.as_ref()),
        parameters: normalize_parameters(ns, &raw.parameters),
    }
}

fn normalize_constant(ns: &Namespace, raw: &parser::RawConstant) -> Option<Constant> {
    let ty = normalize_type(ns, raw.ty.as_ref());
    let value = if ty.is_boolean() {
        ConstantValue::Bool(raw.value == "true" || raw.value == "1")
    } else if ty.is_string() {
        ConstantValue::String(raw.value.clone())
    } else if ty.is_numeric() {
        if let Ok(i) = raw.value.parse::<i64>() {
            ConstantValue::Int(i)
        } else if let Ok(f) = raw.value.parse::<f64>() {
            ConstantValue::Float(f)
        } else {
            return None;
        }
    } else {
        // Typed constants (flags values, etc.) are still emittable as ints.
        raw.value.parse::<i64>().map(ConstantValue::Int).ok()?
    };
    Some(Constant {
        name: raw.name.clone(),
        value,
        ty,
    })
}

fn normalize_enum(ns: &Namespace, raw: &parser::RawEnum) -> Enumeration {
    Enumeration {
        name: raw.name.clone(),
        qualified_name: format!("{}.{}", ns.name, raw.name),
        c_type: raw.c_type.clone(),
        glib_type_name: raw.glib_type_name.clone(),
        members: raw
            .members
            .iter()
            .map(|m| EnumMember {
                name: m.name.clone(),
                value: m.value.parse::<i64>().unwrap_or(0),
                c_identifier: m.c_identifier.clone(),
            })
            .collect(),
    }
}

fn normalize_parameters(ns: &Namespace, raws: &[RawParameter]) -> Vec<Parameter> {
    raws.iter().map(|p| normalize_parameter(ns, p)).collect()
}

fn normalize_parameter(ns: &Namespace, raw: &RawParameter) -> Parameter {
    let name = if raw.varargs {
        "...".to_string()
    } else {
        raw.name.clone()
    };
    Parameter {
        name,
        ty: normalize_type(ns, raw.ty.as_ref()),
        direction: match raw.direction.as_deref() {
            Some("out") => Direction::Out,
            Some("inout") => Direction::InOut,
            _ => Direction::In,
        },
        transfer: raw
            .transfer
            .as_deref()
            .map(Transfer::parse)
            .unwrap_or_default(),
        caller_allocates: raw.caller_allocates,
        // `allow-none` is the legacy spelling of `nullable`; both surface
        // as "caller may pass null".
        nullable: raw.nullable || raw.allow_none,
        optional: raw.optional,
        scope: raw.scope.clone(),
        closure: raw.closure,
        destroy: raw.destroy,
    }
}

fn normalize_type(ns: &Namespace, raw: Option<&RawTypeRef>) -> TypeRef {
    let Some(raw) = raw else {
        return TypeRef::named("none");
    };
    if raw.is_array {
        let element = raw
            .element
            .as_deref()
            .map(|e| normalize_type(ns, Some(e)))
            .unwrap_or_else(|| TypeRef::named("gpointer"));
        let mut t = TypeRef::array_of(element);
        // Linked-list-backed containers keep their qualified container name
        // so the mapper can pick the matching list kind.
        if let Some(name) = &raw.name {
            t.name = ns.qualify(name);
        }
        return t;
    }
    match &raw.name {
        Some(name) => TypeRef::named(ns.qualify(name)),
        None => TypeRef::named("none"),
    }
}
