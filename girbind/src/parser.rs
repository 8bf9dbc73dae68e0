//! GIR XML frontend — parses a GObject-Introspection document into a raw
//! namespace graph of attribute strings.
//!
//! No cross-referencing or name qualification happens here; that is the
//! normalizer's job. The parser is deliberately lenient: malformed or
//! unsupported elements are skipped with a warning rather than failing the
//! whole document.

use anyhow::{Context, Result};
use roxmltree::{Document, Node};
use tracing::{trace, warn};

const CORE_NS: &str = "http://www.gtk.org/introspection/core/1.0";
const C_NS: &str = "http://www.gtk.org/introspection/c/1.0";
const GLIB_NS: &str = "http://www.gtk.org/introspection/glib/1.0";

// ---------------------------------------------------------------------------
// Raw model — one struct per GIR element kind, attribute strings as-is
// ---------------------------------------------------------------------------

/// A raw type reference: `<type name="..."/>` or `<array><type .../></array>`.
#[derive(Debug, Clone, Default)]
pub struct RawTypeRef {
    pub name: Option<String>,
    pub is_array: bool,
    pub element: Option<Box<RawTypeRef>>,
}

/// A raw `<parameter>` / `<instance-parameter>`.
#[derive(Debug, Clone, Default)]
pub struct RawParameter {
    pub name: String,
    pub ty: Option<RawTypeRef>,
    pub varargs: bool,
    pub direction: Option<String>,
    pub transfer: Option<String>,
    pub caller_allocates: bool,
    pub nullable: bool,
    pub allow_none: bool,
    pub optional: bool,
    pub closure: Option<usize>,
    pub destroy: Option<usize>,
    pub scope: Option<String>,
}

/// A raw callable: constructor, method, function or callback body.
#[derive(Debug, Clone, Default)]
pub struct RawFunction {
    pub name: String,
    pub c_identifier: Option<String>,
    pub throws: bool,
    pub finish_func: Option<String>,
    pub return_type: Option<RawTypeRef>,
    pub return_transfer: Option<String>,
    pub parameters: Vec<RawParameter>,
}

/// A raw `<property>`.
#[derive(Debug, Clone, Default)]
pub struct RawProperty {
    pub name: String,
    pub ty: Option<RawTypeRef>,
    pub readable: bool,
    pub writable: bool,
    pub construct_only: bool,
}

/// A raw `<glib:signal>`.
#[derive(Debug, Clone, Default)]
pub struct RawSignal {
    pub name: String,
    pub return_type: Option<RawTypeRef>,
    pub parameters: Vec<RawParameter>,
}

/// A raw `<field>`.
#[derive(Debug, Clone, Default)]
pub struct RawField {
    pub name: String,
    pub ty: Option<RawTypeRef>,
    pub writable: bool,
}

/// A raw `<class>`.
#[derive(Debug, Clone, Default)]
pub struct RawClass {
    pub name: String,
    pub c_type: Option<String>,
    pub parent: Option<String>,
    pub glib_type_name: Option<String>,
    pub glib_get_type: Option<String>,
    pub abstract_: bool,
    pub implements: Vec<String>,
    pub constructors: Vec<RawFunction>,
    pub methods: Vec<RawFunction>,
    pub functions: Vec<RawFunction>,
    pub properties: Vec<RawProperty>,
    pub signals: Vec<RawSignal>,
    pub fields: Vec<RawField>,
}

/// A raw `<interface>`.
#[derive(Debug, Clone, Default)]
pub struct RawInterface {
    pub name: String,
    pub c_type: Option<String>,
    pub glib_type_name: Option<String>,
    pub methods: Vec<RawFunction>,
    pub properties: Vec<RawProperty>,
    pub signals: Vec<RawSignal>,
}

/// A raw `<record>`.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub name: String,
    pub c_type: Option<String>,
    pub glib_type_name: Option<String>,
    pub glib_get_type: Option<String>,
    pub disguised: bool,
    pub constructors: Vec<RawFunction>,
    pub methods: Vec<RawFunction>,
    pub fields: Vec<RawField>,
}

/// A raw `<enumeration>` or `<bitfield>` member.
#[derive(Debug, Clone, Default)]
pub struct RawEnumMember {
    pub name: String,
    pub value: String,
    pub c_identifier: Option<String>,
}

/// A raw `<enumeration>` or `<bitfield>`.
#[derive(Debug, Clone, Default)]
pub struct RawEnum {
    pub name: String,
    pub c_type: Option<String>,
    pub glib_type_name: Option<String>,
    pub members: Vec<RawEnumMember>,
}

/// A raw `<callback>`.
#[derive(Debug, Clone, Default)]
pub struct RawCallback {
    pub name: String,
    pub return_type: Option<RawTypeRef>,
    pub parameters: Vec<RawParameter>,
}

/// A raw `<constant>`.
#[derive(Debug, Clone, Default)]
pub struct RawConstant {
    pub name: String,
    pub value: String,
    pub ty: Option<RawTypeRef>,
}

/// A raw `<namespace>` — the parse result for one GIR document.
#[derive(Debug, Clone, Default)]
pub struct RawNamespace {
    pub name: String,
    pub version: String,
    pub shared_library: Option<String>,
    pub classes: Vec<RawClass>,
    pub interfaces: Vec<RawInterface>,
    pub records: Vec<RawRecord>,
    pub enums: Vec<RawEnum>,
    pub bitfields: Vec<RawEnum>,
    pub callbacks: Vec<RawCallback>,
    pub constants: Vec<RawConstant>,
    pub functions: Vec<RawFunction>,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Parse one GIR XML document into its raw namespace graph.
///
/// A GIR document carries exactly one `<namespace>` under `<repository>`.
pub fn parse_gir(xml: &str) -> Result<RawNamespace> {
    let doc = Document::parse(xml).context("parsing GIR XML")?;
    let repository = doc.root_element();
    if repository.tag_name().name() != "repository" {
        anyhow::bail!(
            "expected <repository> root element, found <{}>",
            repository.tag_name().name()
        );
    }

    let namespace_node = repository
        .children()
        .filter(Node::is_element)
        .find(|n| is_core(n, "namespace"))
        .context("GIR document has no <namespace> element")?;

    parse_namespace(&namespace_node)
}

fn parse_namespace(node: &Node) -> Result<RawNamespace> {
    let mut ns = RawNamespace {
        name: attr_required(node, "name")?,
        version: node.attribute("version").unwrap_or("").to_string(),
        // The attribute may list several comma-separated libraries; the
        // first one is the canonical load target.
        shared_library: node
            .attribute("shared-library")
            .map(|s| s.split(',').next().unwrap_or(s).to_string()),
        ..Default::default()
    };

    for child in node.children().filter(Node::is_element) {
        let tag = child.tag_name();
        match tag.name() {
            "class" if tag.namespace() == Some(CORE_NS) => match parse_class(&child) {
                Ok(c) => ns.classes.push(c),
                Err(e) => warn!(err = %e, "skipping malformed <class>"),
            },
            "interface" => match parse_interface(&child) {
                Ok(i) => ns.interfaces.push(i),
                Err(e) => warn!(err = %e, "skipping malformed <interface>"),
            },
            "record" => match parse_record(&child) {
                Ok(r) => ns.records.push(r),
                Err(e) => warn!(err = %e, "skipping malformed <record>"),
            },
            "enumeration" => match parse_enum(&child) {
                Ok(e) => ns.enums.push(e),
                Err(e) => warn!(err = %e, "skipping malformed <enumeration>"),
            },
            "bitfield" => match parse_enum(&child) {
                Ok(e) => ns.bitfields.push(e),
                Err(e) => warn!(err = %e, "skipping malformed <bitfield>"),
            },
            "callback" => match parse_callback(&child) {
                Ok(c) => ns.callbacks.push(c),
                Err(e) => warn!(err = %e, "skipping malformed <callback>"),
            },
            "constant" => match parse_constant(&child) {
                Ok(c) => ns.constants.push(c),
                Err(e) => warn!(err = %e, "skipping malformed <constant>"),
            },
            "function" => match parse_function(&child) {
                Ok(f) => ns.functions.push(f),
                Err(e) => warn!(err = %e, "skipping malformed <function>"),
            },
            // alias/union/docsection/boxed carry nothing the binding
            // surface needs.
            other => trace!(element = other, "ignoring namespace child"),
        }
    }

    Ok(ns)
}

// ---------------------------------------------------------------------------
// Per-kind element parsers
// ---------------------------------------------------------------------------

fn parse_class(node: &Node) -> Result<RawClass> {
    let mut class = RawClass {
        name: attr_required(node, "name")?,
        c_type: c_attr(node, "type"),
        parent: node.attribute("parent").map(str::to_string),
        glib_type_name: glib_attr(node, "type-name"),
        glib_get_type: glib_attr(node, "get-type"),
        abstract_: bool_attr(node, "abstract"),
        ..Default::default()
    };

    for child in node.children().filter(Node::is_element) {
        let tag = child.tag_name();
        match tag.name() {
            "implements" => {
                if let Some(name) = child.attribute("name") {
                    class.implements.push(name.to_string());
                }
            }
            "constructor" => class.constructors.push(parse_function(&child)?),
            "method" => class.methods.push(parse_function(&child)?),
            "function" => class.functions.push(parse_function(&child)?),
            "property" => class.properties.push(parse_property(&child)),
            "signal" if tag.namespace() == Some(GLIB_NS) => {
                class.signals.push(parse_signal(&child)?)
            }
            "field" => {
                if let Some(f) = parse_field(&child) {
                    class.fields.push(f);
                }
            }
            _ => {}
        }
    }

    Ok(class)
}

fn parse_interface(node: &Node) -> Result<RawInterface> {
    let mut iface = RawInterface {
        name: attr_required(node, "name")?,
        c_type: c_attr(node, "type"),
        glib_type_name: glib_attr(node, "type-name"),
        ..Default::default()
    };

    for child in node.children().filter(Node::is_element) {
        let tag = child.tag_name();
        match tag.name() {
            "method" => iface.methods.push(parse_function(&child)?),
            "property" => iface.properties.push(parse_property(&child)),
            "signal" if tag.namespace() == Some(GLIB_NS) => {
                iface.signals.push(parse_signal(&child)?)
            }
            _ => {}
        }
    }

    Ok(iface)
}

fn parse_record(node: &Node) -> Result<RawRecord> {
    let mut record = RawRecord {
        name: attr_required(node, "name")?,
        c_type: c_attr(node, "type"),
        glib_type_name: glib_attr(node, "type-name"),
        glib_get_type: glib_attr(node, "get-type"),
        disguised: bool_attr(node, "disguised") || bool_attr(node, "opaque"),
        ..Default::default()
    };

    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "constructor" => record.constructors.push(parse_function(&child)?),
            "method" => record.methods.push(parse_function(&child)?),
            "field" => {
                if let Some(f) = parse_field(&child) {
                    record.fields.push(f);
                }
            }
            _ => {}
        }
    }

    Ok(record)
}

fn parse_enum(node: &Node) -> Result<RawEnum> {
    let mut en = RawEnum {
        name: attr_required(node, "name")?,
        c_type: c_attr(node, "type"),
        glib_type_name: glib_attr(node, "type-name"),
        ..Default::default()
    };

    for child in node.children().filter(Node::is_element) {
        if child.tag_name().name() != "member" {
            continue;
        }
        let Some(name) = child.attribute("name") else {
            continue;
        };
        en.members.push(RawEnumMember {
            name: name.to_string(),
            value: child.attribute("value").unwrap_or("0").to_string(),
            c_identifier: c_attr(&child, "identifier"),
        });
    }

    Ok(en)
}

fn parse_callback(node: &Node) -> Result<RawCallback> {
    let f = parse_function(node)?;
    Ok(RawCallback {
        name: f.name,
        return_type: f.return_type,
        parameters: f.parameters,
    })
}

fn parse_constant(node: &Node) -> Result<RawConstant> {
    Ok(RawConstant {
        name: attr_required(node, "name")?,
        value: node.attribute("value").unwrap_or("").to_string(),
        ty: find_type(node),
    })
}

fn parse_function(node: &Node) -> Result<RawFunction> {
    let mut f = RawFunction {
        name: attr_required(node, "name")?,
        c_identifier: c_attr(node, "identifier"),
        throws: bool_attr(node, "throws"),
        finish_func: glib_attr(node, "finish-func"),
        ..Default::default()
    };

    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "return-value" => {
                f.return_type = find_type(&child);
                f.return_transfer = child.attribute("transfer-ownership").map(str::to_string);
            }
            "parameters" => {
                for p in child.children().filter(Node::is_element) {
                    match p.tag_name().name() {
                        // The instance parameter is the implicit self
                        // argument; it never appears in the parameter list.
                        "instance-parameter" => {}
                        "parameter" => f.parameters.push(parse_parameter(&p)),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    Ok(f)
}

fn parse_parameter(node: &Node) -> RawParameter {
    let varargs = node
        .children()
        .filter(Node::is_element)
        .any(|c| c.tag_name().name() == "varargs");

    RawParameter {
        name: node.attribute("name").unwrap_or("").to_string(),
        ty: find_type(node),
        varargs,
        direction: node.attribute("direction").map(str::to_string),
        transfer: node.attribute("transfer-ownership").map(str::to_string),
        caller_allocates: bool_attr(node, "caller-allocates"),
        nullable: bool_attr(node, "nullable"),
        allow_none: bool_attr(node, "allow-none"),
        optional: bool_attr(node, "optional"),
        closure: index_attr(node, "closure"),
        destroy: index_attr(node, "destroy"),
        scope: node.attribute("scope").map(str::to_string),
    }
}

fn parse_property(node: &Node) -> RawProperty {
    RawProperty {
        name: node.attribute("name").unwrap_or("").to_string(),
        ty: find_type(node),
        // GIR defaults: readable unless explicitly "0", writable only when
        // explicitly "1".
        readable: node.attribute("readable") != Some("0"),
        writable: bool_attr(node, "writable"),
        construct_only: bool_attr(node, "construct-only"),
    }
}

fn parse_signal(node: &Node) -> Result<RawSignal> {
    let f = parse_function(node)?;
    Ok(RawSignal {
        name: f.name,
        return_type: f.return_type,
        parameters: f.parameters,
    })
}

fn parse_field(node: &Node) -> Option<RawField> {
    let name = node.attribute("name")?;
    // Callback-typed fields (vfunc slots in instance structs) are plumbing,
    // not bindable state.
    let has_callback_child = node
        .children()
        .filter(Node::is_element)
        .any(|c| c.tag_name().name() == "callback");
    if has_callback_child {
        return None;
    }
    Some(RawField {
        name: name.to_string(),
        ty: find_type(node),
        writable: bool_attr(node, "writable"),
    })
}

// ---------------------------------------------------------------------------
// Type reference parsing
// ---------------------------------------------------------------------------

/// Find the `<type>` or `<array>` child of a node and parse it.
fn find_type(node: &Node) -> Option<RawTypeRef> {
    node.children()
        .filter(Node::is_element)
        .find_map(|c| match c.tag_name().name() {
            "type" => Some(parse_type_node(&c)),
            "array" => Some(parse_array_node(&c)),
            _ => None,
        })
}

fn parse_type_node(node: &Node) -> RawTypeRef {
    RawTypeRef {
        name: node.attribute("name").map(str::to_string),
        is_array: false,
        element: None,
    }
}

fn parse_array_node(node: &Node) -> RawTypeRef {
    let element = node
        .children()
        .filter(Node::is_element)
        .find_map(|c| match c.tag_name().name() {
            "type" => Some(parse_type_node(&c)),
            "array" => Some(parse_array_node(&c)),
            _ => None,
        });
    RawTypeRef {
        // GLib.List / GLib.SList / GLib.PtrArray arrays carry the container
        // name; plain C arrays have none.
        name: node.attribute("name").map(str::to_string),
        is_array: true,
        element: element.map(Box::new),
    }
}

// ---------------------------------------------------------------------------
// Attribute helpers
// ---------------------------------------------------------------------------

fn is_core(node: &Node, name: &str) -> bool {
    let tag = node.tag_name();
    tag.name() == name && (tag.namespace() == Some(CORE_NS) || tag.namespace().is_none())
}

fn attr_required(node: &Node, name: &str) -> Result<String> {
    node.attribute(name)
        .map(str::to_string)
        .with_context(|| format!("<{}> missing `{name}`", node.tag_name().name()))
}

fn c_attr(node: &Node, name: &str) -> Option<String> {
    node.attribute((C_NS, name)).map(str::to_string)
}

fn glib_attr(node: &Node, name: &str) -> Option<String> {
    node.attribute((GLIB_NS, name)).map(str::to_string)
}

fn bool_attr(node: &Node, name: &str) -> bool {
    node.attribute(name) == Some("1")
}

fn index_attr(node: &Node, name: &str) -> Option<usize> {
    node.attribute(name).and_then(|v| v.parse().ok())
}
