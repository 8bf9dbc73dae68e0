//! Widget metadata — per-class records describing slots, properties and
//! containment for the separate UI-binding layer.

use anyhow::Result;

use crate::context::GenerationContext;
use crate::model::Class;
use crate::naming;
use crate::registry::{TypeKind, TypeRegistry};
use crate::repository::Repository;

/// Method names whose presence marks a class as a container. A fixed, small
/// convention list — not exhaustive of every container method the toolkit
/// has.
const CONTAINER_METHODS: &[&str] = &["append", "set_child"];

/// The exported static table attached to widget classes and aggregated into
/// the per-namespace metadata module.
#[derive(Debug, Clone)]
pub struct WidgetMeta {
    pub class_name: String,
    pub namespace: String,
    /// `Namespace + ClassName`, the JSX element name.
    pub jsx_name: String,
    /// Kebab-case module path (`./button.js`).
    pub module_path: String,
    pub is_container: bool,
    /// Writable widget-typed property names (assignable JSX children).
    pub slots: Vec<String>,
    /// All property names, camelCased.
    pub prop_names: Vec<String>,
    /// `None` only at the root widget class.
    pub parent_class_name: Option<String>,
    pub parent_namespace: Option<String>,
}

impl WidgetMeta {
    /// Render as the object literal shared by the static property and the
    /// aggregated table.
    pub fn to_ts_literal(&self, indent: &str) -> String {
        let quote_list = |items: &[String]| {
            items
                .iter()
                .map(|s| format!("\"{s}\""))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let opt = |v: &Option<String>| match v {
            Some(s) => format!("\"{s}\""),
            None => "null".to_string(),
        };
        format!(
            "{{\n\
             {indent}  className: \"{}\",\n\
             {indent}  namespace: \"{}\",\n\
             {indent}  jsxName: \"{}\",\n\
             {indent}  modulePath: \"{}\",\n\
             {indent}  isContainer: {},\n\
             {indent}  slots: [{}],\n\
             {indent}  propNames: [{}],\n\
             {indent}  parentClassName: {},\n\
             {indent}  parentNamespace: {},\n\
             {indent}}}",
            self.class_name,
            self.namespace,
            self.jsx_name,
            self.module_path,
            self.is_container,
            quote_list(&self.slots),
            quote_list(&self.prop_names),
            opt(&self.parent_class_name),
            opt(&self.parent_namespace),
        )
    }
}

/// Decides widget-ness and computes per-class metadata.
pub struct ClassMetaBuilder<'a> {
    repo: &'a Repository,
    registry: &'a TypeRegistry,
    /// Qualified name of the root widget class (`Gtk.Widget` unless
    /// configured otherwise).
    widget_root: String,
}

impl<'a> ClassMetaBuilder<'a> {
    pub fn new(repo: &'a Repository, registry: &'a TypeRegistry, widget_root: impl Into<String>) -> Self {
        ClassMetaBuilder {
            repo,
            registry,
            widget_root: widget_root.into(),
        }
    }

    /// Subclass-of-widget test via inheritance-chain walk; the root widget
    /// class itself counts.
    pub fn is_widget(&self, class: &Class) -> Result<bool> {
        self.repo.is_subclass_of(class, &self.widget_root)
    }

    /// Container detection triggers on presence of any method from the
    /// fixed convention list.
    pub fn is_container(class: &Class) -> bool {
        class
            .methods
            .iter()
            .any(|m| CONTAINER_METHODS.contains(&m.name.as_str()))
    }

    /// Writable widget-typed properties. Read-only widget properties are
    /// not assignable as JSX children and are excluded.
    pub fn slots(&self, class: &Class) -> Result<Vec<String>> {
        let mut slots = Vec::new();
        for prop in &class.properties {
            if !prop.writable {
                continue;
            }
            let Some(entry) = self
                .registry
                .resolve_in_namespace(&prop.ty.name, &class_namespace(class))
            else {
                continue;
            };
            if entry.kind != TypeKind::Class {
                continue;
            }
            let qualified = format!("{}.{}", entry.namespace, entry.name);
            let Some(target) = self.repo.resolve_class(&qualified)? else {
                continue;
            };
            if self.is_widget(target)? {
                slots.push(naming::to_camel_case(&prop.name));
            }
        }
        Ok(slots)
    }

    pub fn prop_names(class: &Class) -> Vec<String> {
        class
            .properties
            .iter()
            .map(|p| naming::to_camel_case(&p.name))
            .collect()
    }

    /// Assemble the exported metadata record. `parent_class_name` and
    /// `parent_namespace` are both `None` only at the root widget class.
    pub fn build_codegen_widget_meta(&self, class: &Class) -> Result<WidgetMeta> {
        let namespace = class_namespace(class);
        let (parent_class_name, parent_namespace) = match &class.parent {
            Some(parent) => match parent.split_once('.') {
                Some((ns, name)) => (Some(name.to_string()), Some(ns.to_string())),
                None => (Some(parent.clone()), Some(namespace.clone())),
            },
            None => (None, None),
        };
        Ok(WidgetMeta {
            class_name: class.name.clone(),
            namespace: namespace.clone(),
            jsx_name: format!("{}{}", namespace, class.name),
            module_path: naming::module_path(&class.name),
            is_container: Self::is_container(class),
            slots: self.slots(class)?,
            prop_names: Self::prop_names(class),
            parent_class_name,
            parent_namespace,
        })
    }

    /// Render the `static readonly WIDGET_META` member for a widget class.
    /// Returns `None` (no-op) for non-widget classes.
    pub fn add_to_class(
        &self,
        class: &Class,
        ctx: &mut GenerationContext,
    ) -> Result<Option<(String, WidgetMeta)>> {
        if !self.is_widget(class)? {
            return Ok(None);
        }
        let meta = self.build_codegen_widget_meta(class)?;
        ctx.uses_runtime_widget_meta = true;
        let text = format!(
            "  static readonly WIDGET_META: RuntimeWidgetMeta = {};",
            meta.to_ts_literal("  ")
        );
        Ok(Some((text, meta)))
    }
}

fn class_namespace(class: &Class) -> String {
    class
        .qualified_name
        .split_once('.')
        .map(|(ns, _)| ns.to_string())
        .unwrap_or_default()
}
