//! Class generator — composes constructors, methods, static functions,
//! signal connect, widget metadata and imports into one complete generated
//! class file.

use anyhow::Result;
use tracing::{debug, warn};

use crate::context::GenerationContext;
use crate::mapper::TypeMapper;
use crate::model::{Class, Namespace};
use crate::naming;
use crate::registry::TypeRegistry;
use crate::repository::Repository;
use crate::writers::body::{self, BodyWriter};
use crate::writers::ffi::{FfiTypeWriter, SelfKind};
use crate::writers::imports::{self, FileIdentity, ParentRef};

use super::GeneratedFile;
use super::meta::{ClassMetaBuilder, WidgetMeta};
use super::methods::MethodBuilder;
use super::signals::SignalBuilder;
use super::statics::StaticFunctionBuilder;

/// Run-wide generation options.
#[derive(Debug, Clone)]
pub struct GenOptions {
    /// Module specifier the fixed runtime contract is imported from.
    pub runtime_module: String,
    /// GLib shared library, required for GError descriptors on throwing
    /// calls.
    pub glib_library: Option<String>,
    /// Qualified name of the root widget class.
    pub widget_root: String,
}

/// Per-class outcome. `success` is false exactly when the class ends up
/// with zero usable constructors because every declared constructor used an
/// unsupported callback parameter; failed units are omitted from output
/// without aborting the batch.
#[derive(Debug)]
pub struct ClassGenResult {
    pub success: bool,
    pub skip_reason: Option<String>,
    pub file: Option<GeneratedFile>,
    pub widget_meta: Option<WidgetMeta>,
}

pub struct ClassGenerator<'a> {
    repo: &'a Repository,
    registry: &'a TypeRegistry,
    mapper: &'a TypeMapper<'a>,
    opts: &'a GenOptions,
}

impl<'a> ClassGenerator<'a> {
    pub fn new(
        repo: &'a Repository,
        registry: &'a TypeRegistry,
        mapper: &'a TypeMapper<'a>,
        opts: &'a GenOptions,
    ) -> Self {
        ClassGenerator {
            repo,
            registry,
            mapper,
            opts,
        }
    }

    pub fn generate(&self, ns: &Namespace, class: &Class) -> Result<ClassGenResult> {
        let ts_name = self
            .registry
            .resolve(&class.qualified_name)
            .map(|e| e.transformed_name.clone())
            .unwrap_or_else(|| class.name.clone());

        let selected = body::select_constructors(&class.constructors);
        if !class.constructors.is_empty() && selected.main.is_none() {
            warn!(
                class = %class.qualified_name,
                "every declared constructor uses an unsupported callback parameter"
            );
            return Ok(ClassGenResult {
                success: false,
                skip_reason: Some("no usable constructor".to_string()),
                file: None,
                widget_meta: None,
            });
        }

        let mut ctx = GenerationContext::new();

        // Parent reference, by transformed name. A missing parent namespace
        // falls back to the base native object.
        let parent = class.parent.as_deref().and_then(|p| {
            let (pns, _) = p.split_once('.')?;
            let name = self
                .registry
                .resolve(p)
                .map(|e| e.transformed_name.clone())
                .or_else(|| p.split_once('.').map(|(_, n)| n.to_string()))?;
            Some(ParentRef {
                name,
                namespace: pns.to_string(),
            })
        });
        let extends = match &parent {
            None => {
                ctx.uses_native_object = true;
                "NativeObject".to_string()
            }
            Some(p) if p.namespace == ns.name => p.name.clone(),
            Some(p) => format!("{}.{}", p.namespace, p.name),
        };

        let ffi = FfiTypeWriter::new(ns.shared_library.clone(), self.opts.glib_library.clone());
        let library = ns.shared_library.clone().unwrap_or_default();
        let writer = BodyWriter::new(&ffi, &library, &ts_name, SelfKind::Object);

        let mut members: Vec<String> = Vec::new();

        // Widget metadata static.
        let meta_builder = ClassMetaBuilder::new(self.repo, self.registry, &self.opts.widget_root);
        let widget_meta = match meta_builder.add_to_class(class, &mut ctx)? {
            Some((text, meta)) => {
                members.push(text);
                Some(meta)
            }
            None => None,
        };

        // GObject type identity statics.
        if let Some(glib_type_name) = &class.glib_type_name {
            let mut ident = format!("  static readonly glibTypeName = \"{glib_type_name}\";");
            if let Some(get_type) = &class.glib_get_type {
                ident.push_str(&format!(
                    "\n  static readonly objectType = \"{get_type}\";"
                ));
            }
            members.push(ident);
        }

        let method_builder = MethodBuilder::new(self.mapper);

        // Main constructor plus factory constructors.
        if let Some(main) = selected.main {
            let structure = method_builder.build_constructor_structure(main, &mut ctx);
            members.push(writer.write_constructor(&structure, &mut ctx)?);
        }
        for factory in &selected.factories {
            let structure = method_builder.build_constructor_structure(factory, &mut ctx);
            members.push(writer.write_factory_method(&structure, &mut ctx)?);
        }

        // Signals: metadata table plus connect overload set.
        let signal_builder = SignalBuilder::new(self.mapper);
        let signal_metas = signal_builder.build_metas(class, &mut ctx);
        if let Some(text) = SignalBuilder::write_signal_meta_static(&signal_metas, &ffi) {
            members.push(text);
        }
        if let Some(text) = SignalBuilder::write_connect(&ts_name, &signal_metas, &mut ctx) {
            members.push(text);
        }

        // Instance methods.
        let structures = method_builder.build_structures(&class.methods, false, &mut ctx);
        if structures.iter().any(|m| m.finish.is_some()) {
            ctx.uses_gio_namespace = true;
        }
        for structure in &structures {
            members.push(writer.write_method(structure, &mut ctx)?);
        }

        // Static functions attached to the class.
        let static_builder = StaticFunctionBuilder::new(self.mapper);
        for structure in static_builder.build_structures(&class.static_functions, &mut ctx) {
            members.push(writer.write_method(&structure, &mut ctx)?);
        }

        let register = class.glib_type_name.is_some();
        if register {
            ctx.uses_register_native_class = true;
        }

        let identity = FileIdentity {
            type_name: &ts_name,
            namespace: &ns.name,
            parent: parent.clone(),
        };
        let import_block = imports::build_imports(&ctx, &identity, &self.opts.runtime_module);

        let mut source = String::new();
        if !import_block.is_empty() {
            source.push_str(&import_block);
            source.push('\n');
        }
        source.push_str(&format!("export class {ts_name} extends {extends} {{\n"));
        source.push_str(&members.join("\n\n"));
        if !members.is_empty() {
            source.push('\n');
        }
        source.push_str("}\n");
        if register {
            source.push_str(&format!("\nregisterNativeClass({ts_name});\n"));
        }

        debug!(
            class = %class.qualified_name,
            methods = structures.len(),
            signals = signal_metas.len(),
            widget = widget_meta.is_some(),
            "generated class"
        );

        Ok(ClassGenResult {
            success: true,
            skip_reason: None,
            file: Some(GeneratedFile {
                file_name: format!("{}.ts", naming::to_kebab_case(&ts_name)),
                source,
            }),
            widget_meta,
        })
    }
}
