//! Record generation — qualifying boxed records become wrapper classes over
//! a native handle, reusing the method machinery classes use.

use anyhow::Result;
use tracing::{debug, warn};

use crate::context::GenerationContext;
use crate::mapper::TypeMapper;
use crate::model::{Namespace, Record};
use crate::naming;
use crate::registry::TypeRegistry;
use crate::writers::body::{self, BodyWriter};
use crate::writers::ffi::{FfiTypeWriter, SelfKind};
use crate::writers::imports::{self, FileIdentity};

use super::GeneratedFile;
use super::class::{ClassGenResult, GenOptions};
use super::methods::MethodBuilder;

pub struct RecordGenerator<'a> {
    registry: &'a TypeRegistry,
    mapper: &'a TypeMapper<'a>,
    opts: &'a GenOptions,
}

impl<'a> RecordGenerator<'a> {
    pub fn new(
        registry: &'a TypeRegistry,
        mapper: &'a TypeMapper<'a>,
        opts: &'a GenOptions,
    ) -> Self {
        RecordGenerator {
            registry,
            mapper,
            opts,
        }
    }

    pub fn generate(&self, ns: &Namespace, record: &Record) -> Result<ClassGenResult> {
        let ts_name = self
            .registry
            .resolve(&record.qualified_name)
            .map(|e| e.transformed_name.clone())
            .unwrap_or_else(|| record.name.clone());

        let selected = body::select_constructors(&record.constructors);
        if !record.constructors.is_empty() && selected.main.is_none() {
            warn!(
                record = %record.qualified_name,
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
        ctx.uses_native_object = true;

        let ffi = FfiTypeWriter::new(ns.shared_library.clone(), self.opts.glib_library.clone());
        let library = ns.shared_library.clone().unwrap_or_default();
        let self_kind = SelfKind::Record {
            inner_type: record
                .glib_type_name
                .clone()
                .unwrap_or_else(|| record.name.clone()),
            lib: None,
        };
        let writer = BodyWriter::new(&ffi, &library, &ts_name, self_kind);

        let mut members: Vec<String> = Vec::new();

        if let Some(glib_type_name) = &record.glib_type_name {
            let mut ident = format!("  static readonly glibTypeName = \"{glib_type_name}\";");
            if let Some(get_type) = &record.glib_get_type {
                ident.push_str(&format!(
                    "\n  static readonly objectType = \"{get_type}\";"
                ));
            }
            members.push(ident);
        }

        let method_builder = MethodBuilder::new(self.mapper);
        if let Some(main) = selected.main {
            let structure = method_builder.build_constructor_structure(main, &mut ctx);
            members.push(writer.write_constructor(&structure, &mut ctx)?);
        }
        for factory in &selected.factories {
            let structure = method_builder.build_constructor_structure(factory, &mut ctx);
            members.push(writer.write_factory_method(&structure, &mut ctx)?);
        }

        let structures = method_builder.build_structures(&record.methods, false, &mut ctx);
        for structure in &structures {
            members.push(writer.write_method(structure, &mut ctx)?);
        }

        let register = record.glib_type_name.is_some();
        if register {
            ctx.uses_register_native_class = true;
        }

        let identity = FileIdentity {
            type_name: &ts_name,
            namespace: &ns.name,
            parent: None,
        };
        let import_block = imports::build_imports(&ctx, &identity, &self.opts.runtime_module);

        let mut source = String::new();
        if !import_block.is_empty() {
            source.push_str(&import_block);
            source.push('\n');
        }
        source.push_str(&format!("export class {ts_name} extends NativeObject {{\n"));
        source.push_str(&members.join("\n\n"));
        if !members.is_empty() {
            source.push('\n');
        }
        source.push_str("}\n");
        if register {
            source.push_str(&format!("\nregisterNativeClass({ts_name});\n"));
        }

        debug!(record = %record.qualified_name, methods = structures.len(), "generated record");

        Ok(ClassGenResult {
            success: true,
            skip_reason: None,
            file: Some(GeneratedFile {
                file_name: format!("{}.ts", naming::to_kebab_case(&ts_name)),
                source,
            }),
            widget_meta: None,
        })
    }
}
