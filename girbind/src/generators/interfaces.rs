//! Interface generation — TypeScript `interface` declarations with
//! camelCased method signatures, consumed through type-only imports.

use anyhow::Result;
use tracing::debug;

use crate::context::GenerationContext;
use crate::mapper::{FfiType, TypeMapper};
use crate::model::{Interface, Namespace};
use crate::naming;
use crate::writers::imports::{self, FileIdentity};

use super::GeneratedFile;
use super::class::GenOptions;
use super::methods::MethodBuilder;

pub struct InterfaceGenerator<'a> {
    mapper: &'a TypeMapper<'a>,
    opts: &'a GenOptions,
}

impl<'a> InterfaceGenerator<'a> {
    pub fn new(mapper: &'a TypeMapper<'a>, opts: &'a GenOptions) -> Self {
        InterfaceGenerator { mapper, opts }
    }

    pub fn generate(&self, ns: &Namespace, iface: &Interface) -> Result<GeneratedFile> {
        let mut ctx = GenerationContext::new();
        let method_builder = MethodBuilder::new(self.mapper);
        let structures = method_builder.build_structures(&iface.methods, false, &mut ctx);

        let mut members: Vec<String> = Vec::new();
        for m in &structures {
            let params: Vec<String> = m
                .params
                .iter()
                .map(|p| {
                    if p.nullable {
                        format!("{}: {} | null", p.js_name, p.mapped.ts)
                    } else {
                        format!("{}: {}", p.js_name, p.mapped.ts)
                    }
                })
                .collect();
            let return_ts = if m.finish.is_some() {
                format!("Promise<{}>", m.return_mapped.ts)
            } else if matches!(m.return_mapped.ffi, FfiType::Undefined) {
                "void".to_string()
            } else {
                m.return_mapped.ts.clone()
            };
            members.push(format!(
                "  {}({}): {return_ts};",
                m.js_name,
                params.join(", ")
            ));
        }

        // A declaration file calls nothing — no body writer ran, so only
        // type-level usage landed in the context.
        let identity = FileIdentity {
            type_name: &iface.name,
            namespace: &ns.name,
            parent: None,
        };
        let import_block = imports::build_imports(&ctx, &identity, &self.opts.runtime_module);

        let mut source = String::new();
        if !import_block.is_empty() {
            source.push_str(&import_block);
            source.push('\n');
        }
        source.push_str(&format!("export interface {} {{\n", iface.name));
        source.push_str(&members.join("\n"));
        if !members.is_empty() {
            source.push('\n');
        }
        source.push_str("}\n");

        debug!(interface = %iface.qualified_name, methods = structures.len(), "generated interface");

        Ok(GeneratedFile {
            file_name: format!("{}.ts", naming::to_kebab_case(&iface.name)),
            source,
        })
    }
}
