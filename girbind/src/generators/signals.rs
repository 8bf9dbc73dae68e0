//! Signal builder — collects a class's own signals (inheritance is
//! surfaced separately through the parent chain), builds the per-signal
//! metadata entries for the runtime widget-meta table, and renders the
//! `connect` overload set.

use crate::context::GenerationContext;
use crate::mapper::{MappedType, TypeMapper};
use crate::model::Class;
use crate::writers::body;
use crate::writers::ffi::FfiTypeWriter;

/// Metadata entry for one signal, consumed by the runtime at connect time.
#[derive(Debug, Clone)]
pub struct SignalMeta {
    pub name: String,
    pub params: Vec<SignalParam>,
    /// `None` for void-returning signals.
    pub return_mapped: Option<MappedType>,
}

#[derive(Debug, Clone)]
pub struct SignalParam {
    pub js_name: String,
    pub mapped: MappedType,
}

pub struct SignalBuilder<'a> {
    mapper: &'a TypeMapper<'a>,
}

impl<'a> SignalBuilder<'a> {
    pub fn new(mapper: &'a TypeMapper<'a>) -> Self {
        SignalBuilder { mapper }
    }

    /// Build metadata entries for the class's own signals only.
    pub fn build_metas(&self, class: &Class, ctx: &mut GenerationContext) -> Vec<SignalMeta> {
        class
            .signals
            .iter()
            .map(|signal| {
                let params = body::filter_parameters(&signal.parameters)
                    .into_iter()
                    .map(|p| {
                        let mapped = self.mapper.map_parameter(p);
                        ctx.note_signal_type(&mapped);
                        SignalParam {
                            js_name: body::to_js_param_name(&p.name),
                            mapped,
                        }
                    })
                    .collect();
                let return_mapped = if signal.return_type.is_void() {
                    None
                } else {
                    let mapped = self.mapper.map_type(&signal.return_type, true);
                    ctx.note_signal_type(&mapped);
                    Some(mapped)
                };
                SignalMeta {
                    name: signal.name.clone(),
                    params,
                    return_mapped,
                }
            })
            .collect()
    }

    /// The `static readonly SIGNAL_META` table the runtime resolves signal
    /// marshalling from.
    pub fn write_signal_meta_static(metas: &[SignalMeta], ffi: &FfiTypeWriter) -> Option<String> {
        if metas.is_empty() {
            return None;
        }
        let mut out = String::from("  static readonly SIGNAL_META = [\n");
        for meta in metas {
            let params: Vec<String> = meta
                .params
                .iter()
                .map(|p| ffi.write(&p.mapped.ffi))
                .collect();
            out.push_str(&format!(
                "    {{ name: \"{}\", params: [{}]",
                meta.name,
                params.join(", ")
            ));
            if let Some(ret) = &meta.return_mapped {
                out.push_str(&format!(", returnType: {}", ffi.write(&ret.ffi)));
            }
            out.push_str(" },\n");
        }
        out.push_str("  ];");
        Some(out)
    }

    /// The `connect` member: one literal-string overload per known signal
    /// (handler takes self plus the signal's parameters), a generic fallback
    /// overload for dynamically-named signals, and the implementation
    /// resolving metadata at call time.
    pub fn write_connect(
        class_ts_name: &str,
        metas: &[SignalMeta],
        ctx: &mut GenerationContext,
    ) -> Option<String> {
        if metas.is_empty() {
            return None;
        }
        ctx.uses_resolve_signal_meta = true;

        let mut out = String::new();
        for meta in metas {
            let mut handler_params = vec![format!("self: {class_ts_name}")];
            for p in &meta.params {
                handler_params.push(format!("{}: {}", p.js_name, p.mapped.ts));
            }
            let return_ts = meta
                .return_mapped
                .as_ref()
                .map(|m| m.ts.clone())
                .unwrap_or_else(|| "void".to_string());
            out.push_str(&format!(
                "  connect(signal: \"{}\", handler: ({}) => {return_ts}): number;\n",
                meta.name,
                handler_params.join(", ")
            ));
        }
        out.push_str(
            "  connect(signal: string, handler: (...args: unknown[]) => unknown): number;\n",
        );
        out.push_str(
            "  connect(signal: string, handler: (...args: unknown[]) => unknown): number {\n",
        );
        out.push_str(&format!(
            "    return resolveSignalMeta({class_ts_name}, this, signal, handler);\n"
        ));
        out.push_str("  }");
        Some(out)
    }
}
