//! Method builder — turns an arbitrary method list into renderable
//! structures: dedupes by native symbol, drops unsupported-callback methods,
//! and collapses `x_async`/`x_finish` pairs into single promise-returning
//! wrappers.

use std::collections::{BTreeMap, HashSet};

use tracing::{trace, warn};

use crate::context::GenerationContext;
use crate::mapper::{self, TypeMapper};
use crate::model::{Constructor, Function, Method, Parameter};
use crate::naming;
use crate::writers::body::{
    self, ConstructorStructure, FinishStructure, MethodStructure, ParamStructure,
};

pub struct MethodBuilder<'a> {
    mapper: &'a TypeMapper<'a>,
}

impl<'a> MethodBuilder<'a> {
    pub fn new(mapper: &'a TypeMapper<'a>) -> Self {
        MethodBuilder { mapper }
    }

    /// Build structures for a method list.
    ///
    /// Async pairing only fires when the finish counterpart is actually
    /// present in the same list; an `x_async` without its `x_finish` is left
    /// as a plain, non-wrapped call rather than being dropped.
    pub fn build_structures(
        &self,
        methods: &[Method],
        is_static: bool,
        ctx: &mut GenerationContext,
    ) -> Vec<MethodStructure> {
        // Dedupe by native symbol — the same cIdentifier appearing twice
        // collapses to one.
        let mut seen = HashSet::new();
        let deduped: Vec<&Method> = methods
            .iter()
            .filter(|m| {
                if seen.insert(m.c_identifier.clone()) {
                    true
                } else {
                    trace!(name = %m.name, symbol = %m.c_identifier, "skipping duplicate method");
                    false
                }
            })
            .collect();

        let by_name: BTreeMap<&str, &Method> =
            deduped.iter().map(|m| (m.name.as_str(), *m)).collect();

        // Names of finish methods consumed by an async sibling — dropped
        // from the output entirely.
        let consumed_finish: HashSet<&str> = deduped
            .iter()
            .filter(|m| m.is_async())
            .filter_map(|m| m.finish_method_name())
            .filter_map(|finish| {
                by_name
                    .get_key_value(finish.as_str())
                    .map(|(name, _)| *name)
            })
            .collect();

        let mut out = Vec::new();
        for method in &deduped {
            if consumed_finish.contains(method.name.as_str()) {
                continue;
            }
            if method
                .parameters
                .iter()
                .any(body::is_unsupported_parameter)
            {
                warn!(name = %method.name, "skipping method with unsupported callback parameter");
                continue;
            }

            let finish = if method.is_async() {
                method
                    .finish_method_name()
                    .and_then(|name| by_name.get(name.as_str()))
                    .map(|f| FinishStructure {
                        c_identifier: f.c_identifier.clone(),
                        return_mapped: self.mapper.map_type(&f.return_type, f.return_borrowed),
                        throws: f.throws,
                    })
            } else {
                None
            };

            let structure = self.build_structure(method, is_static, finish, ctx);
            out.push(structure);
        }
        out
    }

    fn build_structure(
        &self,
        method: &Method,
        is_static: bool,
        finish: Option<FinishStructure>,
        ctx: &mut GenerationContext,
    ) -> MethodStructure {
        let pairing = finish.is_some();
        let params = self.build_params(&method.parameters, pairing, ctx);

        let return_mapped = if let Some(f) = &finish {
            ctx.note_type(&f.return_mapped);
            f.return_mapped.clone()
        } else {
            let mapped = self.mapper.map_type(&method.return_type, method.return_borrowed);
            ctx.note_type(&mapped);
            mapped
        };

        let js_name = naming::escape_reserved(&naming::to_camel_case(&method.name));
        if js_name != method.name {
            ctx.method_renames
                .insert(method.name.clone(), js_name.clone());
        }

        MethodStructure {
            js_name,
            gir_name: method.name.clone(),
            c_identifier: method.c_identifier.clone(),
            is_static,
            params,
            return_mapped,
            throws: method.throws,
            finish,
        }
    }

    /// Map and name the visible parameters. For an async-paired method the
    /// ready callback disappears from the signature — the generated
    /// trampoline supplies it.
    pub fn build_params(
        &self,
        parameters: &[Parameter],
        drop_async_callback: bool,
        ctx: &mut GenerationContext,
    ) -> Vec<ParamStructure> {
        body::filter_parameters(parameters)
            .into_iter()
            .filter(|p| !(drop_async_callback && p.ty.name == mapper::ASYNC_READY_CALLBACK))
            .map(|p| {
                let mapped = self.mapper.map_parameter(p);
                ctx.note_type(&mapped);
                ParamStructure {
                    js_name: body::to_js_param_name(&p.name),
                    nullable: TypeMapper::is_nullable(p),
                    optional: p.optional,
                    mapped,
                }
            })
            .collect()
    }

    /// Build the renderable structure for one constructor, named by GIR
    /// convention (`new_with_label` → `newWithLabel`).
    pub fn build_constructor_structure(
        &self,
        ctor: &Constructor,
        ctx: &mut GenerationContext,
    ) -> ConstructorStructure {
        let params = self.build_params(&ctor.parameters, false, ctx);
        ConstructorStructure {
            js_name: naming::escape_reserved(&naming::to_camel_case(&ctor.name)),
            c_identifier: ctor.c_identifier.clone(),
            params,
            return_mapped: self.mapper.map_type(&ctor.return_type, false),
            throws: ctor.throws,
        }
    }
}

/// View a namespace-scope function as a method for structure building.
pub fn function_as_method(f: &Function) -> Method {
    Method {
        name: f.name.clone(),
        c_identifier: f.c_identifier.clone(),
        return_type: f.return_type.clone(),
        return_borrowed: f.return_borrowed,
        parameters: f.parameters.clone(),
        throws: f.throws,
        finish_func: f.finish_func.clone(),
    }
}
