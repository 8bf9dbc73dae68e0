//! Method body writer — orchestrates the per-callable emission: parameter
//! filtering, constructor selection, naming, wrap-strategy classification
//! and assembly of the final callable text.

use crate::context::GenerationContext;
use crate::mapper::{self, FfiType, MappedType, Ownership, TypeMapper};
use crate::model::{Constructor, Parameter};
use crate::naming;
use crate::writers::call::{CallArg, CallExpressionBuilder};
use crate::writers::ffi::{FfiTypeWriter, SelfKind};

/// One generated-signature parameter.
#[derive(Debug, Clone)]
pub struct ParamStructure {
    pub js_name: String,
    pub mapped: MappedType,
    pub nullable: bool,
    pub optional: bool,
}

/// The paired finish half of an async method.
#[derive(Debug, Clone)]
pub struct FinishStructure {
    pub c_identifier: String,
    pub return_mapped: MappedType,
    pub throws: bool,
}

/// A fully assembled method ready for rendering.
#[derive(Debug, Clone)]
pub struct MethodStructure {
    pub js_name: String,
    pub gir_name: String,
    pub c_identifier: String,
    pub is_static: bool,
    pub params: Vec<ParamStructure>,
    pub return_mapped: MappedType,
    pub throws: bool,
    /// `Some` turns the method into a promise-returning async wrapper.
    pub finish: Option<FinishStructure>,
}

/// A constructor, either the class's native constructor or a static factory.
#[derive(Debug, Clone)]
pub struct ConstructorStructure {
    pub js_name: String,
    pub c_identifier: String,
    pub params: Vec<ParamStructure>,
    pub return_mapped: MappedType,
    pub throws: bool,
}

/// Result of splitting a class's declared constructors.
#[derive(Debug)]
pub struct SelectedConstructors<'a> {
    /// The class's native constructor — first declared constructor with no
    /// unsupported parameter. `None` when every constructor is unsupported;
    /// the caller must surface that as a generation failure.
    pub main: Option<&'a Constructor>,
    /// Remaining supported constructors, emitted as static factories.
    pub factories: Vec<&'a Constructor>,
    pub unsupported: Vec<&'a Constructor>,
}

/// Drop variadic markers and the user-data/destroy-notify parameters that
/// collapse into their owning callback. Original indices are preserved for
/// closure-target checks.
pub fn filter_parameters(params: &[Parameter]) -> Vec<&Parameter> {
    params
        .iter()
        .enumerate()
        .filter(|(i, p)| {
            !p.is_variadic_marker()
                && !TypeMapper::is_closure_target(*i, params)
                && !TypeMapper::is_destroy_target(*i, params)
        })
        .map(|(_, p)| p)
        .collect()
}

/// Any out/inout parameter means the generated signature takes wrapped
/// references.
pub fn has_ref_parameter(params: &[Parameter]) -> bool {
    params.iter().any(|p| p.is_out())
}

/// True when a parameter cannot be marshalled at all (GLib.Closure) and the
/// owning callable must be dropped.
pub fn is_unsupported_parameter(param: &Parameter) -> bool {
    mapper::is_unsupported_callback_type(&param.ty)
}

fn constructor_is_supported(ctor: &Constructor) -> bool {
    !ctor.parameters.iter().any(|p| {
        is_unsupported_parameter(p) || p.ty.name == mapper::ASYNC_READY_CALLBACK
    })
}

/// Pick the class's main constructor and partition the rest.
pub fn select_constructors(ctors: &[Constructor]) -> SelectedConstructors<'_> {
    let mut main = None;
    let mut factories = Vec::new();
    let mut unsupported = Vec::new();
    for ctor in ctors {
        if !constructor_is_supported(ctor) {
            unsupported.push(ctor);
        } else if main.is_none() {
            main = Some(ctor);
        } else {
            factories.push(ctor);
        }
    }
    SelectedConstructors {
        main,
        factories,
        unsupported,
    }
}

/// Result variable name, avoiding shadowing a parameter that camelCases to
/// `result`.
pub fn result_var_name(params: &[ParamStructure]) -> &'static str {
    if params.iter().any(|p| p.js_name == "result") {
        "_result"
    } else {
        "result"
    }
}

/// Renders complete class members from assembled structures.
pub struct BodyWriter<'w> {
    ffi: &'w FfiTypeWriter,
    library: String,
    /// TypeScript name of the type being generated.
    class_name: String,
    self_kind: SelfKind,
}

impl<'w> BodyWriter<'w> {
    pub fn new(
        ffi: &'w FfiTypeWriter,
        library: impl Into<String>,
        class_name: impl Into<String>,
        self_kind: SelfKind,
    ) -> Self {
        BodyWriter {
            ffi,
            library: library.into(),
            class_name: class_name.into(),
            self_kind,
        }
    }

    fn param_list(params: &[ParamStructure]) -> String {
        params
            .iter()
            .map(|p| {
                if p.nullable {
                    format!("{}: {} | null", p.js_name, p.mapped.ts)
                } else {
                    format!("{}: {}", p.js_name, p.mapped.ts)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn call_args(
        &self,
        is_static: bool,
        params: &[ParamStructure],
        ctx: &mut GenerationContext,
    ) -> Vec<CallArg> {
        let mut args = Vec::new();
        if !is_static {
            args.push(CallArg::new(self.ffi.self_argument(&self.self_kind), "this.id"));
        }
        for p in params {
            ctx.uses_ref |= matches!(p.mapped.ffi, FfiType::Ref { .. });
            let value = CallExpressionBuilder::argument_value(&p.mapped, &p.js_name);
            if p.optional {
                args.push(CallArg::optional(p.mapped.ffi.clone(), value));
            } else {
                args.push(CallArg::new(p.mapped.ffi.clone(), value));
            }
        }
        args
    }

    /// How a raw call result is typed before wrapping.
    fn raw_cast(mapped: &MappedType) -> Option<String> {
        if matches!(mapped.ffi, FfiType::Undefined) {
            return None;
        }
        if mapped.needs_array_item_wrap() {
            return Some("number[]".to_string());
        }
        if mapped.needs_gobject_wrap()
            || mapped.needs_interface_wrap()
            || mapped.needs_boxed_wrap()
            || mapped.needs_gvariant_wrap()
        {
            return Some("number".to_string());
        }
        Some(mapped.ts.clone())
    }

    /// The expression a wrapped (or plain) result is returned through.
    fn return_expr(mapped: &MappedType, var: &str, ctx: &mut GenerationContext) -> String {
        if mapped.needs_array_item_wrap() {
            let elem_ts = mapped.ts.trim_end_matches("[]");
            let item_expr = Self::item_wrap_expr(mapped, elem_ts, "item", ctx);
            return format!("{var}.map((item) => {item_expr})");
        }
        if mapped.needs_gvariant_wrap() {
            ctx.uses_variant = true;
            return format!("new Variant({var})");
        }
        if mapped.needs_interface_wrap() {
            ctx.uses_get_native_object = true;
            return format!("getNativeObject({var}, null) as unknown as {}", mapped.ts);
        }
        if mapped.needs_gobject_wrap() || mapped.needs_boxed_wrap() {
            ctx.uses_get_native_object = true;
            if mapped.ts == "unknown" {
                return format!("getNativeObject({var}, null)");
            }
            return format!("getNativeObject({var}, {0}) as {0}", mapped.ts);
        }
        var.to_string()
    }

    fn item_wrap_expr(
        mapped: &MappedType,
        elem_ts: &str,
        var: &str,
        ctx: &mut GenerationContext,
    ) -> String {
        let FfiType::Array { item: Some(item), .. } = &mapped.ffi else {
            return var.to_string();
        };
        match item.as_ref() {
            FfiType::GVariant { .. } => {
                ctx.uses_variant = true;
                format!("new Variant({var})")
            }
            FfiType::GObject { .. } if mapped.kind == Some(mapper::MappedKind::Interface) => {
                ctx.uses_get_native_object = true;
                format!("getNativeObject({var}, null) as unknown as {elem_ts}")
            }
            FfiType::GObject { .. } | FfiType::Boxed { .. } | FfiType::Struct { .. } => {
                ctx.uses_get_native_object = true;
                if elem_ts == "unknown" {
                    format!("getNativeObject({var}, null)")
                } else {
                    format!("getNativeObject({var}, {elem_ts}) as {elem_ts}")
                }
            }
            _ => var.to_string(),
        }
    }

    /// Render an instance method, static function, or async wrapper as a
    /// complete class member.
    pub fn write_method(
        &self,
        m: &MethodStructure,
        ctx: &mut GenerationContext,
    ) -> anyhow::Result<String> {
        if let Some(finish) = &m.finish {
            return self.write_async_method(m, finish, ctx);
        }

        ctx.uses_call = true;
        let builder = CallExpressionBuilder::new(self.ffi);
        let mut args = self.call_args(m.is_static, &m.params, ctx);
        if m.throws {
            ctx.uses_native_error = true;
            args.push(CallArg::new(self.ffi.gerror_ref_descriptor()?, "error"));
        }
        let call_expr = builder.build(&self.library, &m.c_identifier, &args, &m.return_mapped.ffi);

        let static_kw = if m.is_static { "static " } else { "" };
        let return_ts = if matches!(m.return_mapped.ffi, FfiType::Undefined) {
            "void".to_string()
        } else {
            m.return_mapped.ts.clone()
        };

        let mut out = format!(
            "  {static_kw}{}({}): {return_ts} {{\n",
            m.js_name,
            Self::param_list(&m.params)
        );
        let ind = "    ";
        if m.throws {
            out.push_str(&CallExpressionBuilder::error_slot(ind));
            out.push('\n');
        }
        match Self::raw_cast(&m.return_mapped) {
            None => {
                out.push_str(&format!("{ind}{call_expr};\n"));
                if m.throws {
                    out.push_str(&CallExpressionBuilder::error_check(ind));
                    out.push('\n');
                }
            }
            Some(cast) => {
                let var = result_var_name(&m.params);
                out.push_str(&format!("{ind}const {var} = {call_expr} as {cast};\n"));
                if m.throws {
                    out.push_str(&CallExpressionBuilder::error_check(ind));
                    out.push('\n');
                }
                let expr = Self::return_expr(&m.return_mapped, var, ctx);
                out.push_str(&format!("{ind}return {expr};\n"));
            }
        }
        out.push_str("  }");
        Ok(out)
    }

    /// Render an `x_async`/`x_finish` pair as one promise-returning wrapper.
    fn write_async_method(
        &self,
        m: &MethodStructure,
        finish: &FinishStructure,
        ctx: &mut GenerationContext,
    ) -> anyhow::Result<String> {
        ctx.uses_call = true;
        let builder = CallExpressionBuilder::new(self.ffi);

        // The finish call runs inside the async-ready trampoline, receiving
        // the raw AsyncResult handle.
        let mut finish_args = Vec::new();
        if !m.is_static {
            finish_args.push(CallArg::new(self.ffi.self_argument(&self.self_kind), "this.id"));
        }
        finish_args.push(CallArg::new(
            FfiType::GObject {
                ownership: Ownership::None,
            },
            "res",
        ));
        if finish.throws {
            ctx.uses_native_error = true;
            finish_args.push(CallArg::new(self.ffi.gerror_ref_descriptor()?, "error"));
        }
        let finish_call = builder.build(
            &self.library,
            &finish.c_identifier,
            &finish_args,
            &finish.return_mapped.ffi,
        );

        // Inner trampoline body.
        let mut inner = String::new();
        let iind = "          ";
        if finish.throws {
            inner.push_str(&CallExpressionBuilder::error_slot(iind));
            inner.push('\n');
        }
        match Self::raw_cast(&finish.return_mapped) {
            None => {
                inner.push_str(&format!("{iind}{finish_call};\n"));
                if finish.throws {
                    inner.push_str(&CallExpressionBuilder::error_check(iind));
                    inner.push('\n');
                }
                inner.push_str(&format!("{iind}resolve();\n"));
            }
            Some(cast) => {
                inner.push_str(&format!("{iind}const result = {finish_call} as {cast};\n"));
                if finish.throws {
                    inner.push_str(&CallExpressionBuilder::error_check(iind));
                    inner.push('\n');
                }
                let expr = Self::return_expr(&finish.return_mapped, "result", ctx);
                inner.push_str(&format!("{iind}resolve({expr});\n"));
            }
        }

        let trampoline = format!(
            "{{ type: {{ type: \"asyncCallback\" }}, value: (_sourceObject: unknown, res: number) => {{\n        try {{\n{inner}        }} catch (e) {{\n          reject(e);\n        }}\n      }} }}"
        );

        // Outer async call: self + visible params + trampoline.
        let mut rendered: Vec<String> = Vec::new();
        for arg in self.call_args(m.is_static, &m.params, ctx) {
            if arg.optional {
                rendered.push(format!(
                    "{{ type: {}, value: {}, optional: true }}",
                    self.ffi.write(&arg.ffi),
                    arg.value
                ));
            } else {
                rendered.push(format!(
                    "{{ type: {}, value: {} }}",
                    self.ffi.write(&arg.ffi),
                    arg.value
                ));
            }
        }
        rendered.push(trampoline);

        let promise_ts = if matches!(finish.return_mapped.ffi, FfiType::Undefined) {
            "Promise<void>".to_string()
        } else {
            format!("Promise<{}>", finish.return_mapped.ts)
        };

        let static_kw = if m.is_static { "static " } else { "" };
        let mut out = format!(
            "  {static_kw}{}({}): {promise_ts} {{\n",
            m.js_name,
            Self::param_list(&m.params)
        );
        out.push_str("    return new Promise((resolve, reject) => {\n");
        out.push_str(&format!(
            "      call(\"{}\", \"{}\", [{}], {{ type: \"undefined\" }});\n",
            self.library,
            m.c_identifier,
            rendered.join(", ")
        ));
        out.push_str("    });\n");
        out.push_str("  }");
        Ok(out)
    }

    /// Render the class's native constructor. The allocation call's raw
    /// handle feeds the base-class constructor.
    pub fn write_constructor(
        &self,
        c: &ConstructorStructure,
        ctx: &mut GenerationContext,
    ) -> anyhow::Result<String> {
        ctx.uses_call = true;
        let builder = CallExpressionBuilder::new(self.ffi);
        let mut args = self.call_args(true, &c.params, ctx);
        if c.throws {
            ctx.uses_native_error = true;
            args.push(CallArg::new(self.ffi.gerror_ref_descriptor()?, "error"));
        }
        let call_expr = builder.build(&self.library, &c.c_identifier, &args, &c.return_mapped.ffi);

        let mut out = format!("  constructor({}) {{\n", Self::param_list(&c.params));
        let ind = "    ";
        if c.throws {
            out.push_str(&CallExpressionBuilder::error_slot(ind));
            out.push('\n');
            out.push_str(&format!("{ind}const id = {call_expr} as number;\n"));
            out.push_str(&CallExpressionBuilder::error_check(ind));
            out.push('\n');
            out.push_str(&format!("{ind}super(id);\n"));
        } else {
            out.push_str(&format!("{ind}super({call_expr} as number);\n"));
        }
        out.push_str("  }");
        Ok(out)
    }

    /// Render a non-main supported constructor as a static factory method.
    pub fn write_factory_method(
        &self,
        c: &ConstructorStructure,
        ctx: &mut GenerationContext,
    ) -> anyhow::Result<String> {
        ctx.uses_call = true;
        ctx.uses_get_native_object = true;
        let builder = CallExpressionBuilder::new(self.ffi);
        let mut args = self.call_args(true, &c.params, ctx);
        if c.throws {
            ctx.uses_native_error = true;
            args.push(CallArg::new(self.ffi.gerror_ref_descriptor()?, "error"));
        }
        let call_expr = builder.build(&self.library, &c.c_identifier, &args, &c.return_mapped.ffi);

        let name = &self.class_name;
        let mut out = format!(
            "  static {}({}): {name} {{\n",
            c.js_name,
            Self::param_list(&c.params)
        );
        let ind = "    ";
        if c.throws {
            out.push_str(&CallExpressionBuilder::error_slot(ind));
            out.push('\n');
        }
        let var = result_var_name(&c.params);
        out.push_str(&format!("{ind}const {var} = {call_expr} as number;\n"));
        if c.throws {
            out.push_str(&CallExpressionBuilder::error_check(ind));
            out.push('\n');
        }
        out.push_str(&format!("{ind}return getNativeObject({var}, {name}) as {name};\n"));
        out.push_str("  }");
        Ok(out)
    }
}

/// GIR snake_case → generated camelCase with reserved-word escaping.
pub fn to_js_param_name(name: &str) -> String {
    naming::to_js_param_name(name)
}
