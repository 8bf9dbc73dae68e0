//! Call expression builder — assembles the structured `call(...)` site text.
//!
//! Argument order is positional with the synthetic self argument always
//! first when present. Non-primitive argument values are rewritten through a
//! null-safe coalesce so either a wrapper instance or a raw numeric handle
//! may be passed.

use crate::mapper::{FfiType, MappedType};
use crate::writers::ffi::FfiTypeWriter;

/// One positional call argument.
#[derive(Debug, Clone)]
pub struct CallArg {
    pub ffi: FfiType,
    pub value: String,
    pub optional: bool,
}

impl CallArg {
    pub fn new(ffi: FfiType, value: impl Into<String>) -> Self {
        CallArg {
            ffi,
            value: value.into(),
            optional: false,
        }
    }

    pub fn optional(ffi: FfiType, value: impl Into<String>) -> Self {
        CallArg {
            ffi,
            value: value.into(),
            optional: true,
        }
    }
}

/// Builds `call(...)` expressions and the post-call error check.
#[derive(Debug)]
pub struct CallExpressionBuilder<'w> {
    ffi_writer: &'w FfiTypeWriter,
}

impl<'w> CallExpressionBuilder<'w> {
    pub fn new(ffi_writer: &'w FfiTypeWriter) -> Self {
        CallExpressionBuilder { ffi_writer }
    }

    /// The expression text for one argument's `value` slot. Wrapper-backed
    /// kinds extract the native id, tolerating raw numeric handles.
    pub fn argument_value(mapped: &MappedType, js_name: &str) -> String {
        match &mapped.ffi {
            FfiType::GObject { .. }
            | FfiType::GParam { .. }
            | FfiType::GVariant { .. }
            | FfiType::Boxed { .. }
            | FfiType::Struct { .. } => format!("({js_name} as any)?.id ?? {js_name}"),
            _ => js_name.to_string(),
        }
    }

    /// Build the complete call-site expression. `args` must already have the
    /// self argument first when one exists.
    pub fn build(
        &self,
        library: &str,
        c_identifier: &str,
        args: &[CallArg],
        return_type: &FfiType,
    ) -> String {
        let rendered: Vec<String> = args
            .iter()
            .map(|arg| {
                if arg.optional {
                    format!(
                        "{{ type: {}, value: {}, optional: true }}",
                        self.ffi_writer.write(&arg.ffi),
                        arg.value
                    )
                } else {
                    format!(
                        "{{ type: {}, value: {} }}",
                        self.ffi_writer.write(&arg.ffi),
                        arg.value
                    )
                }
            })
            .collect();
        format!(
            r#"call("{library}", "{c_identifier}", [{}], {})"#,
            rendered.join(", "),
            self.ffi_writer.write(return_type)
        )
    }

    /// The fixed post-call check emitted after every throwing call.
    /// `indent` is the body indentation of the surrounding statement.
    pub fn error_check(indent: &str) -> String {
        format!(
            "{indent}if (error.value !== null) {{\n{indent}  throw new NativeError(error.value);\n{indent}}}"
        )
    }

    /// The error-slot allocation statement preceding a throwing call.
    pub fn error_slot(indent: &str) -> String {
        format!("{indent}const error = {{ value: null as unknown }};")
    }
}
