//! FFI type writer — converts an [`FfiType`] descriptor into the emittable
//! TypeScript object literal matching the runtime's marshalling contract.
//!
//! The literal shapes are a fixed wire format; tests assert them
//! byte-for-byte.

use anyhow::Result;

use crate::mapper::{FfiType, Ownership};

/// Which descriptor the synthetic `self` argument of an instance method
/// uses.
#[derive(Debug, Clone)]
pub enum SelfKind {
    /// Plain GObject instance (the default).
    Object,
    /// GParamSpec instance.
    ParamSpec,
    /// Boxed record instance; `lib` overrides the writer's shared library
    /// when set.
    Record {
        inner_type: String,
        lib: Option<String>,
    },
}

/// Stateless-per-call literal writer, configured once per generation unit.
///
/// `glib_library` is required for GError descriptors — construction-time
/// configuration instead of a mutable setter keeps interleaved writers from
/// observing each other's state.
#[derive(Debug, Clone)]
pub struct FfiTypeWriter {
    shared_library: Option<String>,
    glib_library: Option<String>,
}

impl FfiTypeWriter {
    pub fn new(shared_library: Option<String>, glib_library: Option<String>) -> Self {
        FfiTypeWriter {
            shared_library,
            glib_library,
        }
    }

    /// Write a descriptor as its TypeScript object literal.
    pub fn write(&self, ffi: &FfiType) -> String {
        match ffi {
            FfiType::Undefined => r#"{ type: "undefined" }"#.to_string(),
            FfiType::Null => r#"{ type: "null" }"#.to_string(),
            FfiType::Boolean => r#"{ type: "boolean" }"#.to_string(),
            FfiType::Int { size, unsigned } => {
                format!(r#"{{ type: "int", size: {size}, unsigned: {unsigned} }}"#)
            }
            FfiType::Float { size } => format!(r#"{{ type: "float", size: {size} }}"#),
            FfiType::String { ownership } => {
                format!(r#"{{ type: "string", ownership: "{}" }}"#, ownership.as_str())
            }
            FfiType::GObject { ownership } => {
                format!(r#"{{ type: "gobject", ownership: "{}" }}"#, ownership.as_str())
            }
            FfiType::GParam { ownership } => {
                format!(r#"{{ type: "gparam", ownership: "{}" }}"#, ownership.as_str())
            }
            FfiType::GVariant { ownership } => {
                format!(r#"{{ type: "gvariant", ownership: "{}" }}"#, ownership.as_str())
            }
            FfiType::Boxed {
                ownership,
                inner_type,
                lib,
                get_type_fn,
            } => {
                let lib = lib.as_deref().unwrap_or("");
                let mut out = format!(
                    r#"{{ type: "boxed", ownership: "{}", innerType: "{inner_type}", lib: "{lib}""#,
                    ownership.as_str()
                );
                if let Some(get_type_fn) = get_type_fn {
                    out.push_str(&format!(r#", getTypeFn: "{get_type_fn}""#));
                }
                out.push_str(" }");
                out
            }
            FfiType::Struct {
                ownership,
                inner_type,
            } => format!(
                r#"{{ type: "struct", ownership: "{}", innerType: "{inner_type}" }}"#,
                ownership.as_str()
            ),
            FfiType::Ref { inner } => {
                format!(r#"{{ type: "ref", innerType: {} }}"#, self.write(inner))
            }
            FfiType::Array {
                item,
                list_type,
                ownership,
            } => match item {
                Some(item) => format!(
                    r#"{{ type: "array", itemType: {}, listType: "{}", ownership: "{}" }}"#,
                    self.write(item),
                    list_type.as_str(),
                    ownership.as_str()
                ),
                None => format!(
                    r#"{{ type: "array", listType: "{}", ownership: "{}" }}"#,
                    list_type.as_str(),
                    ownership.as_str()
                ),
            },
            FfiType::Callback { trampoline } => {
                format!(r#"{{ type: "callback", trampoline: "{trampoline}" }}"#)
            }
            FfiType::AsyncCallback => r#"{ type: "asyncCallback" }"#.to_string(),
        }
    }

    /// The fixed `ref(boxed GError)` descriptor every throwing call passes
    /// as its trailing argument. Fails loudly when no GLib library was
    /// configured — generating a throwing call without one is a
    /// configuration error, not a recoverable condition.
    pub fn gerror_ref_descriptor(&self) -> Result<FfiType> {
        let Some(glib) = &self.glib_library else {
            anyhow::bail!("glib_library must be set to generate throwing calls (GError descriptors)");
        };
        Ok(FfiType::Ref {
            inner: Box::new(FfiType::Boxed {
                ownership: Ownership::Full,
                inner_type: "GError".to_string(),
                lib: Some(glib.clone()),
                get_type_fn: None,
            }),
        })
    }

    /// The full error argument literal for a throwing call.
    pub fn error_argument(&self) -> Result<String> {
        let descriptor = self.gerror_ref_descriptor()?;
        Ok(format!("{{ type: {}, value: error }}", self.write(&descriptor)))
    }

    /// Descriptor for the synthetic `self` argument of instance methods.
    /// Self is always borrowed — the callee never takes ownership of the
    /// receiver.
    pub fn self_argument(&self, kind: &SelfKind) -> FfiType {
        match kind {
            SelfKind::Object => FfiType::GObject {
                ownership: Ownership::None,
            },
            SelfKind::ParamSpec => FfiType::GParam {
                ownership: Ownership::None,
            },
            SelfKind::Record { inner_type, lib } => FfiType::Boxed {
                ownership: Ownership::None,
                inner_type: inner_type.clone(),
                lib: lib.clone().or_else(|| self.shared_library.clone()),
                get_type_fn: None,
            },
        }
    }

    pub fn shared_library(&self) -> Option<&str> {
        self.shared_library.as_deref()
    }
}
