//! Writer contracts: the exact FFI literal shapes, the GError descriptor,
//! call-site text, argument-value extraction, and the body-writer helpers.

use girbind::mapper::{FfiType, ListType, MappedType, Ownership};
use girbind::model::{Constructor, Direction, Parameter, Transfer, TypeRef};
use girbind::writers::body::{self, ParamStructure};
use girbind::writers::call::{CallArg, CallExpressionBuilder};
use girbind::writers::ffi::{FfiTypeWriter, SelfKind};

fn writer() -> FfiTypeWriter {
    FfiTypeWriter::new(
        Some("libgtk-4.so.1".to_string()),
        Some("libglib-2.0.so.0".to_string()),
    )
}

#[test]
fn literal_shapes_match_the_contract() {
    let w = writer();
    assert_eq!(
        w.write(&FfiType::Int {
            size: 32,
            unsigned: false
        }),
        r#"{ type: "int", size: 32, unsigned: false }"#
    );
    assert_eq!(
        w.write(&FfiType::Float { size: 64 }),
        r#"{ type: "float", size: 64 }"#
    );
    assert_eq!(
        w.write(&FfiType::String {
            ownership: Ownership::None
        }),
        r#"{ type: "string", ownership: "none" }"#
    );
    assert_eq!(w.write(&FfiType::Boolean), r#"{ type: "boolean" }"#);
    assert_eq!(w.write(&FfiType::Undefined), r#"{ type: "undefined" }"#);
    assert_eq!(
        w.write(&FfiType::GObject {
            ownership: Ownership::Full
        }),
        r#"{ type: "gobject", ownership: "full" }"#
    );
    assert_eq!(
        w.write(&FfiType::GParam {
            ownership: Ownership::None
        }),
        r#"{ type: "gparam", ownership: "none" }"#
    );
    assert_eq!(
        w.write(&FfiType::GVariant {
            ownership: Ownership::Container
        }),
        r#"{ type: "gvariant", ownership: "container" }"#
    );
    assert_eq!(w.write(&FfiType::AsyncCallback), r#"{ type: "asyncCallback" }"#);
    assert_eq!(
        w.write(&FfiType::Callback {
            trampoline: "closure".to_string()
        }),
        r#"{ type: "callback", trampoline: "closure" }"#
    );
}

#[test]
fn boxed_literal_with_and_without_get_type_fn() {
    let w = writer();
    let plain = FfiType::Boxed {
        ownership: Ownership::Full,
        inner_type: "GdkRGBA".to_string(),
        lib: Some("libgtk-4.so.1".to_string()),
        get_type_fn: None,
    };
    assert_eq!(
        w.write(&plain),
        r#"{ type: "boxed", ownership: "full", innerType: "GdkRGBA", lib: "libgtk-4.so.1" }"#
    );

    let with_fn = FfiType::Boxed {
        ownership: Ownership::Full,
        inner_type: "GdkRGBA".to_string(),
        lib: Some("libgtk-4.so.1".to_string()),
        get_type_fn: Some("gdk_rgba_get_type".to_string()),
    };
    assert_eq!(
        w.write(&with_fn),
        r#"{ type: "boxed", ownership: "full", innerType: "GdkRGBA", lib: "libgtk-4.so.1", getTypeFn: "gdk_rgba_get_type" }"#
    );

    // No ambient shared library recorded → empty lib string, not a panic.
    let no_lib = FfiType::Boxed {
        ownership: Ownership::Full,
        inner_type: "GdkRGBA".to_string(),
        lib: None,
        get_type_fn: None,
    };
    assert_eq!(
        w.write(&no_lib),
        r#"{ type: "boxed", ownership: "full", innerType: "GdkRGBA", lib: "" }"#
    );
}

#[test]
fn ref_and_array_literals_nest() {
    let w = writer();
    let r = FfiType::Ref {
        inner: Box::new(FfiType::Int {
            size: 32,
            unsigned: false,
        }),
    };
    assert_eq!(
        w.write(&r),
        r#"{ type: "ref", innerType: { type: "int", size: 32, unsigned: false } }"#
    );

    let arr = FfiType::Array {
        item: Some(Box::new(FfiType::String {
            ownership: Ownership::Full,
        })),
        list_type: ListType::Array,
        ownership: Ownership::Full,
    };
    assert_eq!(
        w.write(&arr),
        r#"{ type: "array", itemType: { type: "string", ownership: "full" }, listType: "array", ownership: "full" }"#
    );

    let bare = FfiType::Array {
        item: None,
        list_type: ListType::GList,
        ownership: Ownership::Container,
    };
    assert_eq!(
        w.write(&bare),
        r#"{ type: "array", listType: "glist", ownership: "container" }"#
    );
}

#[test]
fn gerror_descriptor_requires_glib_library() {
    let unconfigured = FfiTypeWriter::new(Some("libgtk-4.so.1".to_string()), None);
    let err = unconfigured.gerror_ref_descriptor().unwrap_err();
    assert!(
        err.to_string().contains("glib_library must be set"),
        "unexpected error: {err}"
    );

    let configured = writer();
    let arg = configured.error_argument().unwrap();
    assert_eq!(
        arg,
        r#"{ type: { type: "ref", innerType: { type: "boxed", ownership: "full", innerType: "GError", lib: "libglib-2.0.so.0" } }, value: error }"#
    );
}

#[test]
fn self_argument_selection() {
    let w = writer();
    assert_eq!(
        w.self_argument(&SelfKind::Object),
        FfiType::GObject {
            ownership: Ownership::None
        }
    );
    assert_eq!(
        w.self_argument(&SelfKind::ParamSpec),
        FfiType::GParam {
            ownership: Ownership::None
        }
    );
    // Records fall back to the writer's ambient shared library.
    match w.self_argument(&SelfKind::Record {
        inner_type: "GtkColor".to_string(),
        lib: None,
    }) {
        FfiType::Boxed {
            ownership,
            inner_type,
            lib,
            ..
        } => {
            assert_eq!(ownership, Ownership::None);
            assert_eq!(inner_type, "GtkColor");
            assert_eq!(lib.as_deref(), Some("libgtk-4.so.1"));
        }
        other => panic!("expected boxed, got {other:?}"),
    }
}

#[test]
fn call_expression_shape() {
    let w = writer();
    let builder = CallExpressionBuilder::new(&w);
    let args = vec![
        CallArg::new(
            FfiType::GObject {
                ownership: Ownership::None,
            },
            "this.id",
        ),
        CallArg::new(
            FfiType::String {
                ownership: Ownership::None,
            },
            "label",
        ),
    ];
    let expr = builder.build(
        "libgtk-4.so.1",
        "gtk_button_set_label",
        &args,
        &FfiType::Undefined,
    );
    assert_eq!(
        expr,
        r#"call("libgtk-4.so.1", "gtk_button_set_label", [{ type: { type: "gobject", ownership: "none" }, value: this.id }, { type: { type: "string", ownership: "none" }, value: label }], { type: "undefined" })"#
    );
}

#[test]
fn optional_arguments_carry_the_flag() {
    let w = writer();
    let builder = CallExpressionBuilder::new(&w);
    let args = vec![CallArg::optional(
        FfiType::String {
            ownership: Ownership::None,
        },
        "label",
    )];
    let expr = builder.build("lib.so", "sym", &args, &FfiType::Undefined);
    assert!(expr.contains(r#"value: label, optional: true }"#), "{expr}");
}

#[test]
fn argument_value_extracts_native_handles() {
    let gobject = MappedType {
        ts: "Widget".to_string(),
        ffi: FfiType::GObject {
            ownership: Ownership::None,
        },
        external_type: None,
        kind: None,
    };
    assert_eq!(
        CallExpressionBuilder::argument_value(&gobject, "child"),
        "(child as any)?.id ?? child"
    );

    let string = MappedType {
        ts: "string".to_string(),
        ffi: FfiType::String {
            ownership: Ownership::None,
        },
        external_type: None,
        kind: None,
    };
    assert_eq!(CallExpressionBuilder::argument_value(&string, "label"), "label");
}

#[test]
fn error_check_text() {
    assert_eq!(
        CallExpressionBuilder::error_check("    "),
        "    if (error.value !== null) {\n      throw new NativeError(error.value);\n    }"
    );
    assert_eq!(
        CallExpressionBuilder::error_slot("    "),
        "    const error = { value: null as unknown };"
    );
}

fn param(name: &str, ty: TypeRef) -> Parameter {
    Parameter {
        name: name.to_string(),
        ty,
        direction: Direction::In,
        transfer: Transfer::None,
        caller_allocates: false,
        nullable: false,
        optional: false,
        scope: None,
        closure: None,
        destroy: None,
    }
}

fn ctor(name: &str, params: Vec<Parameter>) -> Constructor {
    Constructor {
        name: name.to_string(),
        c_identifier: format!("gtk_x_{name}"),
        return_type: TypeRef::named("Gtk.Widget"),
        parameters: params,
        throws: false,
    }
}

#[test]
fn select_constructors_drops_unsupported_and_picks_first() {
    let with_closure = ctor(
        "new_with_callback",
        vec![param("closure", TypeRef::named("GObject.Closure"))],
    );
    let plain = ctor("new", vec![]);
    let labeled = ctor("new_with_label", vec![param("label", TypeRef::named("utf8"))]);

    let ctors = vec![with_closure, plain, labeled];
    let selected = body::select_constructors(&ctors);
    assert_eq!(selected.main.map(|c| c.name.as_str()), Some("new"));
    assert_eq!(selected.factories.len(), 1);
    assert_eq!(selected.factories[0].name, "new_with_label");
    assert_eq!(selected.unsupported.len(), 1);

    // Every constructor unsupported → no main at all.
    let all_unsupported = vec![ctor(
        "new_with_callback",
        vec![param("closure", TypeRef::named("GObject.Closure"))],
    )];
    let selected = body::select_constructors(&all_unsupported);
    assert!(selected.main.is_none());
    assert!(selected.factories.is_empty());
}

#[test]
fn filter_parameters_drops_markers_and_collapsed_pairs() {
    let mut callback = param("cb", TypeRef::named("Gtk.TickCallback"));
    callback.closure = Some(1);
    callback.destroy = Some(2);
    let user_data = param("user_data", TypeRef::named("gpointer"));
    let notify = param("notify", TypeRef::named("GLib.DestroyNotify"));
    let varargs = param("...", TypeRef::named("none"));
    let visible = param("label", TypeRef::named("utf8"));

    let params = vec![callback, user_data, notify, varargs, visible];
    let kept = body::filter_parameters(&params);
    let names: Vec<&str> = kept.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["cb", "label"]);
}

#[test]
fn has_ref_parameter_detects_out_and_inout() {
    let mut out_param = param("width", TypeRef::named("gint"));
    out_param.direction = Direction::Out;
    let mut inout_param = param("height", TypeRef::named("gint"));
    inout_param.direction = Direction::InOut;
    let plain = param("label", TypeRef::named("utf8"));

    assert!(body::has_ref_parameter(&[out_param]));
    assert!(body::has_ref_parameter(&[inout_param]));
    assert!(!body::has_ref_parameter(&[plain]));
}

#[test]
fn result_var_name_avoids_shadowing() {
    let mapped = MappedType {
        ts: "number".to_string(),
        ffi: FfiType::Int {
            size: 32,
            unsigned: false,
        },
        external_type: None,
        kind: None,
    };
    let params = vec![ParamStructure {
        js_name: "result".to_string(),
        mapped: mapped.clone(),
        nullable: false,
        optional: false,
    }];
    assert_eq!(body::result_var_name(&params), "_result");

    let other = vec![ParamStructure {
        js_name: "width".to_string(),
        mapped,
        nullable: false,
        optional: false,
    }];
    assert_eq!(body::result_var_name(&other), "result");
}
