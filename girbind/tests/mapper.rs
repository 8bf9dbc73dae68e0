//! Type-mapper properties: the intrinsic table, local registration, the
//! fail-open unknown mapping, ownership exclusivity, and parameter mapping.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use girbind::mapper::{
    FfiType, MappedKind, MappedType, Ownership, TypeMapper,
};
use girbind::model::{Direction, Parameter, Transfer, TypeRef};
use girbind::registry::TypeRegistry;
use girbind::repository::Repository;

static REPO: LazyLock<Repository> = LazyLock::new(|| {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let mut repo = Repository::new();
    for file in ["Gdk-1.0.gir", "Gtk-4.0.gir"] {
        let xml = std::fs::read_to_string(dir.join(file)).expect("read fixture");
        repo.load_from_xml(&xml).expect("load fixture");
    }
    repo.resolve().expect("resolve");
    repo
});

static REGISTRY: LazyLock<TypeRegistry> =
    LazyLock::new(|| TypeRegistry::from_namespaces(REPO.namespaces()));

fn gtk_mapper() -> TypeMapper<'static> {
    let libraries: BTreeMap<String, String> = [
        ("Gtk".to_string(), "libgtk-4.so.1".to_string()),
        ("Gdk".to_string(), "libgdk-1.so.0".to_string()),
    ]
    .into();
    let mut mapper = TypeMapper::new(
        &REGISTRY,
        "Gtk",
        Some("libgtk-4.so.1".to_string()),
        libraries,
    );
    mapper.register_enum("Align");
    mapper.register_enum("StateFlags");
    mapper.register_record("Color", "Color", "GtkColor");
    mapper
}

fn plain_param(name: &str, ty: TypeRef) -> Parameter {
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

#[test]
fn registered_enum_maps_to_bare_name_and_int32() {
    let mapper = gtk_mapper();
    let mapped = mapper.map_type(&TypeRef::named("Align"), false);
    assert_eq!(mapped.ts, "Align");
    assert_eq!(
        mapped.ffi,
        FfiType::Int {
            size: 32,
            unsigned: false
        }
    );
    assert_eq!(mapped.kind, Some(MappedKind::Enum));
}

#[test]
fn intrinsic_table_is_context_independent() {
    let mapper = gtk_mapper();
    let cases = [
        ("gboolean", "boolean"),
        ("gint", "number"),
        ("guint64", "number"),
        ("gdouble", "number"),
        ("utf8", "string"),
        ("gpointer", "number"),
        ("GType", "number"),
    ];
    for (gir, ts) in cases {
        let mapped = mapper.map_type(&TypeRef::named(gir), false);
        assert_eq!(mapped.ts, ts, "for {gir}");
        assert_eq!(mapped.kind, Some(MappedKind::Intrinsic), "for {gir}");
    }
    assert_eq!(
        mapper.map_type(&TypeRef::named("none"), false).ffi,
        FfiType::Undefined
    );
}

#[test]
fn unknown_type_maps_fail_open_with_unknown_kind() {
    let mapper = gtk_mapper();
    let mapped = mapper.map_type(&TypeRef::named("Foo.Bar"), false);
    assert_eq!(mapped.ts, "unknown");
    assert_eq!(
        mapped.ffi,
        FfiType::GObject {
            ownership: Ownership::Full
        }
    );
    assert_eq!(mapped.kind, Some(MappedKind::Unknown));
}

#[test]
fn map_type_is_deterministic() {
    let mapper = gtk_mapper();
    for ty in [
        TypeRef::named("Align"),
        TypeRef::named("Gtk.Widget"),
        TypeRef::named("Color"),
        TypeRef::named("utf8"),
        TypeRef::array_of(TypeRef::named("Gtk.Widget")),
    ] {
        let a = mapper.map_type(&ty, false);
        let b = mapper.map_type(&ty, false);
        assert_eq!(a, b);
    }
}

#[test]
fn borrowed_return_only_affects_gobject_ownership() {
    let mapper = gtk_mapper();
    let owned = mapper.map_type(&TypeRef::named("Gtk.Widget"), false);
    let borrowed = mapper.map_type(&TypeRef::named("Gtk.Widget"), true);
    assert_eq!(
        owned.ffi,
        FfiType::GObject {
            ownership: Ownership::Full
        }
    );
    assert_eq!(
        borrowed.ffi,
        FfiType::GObject {
            ownership: Ownership::None
        }
    );

    let s_owned = mapper.map_type(&TypeRef::named("utf8"), false);
    let s_borrowed = mapper.map_type(&TypeRef::named("utf8"), true);
    assert_eq!(s_owned.ffi, s_borrowed.ffi);
}

#[test]
fn foreign_class_is_namespace_qualified_with_external_type() {
    let mapper = gtk_mapper();
    let mapped = mapper.map_type(&TypeRef::named("Gdk.Screen"), false);
    assert_eq!(mapped.ts, "Gdk.Screen");
    let external = mapped.external_type.expect("external type");
    assert_eq!(external.namespace, "Gdk");
    assert_eq!(external.name, "Screen");
}

#[test]
fn local_record_carries_shared_library() {
    let mapper = gtk_mapper();
    let mapped = mapper.map_type(&TypeRef::named("Color"), false);
    assert_eq!(mapped.ts, "Color");
    match &mapped.ffi {
        FfiType::Boxed {
            inner_type, lib, ..
        } => {
            assert_eq!(inner_type, "GtkColor");
            assert_eq!(lib.as_deref(), Some("libgtk-4.so.1"));
        }
        other => panic!("expected boxed, got {other:?}"),
    }
}

#[test]
fn gvariant_boxed_collapses_to_gvariant_variant() {
    let collapsed = FfiType::boxed(Ownership::Full, "GVariant", None, None);
    assert_eq!(
        collapsed,
        FfiType::GVariant {
            ownership: Ownership::Full
        }
    );

    let mapper = gtk_mapper();
    let mapped = mapper.map_type(&TypeRef::named("GLib.Variant"), false);
    assert!(matches!(mapped.ffi, FfiType::GVariant { .. }));
}

#[test]
fn out_parameter_wraps_in_ref() {
    let mapper = gtk_mapper();
    let mut param = plain_param("width", TypeRef::named("gint"));
    param.direction = Direction::Out;
    param.transfer = Transfer::Full;
    let mapped = mapper.map_parameter(&param);
    assert_eq!(mapped.ts, "Ref<number>");
    match mapped.ffi {
        FfiType::Ref { inner } => assert_eq!(
            *inner,
            FfiType::Int {
                size: 32,
                unsigned: false
            }
        ),
        other => panic!("expected ref, got {other:?}"),
    }
}

#[test]
fn parameter_transfer_overrides_ownership() {
    let mapper = gtk_mapper();
    let param = plain_param("label", TypeRef::named("utf8"));
    let mapped = mapper.map_parameter(&param);
    assert_eq!(
        mapped.ffi,
        FfiType::String {
            ownership: Ownership::None
        }
    );

    let mut owned = plain_param("label", TypeRef::named("utf8"));
    owned.transfer = Transfer::Full;
    assert_eq!(
        mapper.map_parameter(&owned).ffi,
        FfiType::String {
            ownership: Ownership::Full
        }
    );
}

#[test]
fn async_ready_callback_special_case() {
    let mapper = gtk_mapper();
    let param = plain_param("callback", TypeRef::named("Gio.AsyncReadyCallback"));
    let mapped = mapper.map_parameter(&param);
    assert_eq!(mapped.ffi, FfiType::AsyncCallback);
}

#[test]
fn nullable_and_optional_collapse() {
    let mut a = plain_param("x", TypeRef::named("utf8"));
    a.nullable = true;
    let mut b = plain_param("x", TypeRef::named("utf8"));
    b.optional = true;
    let c = plain_param("x", TypeRef::named("utf8"));
    assert!(TypeMapper::is_nullable(&a));
    assert!(TypeMapper::is_nullable(&b));
    assert!(!TypeMapper::is_nullable(&c));
}

#[test]
fn closure_target_detection() {
    let mut callback = plain_param("cb", TypeRef::named("Gtk.TickCallback"));
    callback.closure = Some(1);
    callback.destroy = Some(2);
    let user_data = plain_param("user_data", TypeRef::named("gpointer"));
    let notify = plain_param("notify", TypeRef::named("GLib.DestroyNotify"));
    let params = vec![callback, user_data, notify];
    assert!(!TypeMapper::is_closure_target(0, &params));
    assert!(TypeMapper::is_closure_target(1, &params));
    assert!(TypeMapper::is_destroy_target(2, &params));
}

#[test]
fn wrap_strategies_are_mutually_exclusive() {
    let mapper = gtk_mapper();
    let samples: Vec<MappedType> = vec![
        mapper.map_type(&TypeRef::named("Gtk.Widget"), false),
        mapper.map_type(&TypeRef::named("Gtk.Orientable"), false),
        mapper.map_type(&TypeRef::named("Color"), false),
        mapper.map_type(&TypeRef::named("GLib.Variant"), false),
        mapper.map_type(&TypeRef::named("utf8"), false),
        mapper.map_type(&TypeRef::named("gint"), false),
        mapper.map_type(&TypeRef::array_of(TypeRef::named("Gtk.Widget")), false),
        mapper.map_type(&TypeRef::named("Foo.Bar"), false),
    ];
    for mapped in &samples {
        let scalar_wraps = [
            mapped.needs_gobject_wrap(),
            mapped.needs_boxed_wrap(),
            mapped.needs_gvariant_wrap(),
            mapped.needs_interface_wrap(),
        ]
        .iter()
        .filter(|&&b| b)
        .count();
        assert!(
            scalar_wraps <= 1,
            "multiple scalar wrap flags for {:?}",
            mapped.ts
        );
    }

    // Array-item wrap composes with (and does not imply) the scalar flags.
    let array = mapper.map_type(&TypeRef::array_of(TypeRef::named("Gtk.Widget")), false);
    assert!(array.needs_array_item_wrap());
    assert!(!array.needs_gobject_wrap());
}

#[test]
fn array_maps_recursively() {
    let mapper = gtk_mapper();
    let mapped = mapper.map_type(&TypeRef::array_of(TypeRef::named("utf8")), false);
    assert_eq!(mapped.ts, "string[]");
    match &mapped.ffi {
        FfiType::Array { item: Some(item), .. } => {
            assert!(matches!(item.as_ref(), FfiType::String { .. }));
        }
        other => panic!("expected array, got {other:?}"),
    }
}

#[test]
fn interface_maps_to_interface_wrap() {
    let mapper = gtk_mapper();
    let mapped = mapper.map_type(&TypeRef::named("Orientable"), false);
    assert_eq!(mapped.ts, "Orientable");
    assert!(mapped.needs_interface_wrap());
    assert!(!mapped.needs_gobject_wrap());
}

#[test]
fn ecosystem_renames_apply() {
    let xml = r#"<?xml version="1.0"?>
<repository version="1.2"
            xmlns="http://www.gtk.org/introspection/core/1.0"
            xmlns:glib="http://www.gtk.org/introspection/glib/1.0">
  <namespace name="GObject" version="2.0" shared-library="libgobject-2.0.so.0">
    <class name="Object" glib:type-name="GObject" glib:get-type="g_object_get_type"/>
  </namespace>
</repository>"#;
    let mut repo = Repository::new();
    repo.load_from_xml(xml).unwrap();
    repo.resolve().unwrap();
    let registry = TypeRegistry::from_namespaces(repo.namespaces());
    let entry = registry.resolve("GObject.Object").expect("entry");
    assert_eq!(entry.transformed_name, "GObject");
}

#[test]
fn registry_resolves_in_namespace_qualified_first() {
    assert!(REGISTRY.resolve_in_namespace("Gdk.Screen", "Gtk").is_some());
    let local = REGISTRY
        .resolve_in_namespace("Button", "Gtk")
        .expect("Button via context");
    assert_eq!(local.namespace, "Gtk");
    assert!(REGISTRY.resolve_in_namespace("Screen", "Gtk").is_none());
}

#[test]
fn plumbing_records_are_not_registered() {
    // No glib:type-name, and the Class suffix marks GObject plumbing.
    assert!(REGISTRY.resolve("Gtk.WidgetClass").is_none());
    assert!(REGISTRY.resolve("Gtk.Color").is_some());
}
