//! Repository behavior: two-phase resolve, idempotence, the pre-resolve
//! usage error, and the Ok(None) not-found contract.

use std::path::Path;
use std::sync::LazyLock;

use girbind::registry::TypeKind;
use girbind::repository::Repository;

fn load_fixtures() -> Repository {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let mut repo = Repository::new();
    for file in ["Gdk-1.0.gir", "Gtk-4.0.gir"] {
        let xml = std::fs::read_to_string(dir.join(file)).expect("read fixture");
        repo.load_from_xml(&xml).expect("load fixture");
    }
    repo
}

static RESOLVED: LazyLock<Repository> = LazyLock::new(|| {
    let mut repo = load_fixtures();
    repo.resolve().expect("resolve");
    repo
});

#[test]
fn query_before_resolve_is_a_usage_error() {
    let repo = load_fixtures();
    let err = repo.resolve_class("Gtk.Button").unwrap_err();
    assert!(
        err.to_string().contains("resolve() must be called first"),
        "unexpected error: {err}"
    );
}

#[test]
fn resolve_is_idempotent() {
    let mut repo = load_fixtures();
    repo.resolve().expect("first resolve");
    let count_once = repo.namespaces().count();
    let classes_once: Vec<String> = repo
        .namespace("Gtk")
        .unwrap()
        .unwrap()
        .classes
        .keys()
        .cloned()
        .collect();

    repo.resolve().expect("second resolve");
    assert_eq!(repo.namespaces().count(), count_once);
    let classes_twice: Vec<String> = repo
        .namespace("Gtk")
        .unwrap()
        .unwrap()
        .classes
        .keys()
        .cloned()
        .collect();
    assert_eq!(classes_once, classes_twice);
}

#[test]
fn not_found_is_none_not_an_error() {
    assert!(RESOLVED.resolve_class("Gtk.NoSuchClass").unwrap().is_none());
    assert!(RESOLVED.resolve_enum("Gtk.NoSuchEnum").unwrap().is_none());
    assert!(RESOLVED.namespace("Qt").unwrap().is_none());
}

#[test]
fn qualified_lookups_resolve_entities() {
    let button = RESOLVED
        .resolve_class("Gtk.Button")
        .unwrap()
        .expect("Button");
    assert_eq!(button.parent.as_deref(), Some("Gtk.Widget"));
    assert_eq!(button.implements, vec!["Gtk.Orientable".to_string()]);
    assert_eq!(button.glib_type_name.as_deref(), Some("GtkButton"));

    assert!(RESOLVED.resolve_interface("Gtk.Orientable").unwrap().is_some());
    assert!(RESOLVED.resolve_record("Gtk.Color").unwrap().is_some());
    assert!(RESOLVED.resolve_enum("Gtk.Align").unwrap().is_some());
    assert!(RESOLVED.resolve_flags("Gtk.StateFlags").unwrap().is_some());
    assert!(RESOLVED.resolve_callback("Gtk.TickCallback").unwrap().is_some());
    assert!(RESOLVED.resolve_constant("Gtk.MAJOR_VERSION").unwrap().is_some());
}

#[test]
fn type_kind_classification() {
    assert_eq!(
        RESOLVED.type_kind("Gtk.Button").unwrap(),
        Some(TypeKind::Class)
    );
    assert_eq!(
        RESOLVED.type_kind("Gtk.Orientable").unwrap(),
        Some(TypeKind::Interface)
    );
    assert_eq!(
        RESOLVED.type_kind("Gtk.Color").unwrap(),
        Some(TypeKind::Record)
    );
    assert_eq!(RESOLVED.type_kind("Gtk.Align").unwrap(), Some(TypeKind::Enum));
    assert_eq!(
        RESOLVED.type_kind("Gtk.StateFlags").unwrap(),
        Some(TypeKind::Flags)
    );
    // Intrinsics and unknowns are both None; is_primitive makes the
    // distinction.
    assert_eq!(RESOLVED.type_kind("gint").unwrap(), None);
    assert_eq!(RESOLVED.type_kind("Gtk.Nope").unwrap(), None);
    assert!(Repository::is_primitive("gint"));
    assert!(!Repository::is_primitive("Gtk.Nope"));
}

#[test]
fn gobject_and_boxed_tests() {
    assert!(RESOLVED.is_gobject("Gtk.Button").unwrap());
    assert!(!RESOLVED.is_gobject("Gtk.NoSuch").unwrap());
    assert!(RESOLVED.is_boxed("Gtk.Color").unwrap());
    assert!(!RESOLVED.is_boxed("Gtk.WidgetClass").unwrap());
}

#[test]
fn inheritance_chain_walk() {
    let button = RESOLVED
        .resolve_class("Gtk.Button")
        .unwrap()
        .expect("Button");
    let ancestors = RESOLVED.ancestors(button).unwrap();
    assert_eq!(ancestors.len(), 1);
    assert_eq!(ancestors[0].qualified_name, "Gtk.Widget");

    assert!(RESOLVED.is_subclass_of(button, "Gtk.Widget").unwrap());
    let widget = RESOLVED.resolve_class("Gtk.Widget").unwrap().unwrap();
    assert!(RESOLVED.is_subclass_of(widget, "Gtk.Widget").unwrap());
    assert!(!RESOLVED.is_subclass_of(widget, "Gtk.Button").unwrap());
}

#[test]
fn find_classes_scans_all_namespaces() {
    let with_signals = RESOLVED.find_classes(|c| !c.signals.is_empty()).unwrap();
    let names: Vec<&str> = with_signals
        .iter()
        .map(|c| c.qualified_name.as_str())
        .collect();
    assert!(names.contains(&"Gtk.Button"));
    assert!(names.contains(&"Gtk.Widget"));
    assert!(!names.contains(&"Gdk.Screen"));
}

#[test]
fn async_convention_on_methods() {
    let button = RESOLVED
        .resolve_class("Gtk.Button")
        .unwrap()
        .expect("Button");
    let fetch = button
        .methods
        .iter()
        .find(|m| m.name == "fetch_async")
        .expect("fetch_async");
    assert!(fetch.is_async());
    assert_eq!(fetch.finish_method_name().as_deref(), Some("fetch_finish"));

    let set_label = button
        .methods
        .iter()
        .find(|m| m.name == "set_label")
        .expect("set_label");
    assert!(!set_label.is_async());
    assert_eq!(set_label.finish_method_name(), None);
}
