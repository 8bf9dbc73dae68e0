//! Widget metadata, enums/records/interfaces emission, the namespace index,
//! the per-unit report, and the unknown-type audit.

use std::path::Path;
use std::sync::LazyLock;

use girbind::{GeneratedNamespace, GenerationReport};

static GENERATED: LazyLock<(Vec<GeneratedNamespace>, GenerationReport)> = LazyLock::new(|| {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample.toml");
    girbind::generate(&path).expect("generate from fixtures")
});

fn gtk() -> &'static GeneratedNamespace {
    GENERATED
        .0
        .iter()
        .find(|ns| ns.name == "Gtk")
        .expect("Gtk namespace generated")
}

fn source(file_name: &str) -> &'static str {
    &gtk()
        .files
        .iter()
        .find(|f| f.file_name == file_name)
        .unwrap_or_else(|| panic!("{file_name} missing"))
        .source
}

#[test]
fn widget_meta_for_button() {
    let meta = gtk()
        .widget_metas
        .iter()
        .find(|m| m.class_name == "Button")
        .expect("Button meta");
    assert_eq!(meta.namespace, "Gtk");
    assert_eq!(meta.jsx_name, "GtkButton");
    assert_eq!(meta.module_path, "./button.js");
    assert!(meta.is_container, "set_child marks Button as a container");
    assert_eq!(meta.slots, vec!["child".to_string()]);
    assert_eq!(
        meta.prop_names,
        vec!["label".to_string(), "child".to_string(), "opacity".to_string()]
    );
    assert_eq!(meta.parent_class_name.as_deref(), Some("Widget"));
    assert_eq!(meta.parent_namespace.as_deref(), Some("Gtk"));
}

#[test]
fn root_widget_meta_has_null_parent() {
    let meta = gtk()
        .widget_metas
        .iter()
        .find(|m| m.class_name == "Widget")
        .expect("Widget meta");
    assert_eq!(meta.parent_class_name, None);
    assert_eq!(meta.parent_namespace, None);
    assert!(!meta.is_container);
    assert!(meta.slots.is_empty());
}

#[test]
fn widget_meta_static_is_attached() {
    let src = source("button.ts");
    assert!(src.contains("static readonly WIDGET_META: RuntimeWidgetMeta = {"));
    assert!(src.contains("className: \"Button\","));
    assert!(src.contains("jsxName: \"GtkButton\","));
    assert!(src.contains("modulePath: \"./button.js\","));
    assert!(src.contains("isContainer: true,"));
    assert!(src.contains("slots: [\"child\"],"));
    assert!(src.contains("propNames: [\"label\", \"child\", \"opacity\"],"));
    assert!(src.contains("parentClassName: \"Widget\","));

    let widget = source("widget.ts");
    assert!(widget.contains("parentClassName: null,"));
    assert!(widget.contains("parentNamespace: null,"));
}

#[test]
fn widget_meta_table_aggregates_all_widgets() {
    let src = source("widget-meta.ts");
    assert!(src.contains("export const WIDGET_METAS: RuntimeWidgetMeta[] = ["));
    assert!(src.contains("jsxName: \"GtkButton\","));
    assert!(src.contains("jsxName: \"GtkWidget\","));
    assert!(src.contains("import type { RuntimeWidgetMeta } from \"../runtime.js\";"));
}

#[test]
fn enums_file_holds_enums_bitfields_and_constants() {
    let src = source("enums.ts");
    assert!(src.contains("export enum Align {"));
    assert!(src.contains("  fill = 0,"));
    assert!(src.contains("  start = 1,"));
    assert!(src.contains("  end = 2,"));
    assert!(src.contains("export enum StateFlags {"));
    assert!(src.contains("  normal = 0,"));
    assert!(src.contains("  active = 1,"));
    assert!(src.contains("export const MAJOR_VERSION = 4;"));
}

#[test]
fn boxed_record_becomes_a_wrapper_class() {
    let src = source("color.ts");
    assert!(src.contains("export class Color extends NativeObject {"));
    assert!(src.contains("static readonly glibTypeName = \"GtkColor\";"));
    assert!(src.contains("static readonly objectType = \"gtk_color_get_type\";"));
    // The record's own methods pass a boxed self argument.
    assert!(src.contains(
        r#"{ type: { type: "boxed", ownership: "none", innerType: "GtkColor", lib: "libgtk-4.so.1" }, value: this.id }"#
    ));
    assert!(src.contains("copy(): Color {"));
    assert!(src.contains("return getNativeObject(result, Color) as Color;"));
    assert!(src.ends_with("registerNativeClass(Color);\n"));
}

#[test]
fn plumbing_record_is_not_emitted() {
    assert!(
        !gtk().files.iter().any(|f| f.file_name == "widget-class.ts"),
        "WidgetClass is GObject plumbing and must not be bound"
    );
}

#[test]
fn interface_declaration_file() {
    let src = source("orientable.ts");
    assert!(src.contains("export interface Orientable {"));
    assert!(src.contains("  getOrientation(): Align;"));
    assert!(src.contains("  setOrientation(orientation: Align): void;"));
    assert!(src.contains("import { Align } from \"./enums.js\";"));
}

#[test]
fn index_reexports_every_module() {
    let src = source("index.ts");
    for module in [
        "./enums.js",
        "./color.js",
        "./orientable.js",
        "./button.js",
        "./widget.js",
        "./widget-meta.js",
    ] {
        assert!(
            src.contains(&format!("export * from \"{module}\";")),
            "index missing {module}:\n{src}"
        );
    }
    assert!(!src.contains("./index.js"), "index must not re-export itself");
    assert!(
        !src.contains("./broken-widget.js"),
        "failed units must not be re-exported"
    );
}

#[test]
fn unit_with_no_usable_constructor_fails_without_aborting() {
    let report = &GENERATED.1;
    let broken = report
        .units
        .iter()
        .find(|u| u.qualified_name == "Gtk.BrokenWidget")
        .expect("BrokenWidget unit reported");
    assert!(!broken.success);
    assert_eq!(broken.reason.as_deref(), Some("no usable constructor"));
    assert!(
        !gtk().files.iter().any(|f| f.file_name == "broken-widget.ts"),
        "failed unit must be omitted from output"
    );

    // The rest of the batch still generated.
    let button = report
        .units
        .iter()
        .find(|u| u.qualified_name == "Gtk.Button")
        .expect("Button unit reported");
    assert!(button.success);
}

#[test]
fn unknown_types_are_audited_not_fatal() {
    let report = &GENERATED.1;
    let names: Vec<&str> = report
        .unknown_types
        .iter()
        .map(|u| u.type_name.as_str())
        .collect();
    assert!(
        names.contains(&"Gio.AsyncResult"),
        "Gio.AsyncResult should be flagged, got: {names:?}"
    );
    assert!(
        names.contains(&"GObject.Closure"),
        "GObject.Closure should be flagged, got: {names:?}"
    );
    // Resolvable and intrinsic types never appear.
    assert!(!names.contains(&"Gtk.Widget"));
    assert!(!names.contains(&"utf8"));

    let async_result = report
        .unknown_types
        .iter()
        .find(|u| u.type_name == "Gio.AsyncResult")
        .unwrap();
    assert!(
        async_result.context.contains("fetch_finish"),
        "audit context should name the referencing method, got: {}",
        async_result.context
    );
}
