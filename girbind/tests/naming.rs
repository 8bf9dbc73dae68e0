//! Identifier-conversion properties: snake/kebab → camelCase round trips,
//! PascalCase → kebab-case module stems, reserved-word escaping.

use girbind::naming::{
    escape_reserved, is_reserved_word, module_path, to_camel_case, to_js_param_name,
    to_kebab_case, to_pascal_case,
};

#[test]
fn camel_case_basic() {
    assert_eq!(to_camel_case("set_label"), "setLabel");
    assert_eq!(to_camel_case("new_with_label"), "newWithLabel");
    assert_eq!(to_camel_case("label"), "label");
    assert_eq!(to_camel_case("has-frame"), "hasFrame");
    assert_eq!(to_camel_case("row-activated"), "rowActivated");
}

#[test]
fn camel_case_no_separators_survive() {
    for input in ["a_b_c", "a-b-c", "one_two_three_four", "x-y_z"] {
        let out = to_camel_case(input);
        assert!(
            !out.contains('_') && !out.contains('-'),
            "separators survived in {out:?}"
        );
        assert!(
            out.chars().next().unwrap().is_lowercase(),
            "first char not lowercase in {out:?}"
        );
    }
}

#[test]
fn camel_case_skips_doubled_separators() {
    assert_eq!(to_camel_case("a__b"), "aB");
    assert_eq!(to_camel_case("set__label"), "setLabel");
}

#[test]
fn pascal_case_is_capitalized_camel() {
    assert_eq!(to_pascal_case("set_label"), "SetLabel");
    assert_eq!(to_pascal_case("button"), "Button");
    assert_eq!(to_pascal_case("file_chooser_dialog"), "FileChooserDialog");
}

#[test]
fn kebab_case_module_stems() {
    assert_eq!(to_kebab_case("Button"), "button");
    assert_eq!(to_kebab_case("FileChooserDialog"), "file-chooser-dialog");
    assert_eq!(to_kebab_case("RGBA"), "rgba");
    assert_eq!(to_kebab_case("GdkRGBA"), "gdk-rgba");
    assert_eq!(to_kebab_case("CSSProvider"), "css-provider");
}

#[test]
fn module_path_convention() {
    assert_eq!(module_path("Foo"), "./foo.js");
    assert_eq!(module_path("FileChooserDialog"), "./file-chooser-dialog.js");
}

#[test]
fn reserved_words_get_trailing_underscore() {
    assert!(is_reserved_word("class"));
    assert_eq!(escape_reserved("class"), "class_");
    assert_eq!(escape_reserved("default"), "default_");
    assert_eq!(escape_reserved("label"), "label");
}

#[test]
fn js_param_name_combines_camel_and_escape() {
    assert_eq!(to_js_param_name("user_data"), "userData");
    // `class` survives camelCasing unchanged, then gets escaped.
    assert_eq!(to_js_param_name("class"), "class_");
    assert_eq!(to_js_param_name("new"), "new_");
}
