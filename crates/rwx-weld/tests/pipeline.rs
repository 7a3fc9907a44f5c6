//! Package generation from declaration input to written files

use pretty_assertions::assert_eq;
use rwx_weld::extractor::PlatformGuard;
use rwx_weld::{Config, MemorySource, Package, SpecBuilder, WeldError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SHAPE: &str = r#"{ "items": [
    { "kind": "class", "name": "Shape", "includes": ["shapes/shape.h"],
      "members": [
        { "kind": "method", "name": "Shape" },
        { "kind": "method", "name": "Draw", "virtual": true },
        { "kind": "method", "name": "Area", "type": "double", "virtual": true, "const": true,
          "brief": "Area covered by the shape." }
      ] },
    { "kind": "define", "name": "wxSHAPE_MAX", "value": "16" },
    { "kind": "define", "name": "wxDefaultShapeSize", "value": "wxSize(20, 20)" }
] }"#;

const CIRCLE: &str = r#"{ "items": [
    { "kind": "class", "name": "Circle", "bases": [ { "name": "Shape" } ],
      "members": [
        { "kind": "method", "name": "Circle",
          "params": [ { "name": "radius", "type": "double" } ] },
        { "kind": "method", "name": "Draw", "virtual": true }
      ] }
] }"#;

const WIDGET: &str = r#"{ "items": [
    { "kind": "class", "name": "Widget",
      "members": [
        { "kind": "method", "name": "OldCall", "type": "int", "deprecated": true,
          "params": [ { "name": "a", "type": "int" } ] },
        { "kind": "method", "name": "NewCall", "type": "int",
          "params": [ { "name": "a", "type": "int" } ] }
      ] }
] }"#;

const COMBO: &str = r#"{ "items": [
    { "kind": "class", "name": "Combo", "bases": [ { "name": "TextEntry" } ],
      "members": [
        { "kind": "method", "name": "SetValue", "virtual": true,
          "params": [ { "name": "value", "type": "const wxString &" } ] }
      ] }
] }"#;

const TEXT_ENTRY: &str = r#"{ "items": [
    { "kind": "class", "name": "TextEntry",
      "members": [
        { "kind": "method", "name": "SetValue", "virtual": true,
          "params": [ { "name": "value", "type": "const wxString &" } ] },
        { "kind": "method", "name": "GetValue", "type": "wxString", "const": true }
      ] }
] }"#;

fn config(root: &Path) -> Config {
    Config {
        common_includes: Vec::new(),
        ..Config::default()
    }
    .resolve_paths(root)
}

fn source() -> MemorySource {
    MemorySource::new()
        .with_json("Shape", SHAPE)
        .unwrap()
        .with_json("Circle", CIRCLE)
        .unwrap()
        .with_json("Widget", WIDGET)
        .unwrap()
        .with_json("Combo", COMBO)
        .unwrap()
        .with_json("TextEntry", TEXT_ENTRY)
        .unwrap()
}

fn shapes_package(root: &Path, shape: SpecBuilder, circle: SpecBuilder) -> Package {
    Package::builder("Wx", config(root))
        .source(source())
        .module(shape.build())
        .module(circle.build())
        .build()
        .unwrap()
}

fn read(root: &Path, path: &str) -> String {
    fs::read_to_string(root.join(path)).unwrap()
}

#[test]
fn test_generate_all_writes_every_output() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let package = shapes_package(root, SpecBuilder::new("Shape", "Wx"), SpecBuilder::new("Circle", "Wx"));

    let report = package.generate_all(2);
    assert!(report.is_success(), "{:?}", report.failures);
    assert_eq!(report.generated, vec!["Shape", "Circle"]);

    let shape_i = read(root, "swig/Shape.i");
    assert!(shape_i.contains("%module(directors=\"1\") Shape\n"));
    assert!(shape_i.contains("#include \"shapes/shape.h\"\n"));
    assert!(shape_i.contains("%include \"include/Shape.h\""));

    let circle_i = read(root, "swig/Circle.i");
    assert!(circle_i.contains("%import \"include/Shape.h\"\n"));

    let shape_h = read(root, "swig/include/Shape.h");
    assert!(shape_h.contains("class Shape"));
    assert!(shape_h.contains("#define wxSHAPE_MAX 16"));

    let ext = read(root, "lib/wx/ext/shape_ext.rb");
    assert!(ext.contains("  DEFAULT_SHAPE_SIZE = Wx::Size.new(20, 20)\n"));
    assert!(!root.join("lib/wx/ext/circle_ext.rb").exists());

    let doc = read(root, "lib/wx/doc/gen/circle.rb");
    assert!(doc.contains("  class Circle < Shape\n"));
    assert!(doc.contains("    def initialize(radius) end\n"));

    let deps = read(root, ".deps/.Circle.dep");
    assert!(deps.starts_with("# dependencies of module Circle\n"));
    assert!(deps.contains(&root.join("decls/Circle.json").display().to_string()));

    assert_eq!(package.class_module("Shape").as_deref(), Some("Shape"));
    assert_eq!(package.registry().len(), 2);
}

#[test]
fn test_generation_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let first = shapes_package(root, SpecBuilder::new("Shape", "Wx"), SpecBuilder::new("Circle", "Wx"));
    assert!(first.generate_all(1).is_success());
    let interface = read(root, "swig/Circle.i");
    let header = read(root, "swig/include/Circle.h");

    let second = shapes_package(root, SpecBuilder::new("Shape", "Wx"), SpecBuilder::new("Circle", "Wx"));
    assert!(second.generate_all(4).is_success());
    assert_eq!(read(root, "swig/Circle.i"), interface);
    assert_eq!(read(root, "swig/include/Circle.h"), header);

    let director = second.director("Circle").unwrap();
    let once = second.extract(director).unwrap();
    let again = second.extract(director).unwrap();
    assert!(std::sync::Arc::ptr_eq(&once, &again));
}

#[test]
fn test_base_in_other_module_is_resolved_on_demand() {
    let dir = TempDir::new().unwrap();
    let package = shapes_package(dir.path(), SpecBuilder::new("Shape", "Wx"), SpecBuilder::new("Circle", "Wx"));

    // Circle first: Shape is found, extracted and preprocessed through the resolver
    package.generate_code("Circle").unwrap();
    assert!(package.registry().has_class("Shape"));
    assert!(package.director("Shape").unwrap().extraction().is_some());
}

#[test]
fn test_inconsistent_proxy_fails_only_that_module() {
    let dir = TempDir::new().unwrap();
    let mut shape = SpecBuilder::new("Shape", "Wx");
    shape.no_proxy(&["Shape::Area"]);
    let package = shapes_package(dir.path(), shape, SpecBuilder::new("Circle", "Wx"));

    let report = package.generate_all(2);
    assert_eq!(report.generated, vec!["Shape"]);
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.module, "Circle");
    match &failure.error {
        WeldError::Consistency { errors, .. } => assert_eq!(
            errors,
            &vec!["* ERROR: method Area() const is proxied without wrapper implementation in class Circle but not proxied in base class Shape!".to_string()]
        ),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_repeated_module_is_generated_once() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let mut shape = SpecBuilder::new("Shape", "Wx");
    shape.no_proxy(&["Shape::Area"]);
    let package = shapes_package(root, shape, SpecBuilder::new("Circle", "Wx"));

    let report = package.generate_modules(&["Circle", "Shape", "Circle"], 3);
    assert_eq!(report.generated, vec!["Shape"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].module, "Circle");

    // the failed check runs again on the next request
    assert!(matches!(package.analyze("Circle"), Err(WeldError::Consistency { .. })));
}

#[test]
fn test_redundant_override_is_dropped_from_header() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let mut shape = SpecBuilder::new("Shape", "Wx");
    shape.no_proxy(&["Shape::Draw"]);
    let mut circle = SpecBuilder::new("Circle", "Wx");
    circle.no_proxy(&["Circle::Draw"]);
    let package = shapes_package(root, shape, circle);

    let report = package.generate_all(1);
    assert!(report.is_success(), "{:?}", report.failures);
    let header = read(root, "swig/include/Circle.h");
    assert!(!header.contains("Draw"));
    assert!(header.contains("Circle(double radius);"));
}

#[test]
fn test_folded_base_members_are_flattened_once() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let mut combo = SpecBuilder::new("Combo", "Wx");
    combo.add_items(&["TextEntry"]).fold_bases("Combo", &["TextEntry"]);
    let package = Package::builder("Wx", config(root))
        .source(source())
        .module(combo.build())
        .build()
        .unwrap();

    package.generate_code("Combo").unwrap();
    let header = read(root, "swig/include/Combo.h");
    assert_eq!(header.matches("virtual void SetValue(").count(), 1);
    assert!(header.contains("wxString GetValue() const;"));
    assert!(!header.contains("class TextEntry"));
    assert!(!read(root, "swig/Combo.i").contains("%import"));
}

#[test]
fn test_base_folded_twice_is_flattened_once() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let mut combo = SpecBuilder::new("Combo", "Wx");
    combo
        .add_items(&["TextEntry"])
        .fold_bases("Combo", &["TextEntry"])
        .fold_bases("Combo", &["TextEntry"]);
    let package = Package::builder("Wx", config(root))
        .source(source())
        .module(combo.build())
        .build()
        .unwrap();

    package.generate_code("Combo").unwrap();
    let header = read(root, "swig/include/Combo.h");
    assert_eq!(header.matches("GetValue() const;").count(), 1);
    assert_eq!(header.matches("virtual void SetValue(").count(), 1);
}

#[test]
fn test_deprecated_method_gets_guarded_shim() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let mut widget = SpecBuilder::new("Widget", "Wx");
    widget.only_for(PlatformGuard::Any(vec!["msw".into(), "gtk".into()]), &["Widget::OldCall"]);
    let package = Package::builder("Wx", config(root))
        .source(source())
        .module(widget.build())
        .build()
        .unwrap();

    package.generate_code("Widget").unwrap();
    let interface = read(root, "swig/Widget.i");
    assert!(interface.contains("%extend Widget {\n#if defined(__MSW__) || defined(__GTK__)\nint OldCall(int a) {\n"));
    assert!(interface.contains("  return $self->OldCall(a);\n"));
}

#[test]
fn test_platform_and_no_deprecate_drop_shims() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let mut widget = SpecBuilder::new("Widget", "Wx");
    widget.only_for("msw", &["Widget::OldCall"]);
    let mut config = config(root);
    config.platform = Some("mac".to_string());
    let package = Package::builder("Wx", config)
        .source(source())
        .module(widget.build())
        .build()
        .unwrap();

    package.generate_code("Widget").unwrap();
    let interface = read(root, "swig/Widget.i");
    assert!(!interface.contains("OldCall"));

    let mut config = self::config(root);
    config.no_deprecate = true;
    let package = Package::builder("Wx", config)
        .source(source())
        .module(SpecBuilder::new("Widget", "Wx").build())
        .build()
        .unwrap();
    package.generate_code("Widget").unwrap();
    assert!(!read(root, "swig/Widget.i").contains("%extend Widget"));
}

#[test]
fn test_missing_base_director_is_reported() {
    let dir = TempDir::new().unwrap();
    let package = Package::builder("Wx", config(dir.path()))
        .source(source())
        .module(SpecBuilder::new("Circle", "Wx").build())
        .build()
        .unwrap();
    let err = package.generate_code("Circle").unwrap_err();
    assert!(matches!(err, WeldError::MissingDirector(class) if class == "Shape"));
}

#[test]
fn test_duplicate_module_is_rejected() {
    let dir = TempDir::new().unwrap();
    let err = Package::builder("Wx", config(dir.path()))
        .source(source())
        .module(SpecBuilder::new("Shape", "Wx").build())
        .module(SpecBuilder::new("Shape", "Wx").build())
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("module Shape declared twice"));
}

#[test]
fn test_common_typemaps_file() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let package = Package::builder("Wx", config(root)).source(source()).build().unwrap();
    assert!(package.write_common_typemaps().unwrap());
    assert!(!package.write_common_typemaps().unwrap());
    let text = read(root, "swig/common_typemaps.i");
    assert!(text.contains("%typemap("));
}
