use assert_matches::assert_matches;
use mapper_gen::codegen::{JavaEmitter, JavaEmitterOptions};
use mapper_gen::{
    find_reserved, synthesize, Diagnostics, Driver, FieldType, GenError, MapperConfig,
};
use mapper_types::{ClassFile, NodeId, Origin, ProgramTree, TypeHierarchy, FIELD_MAPPER_NAME};
use std::path::Path;

fn crate_root() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

fn load_tree(relative_path: &str) -> ProgramTree {
    let path = crate_root().join(relative_path);
    ClassFile::load(&path).expect("load class fixture").into_tree()
}

fn class(tree: &ProgramTree, name: &str) -> NodeId {
    tree.find_class(name)
        .unwrap_or_else(|| panic!("fixture declares {name}"))
}

fn inline_driver() -> Driver {
    Driver::new(MapperConfig::default().with_inline(true))
}

#[test]
fn entity_gets_exactly_the_expected_accessors() {
    let mut tree = load_tree("tests/fixtures/entity.yaml");
    let user = class(&tree, "UserEntity");
    let mut sink = Diagnostics::new();

    let report = inline_driver().run(&mut tree, &mut sink);
    assert!(report.injected.contains(&user));

    let (mapper, origin) = find_reserved(&tree, user).expect("accessor type injected");
    assert_eq!(origin, Origin::Synthesized);
    assert_eq!(tree.class(mapper).unwrap().name, FIELD_MAPPER_NAME);

    let names: Vec<&str> = tree.methods_of(mapper).map(|(_, m)| m.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "set", "get", "setId", "getId", "setName", "getName", "setAge", "getAge", "setTags",
            "getTags"
        ]
    );
    assert!(tree.methods_of(mapper).all(|(_, m)| m.is_static && m.body.is_some()));

    /* Host members other than the new nested type are untouched */
    let host_methods: Vec<&str> = tree.methods_of(user).map(|(_, m)| m.name.as_str()).collect();
    assert_eq!(host_methods.last(), Some(&"describe"));
    assert_eq!(tree.nested_of(user).count(), 1);
}

#[test]
fn broken_classes_are_reported_and_skipped() {
    let mut tree = load_tree("tests/fixtures/entity.yaml");
    let broken = class(&tree, "BrokenEntity");
    let broken_list = class(&tree, "BrokenListEntity");
    let empty = class(&tree, "EmptyEntity");
    let plain = class(&tree, "PlainClass");
    let mut sink = Diagnostics::new();

    let report = inline_driver().run(&mut tree, &mut sink);
    assert_eq!(report.failed, vec![broken, broken_list]);
    assert_eq!(report.skipped, vec![empty]);

    let messages: Vec<(NodeId, &str)> = sink
        .errors()
        .map(|d| (d.anchor, d.message.as_str()))
        .collect();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].0, broken);
    assert!(messages[0].1.contains("setName") && messages[0].1.contains("BrokenEntity"));
    assert_eq!(messages[1].0, broken_list);
    assert!(messages[1].1.contains("getMembers"));

    for id in [broken, broken_list, empty, plain] {
        assert!(find_reserved(&tree, id).is_none());
    }
}

#[test]
fn raw_list_fields_are_sequences() {
    let tree = load_tree("tests/fixtures/entity.yaml");
    let raw = class(&tree, "RawListEntity");
    let hierarchy = TypeHierarchy::from_tree(&tree);

    let synthesized = synthesize(&tree, raw, &hierarchy).expect("raw list synthesizes");
    assert!(synthesized.method("setItems").is_some());

    let fields = mapper_gen::FieldCatalog::new(&tree, &hierarchy)
        .catalog(raw)
        .unwrap();
    assert_matches!(fields[0].ty, FieldType::Sequence(_));
}

#[test]
fn missing_accessor_errors_name_the_method() {
    let tree = load_tree("tests/fixtures/entity.yaml");
    let hierarchy = TypeHierarchy::from_tree(&tree);
    let errors = synthesize(&tree, class(&tree, "BrokenListEntity"), &hierarchy).unwrap_err();

    assert_matches!(
        errors.as_slice(),
        [GenError::MissingGetter { method, class, .. }] if method == "getMembers" && class == "BrokenListEntity"
    );
}

#[test]
fn pipeline_is_idempotent() {
    let mut tree = load_tree("tests/fixtures/entity.yaml");
    let driver = inline_driver();
    driver.run(&mut tree, &mut Diagnostics::new());
    let after_first = tree.clone();

    let report = driver.run(&mut tree, &mut Diagnostics::new());
    assert!(report.injected.is_empty());
    assert_eq!(report.already_present.len(), 2);
    assert_eq!(tree, after_first);
}

#[test]
fn injected_tree_renders_as_java() {
    let mut tree = load_tree("tests/fixtures/entity.yaml");
    inline_driver().run(&mut tree, &mut Diagnostics::new());
    let user = class(&tree, "UserEntity");

    let source = JavaEmitter::new(&tree, JavaEmitterOptions::default())
        .emit_class(user)
        .expect("emit java");
    assert!(source.contains("public static class FieldMapper {"));
    assert!(source.contains("instance.setAge(((java.lang.Integer) value));"));
    assert!(source.contains("public static void setTags(UserEntity instance, java.util.List<String> tags) {"));
    assert!(source.contains("throw new UnsupportedOperationException(\"describe\");"));
}
