//! Access and resolution tests over loaded archives
//!
//! Class hierarchies span several artifacts and the runtime, so every
//! check goes through the resolution chain.

use jarlens::analysis::MemberProblem;
use jarlens::config::RuntimeConfig;
use jarlens::loader::{ClasspathBuilder, Source};
use jarlens::model::{AccessFlags, Classpath};
use jarlens::test_utils::{ClassFileBuilder, JarBuilder, ModuleDescriptor};
use jarlens::{AccessCheck, AccessError, ClasspathAnalyzer, ResolutionChain, RuntimeProvider};
use std::sync::Arc;

fn load(sources: Vec<(&str, Vec<ClassFileBuilder>)>) -> Arc<Classpath> {
    let sources: Vec<Source> = sources
        .into_iter()
        .map(|(name, classes)| {
            let data = classes
                .into_iter()
                .fold(JarBuilder::new(), |jar, class| jar.class(class.build()))
                .build();
            Source::bytes(name, data)
        })
        .collect();
    Arc::new(ClasspathBuilder::default().build(&sources))
}

fn default_chain(classpath: &Arc<Classpath>) -> ResolutionChain {
    ResolutionChain::for_classpath(classpath.clone(), Arc::new(RuntimeProvider::default()))
}

/// Runtime loaded from a `java.base` image holding only `java.lang.Object`
fn object_runtime() -> RuntimeProvider {
    let mut jmod = vec![b'J', b'M', 1, 0];
    jmod.extend(
        JarBuilder::new()
            .file(
                "classes/java/lang/Object.class",
                &ClassFileBuilder::new("java/lang/Object").no_super_class().build(),
            )
            .build(),
    );
    ClasspathBuilder::default().build_runtime(&RuntimeConfig::default(), &[Source::bytes("java.base.jmod", jmod)])
}

fn hierarchy() -> Arc<Classpath> {
    load(vec![
        (
            "api.jar",
            vec![
                ClassFileBuilder::new("api/Base"),
                ClassFileBuilder::new("api/Marker").access(0x0601),
                ClassFileBuilder::new("api/Internal").access(0x0020),
            ],
        ),
        (
            "impl.jar",
            vec![
                ClassFileBuilder::new("impl/Middle").super_class("api/Base"),
                ClassFileBuilder::new("impl/Leaf").super_class("impl/Middle"),
                ClassFileBuilder::new("impl/Tagged").interface("api/Marker"),
            ],
        ),
        ("other.jar", vec![ClassFileBuilder::new("other/Stranger")]),
    ])
}

#[test]
fn test_subclass_across_artifacts() {
    let classpath = hierarchy();
    let chain = default_chain(&classpath);
    let check = AccessCheck::new(&chain);

    let leaf = classpath.class_def("impl.Leaf").unwrap();
    assert!(check.is_subclass(&leaf, "impl.Middle"));
    assert!(check.is_subclass(&leaf, "api.Base"));
    assert!(check.is_subclass(&leaf, "java.lang.Object"));
    assert!(!check.is_subclass(&leaf, "api.Marker"));

    let tagged = classpath.class_def("impl.Tagged").unwrap();
    assert!(check.is_subclass(&tagged, "api.Marker"));
}

#[test]
fn test_protected_member_from_subclass_in_other_package() {
    let classpath = hierarchy();
    let chain = default_chain(&classpath);
    let check = AccessCheck::new(&chain);

    let base = classpath.class_def("api.Base").unwrap();
    let leaf = classpath.class_def("impl.Leaf").unwrap();
    let stranger = classpath.class_def("other.Stranger").unwrap();

    assert!(check.member_accessible(&leaf, &base, AccessFlags::PROTECTED));
    assert!(!check.member_accessible(&stranger, &base, AccessFlags::PROTECTED));
    assert!(!check.member_accessible(&leaf, &base, AccessFlags::PACKAGE));
    assert!(!check.member_accessible(&leaf, &base, AccessFlags::PRIVATE));
    assert!(check.member_accessible(&stranger, &base, AccessFlags::PUBLIC));
    assert!(check.member_accessible(&base, &base, AccessFlags::PRIVATE));
}

#[test]
fn test_package_private_class_visibility() {
    let classpath = hierarchy();
    let chain = default_chain(&classpath);
    let check = AccessCheck::new(&chain);

    let internal = classpath.class_def("api.Internal").unwrap();
    let base = classpath.class_def("api.Base").unwrap();
    let leaf = classpath.class_def("impl.Leaf").unwrap();

    assert_eq!(check.class_accessible(&base, &internal).ok(), Some(true));
    assert_eq!(check.class_accessible(&leaf, &internal).ok(), Some(false));
    assert_eq!(check.class_accessible(&leaf, &base).ok(), Some(true));
}

#[test]
fn test_private_class_flags_are_rejected() {
    let classpath = load(vec![(
        "odd.jar",
        vec![
            ClassFileBuilder::new("odd/Private").access(0x0022),
            ClassFileBuilder::new("odd/User"),
        ],
    )]);
    let chain = default_chain(&classpath);
    let check = AccessCheck::new(&chain);

    let target = classpath.class_def("odd.Private").unwrap();
    let user = classpath.class_def("odd.User").unwrap();
    assert!(matches!(
        check.class_accessible(&user, &target),
        Err(AccessError::IllegalClassAccessFlags(name)) if name == "odd.Private"
    ));
}

#[test]
fn test_self_extending_class_terminates() {
    let classpath = load(vec![(
        "loop.jar",
        vec![
            ClassFileBuilder::new("l/A").super_class("l/B"),
            ClassFileBuilder::new("l/B").super_class("l/A"),
        ],
    )]);
    let chain = default_chain(&classpath);
    let check = AccessCheck::new(&chain);

    let a = classpath.class_def("l.A").unwrap();
    assert!(check.is_subclass(&a, "l.B"));
    assert!(!check.is_subclass(&a, "l.Missing"));
}

#[test]
fn test_runtime_library_replaces_prefix_lookup() {
    let mut jmod = vec![b'J', b'M', 1, 0];
    jmod.extend(
        JarBuilder::new()
            .file(
                "classes/java/lang/Thread.class",
                &ClassFileBuilder::new("java/lang/Thread").build(),
            )
            .file(
                "classes/module-info.class",
                &ClassFileBuilder::module_info(ModuleDescriptor::new("java.base").exports("java/lang")).build(),
            )
            .build(),
    );

    let builder = ClasspathBuilder::default();
    let runtime = builder.build_runtime(&RuntimeConfig::default(), &[Source::bytes("java.base.jmod", jmod)]);

    let library = runtime.library().unwrap();
    let base = &library.jar_files()[0];
    assert_eq!(base.module().name(), Some("java.base"));
    assert!(base.module().exports_package("java.lang"));

    let classpath = load(vec![("app.jar", vec![ClassFileBuilder::new("app/Main")])]);
    let chain = ResolutionChain::for_classpath(classpath, Arc::new(runtime));
    assert!(chain.resolve("java.lang.Thread").is_some());
    assert!(chain.resolve("java.util.List").is_none());
    assert!(chain.resolve("app.Main").is_some());
}

#[test]
fn test_member_references_across_artifacts() {
    let classpath = load(vec![
        (
            "app.jar",
            vec![
                ClassFileBuilder::new("app/Main")
                    .field_ref("lib/Api", "secret", "I")
                    .method_ref("lib/Api", "call", "(I)V")
                    .method_ref("lib/Api", "call", "(J)V")
                    .method_ref("lib/Api", "hook", "()V"),
                ClassFileBuilder::new("app/Sub")
                    .super_class("lib/Api")
                    .method_ref("lib/Api", "hook", "()V")
                    .field_ref("lib/Api", "secret", "I"),
            ],
        ),
        (
            "lib.jar",
            vec![ClassFileBuilder::new("lib/Api")
                .field_with_access("secret", "I", 0x0002)
                .method("call", "(I)V")
                .method_with_access("hook", "()V", 0x0004)],
        ),
    ]);
    let chain = ResolutionChain::for_classpath(classpath.clone(), Arc::new(object_runtime()));

    let rows: Vec<_> = ClasspathAnalyzer::new(&classpath, &chain)
        .member_issues()
        .into_iter()
        .map(|m| (m.class_name, m.member, m.problem, m.declared_in))
        .collect();

    assert_eq!(
        rows,
        vec![
            ("app.Main".to_string(), "secret:I".to_string(), MemberProblem::Inaccessible, Some("lib.Api".to_string())),
            ("app.Main".to_string(), "call(J)V".to_string(), MemberProblem::Missing, None),
            ("app.Main".to_string(), "hook()V".to_string(), MemberProblem::Inaccessible, Some("lib.Api".to_string())),
            ("app.Sub".to_string(), "secret:I".to_string(), MemberProblem::Inaccessible, Some("lib.Api".to_string())),
        ]
    );
}

#[test]
fn test_runtime_subclass_without_runtime_image() {
    let classpath = load(vec![(
        "app.jar",
        vec![ClassFileBuilder::new("app/MyList")
            .super_class("java/util/AbstractList")
            .method_ref("java/util/AbstractList", "removeRange", "(II)V")
            .method_ref("java/util/AbstractList", "noSuchMethod", "()V")],
    )]);
    let chain = default_chain(&classpath);
    let check = AccessCheck::new(&chain);

    let my_list = classpath.class_def("app.MyList").unwrap();
    let abstract_list = chain.resolve("java.util.AbstractList").unwrap();
    assert!(abstract_list.has_unknown_ancestry());
    assert!(abstract_list.super_name().is_none());

    // the runtime hierarchy is unknown, so nothing is claimed either way
    assert!(!check.is_subclass(&my_list, "java.util.AbstractCollection"));
    let collection = chain.resolve("java.util.AbstractCollection").unwrap();
    assert!(check.member_accessible(&my_list, &collection, AccessFlags::PROTECTED));

    let analyzer = ClasspathAnalyzer::new(&classpath, &chain);
    assert!(analyzer.member_issues().is_empty());
    assert!(analyzer.illegal_access().is_empty());
    assert!(analyzer.shadowed_classes().is_empty());
}

#[test]
fn test_classpath_copy_of_runtime_class_is_shadowed() {
    let classpath = load(vec![(
        "rt-copy.jar",
        vec![ClassFileBuilder::new("java/lang/Object").no_super_class(), ClassFileBuilder::new("app/Main")],
    )]);
    let chain = ResolutionChain::for_classpath(classpath.clone(), Arc::new(object_runtime()));

    let rows = ClasspathAnalyzer::new(&classpath, &chain).shadowed_classes();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].class_name, "java.lang.Object");
    assert_eq!(rows[0].artifact, "rt-copy.jar");
    assert_eq!(rows[0].runtime_source, "java.base.jmod");
    assert!(rows[0].identical);
}
