//! Integration tests for classpath analysis
//!
//! These tests load in-memory archives and run the complete analysis
//! pipeline against them.

use jarlens::analysis::{DuplicateClass, SplitPackage, UnresolvedClasses};
use jarlens::config::AnalysisConfig;
use jarlens::loader::{ClasspathBuilder, Source};
use jarlens::model::Classpath;
use jarlens::report::{ReportFormat, Reporter};
use jarlens::test_utils::{ClassFileBuilder, JarBuilder};
use jarlens::{ClasspathAnalyzer, ResolutionChain, RuntimeProvider, Strategy};
use std::sync::Arc;

fn jar(classes: Vec<ClassFileBuilder>) -> Vec<u8> {
    classes
        .into_iter()
        .fold(JarBuilder::new(), |jar, class| jar.class(class.build()))
        .build()
}

fn load(sources: Vec<(&str, Vec<u8>)>) -> Arc<Classpath> {
    let sources: Vec<Source> = sources
        .into_iter()
        .map(|(name, data)| Source::bytes(name, data))
        .collect();
    Arc::new(ClasspathBuilder::default().build(&sources))
}

fn chain(classpath: &Arc<Classpath>) -> ResolutionChain {
    ResolutionChain::for_classpath(classpath.clone(), Arc::new(RuntimeProvider::default()))
}

/// a.jar {a.A, a.B} and b.jar {a.B, b.C}; a.A uses b.C and the missing c.C
fn overlapping_classpath() -> Arc<Classpath> {
    load(vec![
        (
            "a.jar",
            jar(vec![
                ClassFileBuilder::new("a/A").class_ref("b/C").class_ref("c/C"),
                ClassFileBuilder::new("a/B"),
            ]),
        ),
        (
            "b.jar",
            jar(vec![ClassFileBuilder::new("a/B"), ClassFileBuilder::new("b/C")]),
        ),
    ])
}

#[test]
fn test_duplicate_class_across_artifacts() {
    let classpath = overlapping_classpath();
    let chain = chain(&classpath);
    let analyzer = ClasspathAnalyzer::new(&classpath, &chain);

    assert_eq!(
        analyzer.duplicate_classes(),
        vec![DuplicateClass {
            class_name: "a.B".to_string(),
            artifacts: vec!["a.jar".to_string(), "b.jar".to_string()],
            identical: true,
        }]
    );
}

#[test]
fn test_split_package_across_artifacts() {
    let classpath = overlapping_classpath();
    let chain = chain(&classpath);
    let analyzer = ClasspathAnalyzer::new(&classpath, &chain);

    assert_eq!(
        analyzer.split_packages(),
        vec![SplitPackage {
            package: "a".to_string(),
            artifacts: vec!["a.jar".to_string(), "b.jar".to_string()],
        }]
    );
}

#[test]
fn test_dependency_and_unresolved_reference() {
    let classpath = overlapping_classpath();
    let chain = chain(&classpath);
    let analyzer = ClasspathAnalyzer::new(&classpath, &chain);

    let dependencies = analyzer.jar_dependencies();
    let a = dependencies.rows.iter().find(|r| r.artifact == "a.jar").unwrap();
    let b = dependencies.rows.iter().find(|r| r.artifact == "b.jar").unwrap();
    assert_eq!(a.uses, vec!["b.jar".to_string()]);
    assert!(a.used_by.is_empty());
    assert!(b.uses.is_empty());
    assert_eq!(b.used_by, vec!["a.jar".to_string()]);
    assert!(dependencies.cycles.is_empty());

    assert_eq!(
        analyzer.unresolved_classes(),
        vec![UnresolvedClasses {
            artifact: "a.jar".to_string(),
            classes: vec!["c.C".to_string()],
        }]
    );
}

#[test]
fn test_changed_duplicate_is_not_identical() {
    let classpath = load(vec![
        ("one.jar", jar(vec![ClassFileBuilder::new("x/X")])),
        ("two.jar", jar(vec![ClassFileBuilder::new("x/X").field("extra", "I")])),
    ]);
    let chain = chain(&classpath);
    let duplicates = ClasspathAnalyzer::new(&classpath, &chain).duplicate_classes();

    assert_eq!(duplicates.len(), 1);
    assert!(!duplicates[0].identical);
}

#[test]
fn test_dependency_cycle() {
    let classpath = load(vec![
        ("x.jar", jar(vec![ClassFileBuilder::new("x/X").class_ref("y/Y")])),
        ("y.jar", jar(vec![ClassFileBuilder::new("y/Y").class_ref("x/X")])),
        ("z.jar", jar(vec![ClassFileBuilder::new("z/Z").class_ref("x/X")])),
    ]);
    let chain = chain(&classpath);
    let dependencies = ClasspathAnalyzer::new(&classpath, &chain).jar_dependencies();

    assert_eq!(
        dependencies.cycles,
        vec![vec!["x.jar".to_string(), "y.jar".to_string()]]
    );
}

#[test]
fn test_runtime_references_are_resolved() {
    let classpath = load(vec![(
        "app.jar",
        jar(vec![ClassFileBuilder::new("app/Main")
            .super_class("java/lang/Thread")
            .class_ref("javax/sql/DataSource")
            .method_ref("java/util/List", "size", "()I")]),
    )]);
    let chain = chain(&classpath);
    let analyzer = ClasspathAnalyzer::new(&classpath, &chain);

    assert!(analyzer.unresolved_classes().is_empty());
    assert!(analyzer.jar_dependencies().rows[0].uses.is_empty());
}

#[test]
fn test_package_private_class_is_illegal_access() {
    let classpath = load(vec![
        ("user.jar", jar(vec![ClassFileBuilder::new("p/User").class_ref("q/Hidden")])),
        ("hidden.jar", jar(vec![ClassFileBuilder::new("q/Hidden").access(0x0020)])),
    ]);
    let chain = chain(&classpath);
    let rows = ClasspathAnalyzer::new(&classpath, &chain).illegal_access();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].artifact, "user.jar");
    assert_eq!(rows[0].class_name, "p.User");
    assert_eq!(rows[0].target, "q.Hidden");
    assert_eq!(rows[0].target_source, "hidden.jar");
}

#[test]
fn test_class_versions_per_artifact_and_total() {
    let classpath = load(vec![
        (
            "old.jar",
            jar(vec![
                ClassFileBuilder::new("o/A").version(50, 0),
                ClassFileBuilder::new("o/B").version(52, 0),
            ]),
        ),
        ("new.jar", jar(vec![ClassFileBuilder::new("n/A").version(61, 0)])),
    ]);
    let chain = chain(&classpath);
    let rows = ClasspathAnalyzer::new(&classpath, &chain).class_versions();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].artifact, "old.jar");
    let labels: Vec<_> = rows[0].versions.iter().map(|v| v.java_version.as_str()).collect();
    assert_eq!(labels, vec!["Java 8", "Java 6"]);

    let total = &rows[2];
    assert_eq!(total.artifact, "Classpath");
    assert_eq!(total.versions[0].java_version, "Java 17");
    assert_eq!(total.versions.iter().map(|v| v.classes).sum::<usize>(), 3);
}

#[test]
fn test_parent_first_prefers_runtime() {
    let classpath = Arc::new(
        ClasspathBuilder::default()
            .with_strategy(Strategy::ParentFirst)
            .build(&[Source::bytes(
                "shadow.jar",
                jar(vec![ClassFileBuilder::new("java/lang/Thread")]),
            )]),
    );
    let chain = chain(&classpath);

    let resolved = chain.locate("java.lang.Thread").unwrap();
    assert_eq!(resolved.provider, "runtime");
    assert!(resolved.class.owner().is_none());
}

#[test]
fn test_run_respects_disabled_analyzers() {
    let classpath = overlapping_classpath();
    let chain = chain(&classpath);
    let config = AnalysisConfig {
        duplicate_resources: false,
        jar_dependencies: false,
        ..AnalysisConfig::default()
    };

    let report = ClasspathAnalyzer::new(&classpath, &chain).run(&config);
    assert!(report.duplicate_resources.is_none());
    assert!(report.jar_dependencies.is_none());
    assert_eq!(report.duplicate_classes.as_ref().map(Vec::len), Some(1));
    // one duplicate, one split package, one unresolved class
    assert_eq!(report.issue_count(), 3);
    assert!(report.has_issues());
}

#[test]
fn test_json_report_for_overlapping_classpath() {
    let classpath = overlapping_classpath();
    let chain = chain(&classpath);
    let report = ClasspathAnalyzer::new(&classpath, &chain).run(&AnalysisConfig::default());

    let output = Reporter::new(ReportFormat::Json, None).render(&report).unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(json["duplicate_classes"][0]["class_name"], "a.B");
    assert_eq!(json["split_packages"][0]["package"], "a");
    assert_eq!(json["unresolved_classes"][0]["classes"][0], "c.C");
    assert_eq!(json["total_issues"], 3);
}
