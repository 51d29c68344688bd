//! Ingestion integration tests
//!
//! Archives are built in memory and loaded through the public ingestor and
//! classpath builder.

use jarlens::archive::{ArchiveLimits, ArchiveReader};
use jarlens::classfile::{parse_class, ParseOptions};
use jarlens::error::{ArchiveError, ClassFormatError, LoadError};
use jarlens::loader::{ArtifactIngestor, ClasspathBuilder, IngestOptions, Source};
use jarlens::model::JarFile;
use jarlens::test_utils::{ClassFileBuilder, JarBuilder, ModuleDescriptor};
use jarlens::NoopResolver;
use proptest::prelude::*;
use std::sync::Arc;

fn ingest(name: &str, data: Vec<u8>) -> Result<Vec<Arc<JarFile>>, LoadError> {
    ingest_with(IngestOptions::default(), name, data)
}

fn ingest_with(options: IngestOptions, name: &str, data: Vec<u8>) -> Result<Vec<Arc<JarFile>>, LoadError> {
    let reader = ArchiveReader::from_bytes(name, data, options.limits).map_err(LoadError::from)?;
    ArtifactIngestor::new(options, Arc::new(NoopResolver)).ingest(name, None, reader)
}

fn simple_jar(classes: &[&str]) -> Vec<u8> {
    classes
        .iter()
        .fold(JarBuilder::new(), |jar, name| jar.class(ClassFileBuilder::new(name).build()))
        .build()
}

// ============================================================================
// Multi-release overlay
// ============================================================================

#[test]
fn test_versioned_class_wins_when_listed_first() {
    let jar = JarBuilder::new()
        .manifest("Multi-Release: true")
        .versioned_class(11, ClassFileBuilder::new("a/A").version(55, 0).build())
        .class(ClassFileBuilder::new("a/A").build())
        .build();

    let jars = ingest("a.jar", jar).unwrap();
    let class = jars[0].class_def("a.A").unwrap();
    assert_eq!(class.release(), 11);
    assert_eq!(class.major_version(), 55);
    assert_eq!(jars[0].classes().len(), 1);
}

#[test]
fn test_versioned_class_wins_when_listed_last() {
    let jar = JarBuilder::new()
        .manifest("Multi-Release: true")
        .class(ClassFileBuilder::new("a/A").build())
        .versioned_class(9, ClassFileBuilder::new("a/A").version(53, 0).build())
        .versioned_class(17, ClassFileBuilder::new("a/A").version(61, 0).build())
        .versioned_class(11, ClassFileBuilder::new("a/A").version(55, 0).build())
        .build();

    let jars = ingest("a.jar", jar).unwrap();
    let class = jars[0].class_def("a.A").unwrap();
    assert_eq!(class.release(), 17);
    assert_eq!(class.major_version(), 61);
    assert_eq!(jars[0].releases().iter().copied().collect::<Vec<_>>(), vec![9, 11, 17]);
}

#[test]
fn test_versioned_resource_overlays_base_resource() {
    let jar = JarBuilder::new()
        .manifest("Multi-Release: true")
        .file("META-INF/versions/11/config.properties", b"v=11")
        .file("config.properties", b"v=8")
        .build();

    let jars = ingest("a.jar", jar).unwrap();
    let resources = jars[0].resources();
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0].path(), "config.properties");
    assert_eq!(resources[0].release(), 11);
}

#[test]
fn test_release_ceiling_is_inclusive() {
    let jar = || {
        JarBuilder::new()
            .manifest("Multi-Release: true")
            .class(ClassFileBuilder::new("a/A").build())
            .versioned_class(11, ClassFileBuilder::new("a/A").version(55, 0).build())
            .build()
    };

    let at_ceiling = IngestOptions {
        max_release: 11,
        ..IngestOptions::default()
    };
    let jars = ingest_with(at_ceiling, "a.jar", jar()).unwrap();
    assert_eq!(jars[0].class_def("a.A").unwrap().release(), 11);

    let below_ceiling = IngestOptions {
        max_release: 10,
        ..IngestOptions::default()
    };
    let jars = ingest_with(below_ceiling, "a.jar", jar()).unwrap();
    assert_eq!(jars[0].class_def("a.A").unwrap().release(), 8);
}

#[test]
fn test_unparseable_release_keeps_path() {
    let jar = JarBuilder::new()
        .manifest("Multi-Release: true")
        .file("META-INF/versions/latest/notes.txt", b"x")
        .build();

    // the path is kept as-is and then skipped as META-INF content
    let jars = ingest("a.jar", jar).unwrap();
    assert!(jars[0].resources().is_empty());
    assert!(jars[0].releases().is_empty());
}

#[test]
fn test_module_descriptor_from_highest_release() {
    let base = ClassFileBuilder::module_info(ModuleDescriptor::new("org.example")).build();
    let versioned = ClassFileBuilder::module_info(ModuleDescriptor::new("org.example").requires("java.sql")).build();

    let jar = JarBuilder::new()
        .manifest("Multi-Release: true\r\nAutomatic-Module-Name: org.example.auto")
        .versioned_class(11, versioned)
        .class(base)
        .build();

    let jars = ingest("a.jar", jar).unwrap();
    let module = jars[0].module();
    assert_eq!(module.name(), Some("org.example"));
    assert!(!module.is_automatic());
    assert!(module.requires().iter().any(|r| r == "java.sql"));
}

#[test]
fn test_explicit_module_replaces_automatic_module() {
    let jar = JarBuilder::new()
        .manifest("Automatic-Module-Name: org.example.auto")
        .class(ClassFileBuilder::module_info(ModuleDescriptor::new("org.example")).build())
        .build();

    let jars = ingest("a.jar", jar).unwrap();
    assert_eq!(jars[0].module().name(), Some("org.example"));
    assert!(!jars[0].module().is_automatic());
}

// ============================================================================
// Nested and web archives
// ============================================================================

#[test]
fn test_nested_jar_becomes_separate_artifact() {
    let inner = simple_jar(&["b/B"]);
    let outer = JarBuilder::new()
        .class(ClassFileBuilder::new("a/A").build())
        .file("lib/inner.jar", &inner)
        .build();

    let jars = ingest("outer.jar", outer).unwrap();
    let names: Vec<_> = jars.iter().map(|j| j.file_name()).collect();
    assert_eq!(names, vec!["outer.jar", "outer.jar!/lib/inner.jar"]);

    assert!(jars[0].class_def("a.A").is_some());
    assert!(jars[0].class_def("b.B").is_none());
    assert!(jars[0].resources().is_empty());
    assert!(jars[1].class_def("b.B").is_some());
}

#[test]
fn test_war_loads_only_library_jars() {
    let war = JarBuilder::new()
        .file("index.html", b"<html/>")
        .file("WEB-INF/classes/w/Servlet.class", &ClassFileBuilder::new("w/Servlet").build())
        .file("WEB-INF/lib/zeta.jar", &simple_jar(&["z/Z"]))
        .file("WEB-INF/lib/Alpha.jar", &simple_jar(&["a/A"]))
        .file("WEB-INF/lib/sub/hidden.jar", &simple_jar(&["h/H"]))
        .build();

    let jars = ingest("app.war", war).unwrap();
    let names: Vec<_> = jars.iter().map(|j| j.file_name()).collect();
    assert_eq!(names, vec!["Alpha.jar", "zeta.jar"]);
    assert!(jars.iter().all(|j| j.class_def("w.Servlet").is_none()));
}

#[test]
fn test_broken_library_fails_the_war() {
    let war = JarBuilder::new()
        .file("WEB-INF/lib/good.jar", &simple_jar(&["a/A"]))
        .file("WEB-INF/lib/bad.jar", b"not a zip")
        .build();

    assert!(ingest("app.war", war).is_err());
}

#[test]
fn test_nested_jar_shares_total_size_ceiling() {
    let inner = JarBuilder::new()
        .file("one.txt", &[b'1'; 60])
        .file("two.txt", &[b'2'; 60])
        .build();
    let inner_len = inner.len() as u64;
    let outer = JarBuilder::new().file("lib/inner.jar", &inner).build();

    let with_total = |max_total_size| IngestOptions {
        limits: ArchiveLimits {
            max_total_size,
            ..ArchiveLimits::default()
        },
        ..IngestOptions::default()
    };

    let jars = ingest_with(with_total(inner_len + 120), "outer.jar", outer.clone()).unwrap();
    assert_eq!(jars[1].resources().len(), 2);

    let err = ingest_with(with_total(inner_len + 119), "outer.jar", outer).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Archive(ArchiveError::TotalSizeExceeded { max }) if max == inner_len + 119
    ));
}

#[test]
fn test_nesting_depth_ceiling() {
    let inner = simple_jar(&["c/C"]);
    let middle = JarBuilder::new()
        .class(ClassFileBuilder::new("b/B").build())
        .file("lib/inner.jar", &inner)
        .build();
    let outer = JarBuilder::new()
        .class(ClassFileBuilder::new("a/A").build())
        .file("lib/middle.jar", &middle)
        .build();

    let with_depth = |max_nesting_depth| IngestOptions {
        limits: ArchiveLimits {
            max_nesting_depth,
            ..ArchiveLimits::default()
        },
        ..IngestOptions::default()
    };

    let jars = ingest_with(with_depth(2), "outer.jar", outer.clone()).unwrap();
    let names: Vec<_> = jars.iter().map(|j| j.file_name()).collect();
    assert_eq!(
        names,
        vec!["outer.jar", "outer.jar!/lib/middle.jar", "outer.jar!/lib/middle.jar!/lib/inner.jar"]
    );

    let err = ingest_with(with_depth(1), "outer.jar", outer).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Archive(ArchiveError::NestingTooDeep { max: 1, .. })
    ));
}

// ============================================================================
// Errors and ceilings
// ============================================================================

#[test]
fn test_class_decoding_error_names_the_entry() {
    let jar = JarBuilder::new()
        .class(ClassFileBuilder::new("a/A").build())
        .file("a/Broken.class", &[0xDE, 0xAD, 0xBE, 0xEF, 0, 0, 0, 52])
        .build();

    match ingest("a.jar", jar) {
        Err(LoadError::Entry { entry, source }) => {
            assert_eq!(entry, "a/Broken.class");
            assert!(matches!(source, ClassFormatError::BadMagic(_)));
        }
        other => panic!("expected entry error, got {:?}", other),
    }
}

#[test]
fn test_wide_constant_in_last_pool_slot_is_rejected() {
    let mut data = vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0, 0, 52, 0xFF, 0xFF];
    for _ in 1..65534 {
        data.extend_from_slice(&[1, 0, 0]);
    }
    // a Long needs two slots but only slot 65534 is left
    data.extend_from_slice(&[5, 0, 0, 0, 0, 0, 0, 0, 1]);

    assert_eq!(
        parse_class(&data, ParseOptions::default()).unwrap_err(),
        ClassFormatError::BadConstant { index: 65534 }
    );
}

#[test]
fn test_entry_count_ceiling() {
    let options = IngestOptions {
        limits: ArchiveLimits {
            max_entry_count: 3,
            ..ArchiveLimits::default()
        },
        ..IngestOptions::default()
    };

    let jars = ingest_with(options, "a.jar", simple_jar(&["a/A", "a/B", "a/C"])).unwrap();
    assert_eq!(jars[0].classes().len(), 3);

    let err = ingest_with(options, "a.jar", simple_jar(&["a/A", "a/B", "a/C", "a/D"])).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Archive(ArchiveError::TooManyEntries { max: 3 })
    ));
}

#[test]
fn test_entry_size_ceiling() {
    let options = IngestOptions {
        limits: ArchiveLimits {
            max_entry_size: 4,
            ..ArchiveLimits::default()
        },
        ..IngestOptions::default()
    };

    let jar = JarBuilder::new().file("exact.txt", b"1234").build();
    assert!(ingest_with(options, "a.jar", jar).is_ok());

    let jar = JarBuilder::new().file("large.txt", b"12345").build();
    let err = ingest_with(options, "a.jar", jar).unwrap_err();
    match err {
        LoadError::Archive(e) => assert!(e.is_ceiling()),
        other => panic!("expected ceiling error, got {:?}", other),
    }
}

#[test]
fn test_total_size_ceiling() {
    let options = IngestOptions {
        limits: ArchiveLimits {
            max_total_size: 8,
            ..ArchiveLimits::default()
        },
        ..IngestOptions::default()
    };

    let jar = JarBuilder::new().file("a.txt", b"1234").file("b.txt", b"5678").build();
    assert_eq!(ingest_with(options, "a.jar", jar).unwrap()[0].resources().len(), 2);

    let jar = JarBuilder::new()
        .file("a.txt", b"1234")
        .file("b.txt", b"5678")
        .file("c.txt", b"9")
        .build();
    let err = ingest_with(options, "a.jar", jar).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Archive(ArchiveError::TotalSizeExceeded { max: 8 })
    ));
}

// ============================================================================
// Classpath building
// ============================================================================

#[test]
fn test_classpath_keeps_input_order() {
    // the first source takes far longer to load than all the others
    let large: Vec<String> = (0..2000).map(|i| format!("big/C{}", i)).collect();
    let large: Vec<&str> = large.iter().map(String::as_str).collect();

    let mut sources = vec![Source::bytes("lib00.jar", simple_jar(&large))];
    sources.extend((1..16).map(|i| Source::bytes(format!("lib{:02}.jar", i), simple_jar(&[&format!("p{}/C", i)]))));

    let classpath = ClasspathBuilder::default().with_threads(4).build(&sources);
    let names: Vec<_> = classpath.jar_files().iter().map(|j| j.file_name().to_string()).collect();
    let expected: Vec<_> = (0..16).map(|i| format!("lib{:02}.jar", i)).collect();
    assert_eq!(names, expected);
    assert_eq!(classpath.jar_files()[0].classes().len(), 2000);
}

#[test]
fn test_failing_source_does_not_abort_build() {
    let bad_class = JarBuilder::new().file("x/X.class", b"garbage").build();
    let sources = vec![
        Source::bytes("first.jar", simple_jar(&["x/Shared"])),
        Source::bytes("bad.jar", bad_class),
        Source::file("/nonexistent/missing.jar"),
        Source::bytes("second.jar", simple_jar(&["x/Shared", "y/Y"])),
    ];

    let classpath = ClasspathBuilder::default().build(&sources);
    let names: Vec<_> = classpath.jar_files().iter().map(|j| j.file_name()).collect();
    assert_eq!(names, vec!["first.jar", "second.jar"]);

    let shared = classpath.class_def("x.Shared").unwrap();
    assert_eq!(shared.owner().unwrap().file_name(), "first.jar");
    assert_eq!(classpath.class_defs("x.Shared").len(), 2);
}

#[test]
fn test_checksum_and_size_cover_whole_archive() {
    let data = simple_jar(&["a/A"]);
    let expected_size = data.len() as u64;
    let classpath = ClasspathBuilder::default().build(&[Source::bytes("a.jar", data)]);

    let jar = &classpath.jar_files()[0];
    assert_eq!(jar.size(), expected_size);
    assert_eq!(jar.checksum().len(), 40);
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    #[test]
    fn prop_parse_never_panics(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = parse_class(&data, ParseOptions::default());
    }

    #[test]
    fn prop_parse_is_deterministic(
        package in "[a-z]{1,8}",
        class in "[A-Z][a-z]{0,8}",
        fields in proptest::collection::vec("[a-z]{1,6}", 0..4),
    ) {
        let internal = format!("{}/{}", package, class);
        let data = fields
            .iter()
            .fold(ClassFileBuilder::new(&internal), |b, f| b.field(f, "Ljava/lang/String;"))
            .build();

        let first = parse_class(&data, ParseOptions::default()).unwrap();
        let second = parse_class(&data, ParseOptions::default()).unwrap();
        prop_assert_eq!(first.name(), format!("{}.{}", package, class));
        prop_assert_eq!(first, second);
    }
}
