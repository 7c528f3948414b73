use privilege_xml::{
    ErrorKind, NamespaceTable, PrivilegeDefinition, PrivilegeDefinitionReader,
    PrivilegeDefinitionWriter, PrivilegeError, QualifiedName,
};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::PathBuf;

const FOO_URI: &str = "http://www.foo.com/1.0";

fn fixture_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("tests");
    p.push("fixtures");
    p.push(name);
    p
}

fn normalize(s: &str) -> String {
    s.replace("\r\n", "\n").trim().to_string()
}

fn qn(text: &str) -> QualifiedName {
    QualifiedName::parse(text).unwrap_or_else(|e| panic!("bad name {}: {}", text, e))
}

fn def(name: &str, is_abstract: bool, aggregates: &[&str]) -> PrivilegeDefinition {
    PrivilegeDefinition::new(qn(name), is_abstract, aggregates.iter().map(|a| qn(a)).collect())
}

fn expected_definitions() -> Vec<PrivilegeDefinition> {
    vec![
        def("foo:testRead", false, &[]),
        def("foo:testWrite", false, &[]),
        def("foo:testAbstract", true, &[]),
        def("foo:testNonAbstract", false, &[]),
        def("foo:testAll", false, &["foo:testRead", "foo:testWrite"]),
    ]
}

fn foo_namespaces() -> NamespaceTable {
    NamespaceTable::from_pairs([("foo", FOO_URI)]).expect("namespace table")
}

fn read_str(xml: &str) -> privilege_xml::Result<PrivilegeDefinitionReader> {
    PrivilegeDefinitionReader::new(xml.as_bytes(), "text/xml")
}

/// A stream that fails the test if anything reads from it.
struct UntouchableStream;

impl Read for UntouchableStream {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        panic!("stream must not be read for an unsupported format");
    }
}

#[test]
fn read_fixture_matches_expected_definitions() {
    let file = File::open(fixture_path("readtest.xml")).expect("open readtest.xml");
    let reader = PrivilegeDefinitionReader::new(file, "text/xml").expect("read fixture");

    let mut defs: HashMap<String, PrivilegeDefinition> = reader
        .privilege_definitions()
        .iter()
        .map(|d| (d.name().to_string(), d.clone()))
        .collect();
    for expected in expected_definitions() {
        let actual = defs
            .remove(&expected.name().to_string())
            .unwrap_or_else(|| panic!("definition {} missing", expected.name()));
        assert_eq!(expected, actual, "definition mismatch for {}", expected.name());
    }
    assert!(defs.is_empty(), "unexpected extra definitions: {:?}", defs.keys());

    assert_eq!(
        reader.namespaces().resolve_prefix("foo"),
        Some(FOO_URI),
        "namespace foo not included"
    );
}

#[test]
fn read_fixture_preserves_document_order() {
    let file = File::open(fixture_path("readtest.xml")).expect("open readtest.xml");
    let reader = PrivilegeDefinitionReader::new(file, "application/xml").expect("read fixture");
    assert_eq!(reader.privilege_definitions(), expected_definitions().as_slice());
}

#[test]
fn write_matches_fixture() {
    let writer = PrivilegeDefinitionWriter::new("text/xml").expect("writer");
    let result = writer
        .write_to_string(&expected_definitions(), &foo_namespaces())
        .expect("write");

    let expected = fs::read_to_string(fixture_path("writetest.xml")).expect("read writetest.xml");
    assert_eq!(normalize(&expected), normalize(&result), "written document differs");
}

#[test]
fn written_document_reads_back() {
    let writer = PrivilegeDefinitionWriter::new("text/xml").expect("writer");
    let mut out = Vec::new();
    writer
        .write_definitions(&mut out, &expected_definitions(), &foo_namespaces())
        .expect("write");

    let reader = PrivilegeDefinitionReader::new(out.as_slice(), "text/xml").expect("read back");
    assert_eq!(reader.privilege_definitions(), expected_definitions().as_slice());
    for (prefix, uri) in foo_namespaces().iter() {
        assert_eq!(
            reader.namespaces().resolve_prefix(prefix),
            Some(uri),
            "binding for {} lost in round trip",
            prefix
        );
    }
}

#[test]
fn compact_output_reads_back() {
    let writer = PrivilegeDefinitionWriter::new("text/xml")
        .expect("writer")
        .with_indent(0);
    let xml = writer
        .write_to_string(&expected_definitions(), &foo_namespaces())
        .expect("write");
    assert_eq!(xml.trim_end().lines().count(), 1, "compact output spans lines: {}", xml);

    let (defs, _) = read_str(&xml).expect("read back").into_parts();
    assert_eq!(defs, expected_definitions());
}

#[test]
fn unused_namespaces_are_declared() {
    let namespaces =
        NamespaceTable::from_pairs([("foo", FOO_URI), ("bar", "http://www.bar.com/2.0")])
            .expect("namespace table");
    let writer = PrivilegeDefinitionWriter::new("text/xml").expect("writer");
    let xml = writer
        .write_to_string(&[def("foo:testRead", false, &[])], &namespaces)
        .expect("write");

    assert!(
        xml.contains(r#"xmlns:bar="http://www.bar.com/2.0""#),
        "unused prefix bar not declared: {}",
        xml
    );
    let reader = read_str(&xml).expect("read back");
    assert_eq!(reader.namespaces().resolve_prefix("bar"), Some("http://www.bar.com/2.0"));
}

#[test]
fn writes_are_deterministic() {
    let forward =
        NamespaceTable::from_pairs([("foo", FOO_URI), ("bar", "http://www.bar.com/2.0")])
            .expect("namespace table");
    let reversed =
        NamespaceTable::from_pairs([("bar", "http://www.bar.com/2.0"), ("foo", FOO_URI)])
            .expect("namespace table");
    let writer = PrivilegeDefinitionWriter::new("text/xml").expect("writer");

    let first = writer.write_to_string(&expected_definitions(), &forward).expect("write");
    let second = writer.write_to_string(&expected_definitions(), &forward).expect("write");
    let third = writer.write_to_string(&expected_definitions(), &reversed).expect("write");
    assert_eq!(first, second, "repeated writes differ");
    assert_eq!(first, third, "binding insertion order changed the output");
}

#[test]
fn escaped_characters_survive_round_trip() {
    let namespaces =
        NamespaceTable::from_pairs([("q", "urn:x?a=1&b=\"2\"<>")]).expect("namespace table");
    let defs = vec![def("q:a", false, &[])];
    let writer = PrivilegeDefinitionWriter::new("text/xml").expect("writer");
    let xml = writer.write_to_string(&defs, &namespaces).expect("write");

    let (read_defs, read_ns) = read_str(&xml).expect("read back").into_parts();
    assert_eq!(read_defs, defs);
    assert_eq!(read_ns.resolve_prefix("q"), Some("urn:x?a=1&b=\"2\"<>"));
}

#[test]
fn duplicate_fixture_fails_validation() {
    let file = File::open(fixture_path("duplicate.xml")).expect("open duplicate.xml");
    let err = PrivilegeDefinitionReader::new(file, "text/xml").expect_err("duplicate accepted");
    assert_eq!(err.kind(), ErrorKind::Validation);
    match err {
        PrivilegeError::DuplicateDefinition(name) => assert_eq!(name, "foo:testRead"),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn missing_abstract_defaults_to_false() {
    let reader = read_str(
        r#"<privileges xmlns:foo="http://www.foo.com/1.0"><privilege name="foo:testRead"/></privileges>"#,
    )
    .expect("read");
    let defs = reader.privilege_definitions();
    assert_eq!(defs.len(), 1);
    assert!(!defs[0].is_abstract(), "abstract should default to false");
    assert!(!defs[0].is_aggregate());
}

#[test]
fn abstract_attribute_ignores_case() {
    let reader = read_str(
        r#"<privileges xmlns:foo="http://www.foo.com/1.0">
            <privilege abstract="TRUE" name="foo:a"/>
            <privilege abstract="yes" name="foo:b"/>
        </privileges>"#,
    )
    .expect("read");
    let flags: Vec<bool> = reader
        .privilege_definitions()
        .iter()
        .map(PrivilegeDefinition::is_abstract)
        .collect();
    assert_eq!(flags, vec![true, false]);
}

#[test]
fn aggregation_order_is_preserved() {
    let reader = read_str(
        r#"<privileges xmlns:foo="http://www.foo.com/1.0">
            <privilege name="foo:testAll">
                <contains name="foo:testRead"/>
                <contains name="foo:testWrite"/>
            </privilege>
        </privileges>"#,
    )
    .expect("read");
    let all = &reader.privilege_definitions()[0];
    assert_eq!(all.aggregates(), &[qn("foo:testRead"), qn("foo:testWrite")]);

    let reversed = def("foo:testAll", false, &["foo:testWrite", "foo:testRead"]);
    assert_ne!(all, &reversed, "aggregate order must matter for equality");
}

#[test]
fn unsupported_format_does_not_read_stream() {
    let err = PrivilegeDefinitionReader::new(UntouchableStream, "application/unknown")
        .expect_err("unknown format accepted");
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    assert!(err.to_string().contains("application/unknown"));

    let err = PrivilegeDefinitionWriter::new("application/unknown")
        .expect_err("unknown format accepted");
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
}

#[test]
fn format_identifier_parameters_are_ignored() {
    let reader = PrivilegeDefinitionReader::new(
        "<privileges/>".as_bytes(),
        " Text/XML; charset=utf-8 ",
    )
    .expect("read");
    assert!(reader.privilege_definitions().is_empty());
}

#[test]
fn names_round_trip_exactly() {
    let defs = vec![
        def("foo:a.b-c_d\u{B7}e", false, &[]),
        def("foo:caf\u{E9}", true, &["foo:_x1"]),
        def("plain", false, &["foo:caf\u{E9}"]),
    ];
    let writer = PrivilegeDefinitionWriter::new("text/xml").expect("writer");
    let xml = writer.write_to_string(&defs, &foo_namespaces()).expect("write");

    let (read_defs, _) = read_str(&xml).expect("read back").into_parts();
    assert_eq!(read_defs, defs, "names changed in round trip: {}", xml);
}

#[test]
fn names_with_whitespace_cannot_be_built() {
    let cases = [("foo", "a "), ("foo", " a"), ("f o", "a"), ("foo", "a b"), ("1x", "a")];
    for (prefix, local) in cases {
        let err = QualifiedName::new(prefix, local).expect_err(local);
        assert!(
            matches!(err, PrivilegeError::InvalidName(_)),
            "{:?}:{:?} gave {:?}",
            prefix,
            local,
            err
        );
    }

    let err = NamespaceTable::from_pairs([("f o", "urn:foo")])
        .expect_err("prefix with space bound");
    assert!(matches!(err, PrivilegeError::InvalidName(ref p) if p == "f o"));
}

#[test]
fn padded_names_in_source_are_rejected() {
    let err = read_str(
        r#"<privileges xmlns:foo="http://www.foo.com/1.0"><privilege name="foo:a "/></privileges>"#,
    )
    .expect_err("padded name accepted");
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(matches!(err, PrivilegeError::InvalidName(ref n) if n == "foo:a "));
}

#[test]
fn rebound_default_prefix_is_not_written() {
    let namespaces =
        NamespaceTable::from_pairs([("", "urn:d"), ("foo", FOO_URI)]).expect("namespace table");
    let writer = PrivilegeDefinitionWriter::new("text/xml").expect("writer");
    let xml = writer
        .write_to_string(&[def("foo:testRead", false, &[])], &namespaces)
        .expect("write");
    assert!(!xml.contains("urn:d"), "default prefix binding written: {}", xml);

    let reader = read_str(&xml).expect("read back");
    assert_eq!(reader.namespaces().resolve_prefix(""), Some(""));
    assert_eq!(reader.namespaces().resolve_prefix("foo"), Some(FOO_URI));
}
