//! Behavioral tests for the public scanning API.

use libzyaml::{
    scan, scan_with_filename, tokenize, ErrorKind, ScalarStyle, ScanError, Token, TokenKind,
    YamlVersion,
};

fn names(source: &str) -> Vec<String> {
    tokenize(source)
        .unwrap()
        .iter()
        .map(|t| match &t.kind {
            TokenKind::Scalar { text, .. } => format!("{}({})", t.kind.name(), text),
            kind => kind.name().to_string(),
        })
        .collect()
}

fn rendered(source: &str) -> Vec<String> {
    tokenize(source)
        .unwrap()
        .iter()
        .map(Token::to_string)
        .collect()
}

fn error(source: &str) -> ScanError {
    tokenize(source).unwrap_err()
}

#[test]
fn test_flow_structure() {
    assert_eq!(
        names("{a: 1, b: [2, 3]}"),
        vec![
            "DocumentStart",
            "FlowMapStart",
            "KeyScalar(a)",
            "Colon",
            "Scalar(1)",
            "Comma",
            "KeyScalar(b)",
            "Colon",
            "FlowSeqStart",
            "Scalar(2)",
            "Comma",
            "Scalar(3)",
            "FlowEnd",
            "FlowEnd",
            "DocumentEnd",
        ]
    );
}

#[test]
fn test_implicit_block_mapping() {
    assert_eq!(
        names("a: 1\nb: 2\n"),
        vec![
            "DocumentStart",
            "BlockMapStart",
            "KeyScalar(a)",
            "Colon",
            "Scalar(1)",
            "KeyScalar(b)",
            "Colon",
            "Scalar(2)",
            "BlockEnd",
            "DocumentEnd",
        ]
    );
}

#[test]
fn test_implicit_block_sequence() {
    assert_eq!(
        names("- 1\n- 2\n"),
        vec![
            "DocumentStart",
            "BlockSeqStart",
            "Dash",
            "Scalar(1)",
            "Dash",
            "Scalar(2)",
            "BlockEnd",
            "DocumentEnd",
        ]
    );
}

#[test]
fn test_key_after_comment() {
    // Only whitespace and comments separate the key from its colon.
    assert_eq!(
        names("{a # note\n : 1}"),
        vec![
            "DocumentStart",
            "FlowMapStart",
            "KeyScalar(a)",
            "Colon",
            "Scalar(1)",
            "FlowEnd",
            "DocumentEnd",
        ]
    );
}

#[test]
fn test_unterminated_quote() {
    let mut tokens = scan("- \"abc\n- d\n");
    let mut last = None;
    for item in tokens.by_ref() {
        last = Some(item);
    }
    let err = last.unwrap().unwrap_err();
    assert!(matches!(err, ScanError::UnterminatedString(_)));
    assert_eq!(err.kind(), ErrorKind::Lexical);
    assert_eq!((err.location().line, err.location().column), (1, 3));
    assert!(tokens.next().is_none());
}

#[test]
fn test_document_end_before_start() {
    let err = error("...\n%YAML 1.1\n---\n");
    assert!(matches!(err, ScanError::DocumentEndWithoutStart(_)));
    assert_eq!(err.kind(), ErrorKind::Structural);

    let tokens = rendered("a\n...\n%YAML 1.1\n---\n");
    assert_eq!(
        tokens,
        vec![
            "DocumentStart[1,1]",
            "Scalar[1,1] a",
            "DocumentEnd[2,1] ...",
            "Directive[3,1] YAML 1.1",
            "DocumentStart[4,1] ---",
            "DocumentEnd[5,1]",
        ]
    );
}

#[test]
fn test_filename_in_errors() {
    let err = scan_with_filename("[a", Some("list.yaml"))
        .find_map(|item| item.err())
        .unwrap();
    assert_eq!(
        err.to_string(),
        "Expected flow collection end ']', line 1 column 1 of <list.yaml>"
    );
    assert_eq!(err.location().filename.as_deref(), Some("list.yaml"));
}

#[test]
fn test_yaml_version_per_document() {
    let mut tokens = scan("%YAML 1.1\n---\na\n---\nb\n");
    let mut versions = Vec::new();
    while let Some(token) = tokens.next() {
        if matches!(token.unwrap().kind, TokenKind::DocumentStart { .. }) {
            versions.push(tokens.yaml_version());
        }
    }
    assert_eq!(
        versions,
        vec![Some(YamlVersion { major: 1, minor: 1 }), None]
    );
}

#[test]
fn test_newer_minor_version_accepted() {
    let tokens = rendered("%YAML 1.3\n--- a\n");
    assert_eq!(tokens[0], "Directive[1,1] YAML 1.3");
    assert_eq!(tokens[2], "Scalar[2,5] a");
}

#[test]
fn test_document_markers() {
    assert_eq!(
        names("---a"),
        vec!["DocumentStart", "Scalar(---a)", "DocumentEnd"]
    );
    assert_eq!(
        rendered("--- a\n--- b\n"),
        vec![
            "DocumentStart[1,1] ---",
            "Scalar[1,5] a",
            "DocumentEnd[2,1]",
            "DocumentStart[2,1] ---",
            "Scalar[2,5] b",
            "DocumentEnd[3,1]",
        ]
    );
}

#[test]
fn test_empty_input() {
    assert!(tokenize("").unwrap().is_empty());
    assert!(tokenize("\n\n# comment\n").unwrap().is_empty());
    assert!(tokenize("\u{feff}").unwrap().is_empty());
}

#[test]
fn test_plain_folding_under_key() {
    let tokens = tokenize("a: one\n  two\n\n  three\nb: c").unwrap();
    assert_eq!(tokens[4].text(), Some("one two\nthree"));
    assert!(tokens[5].is_key());
}

#[test]
fn test_block_scalar_styles() {
    let tokens = tokenize("a: |+\n  x\n\nb: >\n  y\n  z\n").unwrap();
    match &tokens[4].kind {
        TokenKind::Scalar { text, style, key } => {
            assert_eq!(text, "x\n\n");
            assert_eq!(*style, ScalarStyle::Literal);
            assert!(!key);
        }
        other => panic!("expected scalar, got {:?}", other),
    }
    assert_eq!(tokens[7].text(), Some("y z\n"));
}

#[test]
fn test_double_quoted_escapes() {
    let tokens = tokenize(r#""\x41é\U0001F600\N\_\/\ ""#).unwrap();
    assert_eq!(tokens[1].text(), Some("A\u{e9}\u{1F600}\u{85}\u{a0}/ "));
}

#[test]
fn test_properties_on_key() {
    assert_eq!(
        rendered("&a !t k: v\n"),
        vec![
            "DocumentStart[1,1]",
            "BlockMapStart[1,1]",
            "Anchor[1,1] &a",
            "Tag[1,4] !t",
            "KeyScalar[1,7] k",
            "Colon[1,8]",
            "Scalar[1,10] v",
            "BlockEnd[2,1]",
            "DocumentEnd[2,1]",
        ]
    );
}

#[test]
fn test_explicit_key_in_flow() {
    assert_eq!(
        names("{? a : b}"),
        vec![
            "DocumentStart",
            "FlowMapStart",
            "Key",
            "Scalar(a)",
            "Colon",
            "Scalar(b)",
            "FlowEnd",
            "DocumentEnd",
        ]
    );
}

#[test]
fn test_structural_errors() {
    assert!(matches!(error("a: ]"), ScanError::UnmatchedFlowEnd(']', _)));
    assert!(matches!(error("[\n...\n]"), ScanError::DocumentMarkerInFlow(_)));
    assert!(matches!(error("a: : b"), ScanError::NestedCompactMapping(_)));
    assert!(matches!(error("- a\n- b\nc: d"), ScanError::TrailingContent(_)));
    assert!(matches!(
        error("%YAML 1.2\n%YAML 1.2\n---"),
        ScanError::DuplicateYamlDirective(_)
    ));
    assert!(matches!(error("%YAML one\n---"), ScanError::InvalidYamlVersion(..)));
    assert!(matches!(error("[a, |\n  b]"), ScanError::BlockScalarInFlow(_)));
}

#[test]
fn test_tab_indentation() {
    let err = error("a:\n\tb: c\n");
    assert!(matches!(err, ScanError::TabNotAllowed(_)));
    assert_eq!(err.kind(), ErrorKind::Structural);
    assert_eq!((err.location().line, err.location().column), (2, 1));
    assert_eq!(names("[a,\n\tb]").len(), 7);
}
