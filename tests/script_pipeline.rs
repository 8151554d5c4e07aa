//! End-to-end coverage of the textual pipeline: tokenize, parse into
//! categorized statements, refine, and normalize jump targets.

use cmdscript::script::{
    find_label_position, normalize_jump_targets, parse, refine, remove_control_statements,
    tokenize, ScriptError, TokenKind,
};
use cmdscript::{CategorizedSequence, Category};

const SCRIPT: &str = r#"
    Label(one);
    Print( hello    world );
    goto(one);
    if(condition) { Print(yes); } else { Print(no); }
"#;

fn parsed(text: &str) -> CategorizedSequence {
    parse(&tokenize(text)).expect("script should parse")
}

#[test]
fn test_lexer_token_kinds_for_full_script() {
    let tokens = tokenize(SCRIPT);

    assert_eq!(tokens[0].kind, TokenKind::Label);
    assert!(tokens.iter().any(|t| t.kind == TokenKind::KeywordIf));
    assert!(tokens.iter().any(|t| t.kind == TokenKind::KeywordElse));
    assert!(tokens.iter().any(|t| t.kind == TokenKind::KeywordGoto));
    assert!(tokens
        .iter()
        .any(|t| t.kind == TokenKind::Identifier && t.lexeme == "Print"));
    assert_eq!(tokens.last().unwrap().kind, TokenKind::EndOfInput);
}

#[test]
fn test_parser_categorizes_statements() {
    let result = parsed(SCRIPT);

    assert_eq!(result.len(), 4);
    assert_eq!(result.get(0), Some((&Category::Label, "Label(one);")));
    assert_eq!(result.get(1), Some((&Category::Command, "Print(hello world);")));
    assert_eq!(result.get(2), Some((&Category::Command, "goto(one);")));
    assert_eq!(result.category(3), Some(Category::If));
}

#[test]
fn test_refine_splits_the_conditional() {
    let refined = refine(&parsed(SCRIPT));

    assert_eq!(refined.len(), 6);
    assert_eq!(refined.get(3), Some((&Category::IfCondition, "condition")));
    assert_eq!(refined.get(4), Some((&Category::IfBranch, "Print(yes);")));
    assert_eq!(refined.get(5), Some((&Category::ElseBranch, "Print(no);")));
}

#[test]
fn test_refinement_is_a_fixed_point() {
    let refined = refine(&parsed(SCRIPT));
    assert_eq!(refine(&refined), refined);
}

#[test]
fn test_full_normalization_pipeline() {
    let normalized =
        normalize_jump_targets(&remove_control_statements(&refine(&parsed(SCRIPT))));

    assert_eq!(normalized.get(0), Some((&Category::Label, "one")));
    assert_eq!(normalized.get(1), Some((&Category::Command, "Print(hello world)")));
    assert_eq!(normalized.get(2), Some((&Category::Goto, "one")));
    assert_eq!(normalized.get(3), Some((&Category::IfCondition, "condition")));
}

#[test]
fn test_goto_targets_resolve_to_label_keys() {
    let sequence = parsed(
        "com1();\n\
         Label(start);\n\
         com2();\n\
         goto(start);",
    );

    assert_eq!(find_label_position(&sequence, "start"), Some(1));
    assert_eq!(find_label_position(&sequence, "START"), Some(1));
    assert_eq!(find_label_position(&sequence, "absent"), None);
}

#[test]
fn test_comments_survive_lexing_but_not_parsing() {
    let source = "-- header comment\ncom1(); -- trailing note";
    let tokens = tokenize(source);

    assert!(tokens
        .iter()
        .any(|t| t.kind == TokenKind::Comment && t.lexeme == "header comment"));

    let result = parse(&tokens).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.get(0), Some((&Category::Command, "com1();")));
}

#[test]
fn test_unterminated_block_reports_instead_of_truncating() {
    let result = parse(&tokenize("com1(); if(a) { com2();"));
    assert!(matches!(result, Err(ScriptError::UnterminatedBlock { .. })));
}

#[test]
fn test_malformed_input_never_panics_the_lexer() {
    for source in ["@@@", "if { } (", "((((", "}", "\"open string"] {
        let tokens = tokenize(source);
        assert_eq!(tokens.last().unwrap().kind, TokenKind::EndOfInput);
        // Parsing may fail, but it must fail with an error value
        let _ = parse(&tokens);
    }
}
