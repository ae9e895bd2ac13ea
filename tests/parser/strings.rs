use super::support::*;
use codespan_reporting::files::SimpleFile;
use stata_syntax::parser::*;

test_parse_ok!(
    double_quoted_strings,
    r#"
    display "a \"quoted\" ${name} and $x"
    "#,
    file(vec![Line::statement(command(
        "display",
        vec![double(vec![
            text("a "),
            StringPart::Escape('"'),
            text("quoted"),
            StringPart::Escape('"'),
            text(" "),
            StringPart::GlobalMacro(global("name", true)),
            text(" and "),
            StringPart::GlobalMacro(global("x", false)),
        ])]
    ))])
);

test_parse_ok!(
    doubled_quotes,
    r#"
    display "say ""hi"""
    "#,
    file(vec![Line::statement(command(
        "display",
        vec![double(vec![
            text("say "),
            StringPart::EscapedQuote,
            text("hi"),
            StringPart::EscapedQuote,
        ])]
    ))])
);

test_parse_ok!(
    lone_dollar_in_string,
    r#"
    display "costs 5$"
    "#,
    file(vec![Line::statement(command(
        "display",
        vec![double(vec![text("costs 5"), text("$")])]
    ))])
);

test_parse_ok!(
    nested_compound_strings,
    r#"
    display `"outer `"inner `x'"' and "plain" text"'
    "#,
    file(vec![Line::statement(command(
        "display",
        vec![Argument::String(StringLiteral::Compound {
            depth: 1,
            parts: vec![
                text("outer "),
                StringPart::String(StringLiteral::Compound {
                    depth: 2,
                    parts: vec![
                        text("inner "),
                        StringPart::LocalMacro(local(1, vec![MacroPart::Name(name("x"))])),
                    ],
                }),
                text(" and "),
                StringPart::String(StringLiteral::Double(vec![text("plain")])),
                text(" text"),
            ],
        })]
    ))])
);

test_parse_ok!(
    double_string_within_compound_string,
    r#"
    di `"a "b" c"'
    "#,
    file(vec![Line::statement(command(
        "di",
        vec![Argument::String(StringLiteral::Compound {
            depth: 1,
            parts: vec![
                text("a "),
                StringPart::String(StringLiteral::Double(vec![text("b")])),
                text(" c"),
            ],
        })]
    ))])
);

test_parse_ok!(
    strings_as_macro_values,
    r#"
    local controls "weight length"
    "#,
    file(vec![Line::statement(Statement::Macro(MacroDefinition::Local {
        keyword: "local".to_string(),
        name: name("controls"),
        arguments: vec![double(vec![text("weight length")])],
    }))])
);

test_parse_error!(
    unterminated_double_string,
    r#"
    display "no end
    "#,
    Error::Tokenizer(_)
);

test_parse_error!(
    unterminated_compound_string,
    r#"
    display `"no end
    "#,
    Error::Tokenizer(_)
);

/// Depths of the compound strings nested in `literal`, outermost first
fn compound_depths(literal: &StringLiteral) -> Vec<u8> {
    match literal {
        StringLiteral::Double(_) => vec![],
        StringLiteral::Compound { depth, parts } => {
            let mut depths = vec![*depth];
            for part in parts {
                if let StringPart::String(inner) = part {
                    depths.extend(compound_depths(inner));
                }
            }
            depths
        }
    }
}

#[test]
fn compound_depth_wraps_after_six() {
    let source = "di `\"1`\"2`\"3`\"4`\"5`\"6`\"7\"'\"'\"'\"'\"'\"'\"'\n";
    let file = SimpleFile::new("wrap.do".to_owned(), source.to_owned());

    let parsed = parse(&file).unwrap();

    let literal = match &parsed.lines[0].statement {
        Some(Statement::Command(Command { arguments, .. })) => match &arguments[0] {
            Argument::String(literal) => literal.clone(),
            other => panic!("expected a string, got {:?}", other),
        },
        other => panic!("expected a command, got {:?}", other),
    };

    assert_eq!(compound_depths(&literal), vec![1, 2, 3, 4, 5, 6, 1]);
}
