use super::support::*;
use codespan_reporting::files::SimpleFile;
use stata_syntax::parser::*;

fn parse_str(source: &str) -> Result<SourceFile, Error> {
    parse(&SimpleFile::new("test.do".to_owned(), source.to_owned()))
}

test_parse_ok!(
    program_definition,
    r#"
    program define hello, rclass
        display "hello"
    end
    "#,
    file(vec![Line::statement(Statement::Program(ProgramDefinition {
        define: true,
        name: name("hello"),
        options: vec![other(","), ident("rclass")],
        body: vec![Line::statement(command(
            "display",
            vec![double(vec![text("hello")])]
        ))],
    }))])
);

test_parse_ok!(
    program_without_define,
    r#"
    program mycmd
        * parse the arguments

        syntax varlist
    end
    "#,
    file(vec![Line::statement(Statement::Program(ProgramDefinition {
        define: false,
        name: name("mycmd"),
        options: vec![],
        body: vec![
            Line::statement(Statement::Comment(comment(
                CommentKind::Star,
                " parse the arguments"
            ))),
            Line::empty(),
            Line::statement(command("syntax", vec![ident("varlist")])),
        ],
    }))])
);

test_parse_ok!(
    program_drop,
    r#"
    program drop hello
    capture program drop hello
    "#,
    file(vec![
        Line::statement(command("program", vec![ident("drop"), ident("hello")])),
        Line::statement(Statement::Command(Command {
            prefixes: vec!["capture".to_string()],
            name: name("program"),
            arguments: vec![ident("drop"), ident("hello")],
        })),
    ])
);

test_parse_ok!(
    chained_prefixes,
    r#"
    quietly by foreign: summarize price
    "#,
    file(vec![Line::statement(Statement::Command(Command {
        prefixes: vec!["quietly".to_string(), "by".to_string()],
        name: name("foreign"),
        arguments: vec![other(":"), ident("summarize"), ident("price")],
    }))])
);

test_parse_ok!(
    prefix_block,
    r#"
    capture noisily {
        summarize price
    }
    "#,
    file(vec![
        Line::statement(Statement::Command(Command {
            prefixes: vec!["capture".to_string()],
            name: name("noisily"),
            arguments: vec![other("{")],
        })),
        Line::statement(command("summarize", vec![ident("price")])),
        Line {
            closes_block: true,
            statement: None,
            comment: None,
        },
    ])
);

test_parse_ok!(
    if_else_blocks,
    r#"
    if _rc {
        exit 198
    }
    else {
        display "ok"
    } 
    "#,
    file(vec![
        Line::statement(command(
            "if",
            vec![Argument::Builtin("_rc".to_string()), other("{")]
        )),
        Line::statement(command("exit", vec![number("198")])),
        Line {
            closes_block: true,
            statement: None,
            comment: None,
        },
        Line::statement(command("else", vec![other("{")])),
        Line::statement(command("display", vec![double(vec![text("ok")])])),
        Line {
            closes_block: true,
            statement: None,
            comment: None,
        },
    ])
);

test_parse_ok!(
    closing_brace_before_statement,
    r#"
    } else if missing(x) { // fallback
    "#,
    file(vec![Line {
        closes_block: true,
        statement: Some(command(
            "else",
            vec![
                Argument::Control("if".to_string()),
                ident("missing"),
                op("("),
                ident("x"),
                op(")"),
                other("{"),
            ]
        )),
        comment: Some(comment(CommentKind::Line, " fallback")),
    }])
);

test_parse_ok!(
    arguments_kinds,
    r#"
    generate str20 name = "x" if price >= 5000 & mpg != . [fweight=w], replace
    "#,
    file(vec![Line::statement(command(
        "generate",
        vec![
            Argument::Type("str20".to_string()),
            ident("name"),
            op("="),
            double(vec![text("x")]),
            Argument::Control("if".to_string()),
            ident("price"),
            op(">="),
            number("5000"),
            op("&"),
            ident("mpg"),
            op("!="),
            Argument::Missing(".".to_string()),
            op("["),
            ident("fweight"),
            op("="),
            ident("w"),
            op("]"),
            other(","),
            ident("replace"),
        ]
    ))])
);

test_parse_error!(
    unclosed_program,
    r#"
    program foo
        display 1
    "#,
    Error::UnexpectedEOF { .. }
);

test_parse_error!(
    stray_end,
    r#"
    end
    "#,
    Error::UnexpectedToken { .. }
);

#[test]
fn windows_line_endings() {
    let parsed = parse_str("* note\r\nsysuse auto\r\n").unwrap();

    assert_eq!(
        parsed,
        file(vec![
            Line::statement(Statement::Comment(comment(CommentKind::Star, " note"))),
            Line::statement(command("sysuse", vec![ident("auto")])),
        ])
    );
}

#[test]
fn missing_trailing_newline() {
    let parsed = parse_str("* a\nsysuse auto").unwrap();

    assert_eq!(parsed.lines.len(), 2);
}

#[test]
fn empty_file() {
    assert_eq!(parse_str("").unwrap(), file(vec![]));
}

#[test]
fn realistic_do_file() {
    let source = r#"
*! version 1.0.0
version 16
clear all
set more off

* Load and prepare the data
sysuse auto, clear
local controls "weight length"
global outdir "results"

tempvar ratio
generate `ratio' = price / mpg * 100

foreach v of varlist price mpg {
    quietly summarize `v', detail
    display "`v': " r(mean) * 2
}

capture program drop table_row
program define table_row, rclass
    syntax varname [if] [in]
    * compute the row
    return scalar n = _N
end

mata:
    x = st_data(., "price")
    mean(x)
end

regress price `controls' /// the usual suspects
    i.foreign
esttab using "$outdir/table.tex", replace
"#;

    let parsed = parse_str(source).expect("do-file should parse");

    let programs = parsed
        .lines
        .iter()
        .filter(|line| matches!(line.statement, Some(Statement::Program(_))))
        .count();
    assert_eq!(programs, 1);

    let star_comments = parsed
        .lines
        .iter()
        .filter(|line| {
            matches!(
                line.statement,
                Some(Statement::Comment(Comment {
                    kind: CommentKind::Star,
                    ..
                }))
            )
        })
        .count();
    assert_eq!(star_comments, 2);
}
