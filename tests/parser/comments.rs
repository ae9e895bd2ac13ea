use super::support::*;
use stata_syntax::parser::*;

test_parse_ok!(
    star_comments,
    r#"
    * header
      * indented
    sysuse auto
    "#,
    file(vec![
        Line::statement(Statement::Comment(comment(CommentKind::Star, " header"))),
        Line::statement(Statement::Comment(comment(CommentKind::Star, " indented"))),
        Line::statement(command("sysuse", vec![ident("auto")])),
    ])
);

test_parse_ok!(
    multiplication_is_not_a_comment,
    r#"
    gen y = x * 2
    "#,
    file(vec![Line::statement(command(
        "gen",
        vec![ident("y"), op("="), ident("x"), op("*"), number("2")]
    ))])
);

test_parse_ok!(
    star_comment_after_empty_line,
    r#"
    display 2*3

    *display 2*3
    "#,
    file(vec![
        Line::statement(command("display", vec![number("2"), op("*"), number("3")])),
        Line::empty(),
        Line::statement(Statement::Comment(comment(CommentKind::Star, "display 2*3"))),
    ])
);

test_parse_ok!(
    trailing_comments,
    r#"
    regress y x // robust later
    regress y x /// continues
        z
    "#,
    file(vec![
        Line {
            closes_block: false,
            statement: Some(command("regress", vec![ident("y"), ident("x")])),
            comment: Some(comment(CommentKind::Line, " robust later")),
        },
        Line {
            closes_block: false,
            statement: Some(command("regress", vec![ident("y"), ident("x")])),
            comment: Some(comment(CommentKind::Continuation, " continues")),
        },
        Line::statement(command("z", vec![])),
    ])
);

test_parse_ok!(
    comment_lines,
    r#"
    // a line comment
    /// a continuation comment
    "#,
    file(vec![
        Line::statement(Statement::Comment(comment(CommentKind::Line, " a line comment"))),
        Line::statement(Statement::Comment(comment(
            CommentKind::Continuation,
            " a continuation comment"
        ))),
    ])
);

test_parse_ok!(
    block_comments,
    r#"
    /* header
       spanning lines */
    summarize price /* inline */ mpg
    "#,
    file(vec![
        Line::statement(Statement::Comment(comment(
            CommentKind::Block,
            " header\n   spanning lines "
        ))),
        Line::statement(command(
            "summarize",
            vec![
                ident("price"),
                Argument::Comment(comment(CommentKind::Block, " inline ")),
                ident("mpg"),
            ]
        )),
    ])
);

test_parse_error!(
    unterminated_block_comment,
    r#"
    /* never closed
    "#,
    Error::Tokenizer(_)
);
