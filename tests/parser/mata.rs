use super::support::*;
use stata_syntax::parser::*;

fn mata(colon: bool, body: MataBody) -> Line {
    Line::statement(Statement::Mata(MataBlock { colon, body }))
}

test_parse_ok!(
    mata_lines_up_to_end,
    r#"
    mata:
        x = 1
        y = x * 2
    end
    "#,
    file(vec![mata(
        true,
        MataBody::Lines(vec!["    x = 1".to_string(), "    y = x * 2".to_string()])
    )])
);

test_parse_ok!(
    mata_braced_body,
    r#"
    mata { printf("{%s}\n", "a") }
    "#,
    file(vec![mata(
        false,
        MataBody::Braced(r#" printf("{%s}\n", "a") "#.to_string())
    )])
);

test_parse_ok!(
    mata_braced_over_lines,
    r#"
    mata {
        x = 1
    }
    display "back"
    "#,
    file(vec![
        mata(false, MataBody::Braced("\n    x = 1\n".to_string())),
        Line::statement(command("display", vec![double(vec![text("back")])])),
    ])
);

test_parse_ok!(
    mata_inline,
    r#"
    mata: mean(x)
    "#,
    file(vec![mata(true, MataBody::Inline("mean(x)".to_string()))])
);

test_parse_error!(
    unterminated_mata,
    r#"
    mata
        x = 1
    "#,
    Error::Tokenizer(_)
);
