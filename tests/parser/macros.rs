use super::support::*;
use stata_syntax::parser::*;

test_parse_ok!(
    local_definition,
    r#"
    local n = _N + 1
    "#,
    file(vec![Line::statement(Statement::Macro(MacroDefinition::Local {
        keyword: "local".to_string(),
        name: name("n"),
        arguments: vec![
            op("="),
            Argument::Builtin("_N".to_string()),
            op("+"),
            number("1"),
        ],
    }))])
);

test_parse_ok!(
    global_definition,
    r#"
    gl data "auto.dta"
    "#,
    file(vec![Line::statement(Statement::Macro(MacroDefinition::Global {
        keyword: "gl".to_string(),
        name: name("data"),
        arguments: vec![double(vec![text("auto.dta")])],
    }))])
);

test_parse_ok!(
    temporary_names,
    r#"
    tempvar a b
    tempfile results
    "#,
    file(vec![
        Line::statement(Statement::Macro(MacroDefinition::Temp {
            keyword: "tempvar".to_string(),
            names: vec![name("a"), name("b")],
        })),
        Line::statement(Statement::Macro(MacroDefinition::Temp {
            keyword: "tempfile".to_string(),
            names: vec![name("results")],
        })),
    ])
);

test_parse_ok!(
    nested_local_macros,
    r#"
    display `lbl`i''
    "#,
    file(vec![Line::statement(command(
        "display",
        vec![Argument::LocalMacro(local(
            1,
            vec![
                MacroPart::Name(name("lbl")),
                MacroPart::Local(local(2, vec![MacroPart::Name(name("i"))])),
            ]
        ))]
    ))])
);

test_parse_ok!(
    macro_expressions,
    r#"
    display `=1+1'
    local n `:word count `list''
    "#,
    file(vec![
        Line::statement(command(
            "display",
            vec![Argument::LocalMacro(local(
                1,
                vec![MacroPart::Expression("=1+1".to_string())]
            ))]
        )),
        Line::statement(Statement::Macro(MacroDefinition::Local {
            keyword: "local".to_string(),
            name: name("n"),
            arguments: vec![Argument::LocalMacro(local(
                1,
                vec![MacroPart::Expression(":word count `list'".to_string())]
            ))],
        })),
    ])
);

test_parse_ok!(
    positional_and_global_in_local,
    r#"
    display `1' `$x'
    "#,
    file(vec![Line::statement(command(
        "display",
        vec![
            Argument::LocalMacro(local(1, vec![MacroPart::Number("1".to_string())])),
            Argument::LocalMacro(local(1, vec![MacroPart::Global(global("x", false))])),
        ]
    ))])
);

test_parse_ok!(
    global_macros_as_arguments,
    r#"
    use $data, clear
    cd ${root}
    "#,
    file(vec![
        Line::statement(command(
            "use",
            vec![
                Argument::GlobalMacro(global("data", false)),
                other(","),
                ident("clear"),
            ]
        )),
        Line::statement(command(
            "cd",
            vec![Argument::GlobalMacro(global("root", true))]
        )),
    ])
);

test_parse_ok!(
    loop_over_variables,
    r#"
    foreach v of varlist x y {
        replace `v' = `v' * 2 if !missing(`v')
    }
    "#,
    file(vec![
        Line::statement(command(
            "foreach",
            vec![
                ident("v"),
                ident("of"),
                ident("varlist"),
                ident("x"),
                ident("y"),
                other("{"),
            ]
        )),
        Line::statement(command(
            "replace",
            vec![
                local_name("v"),
                op("="),
                local_name("v"),
                op("*"),
                number("2"),
                Argument::Control("if".to_string()),
                op("!"),
                ident("missing"),
                op("("),
                local_name("v"),
                op(")"),
            ]
        )),
        Line {
            closes_block: true,
            statement: None,
            comment: None,
        },
    ])
);

test_parse_error!(
    increment_is_unsupported,
    r#"
    display `i++'
    "#,
    Error::Tokenizer(_)
);

test_parse_error!(
    unterminated_local_macro,
    r#"
    display `x
    "#,
    Error::Tokenizer(_)
);
