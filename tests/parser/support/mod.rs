//! Helpers functions and macros to support testing the parser.
//!
use stata_syntax::name::Name;
use stata_syntax::parser::*;

// macros to simplify tests

#[macro_export]
macro_rules! test_parse_ok {
    ($test_name: ident, $source: expr, $expected: expr $(,)?) => {
        #[test]
        fn $test_name() {
            use codespan_reporting::files::SimpleFile;
            use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
            use codespan_reporting::term::{self};
            use stata_syntax::parser;

            let test_name = stringify!($test_name);

            let _ = ::env_logger::try_init();
            let source = indoc::indoc! {$source}.to_string();
            let file = SimpleFile::new(test_name.to_owned(), source);

            let e = parser::parse(&file);

            match e {
                Ok(parsed) => assert_eq!(parsed, $expected),
                Err(err) => {
                    let writer = StandardStream::stderr(ColorChoice::Auto);
                    let config = codespan_reporting::term::Config {
                        tab_width: 2,
                        ..codespan_reporting::term::Config::default()
                    };

                    term::emit(&mut writer.lock(), &config, &file, &err.diagnostic(())).unwrap();
                    assert_eq!(None, Some(err), "{} should not produce an error", test_name);
                }
            }
        }
    };
}

#[macro_export]
macro_rules! test_parse_error {
    ($test_name: ident, $source: expr, $expected: pat $(,)?) => {
        #[test]
        fn $test_name() {
            use codespan_reporting::files::SimpleFile;
            use stata_syntax::parser;

            let test_name = stringify!($test_name);

            let _ = ::env_logger::try_init();
            let source = indoc::indoc! {$source}.to_string();
            let file = SimpleFile::new(test_name.to_owned(), source);

            match parser::parse(&file) {
                Ok(parsed) => panic!("{} should not parse, got {:?}", test_name, parsed),
                Err(err) => assert!(
                    matches!(err, $expected),
                    "{} produced an unexpected error: {:?}",
                    test_name,
                    err
                ),
            }
        }
    };
}

// AST constructor as simple functions

pub fn name(name: &str) -> Name {
    Name(name.to_string())
}

pub fn file(lines: Vec<Line>) -> SourceFile {
    SourceFile { lines }
}

pub fn command(command_name: &str, arguments: Vec<Argument>) -> Statement {
    Statement::Command(Command {
        prefixes: vec![],
        name: name(command_name),
        arguments,
    })
}

pub fn comment(kind: CommentKind, text: &str) -> Comment {
    Comment::new(kind, text.to_string())
}

pub fn ident(s: &str) -> Argument {
    Argument::Identifier(s.to_string())
}

pub fn op(s: &str) -> Argument {
    Argument::Operator(s.to_string())
}

pub fn other(s: &str) -> Argument {
    Argument::Other(s.to_string())
}

pub fn number(s: &str) -> Argument {
    Argument::Number(s.to_string())
}

pub fn text(s: &str) -> StringPart {
    StringPart::Text(s.to_string())
}

pub fn double(parts: Vec<StringPart>) -> Argument {
    Argument::String(StringLiteral::Double(parts))
}

pub fn local(depth: u8, parts: Vec<MacroPart>) -> LocalMacro {
    LocalMacro { depth, parts }
}

pub fn local_name(macro_name: &str) -> Argument {
    Argument::LocalMacro(local(1, vec![MacroPart::Name(name(macro_name))]))
}

pub fn global(macro_name: &str, braced: bool) -> GlobalMacro {
    GlobalMacro {
        name: name(macro_name),
        braced,
    }
}
