use super::tokenizer::{Token, TokenizerError, TokenizerErrorType};
use crate::position::{BytePos, Spanned};
use codespan_reporting::diagnostic::{Diagnostic, Label};
use lalrpop_util::ParseError;

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    Tokenizer(TokenizerError),
    // Errors coming from the parser
    InvalidToken(BytePos),
    UnexpectedEOF {
        position: BytePos,
        expected: Vec<String>, // The kind of token the parser was expecting
    },
    UnexpectedToken {
        token: Spanned<BytePos, Token>,
        expected: Vec<String>, // The kind of token the parser was expecting
    },
    ExtraToken {
        token: Spanned<BytePos, Token>,
    },
}

impl Error {
    pub fn diagnostic<Id: Copy>(&self, name: Id) -> Diagnostic<Id> {
        match self {
            Error::UnexpectedToken { token, expected } => Diagnostic::error()
                .with_message(format!("unexpected token: `{}`", token.value))
                .with_labels(vec![
                    Label::primary(name, token.span.to_range()).with_message("unexpected token")
                ])
                .with_notes(vec![expected_note(expected)]),
            Error::UnexpectedEOF { position, expected } => Diagnostic::error()
                .with_message("unexpected end of file")
                .with_labels(vec![Label::primary(name, *position..*position)])
                .with_notes(vec![expected_note(expected)]),
            Error::ExtraToken { token } => Diagnostic::error()
                .with_message(format!("extra token: `{}`", token.value))
                .with_labels(vec![Label::primary(name, token.span.to_range())]),
            Error::InvalidToken(position) => Diagnostic::error()
                .with_message("invalid token")
                .with_labels(vec![Label::primary(name, *position..*position)]),
            Error::Tokenizer(err) => {
                let range = err.error.span.to_range();
                let opening = err.error.span.start.to_range();
                let diag = Diagnostic::error();

                match err.error.value {
                    TokenizerErrorType::UnterminatedString => diag
                        .with_message("string opened but never closed")
                        .with_labels(vec![
                            Label::primary(name, range.end..range.end)
                                .with_message("we were expecting a double quote here"),
                            Label::secondary(name, opening).with_message("for the string opened here"),
                        ])
                        .with_notes(vec!["double quoted strings can't span multiple lines".to_owned()]),
                    TokenizerErrorType::UnterminatedCompoundString => diag
                        .with_message("compound string opened but never closed")
                        .with_labels(vec![
                            Label::primary(name, range.end..range.end)
                                .with_message("we were expecting `\"'` here"),
                            Label::secondary(name, opening).with_message("for the string opened here"),
                        ]),
                    TokenizerErrorType::UnterminatedBlockComment => diag
                        .with_message("block comment opened but never closed")
                        .with_labels(vec![
                            Label::primary(name, opening).with_message("comment opened here")
                        ]),
                    TokenizerErrorType::UnterminatedLocalMacro => diag
                        .with_message("local macro opened but never closed")
                        .with_labels(vec![
                            Label::primary(name, range.end..range.end)
                                .with_message("we were expecting a single quote here"),
                            Label::secondary(name, opening).with_message("for the macro opened here"),
                        ]),
                    TokenizerErrorType::InvalidLocalMacro { found } => diag
                        .with_message("invalid local macro name")
                        .with_labels(vec![Label::primary(name, range)
                            .with_message(format!("`{}` can't be part of a macro name", found.escape_debug()))]),
                    TokenizerErrorType::InvalidGlobalMacro => diag
                        .with_message("invalid global macro")
                        .with_labels(vec![Label::primary(name, range)])
                        .with_notes(vec!["global macros are written `$name` or `${name}`".to_owned()]),
                    TokenizerErrorType::UnterminatedMata => diag
                        .with_message("mata block opened but never closed")
                        .with_labels(vec![
                            Label::primary(name, opening).with_message("mata block starts here")
                        ])
                        .with_notes(vec!["a mata block ends with `end` on its own line, or with `}` when opened with `{`".to_owned()]),
                }
            }
        }
    }
}

fn expected_note(expected: &[String]) -> String {
    format!(
        "we were expecting one of the following tokens: {}",
        expected.join(", ")
    )
}

/// lalrpop expected tokens in error are wrapped in double quote, which we don't really want
fn unquote_tokens(mut tokens: Vec<String>) -> Vec<String> {
    for token in &mut tokens {
        if token.starts_with('"') {
            token.remove(0);
        }

        if token.ends_with('"') {
            token.pop();
        }
    }

    tokens
}

impl From<ParseError<BytePos, Token, Error>> for Error {
    fn from(e: ParseError<BytePos, Token, Error>) -> Self {
        match e {
            ParseError::InvalidToken { location } => Error::InvalidToken(location),
            ParseError::UnrecognizedEof { location, expected } => Error::UnexpectedEOF {
                position: location,
                expected: unquote_tokens(expected),
            },
            ParseError::UnrecognizedToken { token, expected } => Error::UnexpectedToken {
                token: token.into(),
                expected: unquote_tokens(expected),
            },
            ParseError::ExtraToken { token } => Error::ExtraToken {
                token: token.into(),
            },
            ParseError::User { error } => error,
        }
    }
}

impl From<TokenizerError> for Error {
    fn from(e: TokenizerError) -> Self {
        Error::Tokenizer(e)
    }
}
