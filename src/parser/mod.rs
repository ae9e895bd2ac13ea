//! This module contains all the data types representing a Stata source file.
//!
//! ## Compiler phase
//! `parse` runs the tokenizer over a source file, then feeds the tokens to
//! the lalrpop generated parser.
//!
//! ## AST
//! A file is a list of lines. Most lines hold a single statement, optionally
//! followed by a `//` or `///` comment. A line may also start with the `}`
//! closing a block opened on a previous line (eg. by `foreach` or `if`), the
//! block structure itself isn't part of the tree.
//!
//! The tree is syntactic only: positions live in the tokens and commands
//! arguments are kept as a flat list.
use codespan_reporting::files::SimpleFile;
use lalrpop_util::lalrpop_mod;
use log::debug;

pub mod error;
pub mod tokenizer;

use crate::name::Name;
pub use error::Error;

lalrpop_mod!(
    #[allow(clippy::all)]
    grammar,
    "/parser/grammar.rs"
);

pub fn parse(source_file: &SimpleFile<String, String>) -> Result<SourceFile, Error> {
    debug!("parse: {}", source_file.name());
    let source = source_file.source();

    // Tokenize the source code into a serie of tokens
    let tokens = tokenizer::make_tokenizer(source).map(|r| {
        r.map(|t| (t.span.start.absolute, t.value, t.span.end.absolute))
            .map_err(Error::from)
    });

    // Parse the tokens into an AST
    let file = grammar::SourceFileParser::new().parse(tokens)?;

    Ok(file)
}

/// The top-level structure for a source file.
#[derive(Debug, PartialEq, Clone)]
pub struct SourceFile {
    pub lines: Vec<Line>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Line {
    /// The line starts with a `}`
    pub closes_block: bool,
    pub statement: Option<Statement>,
    /// Comment following the statement
    pub comment: Option<Comment>,
}

impl Line {
    pub fn empty() -> Line {
        Line {
            closes_block: false,
            statement: None,
            comment: None,
        }
    }

    pub fn statement(statement: Statement) -> Line {
        Line {
            closes_block: false,
            statement: Some(statement),
            comment: None,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Comment(Comment),
    Program(ProgramDefinition),
    Mata(MataBlock),
    Macro(MacroDefinition),
    Command(Command),
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum CommentKind {
    /// `// text`
    Line,
    /// `/// text`, the next line continues the statement
    Continuation,
    /// `/* text */`
    Block,
    /// `* text`, only at the start of a line
    Star,
}

/// A comment, with its text stripped from the markers
#[derive(Debug, PartialEq, Clone)]
pub struct Comment {
    pub kind: CommentKind,
    pub text: String,
}

impl Comment {
    pub fn new(kind: CommentKind, text: String) -> Comment {
        Comment { kind, text }
    }
}

/// `program [define] name [, options]` up to the matching `end`
#[derive(Debug, PartialEq, Clone)]
pub struct ProgramDefinition {
    pub define: bool,
    pub name: Name,
    pub options: Vec<Argument>,
    pub body: Vec<Line>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MataBlock {
    /// `mata:` rather than `mata`
    pub colon: bool,
    pub body: MataBody,
}

/// The content of a mata block, which isn't Stata code and is kept verbatim
#[derive(Debug, PartialEq, Clone)]
pub enum MataBody {
    /// `mata { … }`, what is between the outer braces
    Braced(String),
    /// `mata` then lines up to `end`
    Lines(Vec<String>),
    /// `mata: statement`
    Inline(String),
}

#[derive(Debug, PartialEq, Clone)]
pub enum MacroDefinition {
    /// `local`/`loc`
    Local {
        keyword: String,
        name: Name,
        arguments: Vec<Argument>,
    },
    /// `global`/`gl`
    Global {
        keyword: String,
        name: Name,
        arguments: Vec<Argument>,
    },
    /// `tempvar`, `tempname` or `tempfile`
    Temp { keyword: String, names: Vec<Name> },
}

#[derive(Debug, PartialEq, Clone)]
pub struct Command {
    /// `by`, `quietly`, `capture`…
    pub prefixes: Vec<String>,
    pub name: Name,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Argument {
    String(StringLiteral),
    LocalMacro(LocalMacro),
    GlobalMacro(GlobalMacro),
    Number(String),
    /// `.` and `.a` to `.z`
    Missing(String),
    /// `_n`, `_N`, `_rc`…
    Builtin(String),
    Control(String),
    Type(String),
    Identifier(String),
    /// Arithmetic, logical and comparison operators, brackets and parenthesis
    Operator(String),
    Comment(Comment),
    Other(String),
}

#[derive(Debug, PartialEq, Clone)]
pub enum StringLiteral {
    Double(Vec<StringPart>),
    Compound { depth: u8, parts: Vec<StringPart> },
}

#[derive(Debug, PartialEq, Clone)]
pub enum StringPart {
    Text(String),
    Escape(char),
    EscapedQuote,
    String(StringLiteral),
    LocalMacro(LocalMacro),
    GlobalMacro(GlobalMacro),
}

/// `` `name' ``, nesting depth goes from 1 to 6 then wraps around
#[derive(Debug, PartialEq, Clone)]
pub struct LocalMacro {
    pub depth: u8,
    pub parts: Vec<MacroPart>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum MacroPart {
    Name(Name),
    /// Positional arguments, eg. `` `1' ``
    Number(String),
    /// `=exp` or `:fcn`, verbatim
    Expression(String),
    Local(LocalMacro),
    Global(GlobalMacro),
}

/// `$name` or `${name}`
#[derive(Debug, PartialEq, Clone)]
pub struct GlobalMacro {
    pub name: Name,
    pub braced: bool,
}
