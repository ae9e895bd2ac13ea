use std::ops::Range;

/// Byte offset into a source file, as handed over to the parser
pub type BytePos = usize;

#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct Position {
    /// The byte index in the source code
    pub absolute: usize,
    /// 1-based line number
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl Position {
    pub fn new(absolute: usize, line: usize, column: usize) -> Position {
        Position {
            absolute,
            line,
            column,
        }
    }

    /// Move to the right of a character of `width` bytes
    pub fn increment_by(&mut self, width: usize) {
        self.absolute += width;
        self.column += 1;
    }

    /// Move past a line terminator of `width` bytes
    pub fn new_line(&mut self, width: usize) {
        self.absolute += width;
        self.line += 1;
        self.column = 1;
    }

    pub fn to_range(&self) -> Range<usize> {
        self.absolute..self.absolute
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "line: {}, column: {}", self.line, self.column)
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Span<P> {
    pub start: P,
    pub end: P,
}

impl Span<Position> {
    pub fn to_range(&self) -> Range<usize> {
        self.start.absolute..self.end.absolute
    }
}

impl Span<BytePos> {
    pub fn to_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A value enriched with its starting and ending position in the source code
#[derive(Debug, PartialEq, Clone)]
pub struct Spanned<P, T> {
    pub span: Span<P>,
    pub value: T,
}

pub fn spanned<P, T>(start: P, end: P, value: T) -> Spanned<P, T> {
    Spanned {
        span: Span { start, end },
        value,
    }
}

impl<T> From<(BytePos, T, BytePos)> for Spanned<BytePos, T> {
    fn from((start, value, end): (BytePos, T, BytePos)) -> Self {
        spanned(start, end, value)
    }
}
