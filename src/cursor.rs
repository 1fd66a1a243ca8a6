//! Positional state over an input source, with O(1) checkpoint and restore.
//!
//! There are two kinds of cursor:
//!
//! - [`TextCursor`] reads `char`s out of an owned string. Its position is a byte
//!   offset that always sits on a char boundary.
//! - [`IterCursor`] reads elements out of any [`Iterator`]. Elements are pulled
//!   lazily and buffered, so that restoring a checkpoint can replay them.

use crate::ParseError;
use std::fmt;

/*========================================*/
/*          Cursor                        */
/*========================================*/

/// The state a parser reads from. A cursor is created once per parse and is
/// exclusively borrowed by the parse call tree.
pub trait Cursor {
    /// The element type produced by [`Cursor::read`].
    type Item: Clone + fmt::Debug;
    /// An opaque snapshot of the cursor's position.
    type Checkpoint: Copy + fmt::Debug;

    /// Consume and return the next element.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::EndOfInput`] if the cursor is exhausted.
    fn read(&mut self) -> Result<Self::Item, ParseError>;

    /// Move back by exactly one previously read element.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NothingToUnread`] at the start of the input.
    fn unread(&mut self) -> Result<(), ParseError>;

    /// Snapshot the current position.
    fn checkpoint(&self) -> Self::Checkpoint;

    /// Reset to a snapshot previously taken from this cursor.
    fn restore(&mut self, checkpoint: Self::Checkpoint);

    /// How far into the input the cursor is: a byte offset for text, an
    /// element index otherwise. Used to observe consumption.
    fn offset(&self) -> usize;

    /// Whether every element has been read.
    fn is_exhausted(&mut self) -> bool;
}

/*========================================*/
/*          Position                      */
/*========================================*/

/// A position in the input text, _between_ two characters (or at the
/// start or end of a line). For example, "xyz" has 4 possible positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Byte offset from the beginning of the source string.
    pub offset: usize,
    /// Line number, starting at 0.
    pub line: u32,
    /// Column number, counted in bytes.
    pub col: u32,
    /// Column number, counted in utf8 codepoints.
    pub utf8_col: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.utf8_col)
    }
}

impl Position {
    /// Compute the position of byte `offset` within `source`. Offsets past the
    /// end of `source` are clamped to its end.
    pub fn locate(source: &str, offset: usize) -> Position {
        let mut pos = Position {
            offset: 0,
            line: 0,
            col: 0,
            utf8_col: 0,
        };
        for ch in source.chars() {
            if pos.offset >= offset {
                break;
            }
            pos.advance(ch);
        }
        pos
    }

    fn advance(&mut self, ch: char) {
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.col = 0;
            self.utf8_col = 0;
            self.line += 1;
        } else {
            self.col += ch.len_utf8() as u32;
            self.utf8_col += 1;
        }
    }
}

/*========================================*/
/*          Text Cursor                   */
/*========================================*/

/// A cursor over an owned string, reading one `char` at a time.
#[derive(Debug, Clone)]
pub struct TextCursor {
    input: String,
    pos: usize,
    /// 1-based line of `pos`.
    line: usize,
}

/// A snapshot of a [`TextCursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextCheckpoint {
    pos: usize,
    line: usize,
}

impl TextCursor {
    /// Construct a cursor at the start of `input`.
    pub fn new(input: impl Into<String>) -> TextCursor {
        TextCursor {
            input: input.into(),
            pos: 0,
            line: 1,
        }
    }

    /// The current line number, starting at 1.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The full input text.
    pub fn source(&self) -> &str {
        &self.input
    }

    /// The input that has not been read yet.
    pub fn remaining(&self) -> &str {
        &self.input[self.pos..]
    }

    /// The text between two byte offsets, or `None` if they are out of range or
    /// not on char boundaries.
    pub fn slice(&self, from: usize, to: usize) -> Option<&str> {
        self.input.get(from..to)
    }

    /// The line and column of the cursor.
    pub fn position(&self) -> Position {
        Position::locate(&self.input, self.pos)
    }

    /// Advance past `len` bytes of the remaining input. `len` must land on a
    /// char boundary.
    pub(crate) fn advance_by(&mut self, len: usize) {
        let consumed = &self.input[self.pos..self.pos + len];
        self.line += consumed.matches('\n').count();
        self.pos += len;
    }
}

impl Cursor for TextCursor {
    type Item = char;
    type Checkpoint = TextCheckpoint;

    fn read(&mut self) -> Result<char, ParseError> {
        let ch = self.input[self.pos..]
            .chars()
            .next()
            .ok_or(ParseError::EndOfInput { offset: self.pos })?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
        }
        Ok(ch)
    }

    fn unread(&mut self) -> Result<(), ParseError> {
        let ch = self.input[..self.pos]
            .chars()
            .next_back()
            .ok_or(ParseError::NothingToUnread { offset: self.pos })?;
        self.pos -= ch.len_utf8();
        if ch == '\n' {
            self.line -= 1;
        }
        Ok(())
    }

    fn checkpoint(&self) -> TextCheckpoint {
        TextCheckpoint {
            pos: self.pos,
            line: self.line,
        }
    }

    fn restore(&mut self, checkpoint: TextCheckpoint) {
        self.pos = checkpoint.pos;
        self.line = checkpoint.line;
    }

    fn offset(&self) -> usize {
        self.pos
    }

    fn is_exhausted(&mut self) -> bool {
        self.pos == self.input.len()
    }
}

/*========================================*/
/*          Iter Cursor                   */
/*========================================*/

/// A cursor over any pull-based source of elements.
pub struct IterCursor<I: Iterator> {
    source: I,
    buffer: Vec<I::Item>,
    pos: usize,
}

impl<I: Iterator> IterCursor<I> {
    /// Construct a cursor that exclusively owns `source`.
    pub fn new(source: impl IntoIterator<IntoIter = I>) -> IterCursor<I> {
        IterCursor {
            source: source.into_iter(),
            buffer: Vec::new(),
            pos: 0,
        }
    }

    /// The underlying source. Elements already pulled into the buffer are not
    /// visible through it.
    pub fn source(&self) -> &I {
        &self.source
    }

    /// Consume the cursor, returning its underlying source.
    pub fn into_source(self) -> I {
        self.source
    }

    /// Pull from the source until `pos` is buffered. Returns `false` if the
    /// source ran out first.
    fn fill(&mut self) -> bool {
        while self.pos >= self.buffer.len() {
            match self.source.next() {
                Some(elem) => self.buffer.push(elem),
                None => return false,
            }
        }
        true
    }
}

impl<I> Cursor for IterCursor<I>
where
    I: Iterator,
    I::Item: Clone + fmt::Debug,
{
    type Item = I::Item;
    type Checkpoint = usize;

    fn read(&mut self) -> Result<I::Item, ParseError> {
        if !self.fill() {
            return Err(ParseError::EndOfInput { offset: self.pos });
        }
        let elem = self.buffer[self.pos].clone();
        self.pos += 1;
        Ok(elem)
    }

    fn unread(&mut self) -> Result<(), ParseError> {
        if self.pos == 0 {
            return Err(ParseError::NothingToUnread { offset: 0 });
        }
        self.pos -= 1;
        Ok(())
    }

    fn checkpoint(&self) -> usize {
        self.pos
    }

    fn restore(&mut self, checkpoint: usize) {
        self.pos = checkpoint;
    }

    fn offset(&self) -> usize {
        self.pos
    }

    fn is_exhausted(&mut self) -> bool {
        !self.fill()
    }
}

impl<I> fmt::Debug for IterCursor<I>
where
    I: Iterator,
    I::Item: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("IterCursor")
            .field("buffer", &self.buffer)
            .field("pos", &self.pos)
            .finish()
    }
}
