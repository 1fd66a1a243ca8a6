use crate::cursor::Position;
use crate::lexer::LexError;
#[cfg(doc)]
use crate::{choice, or, Parser};
use std::fmt;
use thiserror::Error;

/*========================================*/
/*          Parse Error                   */
/*========================================*/

/// An error encountered while parsing.
///
/// Every variant records the cursor offset at which it arose (a byte offset for
/// text input, an element index otherwise).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The cursor was exhausted.
    #[error("unexpected end of input")]
    EndOfInput { offset: usize },

    /// An element was read but rejected by a rule.
    #[error("{message}, found {found}")]
    Predicate {
        offset: usize,
        found: String,
        message: String,
    },

    /// Both branches of an [`or`] failed.
    #[error("{}", Joined(.causes))]
    Alternatives {
        offset: usize,
        causes: Vec<ParseError>,
    },

    /// Every branch of a [`choice`] failed, or one failed after consuming input.
    #[error("expected {label}: {}", Joined(.causes))]
    Expected {
        label: String,
        offset: usize,
        causes: Vec<ParseError>,
    },

    /// A lifted function rejected the values its parsers produced.
    #[error("{message}")]
    Transform { offset: usize, message: String },

    /// A failure inside a parser given a name with [`Parser::named`].
    #[error("{label} failed: {inner}")]
    Named {
        label: String,
        #[source]
        inner: Box<ParseError>,
    },

    /// The parser succeeded without consuming the whole input.
    #[error("unparsed input: {remaining:?}")]
    Unparsed { offset: usize, remaining: String },

    /// A cursor was asked to unread past the start of its input.
    #[error("nothing to unread")]
    NothingToUnread { offset: usize },

    /// A user-supplied failure.
    #[error("{message}")]
    Failure { offset: usize, message: String },

    /// The lexer producing the input stopped with a fatal error.
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
}

struct Joined<'a>(&'a [ParseError]);

impl fmt::Display for Joined<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl ParseError {
    /// The cursor offset at which the failure arose. For [`ParseError::Named`]
    /// this is the offset of the wrapped error; lex errors have no offset.
    pub fn offset(&self) -> Option<usize> {
        use ParseError::*;

        match self {
            EndOfInput { offset }
            | Predicate { offset, .. }
            | Alternatives { offset, .. }
            | Expected { offset, .. }
            | Transform { offset, .. }
            | Unparsed { offset, .. }
            | NothingToUnread { offset }
            | Failure { offset, .. } => Some(*offset),
            Named { inner, .. } => inner.offset(),
            Lex(_) => None,
        }
    }

    /// Every underlying error, for the aggregate variants. Other variants
    /// yield an empty slice.
    pub fn causes(&self) -> &[ParseError] {
        match self {
            ParseError::Alternatives { causes, .. } | ParseError::Expected { causes, .. } => causes,
            _ => &[],
        }
    }

    /// Render this error against the text it arose from, for display to a user.
    /// `filename` is used only in the rendered message.
    ///
    /// Only meaningful for errors from text parses, whose offsets are byte
    /// offsets into `source`.
    pub fn report(&self, filename: &str, source: &str) -> ErrorReport {
        let offset = self.offset().unwrap_or(source.len()).min(source.len());
        let start = Position::locate(source, offset);
        let line_contents = match source.lines().nth(start.line as usize) {
            Some(line) => line.to_owned(),
            None => "".to_owned(),
        };
        let caret_message = match self {
            ParseError::Expected { label, .. } => format!("expected {}", label),
            ParseError::Named { label, .. } => format!("in {}", label),
            ParseError::EndOfInput { .. } => "end of input".to_owned(),
            ParseError::Unparsed { .. } => "unexpected".to_owned(),
            _ => "here".to_owned(),
        };
        ErrorReport {
            message: self.to_string(),
            caret_message,
            filename: filename.to_owned(),
            line_contents,
            start,
        }
    }
}

/*========================================*/
/*          Error Report                  */
/*========================================*/

/// A [`ParseError`] located in its source text, printable with
/// a caret under the offending position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    message: String,
    caret_message: String,
    filename: String,
    line_contents: String,
    start: Position,
}

impl ErrorReport {
    /// Where in the source the error arose.
    pub fn position(&self) -> Position {
        self.start
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use colored::Colorize;

        let start = self.start;
        let line_num = format!("{}", start.line + 1);
        let margin_width = line_num.len();

        writeln!(
            f,
            "{}{} {}",
            "parse error".red().bold(),
            ":".bold(),
            self.message.bold(),
        )?;
        writeln!(
            f,
            "{:indent$}{} {}:{}:{}",
            "",
            "-->".blue().bold(),
            self.filename,
            start.line + 1,
            start.utf8_col + 1,
            indent = margin_width,
        )?;
        writeln!(
            f,
            "{:indent$}{}",
            "",
            "|".blue().bold(),
            indent = margin_width + 1
        )?;
        writeln!(
            f,
            "{} {}{}",
            line_num.blue().bold(),
            "|".blue().bold(),
            self.line_contents,
        )?;
        writeln!(
            f,
            "{:indent$}{}{:start$}{} {}",
            "",
            "|".blue().bold(),
            "",
            "^".red().bold(),
            self.caret_message.red().bold(),
            start = start.utf8_col as usize,
            indent = margin_width + 1
        )?;
        write!(
            f,
            "{:indent$}{}",
            "",
            "|".blue().bold(),
            indent = margin_width + 1
        )?;
        Ok(())
    }
}

impl std::error::Error for ErrorReport {}
