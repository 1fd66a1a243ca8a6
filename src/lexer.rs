//! A lexer (a.k.a. tokenizer) driven by state functions, producing an iterator of
//! [`Token`]s.
//!
//! A state function reads characters through a [`Machine`], publishes tokens with
//! [`Machine::emit`], and returns the next state function to run (or `None` to stop).
//! The machine runs on its own thread and hands tokens to the [`Lexer`] one at a
//! time: it blocks until the previous token has been taken.
//!
//! ```
//! use parser_rd::lexer::{LexError, Lexer, Machine, StateFn};
//!
//! fn words(m: &mut Machine<&'static str>) -> Result<Option<StateFn<&'static str>>, LexError> {
//!     match m.read() {
//!         None => return Ok(None),
//!         Some(' ') => m.drop_span(),
//!         Some(_) => {
//!             while let Some(ch) = m.read() {
//!                 if ch == ' ' {
//!                     m.backup();
//!                     break;
//!                 }
//!             }
//!             m.emit("word");
//!         }
//!     }
//!     Ok(Some(StateFn::new(words)))
//! }
//!
//! let lexer = Lexer::new(StateFn::new(words), "hello world");
//! let bodies: Vec<String> = lexer.map(|token| token.body).collect();
//! assert_eq!(bodies, vec!["hello", "world"]);
//! ```

use std::fmt;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};
use thiserror::Error;

/*========================================*/
/*          Token                         */
/*========================================*/

/// A lexeme, classified by a user-chosen `tag`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token<T> {
    /// The kind of lexeme, as passed to [`Machine::emit`].
    pub tag: T,
    /// The text of the lexeme.
    pub body: String,
    /// The line the lexer was on when the token was emitted, starting at 1.
    pub line: usize,
    /// Byte offset of the start of the lexeme.
    pub start: usize,
    /// Length of the lexeme in bytes.
    pub span: usize,
}

/// A fatal lexing error. Once one occurs, no further tokens are produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// Reported by a state function.
    #[error("{0}")]
    Message(String),
    /// A state function panicked.
    #[error("lexer state function panicked")]
    Panicked,
    /// The lexer thread could not be started.
    #[error("could not start lexer thread: {0}")]
    Spawn(String),
}

impl LexError {
    /// A [`LexError::Message`] with the given text.
    pub fn new(message: impl Into<String>) -> LexError {
        LexError::Message(message.into())
    }
}

/*========================================*/
/*          State Functions               */
/*========================================*/

type StateBody<T> = dyn FnOnce(&mut Machine<T>) -> Result<Option<StateFn<T>>, LexError> + Send;

/// One state of a lexer. Running it returns the next state, `None` to stop
/// lexing, or a fatal error.
pub struct StateFn<T>(Box<StateBody<T>>);

impl<T> StateFn<T> {
    /// Wrap a closure or function as a state.
    pub fn new<F>(func: F) -> StateFn<T>
    where
        F: FnOnce(&mut Machine<T>) -> Result<Option<StateFn<T>>, LexError> + Send + 'static,
    {
        StateFn(Box::new(func))
    }
}

impl<T> fmt::Debug for StateFn<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "StateFn")
    }
}

enum Message<T> {
    Token(Token<T>),
    Fatal(LexError),
}

/*========================================*/
/*          Machine                       */
/*========================================*/

/// The state functions' view of the lexer: a cursor over the input that tracks
/// the span of the pending token.
pub struct Machine<T> {
    input: String,
    /// End of the last emitted or dropped span.
    start: usize,
    pos: usize,
    /// Widths of the chars read since `start`, for [`Machine::backup`].
    /// A read at the end of the input records a width of 0.
    widths: Vec<usize>,
    line: usize,
    sender: SyncSender<Message<T>>,
    disconnected: bool,
}

impl<T> Machine<T> {
    fn new(input: String, sender: SyncSender<Message<T>>) -> Machine<T> {
        Machine {
            input,
            start: 0,
            pos: 0,
            widths: Vec::new(),
            line: 1,
            sender,
            disconnected: false,
        }
    }

    /// Consume the next char, or return `None` at the end of the input.
    pub fn read(&mut self) -> Option<char> {
        match self.input[self.pos..].chars().next() {
            None => {
                self.widths.push(0);
                None
            }
            Some(ch) => {
                let width = ch.len_utf8();
                self.widths.push(width);
                self.pos += width;
                if ch == '\n' {
                    self.line += 1;
                }
                Some(ch)
            }
        }
    }

    /// The next char, without consuming it.
    pub fn peek(&mut self) -> Option<char> {
        let ch = self.read();
        self.backup();
        ch
    }

    /// Undo the most recent [`Machine::read`] that has not been undone yet. Does
    /// nothing if every char since the last emit or drop has been backed up.
    pub fn backup(&mut self) {
        if let Some(width) = self.widths.pop() {
            self.pos -= width;
            if width == 1 && self.input.as_bytes()[self.pos] == b'\n' {
                self.line -= 1;
            }
        }
    }

    /// The text of the pending token.
    pub fn body(&self) -> &str {
        &self.input[self.start..self.pos]
    }

    /// Publish the pending text as a token tagged `tag`, and start a new one.
    ///
    /// If the [`Lexer`] has been dropped, the token is discarded and lexing stops
    /// once the current state function returns.
    pub fn emit(&mut self, tag: T) {
        let token = Token {
            tag,
            body: self.body().to_owned(),
            line: self.line,
            start: self.start,
            span: self.pos - self.start,
        };
        log::trace!("emit token at {} ({} bytes)", token.start, token.span);
        if !self.disconnected && self.sender.send(Message::Token(token)).is_err() {
            self.disconnected = true;
        }
        self.skip();
    }

    /// Discard the pending text without publishing it, and start a new token.
    pub fn drop_span(&mut self) {
        self.skip();
    }

    fn skip(&mut self) {
        self.start = self.pos;
        self.widths.clear();
    }

    /// The current line, starting at 1.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The current byte offset into the input.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The byte offset at which the pending token starts.
    pub fn start(&self) -> usize {
        self.start
    }

    /// The full input.
    pub fn input(&self) -> &str {
        &self.input
    }

    fn run(&mut self, mut state: StateFn<T>) {
        loop {
            match (state.0)(self) {
                Ok(Some(_)) if self.disconnected => break,
                Ok(Some(next)) => state = next,
                Ok(None) => break,
                Err(err) => {
                    log::warn!("lexing stopped at offset {}: {}", self.pos, err);
                    // The consumer may be gone, in which case nobody needs the error.
                    let _ = self.sender.send(Message::Fatal(err));
                    break;
                }
            }
        }
    }
}

/*========================================*/
/*          Lexer                         */
/*========================================*/

/// A stream of tokens produced by a state function running on another thread.
///
/// Iterate over it to take tokens. Once it is exhausted, [`Lexer::err`] reports
/// whether lexing stopped early.
pub struct Lexer<T> {
    receiver: Receiver<Message<T>>,
    handle: Option<JoinHandle<()>>,
    err: Option<LexError>,
}

impl<T: Send + 'static> Lexer<T> {
    /// Start lexing `input` from `state`.
    pub fn new(state: StateFn<T>, input: impl Into<String>) -> Lexer<T> {
        let (sender, receiver) = mpsc::sync_channel(1);
        let mut machine = Machine::new(input.into(), sender);
        let spawned = thread::Builder::new()
            .name("lexer".to_owned())
            .spawn(move || {
                log::debug!("lexer started on {} bytes", machine.input.len());
                machine.run(state);
                log::debug!("lexer stopped at offset {}", machine.pos);
            });
        match spawned {
            Ok(handle) => Lexer {
                receiver,
                handle: Some(handle),
                err: None,
            },
            Err(err) => {
                log::warn!("could not start lexer thread: {}", err);
                Lexer {
                    receiver,
                    handle: None,
                    err: Some(LexError::Spawn(err.to_string())),
                }
            }
        }
    }
}

impl<T> Lexer<T> {
    /// The error that stopped lexing, if any. Only meaningful once the lexer
    /// has been exhausted.
    pub fn err(&self) -> Option<&LexError> {
        self.err.as_ref()
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("lexer state function panicked");
                self.err.get_or_insert(LexError::Panicked);
            }
        }
    }
}

impl<T> Iterator for Lexer<T> {
    type Item = Token<T>;

    fn next(&mut self) -> Option<Token<T>> {
        match self.receiver.recv() {
            Ok(Message::Token(token)) => Some(token),
            Ok(Message::Fatal(err)) => {
                self.err = Some(err);
                self.join();
                None
            }
            Err(mpsc::RecvError) => {
                self.join();
                None
            }
        }
    }
}

impl<T> fmt::Debug for Lexer<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("running", &self.handle.is_some())
            .field("err", &self.err)
            .finish()
    }
}
