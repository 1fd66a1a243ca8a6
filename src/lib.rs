//! # parser_rd
//!
//! **Backtracking recursive-descent parsing with typed parser combinators.**
//!
//! ```
//! use parser_rd::text::{char, take_while1};
//! use parser_rd::{parse_str, Parser};
//!
//! let number = take_while1(|c| c.is_ascii_digit())
//!     .try_map(|digits: String| digits.parse::<i64>());
//! let plus = char('+').constant(|a: i64, b: i64| a + b);
//! let sum = number.chain_l1(plus);
//!
//! assert_eq!(parse_str("1+2+3", &sum), Ok(6));
//! ```
//!
//! ## Overview
//!
//! This crate centers around the trait `Parser<C, T>` which represents a parser that
//! reads from a [`Cursor`] of type `C` and, if successful, produces a value of type `T`.
//! Parsers are combined together using _combinators_ to create larger parsers.
//!
//! ### Cursors
//!
//! A cursor is the position a parse has reached in its input. There are two:
//!
//! - [`TextCursor`] reads `char`s from a string. Use [`parse_str`] to run a parser on text.
//!   The [`text`] module holds the character-level building blocks.
//! - [`IterCursor`] reads elements from any `Iterator`, such as the token stream of
//!   a [`Lexer`]. Use [`parse`] to run a parser on one.
//!
//! Every cursor supports O(1) checkpoint and restore, which is what makes
//! backtracking possible.
//!
//! ### Committed choice
//!
//! [`or`] and [`choice`] only try the next alternative if the failed one consumed
//! no input. Once an alternative has consumed input it is _committed_ and its
//! failure is the failure of the whole choice. Wrap an alternative in [`attempt`]
//! to make it restore the cursor when it fails, so that the next alternative runs
//! regardless:
//!
//! ```
//! use parser_rd::text::string;
//! use parser_rd::{attempt, or, parse_str, Parser};
//!
//! // The first alternative consumes "ab" before failing, so the second is never tried.
//! let committed = or(string("ab").and(string("!")), string("ab").and(string("?")));
//! assert!(parse_str("ab?", &committed).is_err());
//!
//! let backtracking = or(attempt(string("ab").and(string("!"))), string("ab").and(string("?")));
//! assert!(parse_str("ab?", &backtracking).is_ok());
//! ```
//!
//! ### Recursion
//!
//! Grammars that refer to themselves are built with [`fix`], and left-recursive
//! operator grammars with [`chain_l1`] and [`chain_r1`].
//!
//! ## Reference
//!
//! ```text
//! COMBINATOR           OUTPUT-TYPE    NOTES
//!
//! ~~ primitives ~~
//! match_item(rule)     Item           rule: Fn(&Item) -> Result<(), E>
//! satisfy(pred)        Item
//! item(x) / any_item() Item
//! ret(V) / fail(msg)   V
//! end()                ()
//!
//! ~~ mapping ~~
//! P.constant(V)        V
//! P.map(f)             f(P)
//! P.try_map(f)         f(P)?
//! P.bind(f)            f(P)'s output
//! lift..lift4(f, ..)   f(P1, .., Pn)?
//!
//! ~~ combination ~~
//! P.and(Q)             (P, Q)
//! P.preceded(Q)        P
//! P.terminated(Q)      P
//! wrap(L, P, R)        P
//! tuple((P1, .., Pn))  (P1, .., Pn)
//!
//! ~~ choice ~~
//! P.or(Q)              P              committed
//! P.attempt()          P              restores on failure
//! choice(label, (..))  P              committed
//! try_choice(label, ..) P             all but the last alternative restore
//! P.opt()              Option<P>
//! P.look_ahead()       P              never consumes
//!
//! ~~ repetition ~~
//! P.many0()            Vec<P>
//! P.many1()            Vec<P>
//! P.count(n)           Vec<P>
//! P.sep_by(S)          Vec<P>
//! P.sep_by1(S)         Vec<P>
//! P.many_till(E)       Vec<P>
//! P.skip_many()        ()
//! P.skip_many1()       ()
//!
//! ~~ recursion ~~
//! fix(f)               P              f: Fn(FixRef) -> P
//! P.chain_l1(OP)       P              OP: Parser<F>, F: Fn(P, P) -> P
//! P.chain_r1(OP)       P
//! ```

mod choice;
pub mod cursor;
pub mod lexer;
mod parse_error;
mod primitive;
mod recursive;
mod repeat;
mod seq;
pub mod text;

use dyn_clone::{clone_box, DynClone};
use std::fmt;

/*========================================*/
/*          Interface                     */
/*========================================*/

pub use choice::{attempt, choice, or, try_choice, AttemptP, Choice, ChoiceTuple, OrP};
pub use cursor::{Cursor, IterCursor, Position, TextCursor};
pub use lexer::{LexError, Lexer, Machine, StateFn, Token};
pub use parse_error::{ErrorReport, ParseError};
pub use primitive::{
    any_item, assert, bind, discard_left, discard_right, end, fail, finish, item, lift, lift2,
    lift3, lift4, look_ahead, match_item, maybe, name, option, ret, satisfy, wrap, AssertP,
    BindP, ConstantP, DiscardLeftP, DiscardRightP, EndP, FailP, FinishP, LookAheadP, MapP,
    MatchP, MaybeP, NamedP, OptionP, ReturnP, TryMapP,
};
pub use recursive::{chain_l1, chain_r1, fix, ChainL1P, ChainR1P, Fix, FixRef};
pub use repeat::{
    count, list, many, many1, many_till, sep_by, sep_by1, skip_many, skip_many1, CountP, ListP,
    Many1P, ManyP, ManyTillP, SepByP, SkipManyP,
};
pub use seq::{tuple, Seq, SeqTuple};

/// A type-erased parser.
pub type BoxedParser<C, T> = Box<dyn Parser<C, T>>;

/// A parser that reads from a cursor of type `C` and outputs type `T` on a successful parse.
///
/// A parser has no side effects beyond advancing the cursor. If it fails, the cursor
/// is left wherever the failure happened: how far it got is what [`or`] and
/// [`choice`] look at to decide whether to try another alternative.
pub trait Parser<C: Cursor, T>: DynClone {
    /// A descriptive name for this parser. Used in error messages.
    fn name(&self) -> String;

    /// Run this parser against `cursor`.
    fn parse(&self, cursor: &mut C) -> Result<T, ParseError>;

    // ========== Mapping ========== //

    /// Ignore this parser's output, replacing it with `value`.
    fn constant<T2: Clone>(self, value: T2) -> ConstantP<Self, T2, T>
    where
        Self: Clone,
    {
        ConstantP::new(self, value)
    }

    /// Transform this parser's output value with `func`.
    fn map<T2, F: Fn(T) -> T2 + Clone>(self, func: F) -> MapP<Self, F, T>
    where
        Self: Clone,
    {
        MapP::new(self, func)
    }

    /// Transform this parser's output value with `func`, producing a parse
    /// error if `func` returns an `Err`.
    fn try_map<T2, E, F>(self, func: F) -> TryMapP<Self, F, T>
    where
        Self: Clone,
        E: fmt::Display,
        F: Fn(T) -> Result<T2, E> + Clone,
    {
        TryMapP::new(self, func)
    }

    /// Run this parser, then the parser `func` makes out of its output.
    fn bind<T2, P2, F>(self, func: F) -> BindP<Self, F, T>
    where
        Self: Clone,
        P2: Parser<C, T2>,
        F: Fn(T) -> P2 + Clone,
    {
        bind(self, func)
    }

    /// Require the output to satisfy `pred`, failing with `message(&output)` otherwise.
    fn assert<F, M>(self, pred: F, message: M) -> AssertP<Self, F, M>
    where
        Self: Clone,
        F: Fn(&T) -> bool + Clone,
        M: Fn(&T) -> String + Clone,
    {
        assert(self, pred, message)
    }

    // ========== Sequencing ========== //

    /// Parse `self` followed by `next`, producing a tuple of their outputs.
    fn and<T2, P2: Parser<C, T2> + Clone>(self, next: P2) -> Seq<(Self, P2)>
    where
        Self: Clone,
    {
        tuple((self, next))
    }

    /// Parse `prev` followed by `self`, keeping only the output of `self`.
    fn preceded<T2, P2: Parser<C, T2> + Clone>(self, prev: P2) -> DiscardLeftP<P2, Self, T2>
    where
        Self: Clone,
    {
        discard_left(prev, self)
    }

    /// Parse `self` followed by `next`, keeping only the output of `self`.
    fn terminated<T2, P2: Parser<C, T2> + Clone>(self, next: P2) -> DiscardRightP<Self, P2, T2>
    where
        Self: Clone,
    {
        discard_right(self, next)
    }

    // ========== Choice ========== //

    /// Parse `self`, or `other` if `self` fails without consuming input.
    fn or<P2: Parser<C, T> + Clone>(self, other: P2) -> OrP<Self, P2>
    where
        Self: Clone,
    {
        or(self, other)
    }

    /// Parse `self`, restoring the cursor if it fails.
    fn attempt(self) -> AttemptP<Self>
    where
        Self: Clone,
    {
        attempt(self)
    }

    /// Either parse `self`, or parse nothing.
    fn opt(self) -> MaybeP<Self>
    where
        Self: Clone,
    {
        maybe(self)
    }

    /// Parse `self` without consuming any input.
    fn look_ahead(self) -> LookAheadP<Self>
    where
        Self: Clone,
    {
        look_ahead(self)
    }

    /// Refer to this parser as `label`, in its name and in its errors.
    fn named(self, label: &str) -> NamedP<Self>
    where
        Self: Clone,
    {
        name(label, self)
    }

    // ========== Repetition ========== //

    /// Parse `self` zero or more times.
    fn many0(self) -> ManyP<Self>
    where
        Self: Clone,
    {
        many(self)
    }

    /// Parse `self` one or more times.
    fn many1(self) -> Many1P<Self>
    where
        Self: Clone,
    {
        many1(self)
    }

    /// Parse `self` exactly `n` times.
    fn count(self, n: usize) -> CountP<Self>
    where
        Self: Clone,
    {
        count(n, self)
    }

    /// Parse `self` zero or more times, separated by `sep`s.
    ///
    /// Collects the `self` outputs into a vector, and ignores the `sep` outputs.
    fn sep_by<T2, S: Parser<C, T2> + Clone>(self, sep: S) -> SepByP<S, Self, T2>
    where
        Self: Clone,
    {
        sep_by(sep, self)
    }

    /// Parse `self` one or more times, separated by `sep`s.
    fn sep_by1<T2, S: Parser<C, T2> + Clone>(self, sep: S) -> SepByP<S, Self, T2>
    where
        Self: Clone,
    {
        sep_by1(sep, self)
    }

    /// Parse `self` repeatedly until `end` succeeds.
    fn many_till<T2, E: Parser<C, T2> + Clone>(self, end: E) -> ManyTillP<Self, E, T2>
    where
        Self: Clone,
    {
        many_till(self, end)
    }

    /// Parse `self` zero or more times, discarding the outputs.
    fn skip_many(self) -> SkipManyP<Self, T>
    where
        Self: Clone,
    {
        skip_many(self)
    }

    /// Parse `self` one or more times, discarding the outputs.
    fn skip_many1(self) -> SkipManyP<Self, T>
    where
        Self: Clone,
    {
        skip_many1(self)
    }

    // ========== Recursion ========== //

    /// Parse one or more `self`s separated by `op`, combining them left-associatively
    /// with the functions `op` outputs.
    fn chain_l1<F, O>(self, op: O) -> ChainL1P<Self, O, F>
    where
        Self: Clone,
        F: Fn(T, T) -> T,
        O: Parser<C, F> + Clone,
    {
        chain_l1(self, op)
    }

    /// Parse one or more `self`s separated by `op`, combining them right-associatively
    /// with the functions `op` outputs.
    fn chain_r1<F, O>(self, op: O) -> ChainR1P<Self, O, F>
    where
        Self: Clone,
        F: Fn(T, T) -> T,
        O: Parser<C, F> + Clone,
    {
        chain_r1(self, op)
    }

    /// Erase this parser's type.
    fn boxed(self) -> BoxedParser<C, T>
    where
        Self: Clone + 'static,
    {
        Box::new(self)
    }
}

impl<C: Cursor, T> Clone for Box<dyn Parser<C, T>> {
    fn clone(&self) -> Self {
        clone_box(self.as_ref())
    }
}

impl<C: Cursor, T> Parser<C, T> for Box<dyn Parser<C, T>> {
    fn name(&self) -> String {
        self.as_ref().name()
    }

    fn parse(&self, cursor: &mut C) -> Result<T, ParseError> {
        self.as_ref().parse(cursor)
    }
}

impl<C: Cursor, T> Clone for Box<dyn Parser<C, T> + Send + Sync> {
    fn clone(&self) -> Self {
        clone_box(self.as_ref())
    }
}

impl<C: Cursor, T> Parser<C, T> for Box<dyn Parser<C, T> + Send + Sync> {
    fn name(&self) -> String {
        self.as_ref().name()
    }

    fn parse(&self, cursor: &mut C) -> Result<T, ParseError> {
        self.as_ref().parse(cursor)
    }
}

/*========================================*/
/*          Entry Points                  */
/*========================================*/

/// Run `parser` over the elements of `source`.
///
/// The parser is not required to consume every element; wrap it in [`finish`]
/// for that.
pub fn parse<I, T, P>(source: I, parser: &P) -> Result<T, ParseError>
where
    I: IntoIterator,
    I::Item: Clone + fmt::Debug,
    P: Parser<IterCursor<I::IntoIter>, T>,
{
    let mut cursor = IterCursor::new(source);
    run(&mut cursor, parser)
}

/// Run `parser` over the text `input`.
///
/// The parser is not required to consume all of `input`; wrap it in [`finish`]
/// for that.
pub fn parse_str<T, P>(input: &str, parser: &P) -> Result<T, ParseError>
where
    P: Parser<TextCursor, T>,
{
    let mut cursor = TextCursor::new(input);
    run(&mut cursor, parser)
}

fn run<C: Cursor, T, P: Parser<C, T>>(cursor: &mut C, parser: &P) -> Result<T, ParseError> {
    let result = parser.parse(cursor);
    if let Err(err) = &result {
        log::debug!(
            "parse of {} failed at offset {:?}: {}",
            parser.name(),
            err.offset(),
            err
        );
    }
    result
}
