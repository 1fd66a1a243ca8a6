//! Character-level parsers, for running over a [`TextCursor`] with
//! [`parse_str`](crate::parse_str).
//!
//! ```
//! use parser_rd::text::{char, skip_ws, take_while1};
//! use parser_rd::{parse_str, Parser};
//!
//! let ident = take_while1(|c| c.is_alphanumeric() || c == '_');
//! let args = skip_ws(ident.clone()).sep_by(char(','));
//! let call = ident.and(args.preceded(char('(')).terminated(char(')')));
//! assert_eq!(
//!     parse_str("max( a,b )", &call),
//!     Ok(("max".to_owned(), vec!["a".to_owned(), "b".to_owned()]))
//! );
//! ```

use crate::cursor::{Position, TextCursor};
use crate::{
    any_item, discard_left, discard_right, match_item, skip_many, skip_many1, wrap, Cursor,
    ParseError, Parser,
};
use std::marker::PhantomData;

/// Text parsers share this error shape: what was expected, and the char that was
/// found instead.
fn mismatch(cursor: &TextCursor, message: String) -> ParseError {
    let offset = cursor.offset();
    match cursor.remaining().chars().next() {
        None => ParseError::EndOfInput { offset },
        Some(found) => ParseError::Predicate {
            offset,
            found: format!("{:?}", found),
            message,
        },
    }
}

/*========================================*/
/*          Single Chars                  */
/*========================================*/

/// Match the char `expected`.
pub fn char(expected: char) -> impl Parser<TextCursor, char> + Clone {
    match_item::<TextCursor, _, _>(move |ch: &char| {
        if *ch == expected {
            Ok(())
        } else {
            Err(format!("expected {:?}", expected))
        }
    })
    .with_label(format!("'{}'", expected))
}

/// Match any char except `unexpected`.
pub fn not_char(unexpected: char) -> impl Parser<TextCursor, char> + Clone {
    match_item::<TextCursor, _, _>(move |ch: &char| {
        if *ch != unexpected {
            Ok(())
        } else {
            Err(format!("unexpected {:?}", unexpected))
        }
    })
    .with_label(format!("not '{}'", unexpected))
}

/// Match any char between `lo` and `hi`, inclusive.
pub fn char_range(lo: char, hi: char) -> impl Parser<TextCursor, char> + Clone {
    match_item::<TextCursor, _, _>(move |ch: &char| {
        if (lo..=hi).contains(ch) {
            Ok(())
        } else {
            Err(format!("expected a char between {:?} and {:?}", lo, hi))
        }
    })
    .with_label(format!("'{}'..='{}'", lo, hi))
}

/// Match any one of the chars in `chars`.
pub fn one_of(chars: &str) -> impl Parser<TextCursor, char> + Clone {
    let set: Vec<char> = chars.chars().collect();
    let label = format!("one of {:?}", chars);
    let message = label.clone();
    match_item::<TextCursor, _, _>(move |ch: &char| {
        if set.contains(ch) {
            Ok(())
        } else {
            Err(format!("expected {}", message))
        }
    })
    .with_label(label)
}

/// Match any char. Fails only at the end of the input.
pub fn any_char() -> impl Parser<TextCursor, char> + Clone {
    any_item::<TextCursor>()
}

/// Match any char for which `pred` holds.
pub fn satisfy_char<F>(pred: F) -> impl Parser<TextCursor, char> + Clone
where
    F: Fn(char) -> bool + Clone,
{
    match_item::<TextCursor, _, _>(move |ch: &char| {
        if pred(*ch) {
            Ok(())
        } else {
            Err("char does not match predicate")
        }
    })
    .with_label("satisfy".to_owned())
}

/// Match one char for which `pred` holds, and discard it.
pub fn skip_char<F>(pred: F) -> impl Parser<TextCursor, ()> + Clone
where
    F: Fn(char) -> bool + Clone,
{
    satisfy_char(pred).constant(())
}

/*========================================*/
/*          Parser: String                */
/*========================================*/

#[derive(Clone)]
struct StringP {
    target: String,
}

impl Parser<TextCursor, String> for StringP {
    fn name(&self) -> String {
        format!("{:?}", self.target)
    }

    fn parse(&self, cursor: &mut TextCursor) -> Result<String, ParseError> {
        if cursor.remaining().starts_with(&self.target) {
            cursor.advance_by(self.target.len());
            Ok(self.target.clone())
        } else {
            Err(mismatch(cursor, format!("expected {:?}", self.target)))
        }
    }
}

/// Match exactly the text `target`. Consumes nothing unless all of it matches.
pub fn string(target: &str) -> impl Parser<TextCursor, String> + Clone {
    StringP {
        target: target.to_owned(),
    }
}

/*========================================*/
/*          Parser: Regex                 */
/*========================================*/

#[cfg(feature = "regex")]
#[derive(Clone)]
struct RegexP {
    pattern: String,
    regex: regex::Regex,
}

#[cfg(feature = "regex")]
impl Parser<TextCursor, String> for RegexP {
    fn name(&self) -> String {
        format!("/{}/", self.pattern)
    }

    fn parse(&self, cursor: &mut TextCursor) -> Result<String, ParseError> {
        match self.regex.find(cursor.remaining()) {
            Some(found) => {
                let text = found.as_str().to_owned();
                cursor.advance_by(found.end());
                Ok(text)
            }
            None => Err(mismatch(
                cursor,
                format!("expected a match of /{}/", self.pattern),
            )),
        }
    }
}

/// Match the regex `pattern` at the cursor, outputting the matched text.
/// Consumes nothing unless it matches.
///
/// The syntax is that of the `regex` crate. You do not need to begin the pattern
/// with a start-of-string anchor `^`.
///
/// # Errors
///
/// Returns an error if `pattern` is not a valid regex.
#[cfg(feature = "regex")]
pub fn regex(pattern: &str) -> Result<impl Parser<TextCursor, String> + Clone, regex::Error> {
    let regex = match regex::Regex::new(&format!("^({})", pattern)) {
        Ok(regex) => regex,
        // Report the error against the pattern as written, without the anchor.
        Err(err) => return Err(regex::Regex::new(pattern).err().unwrap_or(err)),
    };
    Ok(RegexP {
        pattern: pattern.to_owned(),
        regex,
    })
}

/*========================================*/
/*          Whitespace                    */
/*========================================*/

/// Match a single whitespace char.
pub fn space() -> impl Parser<TextCursor, char> + Clone {
    satisfy_char(char::is_whitespace).named("whitespace")
}

/// Parse `parser`, skipping any whitespace before and after it.
pub fn skip_ws<T, P>(parser: P) -> impl Parser<TextCursor, T> + Clone
where
    P: Parser<TextCursor, T> + Clone,
{
    wrap(skip_many(space()), parser, skip_many(space()))
}

/// Parse `parser`, then at least one whitespace char.
pub fn trailing_ws<T, P>(parser: P) -> impl Parser<TextCursor, T> + Clone
where
    P: Parser<TextCursor, T> + Clone,
{
    discard_right(parser, skip_many1(space()))
}

/// Parse at least one whitespace char, then `parser`.
pub fn preceding_ws<T, P>(parser: P) -> impl Parser<TextCursor, T> + Clone
where
    P: Parser<TextCursor, T> + Clone,
{
    discard_left(skip_many1(space()), parser)
}

/*========================================*/
/*          Parser: Take                  */
/*========================================*/

#[derive(Clone)]
struct TakeWhileP<F> {
    pred: F,
    at_least_one: bool,
}

impl<F: Fn(char) -> bool + Clone> Parser<TextCursor, String> for TakeWhileP<F> {
    fn name(&self) -> String {
        "take_while".to_owned()
    }

    fn parse(&self, cursor: &mut TextCursor) -> Result<String, ParseError> {
        let len: usize = cursor
            .remaining()
            .chars()
            .take_while(|ch| (self.pred)(*ch))
            .map(char::len_utf8)
            .sum();
        if len == 0 && self.at_least_one {
            return Err(mismatch(
                cursor,
                "expected at least one matching char".to_owned(),
            ));
        }
        let text = cursor.remaining()[..len].to_owned();
        cursor.advance_by(len);
        Ok(text)
    }
}

/// Match exactly `n` chars, outputting them.
pub fn take(n: usize) -> impl Parser<TextCursor, String> + Clone {
    consumed(any_char().count(n))
}

/// Match chars as long as `pred` holds for them, outputting them. Never fails:
/// outputs an empty string if `pred` does not hold for the first char.
pub fn take_while<F>(pred: F) -> impl Parser<TextCursor, String> + Clone
where
    F: Fn(char) -> bool + Clone,
{
    TakeWhileP {
        pred,
        at_least_one: false,
    }
}

/// Like [`take_while`], but fails unless `pred` holds for at least one char.
pub fn take_while1<F>(pred: F) -> impl Parser<TextCursor, String> + Clone
where
    F: Fn(char) -> bool + Clone,
{
    TakeWhileP {
        pred,
        at_least_one: true,
    }
}

/// Match chars until `pred` holds for one, outputting the chars before it.
pub fn take_till<F>(pred: F) -> impl Parser<TextCursor, String> + Clone
where
    F: Fn(char) -> bool + Clone,
{
    take_while(move |ch| !pred(ch))
}

/// Like [`take_till`], but fails unless at least one char is matched.
pub fn take_till1<F>(pred: F) -> impl Parser<TextCursor, String> + Clone
where
    F: Fn(char) -> bool + Clone,
{
    take_while1(move |ch| !pred(ch))
}

/// Skip chars as long as `pred` holds for them. Never fails.
pub fn skip_while<F>(pred: F) -> impl Parser<TextCursor, ()> + Clone
where
    F: Fn(char) -> bool + Clone,
{
    take_while(pred).constant(())
}

/*========================================*/
/*          Parser: Consumed              */
/*========================================*/

struct ConsumedP<P, A> {
    parser: P,
    phantom: PhantomData<fn() -> A>,
}

impl<P: Clone, A> Clone for ConsumedP<P, A> {
    fn clone(&self) -> Self {
        ConsumedP {
            parser: self.parser.clone(),
            phantom: PhantomData,
        }
    }
}

impl<A, P: Parser<TextCursor, A> + Clone> Parser<TextCursor, String> for ConsumedP<P, A> {
    fn name(&self) -> String {
        self.parser.name()
    }

    fn parse(&self, cursor: &mut TextCursor) -> Result<String, ParseError> {
        let start = cursor.offset();
        self.parser.parse(cursor)?;
        let text = cursor.slice(start, cursor.offset()).unwrap_or_default();
        Ok(text.to_owned())
    }
}

/// Parse `parser`, outputting the text it consumed instead of its output.
pub fn consumed<A, P>(parser: P) -> impl Parser<TextCursor, String> + Clone
where
    P: Parser<TextCursor, A> + Clone,
{
    ConsumedP {
        parser,
        phantom: PhantomData,
    }
}

/*========================================*/
/*          Parser: Location              */
/*========================================*/

struct LocationP<P, F, A> {
    parser: P,
    func: F,
    phantom: PhantomData<fn() -> A>,
}

impl<P: Clone, F: Clone, A> Clone for LocationP<P, F, A> {
    fn clone(&self) -> Self {
        LocationP {
            parser: self.parser.clone(),
            func: self.func.clone(),
            phantom: PhantomData,
        }
    }
}

impl<A, B, P, F> Parser<TextCursor, B> for LocationP<P, F, A>
where
    P: Parser<TextCursor, A> + Clone,
    F: Fn(usize, usize, A) -> B + Clone,
{
    fn name(&self) -> String {
        self.parser.name()
    }

    fn parse(&self, cursor: &mut TextCursor) -> Result<B, ParseError> {
        let start = cursor.offset();
        let value = self.parser.parse(cursor)?;
        Ok((self.func)(start, cursor.offset(), value))
    }
}

/// Parse `parser`, then combine its output with the byte offsets where it started
/// and ended using `func`.
pub fn location<A, B, P, F>(parser: P, func: F) -> impl Parser<TextCursor, B> + Clone
where
    P: Parser<TextCursor, A> + Clone,
    F: Fn(usize, usize, A) -> B + Clone,
{
    LocationP {
        parser,
        func,
        phantom: PhantomData,
    }
}

/*========================================*/
/*          Cursor State                  */
/*========================================*/

#[derive(Clone)]
struct StateP<F>(&'static str, F);

impl<T, F: Fn(&TextCursor) -> T + Clone> Parser<TextCursor, T> for StateP<F> {
    fn name(&self) -> String {
        self.0.to_owned()
    }

    fn parse(&self, cursor: &mut TextCursor) -> Result<T, ParseError> {
        Ok((self.1)(cursor))
    }
}

/// Output the current position, consuming nothing.
pub fn position() -> impl Parser<TextCursor, Position> + Clone {
    StateP("position", TextCursor::position)
}

/// Output the unconsumed input, consuming nothing.
pub fn remaining() -> impl Parser<TextCursor, String> + Clone {
    StateP("remaining", |cursor: &TextCursor| cursor.remaining().to_owned())
}

/// Output the whole input, consumed or not, consuming nothing.
pub fn input() -> impl Parser<TextCursor, String> + Clone {
    StateP("input", |cursor: &TextCursor| cursor.source().to_owned())
}

/*========================================*/
/*          Parser: Finish                */
/*========================================*/

#[derive(Clone)]
struct FinishTextP<P>(P);

impl<T, P: Parser<TextCursor, T> + Clone> Parser<TextCursor, T> for FinishTextP<P> {
    fn name(&self) -> String {
        self.0.name()
    }

    fn parse(&self, cursor: &mut TextCursor) -> Result<T, ParseError> {
        let value = self.0.parse(cursor)?;
        if cursor.remaining().is_empty() {
            Ok(value)
        } else {
            Err(ParseError::Unparsed {
                offset: cursor.offset(),
                remaining: cursor.remaining().to_owned(),
            })
        }
    }
}

/// Parse `parser`, then require that all of the text has been consumed. On
/// failure the error holds the whole unparsed text.
pub fn finish<T, P>(parser: P) -> impl Parser<TextCursor, T> + Clone
where
    P: Parser<TextCursor, T> + Clone,
{
    FinishTextP(parser)
}
