use crate::{Cursor, ParseError, Parser};
use std::marker::PhantomData;

/// Parse `parser` as many times as it succeeds, pushing onto `values`. Each
/// failed attempt is undone. Also stops after a success that consumed nothing,
/// since every later iteration would do the same.
fn repeat<C, T, P>(parser: &P, cursor: &mut C, values: &mut Vec<T>)
where
    C: Cursor,
    P: Parser<C, T> + ?Sized,
{
    loop {
        let chk = cursor.checkpoint();
        let before = cursor.offset();
        match parser.parse(cursor) {
            Ok(value) => {
                values.push(value);
                if cursor.offset() == before {
                    break;
                }
            }
            Err(_) => {
                cursor.restore(chk);
                break;
            }
        }
    }
}

/*========================================*/
/*          Parser: Many                  */
/*========================================*/

/// The type returned by [`many`] and [`Parser::many0`].
#[derive(Clone)]
pub struct ManyP<P>(P);

impl<C: Cursor, T, P: Parser<C, T> + Clone> Parser<C, Vec<T>> for ManyP<P> {
    fn name(&self) -> String {
        format!("{}.many0()", self.0.name())
    }

    fn parse(&self, cursor: &mut C) -> Result<Vec<T>, ParseError> {
        let mut values = Vec::new();
        repeat(&self.0, cursor, &mut values);
        Ok(values)
    }
}

/// Parse `parser` zero or more times. Never fails: the cursor is left after the
/// last successful application.
pub fn many<C: Cursor, T, P: Parser<C, T> + Clone>(parser: P) -> ManyP<P> {
    ManyP(parser)
}

/// The type returned by [`many1`] and [`Parser::many1`].
#[derive(Clone)]
pub struct Many1P<P>(P);

impl<C: Cursor, T, P: Parser<C, T> + Clone> Parser<C, Vec<T>> for Many1P<P> {
    fn name(&self) -> String {
        format!("{}.many1()", self.0.name())
    }

    fn parse(&self, cursor: &mut C) -> Result<Vec<T>, ParseError> {
        let mut values = vec![self.0.parse(cursor)?];
        repeat(&self.0, cursor, &mut values);
        Ok(values)
    }
}

/// Parse `parser` one or more times. Fails if the first application fails.
pub fn many1<C: Cursor, T, P: Parser<C, T> + Clone>(parser: P) -> Many1P<P> {
    Many1P(parser)
}

/*========================================*/
/*          Parser: Count                 */
/*========================================*/

/// The type returned by [`count`] and [`Parser::count`].
#[derive(Clone)]
pub struct CountP<P> {
    n: usize,
    parser: P,
}

impl<C: Cursor, T, P: Parser<C, T> + Clone> Parser<C, Vec<T>> for CountP<P> {
    fn name(&self) -> String {
        format!("{}.count({})", self.parser.name(), self.n)
    }

    fn parse(&self, cursor: &mut C) -> Result<Vec<T>, ParseError> {
        let mut values = Vec::with_capacity(self.n);
        for _ in 0..self.n {
            values.push(self.parser.parse(cursor)?);
        }
        Ok(values)
    }
}

/// Parse `parser` exactly `n` times. The first failure is returned as is, with
/// the cursor wherever that failure left it.
pub fn count<C: Cursor, T, P: Parser<C, T> + Clone>(n: usize, parser: P) -> CountP<P> {
    CountP { n, parser }
}

/*========================================*/
/*          Parser: Sep By                */
/*========================================*/

/// The type returned by [`sep_by`], [`sep_by1`] and their methods.
pub struct SepByP<S, P, A> {
    sep: S,
    parser: P,
    at_least_one: bool,
    phantom: PhantomData<fn() -> A>,
}

impl<S: Clone, P: Clone, A> Clone for SepByP<S, P, A> {
    fn clone(&self) -> Self {
        SepByP {
            sep: self.sep.clone(),
            parser: self.parser.clone(),
            at_least_one: self.at_least_one,
            phantom: PhantomData,
        }
    }
}

impl<C, A, T, S, P> Parser<C, Vec<T>> for SepByP<S, P, A>
where
    C: Cursor,
    S: Parser<C, A> + Clone,
    P: Parser<C, T> + Clone,
{
    fn name(&self) -> String {
        format!("{}.sep_by({})", self.parser.name(), self.sep.name())
    }

    fn parse(&self, cursor: &mut C) -> Result<Vec<T>, ParseError> {
        let chk = cursor.checkpoint();
        let first = match self.parser.parse(cursor) {
            Ok(value) => value,
            Err(err) if self.at_least_one => return Err(err),
            Err(_) => {
                cursor.restore(chk);
                return Ok(Vec::new());
            }
        };
        let mut values = vec![first];
        loop {
            let chk = cursor.checkpoint();
            let before = cursor.offset();
            let step = self
                .sep
                .parse(cursor)
                .and_then(|_| self.parser.parse(cursor));
            match step {
                Ok(value) => {
                    values.push(value);
                    if cursor.offset() == before {
                        break;
                    }
                }
                Err(_) => {
                    cursor.restore(chk);
                    break;
                }
            }
        }
        Ok(values)
    }
}

/// Parse `parser` zero or more times, separated by `sep`. Never fails: if the
/// first `parser` fails the cursor is restored and the output is empty. A
/// trailing separator is left unconsumed.
pub fn sep_by<C, A, T, S, P>(sep: S, parser: P) -> SepByP<S, P, A>
where
    C: Cursor,
    S: Parser<C, A> + Clone,
    P: Parser<C, T> + Clone,
{
    SepByP {
        sep,
        parser,
        at_least_one: false,
        phantom: PhantomData,
    }
}

/// Parse `parser` one or more times, separated by `sep`.
pub fn sep_by1<C, A, T, S, P>(sep: S, parser: P) -> SepByP<S, P, A>
where
    C: Cursor,
    S: Parser<C, A> + Clone,
    P: Parser<C, T> + Clone,
{
    SepByP {
        sep,
        parser,
        at_least_one: true,
        phantom: PhantomData,
    }
}

/*========================================*/
/*          Parser: Many Till             */
/*========================================*/

/// The type returned by [`many_till`] and [`Parser::many_till`].
pub struct ManyTillP<P, E, B> {
    parser: P,
    end: E,
    phantom: PhantomData<fn() -> B>,
}

impl<P: Clone, E: Clone, B> Clone for ManyTillP<P, E, B> {
    fn clone(&self) -> Self {
        ManyTillP {
            parser: self.parser.clone(),
            end: self.end.clone(),
            phantom: PhantomData,
        }
    }
}

impl<C, B, T, P, E> Parser<C, Vec<T>> for ManyTillP<P, E, B>
where
    C: Cursor,
    P: Parser<C, T> + Clone,
    E: Parser<C, B> + Clone,
{
    fn name(&self) -> String {
        format!("{}.many_till({})", self.parser.name(), self.end.name())
    }

    fn parse(&self, cursor: &mut C) -> Result<Vec<T>, ParseError> {
        let mut values = Vec::new();
        loop {
            let chk = cursor.checkpoint();
            let end_err = match self.end.parse(cursor) {
                Ok(_) => return Ok(values),
                Err(err) => err,
            };
            cursor.restore(chk);
            let before = cursor.offset();
            values.push(self.parser.parse(cursor)?);
            if cursor.offset() == before {
                // `end` can never succeed from here.
                return Err(end_err);
            }
        }
    }
}

/// Parse `parser` repeatedly until `end` succeeds, trying `end` first at each
/// step. The output of `end` is discarded. When `end` fails, `parser` must
/// succeed, or the whole parse fails.
pub fn many_till<C, B, T, P, E>(parser: P, end: E) -> ManyTillP<P, E, B>
where
    C: Cursor,
    P: Parser<C, T> + Clone,
    E: Parser<C, B> + Clone,
{
    ManyTillP {
        parser,
        end,
        phantom: PhantomData,
    }
}

/*========================================*/
/*          Parser: Skip Many             */
/*========================================*/

/// The type returned by [`skip_many`], [`skip_many1`] and their methods.
pub struct SkipManyP<P, T> {
    parser: P,
    at_least_one: bool,
    phantom: PhantomData<fn() -> T>,
}

impl<P: Clone, T> Clone for SkipManyP<P, T> {
    fn clone(&self) -> Self {
        SkipManyP {
            parser: self.parser.clone(),
            at_least_one: self.at_least_one,
            phantom: PhantomData,
        }
    }
}

impl<C: Cursor, T, P: Parser<C, T> + Clone> Parser<C, ()> for SkipManyP<P, T> {
    fn name(&self) -> String {
        format!("{}.skip_many()", self.parser.name())
    }

    fn parse(&self, cursor: &mut C) -> Result<(), ParseError> {
        if self.at_least_one {
            self.parser.parse(cursor)?;
        }
        loop {
            let chk = cursor.checkpoint();
            let before = cursor.offset();
            if self.parser.parse(cursor).is_err() {
                cursor.restore(chk);
                return Ok(());
            }
            if cursor.offset() == before {
                return Ok(());
            }
        }
    }
}

/// Parse `parser` zero or more times, discarding the outputs. Never fails.
pub fn skip_many<C: Cursor, T, P: Parser<C, T> + Clone>(parser: P) -> SkipManyP<P, T> {
    SkipManyP {
        parser,
        at_least_one: false,
        phantom: PhantomData,
    }
}

/// Parse `parser` one or more times, discarding the outputs.
pub fn skip_many1<C: Cursor, T, P: Parser<C, T> + Clone>(parser: P) -> SkipManyP<P, T> {
    SkipManyP {
        parser,
        at_least_one: true,
        phantom: PhantomData,
    }
}

/*========================================*/
/*          Parser: List                  */
/*========================================*/

/// The type returned by [`list`].
#[derive(Clone)]
pub struct ListP<P>(Vec<P>);

impl<C: Cursor, T, P: Parser<C, T> + Clone> Parser<C, Vec<T>> for ListP<P> {
    fn name(&self) -> String {
        let names: Vec<String> = self.0.iter().map(|p| p.name()).collect();
        format!("[{}]", names.join(", "))
    }

    fn parse(&self, cursor: &mut C) -> Result<Vec<T>, ParseError> {
        self.0.iter().map(|parser| parser.parse(cursor)).collect()
    }
}

/// Parse each of `parsers` in order, collecting their outputs. Fails at the
/// first failing parser.
pub fn list<C: Cursor, T, P: Parser<C, T> + Clone>(parsers: Vec<P>) -> ListP<P> {
    ListP(parsers)
}
