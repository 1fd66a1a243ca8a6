use crate::seq::tuple;
use crate::{Cursor, ParseError, Parser};
use std::fmt;
use std::marker::PhantomData;

/*========================================*/
/*          Parser: Match                 */
/*========================================*/

/// The type returned by [`match_item`], [`satisfy`] and [`item`].
///
/// Tied to its cursor type `C`, so that `item::<C>(..)` fixes the cursor.
pub struct MatchP<C, F, E> {
    label: String,
    rule: F,
    phantom: PhantomData<(fn(&mut C), fn() -> E)>,
}

impl<C, F, E> MatchP<C, F, E> {
    pub(crate) fn with_label(mut self, label: String) -> Self {
        self.label = label;
        self
    }
}

impl<C, F: Clone, E> Clone for MatchP<C, F, E> {
    fn clone(&self) -> Self {
        MatchP {
            label: self.label.clone(),
            rule: self.rule.clone(),
            phantom: PhantomData,
        }
    }
}

impl<C, F, E> Parser<C, C::Item> for MatchP<C, F, E>
where
    C: Cursor,
    F: Fn(&C::Item) -> Result<(), E> + Clone,
    E: fmt::Display,
{
    fn name(&self) -> String {
        self.label.clone()
    }

    fn parse(&self, cursor: &mut C) -> Result<C::Item, ParseError> {
        let offset = cursor.offset();
        let elem = cursor.read()?;
        match (self.rule)(&elem) {
            Ok(()) => Ok(elem),
            Err(err) => {
                cursor.unread()?;
                Err(ParseError::Predicate {
                    offset,
                    found: format!("{:?}", elem),
                    message: err.to_string(),
                })
            }
        }
    }
}

/// Read one element and accept it if `rule` returns `Ok`. If `rule` rejects it, the
/// element is unread, so a failed match consumes nothing.
pub fn match_item<C, F, E>(rule: F) -> MatchP<C, F, E>
where
    C: Cursor,
    F: Fn(&C::Item) -> Result<(), E> + Clone,
    E: fmt::Display,
{
    MatchP {
        label: "item".to_owned(),
        rule,
        phantom: PhantomData,
    }
}

/// Read one element and accept it if `pred` holds for it.
pub fn satisfy<C, F>(
    pred: F,
) -> MatchP<C, impl Fn(&C::Item) -> Result<(), &'static str> + Clone, &'static str>
where
    C: Cursor,
    F: Fn(&C::Item) -> bool + Clone,
{
    match_item::<C, _, _>(move |elem: &C::Item| {
        if pred(elem) {
            Ok(())
        } else {
            Err("element does not match predicate")
        }
    })
    .with_label("satisfy".to_owned())
}

/// Read one element and accept it if it equals `expected`.
pub fn item<C>(
    expected: C::Item,
) -> MatchP<C, impl Fn(&C::Item) -> Result<(), String> + Clone, String>
where
    C: Cursor,
    C::Item: PartialEq,
{
    let label = format!("{:?}", expected);
    match_item::<C, _, _>(move |elem: &C::Item| {
        if *elem == expected {
            Ok(())
        } else {
            Err(format!("expected {:?}", expected))
        }
    })
    .with_label(label)
}

/*========================================*/
/*          Parser: Any                   */
/*========================================*/

struct AnyP<C>(PhantomData<fn(&mut C)>);

impl<C> Clone for AnyP<C> {
    fn clone(&self) -> Self {
        AnyP(PhantomData)
    }
}

impl<C: Cursor> Parser<C, C::Item> for AnyP<C> {
    fn name(&self) -> String {
        "any item".to_owned()
    }

    fn parse(&self, cursor: &mut C) -> Result<C::Item, ParseError> {
        cursor.read()
    }
}

/// Read any one element. Fails only at the end of the input.
pub fn any_item<C: Cursor>() -> impl Parser<C, C::Item> + Clone {
    AnyP(PhantomData)
}

/*========================================*/
/*          Parser: Return & Fail         */
/*========================================*/

/// The type returned by [`ret`].
#[derive(Clone)]
pub struct ReturnP<V>(V);

impl<C: Cursor, V: Clone> Parser<C, V> for ReturnP<V> {
    fn name(&self) -> String {
        "ret".to_owned()
    }

    fn parse(&self, _cursor: &mut C) -> Result<V, ParseError> {
        Ok(self.0.clone())
    }
}

/// Always succeed with `value`, consuming nothing.
pub fn ret<V: Clone>(value: V) -> ReturnP<V> {
    ReturnP(value)
}

/// The type returned by [`fail`].
pub struct FailP<T> {
    message: String,
    phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for FailP<T> {
    fn clone(&self) -> Self {
        FailP {
            message: self.message.clone(),
            phantom: PhantomData,
        }
    }
}

impl<C: Cursor, T> Parser<C, T> for FailP<T> {
    fn name(&self) -> String {
        "fail".to_owned()
    }

    fn parse(&self, cursor: &mut C) -> Result<T, ParseError> {
        Err(ParseError::Failure {
            offset: cursor.offset(),
            message: self.message.clone(),
        })
    }
}

/// Always fail with `message`, consuming nothing.
pub fn fail<T>(message: &str) -> FailP<T> {
    FailP {
        message: message.to_owned(),
        phantom: PhantomData,
    }
}

/*========================================*/
/*          Parser: End & Finish          */
/*========================================*/

fn expect_end<C: Cursor>(cursor: &mut C) -> Result<(), ParseError> {
    if cursor.is_exhausted() {
        return Ok(());
    }
    let offset = cursor.offset();
    let chk = cursor.checkpoint();
    let remaining = match cursor.read() {
        Ok(elem) => format!("{:?}", elem),
        Err(_) => String::new(),
    };
    cursor.restore(chk);
    Err(ParseError::Unparsed { offset, remaining })
}

/// The type returned by [`end`].
#[derive(Clone)]
pub struct EndP;

impl<C: Cursor> Parser<C, ()> for EndP {
    fn name(&self) -> String {
        "end of input".to_owned()
    }

    fn parse(&self, cursor: &mut C) -> Result<(), ParseError> {
        expect_end(cursor)
    }
}

/// Succeed only if every element of the input has been read.
pub fn end() -> EndP {
    EndP
}

/// The type returned by [`finish`].
#[derive(Clone)]
pub struct FinishP<P>(P);

impl<C: Cursor, T, P: Parser<C, T> + Clone> Parser<C, T> for FinishP<P> {
    fn name(&self) -> String {
        self.0.name()
    }

    fn parse(&self, cursor: &mut C) -> Result<T, ParseError> {
        let value = self.0.parse(cursor)?;
        expect_end(cursor)?;
        Ok(value)
    }
}

/// Parse `parser`, then require that the whole input has been consumed.
pub fn finish<C: Cursor, T, P: Parser<C, T> + Clone>(parser: P) -> FinishP<P> {
    FinishP(parser)
}

/*========================================*/
/*          Parser: Bind                  */
/*========================================*/

/// The type returned by [`bind`].
pub struct BindP<P, F, A> {
    parser: P,
    func: F,
    phantom: PhantomData<fn() -> A>,
}

impl<P: Clone, F: Clone, A> Clone for BindP<P, F, A> {
    fn clone(&self) -> Self {
        BindP {
            parser: self.parser.clone(),
            func: self.func.clone(),
            phantom: PhantomData,
        }
    }
}

impl<C, A, B, P, Q, F> Parser<C, B> for BindP<P, F, A>
where
    C: Cursor,
    P: Parser<C, A> + Clone,
    Q: Parser<C, B>,
    F: Fn(A) -> Q + Clone,
{
    fn name(&self) -> String {
        format!("{}.bind(..)", self.parser.name())
    }

    fn parse(&self, cursor: &mut C) -> Result<B, ParseError> {
        let value = self.parser.parse(cursor)?;
        (self.func)(value).parse(cursor)
    }
}

/// Run `parser`, pass its output to `func`, and run the parser `func` returns
/// from where `parser` left off.
pub fn bind<C, A, B, P, Q, F>(parser: P, func: F) -> BindP<P, F, A>
where
    C: Cursor,
    P: Parser<C, A> + Clone,
    Q: Parser<C, B>,
    F: Fn(A) -> Q + Clone,
{
    BindP {
        parser,
        func,
        phantom: PhantomData,
    }
}

/*========================================*/
/*          Parser: Map                   */
/*========================================*/

/// The type returned by [`Parser::map`].
pub struct MapP<P, F, A> {
    parser: P,
    func: F,
    phantom: PhantomData<fn() -> A>,
}

impl<P, F, A> MapP<P, F, A> {
    pub(crate) fn new(parser: P, func: F) -> Self {
        MapP {
            parser,
            func,
            phantom: PhantomData,
        }
    }
}

impl<P: Clone, F: Clone, A> Clone for MapP<P, F, A> {
    fn clone(&self) -> Self {
        MapP::new(self.parser.clone(), self.func.clone())
    }
}

impl<C, A, B, P, F> Parser<C, B> for MapP<P, F, A>
where
    C: Cursor,
    P: Parser<C, A> + Clone,
    F: Fn(A) -> B + Clone,
{
    fn name(&self) -> String {
        self.parser.name()
    }

    fn parse(&self, cursor: &mut C) -> Result<B, ParseError> {
        self.parser.parse(cursor).map(&self.func)
    }
}

/// The type returned by [`Parser::try_map`] and [`lift`].
pub struct TryMapP<P, F, A> {
    parser: P,
    func: F,
    phantom: PhantomData<fn() -> A>,
}

impl<P, F, A> TryMapP<P, F, A> {
    pub(crate) fn new(parser: P, func: F) -> Self {
        TryMapP {
            parser,
            func,
            phantom: PhantomData,
        }
    }
}

impl<P: Clone, F: Clone, A> Clone for TryMapP<P, F, A> {
    fn clone(&self) -> Self {
        TryMapP::new(self.parser.clone(), self.func.clone())
    }
}

impl<C, A, B, E, P, F> Parser<C, B> for TryMapP<P, F, A>
where
    C: Cursor,
    P: Parser<C, A> + Clone,
    F: Fn(A) -> Result<B, E> + Clone,
    E: fmt::Display,
{
    fn name(&self) -> String {
        self.parser.name()
    }

    fn parse(&self, cursor: &mut C) -> Result<B, ParseError> {
        let offset = cursor.offset();
        let value = self.parser.parse(cursor)?;
        (self.func)(value).map_err(|err| ParseError::Transform {
            offset,
            message: err.to_string(),
        })
    }
}

/// The type returned by [`Parser::constant`].
pub struct ConstantP<P, V, A> {
    parser: P,
    value: V,
    phantom: PhantomData<fn() -> A>,
}

impl<P, V, A> ConstantP<P, V, A> {
    pub(crate) fn new(parser: P, value: V) -> Self {
        ConstantP {
            parser,
            value,
            phantom: PhantomData,
        }
    }
}

impl<P: Clone, V: Clone, A> Clone for ConstantP<P, V, A> {
    fn clone(&self) -> Self {
        ConstantP::new(self.parser.clone(), self.value.clone())
    }
}

impl<C, A, V, P> Parser<C, V> for ConstantP<P, V, A>
where
    C: Cursor,
    P: Parser<C, A> + Clone,
    V: Clone,
{
    fn name(&self) -> String {
        self.parser.name()
    }

    fn parse(&self, cursor: &mut C) -> Result<V, ParseError> {
        self.parser.parse(cursor)?;
        Ok(self.value.clone())
    }
}

/*========================================*/
/*          Parser: Lift                  */
/*========================================*/

/// Run `p`, then transform its output with the fallible `func`.
pub fn lift<C, A, B, E, P, F>(func: F, p: P) -> TryMapP<P, F, A>
where
    C: Cursor,
    P: Parser<C, A> + Clone,
    F: Fn(A) -> Result<B, E> + Clone,
    E: fmt::Display,
{
    TryMapP::new(p, func)
}

/// Run `p1` and `p2` in order, then combine their outputs with the fallible `func`.
pub fn lift2<C, A1, A2, B, E, P1, P2, F>(func: F, p1: P1, p2: P2) -> impl Parser<C, B> + Clone
where
    C: Cursor,
    P1: Parser<C, A1> + Clone,
    P2: Parser<C, A2> + Clone,
    F: Fn(A1, A2) -> Result<B, E> + Clone,
    E: fmt::Display,
{
    TryMapP::new(tuple((p1, p2)), move |(a1, a2)| func(a1, a2))
}

/// Run three parsers in order, then combine their outputs with the fallible `func`.
pub fn lift3<C, A1, A2, A3, B, E, P1, P2, P3, F>(
    func: F,
    p1: P1,
    p2: P2,
    p3: P3,
) -> impl Parser<C, B> + Clone
where
    C: Cursor,
    P1: Parser<C, A1> + Clone,
    P2: Parser<C, A2> + Clone,
    P3: Parser<C, A3> + Clone,
    F: Fn(A1, A2, A3) -> Result<B, E> + Clone,
    E: fmt::Display,
{
    TryMapP::new(tuple((p1, p2, p3)), move |(a1, a2, a3)| func(a1, a2, a3))
}

/// Run four parsers in order, then combine their outputs with the fallible `func`.
pub fn lift4<C, A1, A2, A3, A4, B, E, P1, P2, P3, P4, F>(
    func: F,
    p1: P1,
    p2: P2,
    p3: P3,
    p4: P4,
) -> impl Parser<C, B> + Clone
where
    C: Cursor,
    P1: Parser<C, A1> + Clone,
    P2: Parser<C, A2> + Clone,
    P3: Parser<C, A3> + Clone,
    P4: Parser<C, A4> + Clone,
    F: Fn(A1, A2, A3, A4) -> Result<B, E> + Clone,
    E: fmt::Display,
{
    TryMapP::new(tuple((p1, p2, p3, p4)), move |(a1, a2, a3, a4)| {
        func(a1, a2, a3, a4)
    })
}

/*========================================*/
/*          Parser: Discard               */
/*========================================*/

/// The type returned by [`discard_left`] and [`Parser::preceded`].
pub struct DiscardLeftP<P, Q, A> {
    left: P,
    right: Q,
    phantom: PhantomData<fn() -> A>,
}

impl<P: Clone, Q: Clone, A> Clone for DiscardLeftP<P, Q, A> {
    fn clone(&self) -> Self {
        DiscardLeftP {
            left: self.left.clone(),
            right: self.right.clone(),
            phantom: PhantomData,
        }
    }
}

impl<C, A, B, P, Q> Parser<C, B> for DiscardLeftP<P, Q, A>
where
    C: Cursor,
    P: Parser<C, A> + Clone,
    Q: Parser<C, B> + Clone,
{
    fn name(&self) -> String {
        format!("{}.preceded({})", self.right.name(), self.left.name())
    }

    fn parse(&self, cursor: &mut C) -> Result<B, ParseError> {
        self.left.parse(cursor)?;
        self.right.parse(cursor)
    }
}

/// Parse `left` then `right`, keeping only the output of `right`.
pub fn discard_left<C, A, B, P, Q>(left: P, right: Q) -> DiscardLeftP<P, Q, A>
where
    C: Cursor,
    P: Parser<C, A> + Clone,
    Q: Parser<C, B> + Clone,
{
    DiscardLeftP {
        left,
        right,
        phantom: PhantomData,
    }
}

/// The type returned by [`discard_right`] and [`Parser::terminated`].
pub struct DiscardRightP<P, Q, B> {
    left: P,
    right: Q,
    phantom: PhantomData<fn() -> B>,
}

impl<P: Clone, Q: Clone, B> Clone for DiscardRightP<P, Q, B> {
    fn clone(&self) -> Self {
        DiscardRightP {
            left: self.left.clone(),
            right: self.right.clone(),
            phantom: PhantomData,
        }
    }
}

impl<C, A, B, P, Q> Parser<C, A> for DiscardRightP<P, Q, B>
where
    C: Cursor,
    P: Parser<C, A> + Clone,
    Q: Parser<C, B> + Clone,
{
    fn name(&self) -> String {
        format!("{}.terminated({})", self.left.name(), self.right.name())
    }

    fn parse(&self, cursor: &mut C) -> Result<A, ParseError> {
        let value = self.left.parse(cursor)?;
        self.right.parse(cursor)?;
        Ok(value)
    }
}

/// Parse `left` then `right`, keeping only the output of `left`.
pub fn discard_right<C, A, B, P, Q>(left: P, right: Q) -> DiscardRightP<P, Q, B>
where
    C: Cursor,
    P: Parser<C, A> + Clone,
    Q: Parser<C, B> + Clone,
{
    DiscardRightP {
        left,
        right,
        phantom: PhantomData,
    }
}

/// Parse `left`, `parser`, then `right`, keeping only the output of `parser`.
/// Commonly used for content between delimiters.
pub fn wrap<C, A, B, D, L, P, R>(
    left: L,
    parser: P,
    right: R,
) -> DiscardRightP<DiscardLeftP<L, P, A>, R, D>
where
    C: Cursor,
    L: Parser<C, A> + Clone,
    P: Parser<C, B> + Clone,
    R: Parser<C, D> + Clone,
{
    discard_right(discard_left(left, parser), right)
}

/*========================================*/
/*          Parser: Look Ahead            */
/*========================================*/

/// The type returned by [`look_ahead`].
#[derive(Clone)]
pub struct LookAheadP<P>(P);

impl<C: Cursor, T, P: Parser<C, T> + Clone> Parser<C, T> for LookAheadP<P> {
    fn name(&self) -> String {
        format!("{}.look_ahead()", self.0.name())
    }

    fn parse(&self, cursor: &mut C) -> Result<T, ParseError> {
        let chk = cursor.checkpoint();
        let result = self.0.parse(cursor);
        cursor.restore(chk);
        result
    }
}

/// Run `parser`, then put the cursor back where it started, whether or not
/// `parser` succeeded.
pub fn look_ahead<C: Cursor, T, P: Parser<C, T> + Clone>(parser: P) -> LookAheadP<P> {
    LookAheadP(parser)
}

/*========================================*/
/*          Parser: Optional              */
/*========================================*/

/// The type returned by [`maybe`] and [`Parser::opt`].
#[derive(Clone)]
pub struct MaybeP<P>(P);

impl<C: Cursor, T, P: Parser<C, T> + Clone> Parser<C, Option<T>> for MaybeP<P> {
    fn name(&self) -> String {
        format!("{}.opt()", self.0.name())
    }

    fn parse(&self, cursor: &mut C) -> Result<Option<T>, ParseError> {
        let chk = cursor.checkpoint();
        match self.0.parse(cursor) {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                cursor.restore(chk);
                Ok(None)
            }
        }
    }
}

/// Either parse `parser`, or restore the cursor and output `None`. Never fails.
pub fn maybe<C: Cursor, T, P: Parser<C, T> + Clone>(parser: P) -> MaybeP<P> {
    MaybeP(parser)
}

/// The type returned by [`option`].
#[derive(Clone)]
pub struct OptionP<P, T> {
    parser: P,
    fallback: T,
}

impl<C: Cursor, T: Clone, P: Parser<C, T> + Clone> Parser<C, T> for OptionP<P, T> {
    fn name(&self) -> String {
        format!("{}.opt()", self.parser.name())
    }

    fn parse(&self, cursor: &mut C) -> Result<T, ParseError> {
        let chk = cursor.checkpoint();
        match self.parser.parse(cursor) {
            Ok(value) => Ok(value),
            Err(_) => {
                cursor.restore(chk);
                Ok(self.fallback.clone())
            }
        }
    }
}

/// Either parse `parser`, or restore the cursor and output `fallback`. Never fails.
pub fn option<C: Cursor, T: Clone, P: Parser<C, T> + Clone>(fallback: T, parser: P) -> OptionP<P, T> {
    OptionP { parser, fallback }
}

/*========================================*/
/*          Parser: Named                 */
/*========================================*/

/// The type returned by [`name`] and [`Parser::named`].
#[derive(Clone)]
pub struct NamedP<P> {
    label: String,
    parser: P,
}

impl<C: Cursor, T, P: Parser<C, T> + Clone> Parser<C, T> for NamedP<P> {
    fn name(&self) -> String {
        self.label.clone()
    }

    fn parse(&self, cursor: &mut C) -> Result<T, ParseError> {
        self.parser.parse(cursor).map_err(|err| ParseError::Named {
            label: self.label.clone(),
            inner: Box::new(err),
        })
    }
}

/// Refer to `parser` as `label`. Failures are reported as `"{label} failed: ..."`.
pub fn name<C: Cursor, T, P: Parser<C, T> + Clone>(label: &str, parser: P) -> NamedP<P> {
    NamedP {
        label: label.to_owned(),
        parser,
    }
}

/*========================================*/
/*          Parser: Assert                */
/*========================================*/

/// The type returned by [`assert`].
#[derive(Clone)]
pub struct AssertP<P, F, M> {
    parser: P,
    pred: F,
    message: M,
}

impl<C, T, P, F, M> Parser<C, T> for AssertP<P, F, M>
where
    C: Cursor,
    P: Parser<C, T> + Clone,
    F: Fn(&T) -> bool + Clone,
    M: Fn(&T) -> String + Clone,
{
    fn name(&self) -> String {
        self.parser.name()
    }

    fn parse(&self, cursor: &mut C) -> Result<T, ParseError> {
        let offset = cursor.offset();
        let value = self.parser.parse(cursor)?;
        if (self.pred)(&value) {
            Ok(value)
        } else {
            Err(ParseError::Failure {
                offset,
                message: (self.message)(&value),
            })
        }
    }
}

/// Run `parser` and check its output with `pred`. If `pred` does not hold, fail
/// with the message `message` builds from the output.
pub fn assert<C, T, P, F, M>(parser: P, pred: F, message: M) -> AssertP<P, F, M>
where
    C: Cursor,
    P: Parser<C, T> + Clone,
    F: Fn(&T) -> bool + Clone,
    M: Fn(&T) -> String + Clone,
{
    AssertP {
        parser,
        pred,
        message,
    }
}
