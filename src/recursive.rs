use crate::{Cursor, ParseError, Parser};
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock, Weak};

/*========================================*/
/*          Parser: Fix                   */
/*========================================*/

type SyncParser<C, T> = Box<dyn Parser<C, T> + Send + Sync>;
type Builder<C, T> = Box<dyn Fn(FixRef<C, T>) -> SyncParser<C, T> + Send + Sync>;

struct FixCell<C: Cursor, T> {
    builder: Builder<C, T>,
    parser: OnceLock<SyncParser<C, T>>,
}

impl<C: Cursor, T> FixCell<C, T> {
    /// The materialized definition, building it on first use.
    fn get(cell: &Arc<Self>) -> &SyncParser<C, T> {
        cell.parser.get_or_init(|| {
            log::trace!("materializing fixpoint parser");
            (cell.builder)(FixRef(Arc::downgrade(cell)))
        })
    }
}

/// A self-referential parser, built with [`fix`].
pub struct Fix<C: Cursor, T>(Arc<FixCell<C, T>>);

impl<C: Cursor, T> Clone for Fix<C, T> {
    fn clone(&self) -> Self {
        Fix(self.0.clone())
    }
}

impl<C: Cursor, T> Parser<C, T> for Fix<C, T> {
    fn name(&self) -> String {
        FixCell::get(&self.0).name()
    }

    fn parse(&self, cursor: &mut C) -> Result<T, ParseError> {
        FixCell::get(&self.0).parse(cursor)
    }
}

/// The reference to itself that a [`fix`] definition receives.
///
/// This is a _weak_ pointer, so that the definition does not keep itself alive.
pub struct FixRef<C: Cursor, T>(Weak<FixCell<C, T>>);

impl<C: Cursor, T> Clone for FixRef<C, T> {
    fn clone(&self) -> Self {
        FixRef(self.0.clone())
    }
}

impl<C: Cursor, T> FixRef<C, T> {
    fn upgrade(&self) -> Arc<FixCell<C, T>> {
        match self.0.upgrade() {
            None => panic!("fix: self-reference used after its parser was dropped"),
            Some(cell) => cell,
        }
    }
}

impl<C: Cursor, T> Parser<C, T> for FixRef<C, T> {
    fn name(&self) -> String {
        // Not the definition's name, which would contain this one.
        "fix".to_owned()
    }

    fn parse(&self, cursor: &mut C) -> Result<T, ParseError> {
        FixCell::get(&self.upgrade()).parse(cursor)
    }
}

/// Define a parser in terms of itself.
///
/// `f` receives a reference to the parser being defined and returns its
/// definition. The reference may be used anywhere inside the definition, for
/// example in a parenthesized sub-expression. `f` is called exactly once, the
/// first time the parser is used; this is safe to race from several threads.
///
/// # Panics
///
/// Parsing with the [`FixRef`] after every clone of the returned [`Fix`] has been
/// dropped panics.
///
/// ```
/// use parser_rd::text::char;
/// use parser_rd::{fix, parse_str, Parser};
///
/// // nested ::= "()" | "(" nested ")"
/// let nested = fix(|nested| {
///     nested
///         .opt()
///         .preceded(char('('))
///         .terminated(char(')'))
///         .map(|_| ())
/// });
/// assert_eq!(parse_str("((()))", &nested), Ok(()));
/// ```
pub fn fix<C, T, P, F>(f: F) -> Fix<C, T>
where
    C: Cursor,
    P: Parser<C, T> + Clone + Send + Sync + 'static,
    F: Fn(FixRef<C, T>) -> P + Send + Sync + 'static,
{
    let builder: Builder<C, T> = Box::new(move |receiver: FixRef<C, T>| -> SyncParser<C, T> {
        Box::new(f(receiver))
    });
    Fix(Arc::new(FixCell {
        builder,
        parser: OnceLock::new(),
    }))
}

/*========================================*/
/*          Parser: Chains                */
/*========================================*/

/// The type returned by [`chain_l1`] and [`Parser::chain_l1`].
pub struct ChainL1P<P, O, F> {
    parser: P,
    op: O,
    phantom: PhantomData<fn() -> F>,
}

impl<P: Clone, O: Clone, F> Clone for ChainL1P<P, O, F> {
    fn clone(&self) -> Self {
        ChainL1P {
            parser: self.parser.clone(),
            op: self.op.clone(),
            phantom: PhantomData,
        }
    }
}

impl<C, T, P, O, F> Parser<C, T> for ChainL1P<P, O, F>
where
    C: Cursor,
    P: Parser<C, T> + Clone,
    O: Parser<C, F> + Clone,
    F: Fn(T, T) -> T,
{
    fn name(&self) -> String {
        format!("{}.chain_l1({})", self.parser.name(), self.op.name())
    }

    fn parse(&self, cursor: &mut C) -> Result<T, ParseError> {
        let mut acc = self.parser.parse(cursor)?;
        loop {
            let chk = cursor.checkpoint();
            let before = cursor.offset();
            match operator_step(&self.op, &self.parser, cursor) {
                Ok((func, rhs)) => {
                    acc = func(acc, rhs);
                    if cursor.offset() == before {
                        return Ok(acc);
                    }
                }
                Err(_) => {
                    cursor.restore(chk);
                    return Ok(acc);
                }
            }
        }
    }
}

/// Parse one or more `parser`s separated by `op`, folding them from the left
/// with the functions `op` produces: `a + b + c` is `(a + b) + c`.
///
/// After the first operand, each `op` and operand pair is tried under a
/// checkpoint. The first pair that fails is undone and ends the chain.
pub fn chain_l1<C, T, P, O, F>(parser: P, op: O) -> ChainL1P<P, O, F>
where
    C: Cursor,
    P: Parser<C, T> + Clone,
    O: Parser<C, F> + Clone,
    F: Fn(T, T) -> T,
{
    ChainL1P {
        parser,
        op,
        phantom: PhantomData,
    }
}

/// The type returned by [`chain_r1`] and [`Parser::chain_r1`].
pub struct ChainR1P<P, O, F> {
    parser: P,
    op: O,
    phantom: PhantomData<fn() -> F>,
}

impl<P: Clone, O: Clone, F> Clone for ChainR1P<P, O, F> {
    fn clone(&self) -> Self {
        ChainR1P {
            parser: self.parser.clone(),
            op: self.op.clone(),
            phantom: PhantomData,
        }
    }
}

impl<C, T, P, O, F> Parser<C, T> for ChainR1P<P, O, F>
where
    C: Cursor,
    P: Parser<C, T> + Clone,
    O: Parser<C, F> + Clone,
    F: Fn(T, T) -> T,
{
    fn name(&self) -> String {
        format!("{}.chain_r1({})", self.parser.name(), self.op.name())
    }

    fn parse(&self, cursor: &mut C) -> Result<T, ParseError> {
        let first = self.parser.parse(cursor)?;
        let mut rest = Vec::new();
        loop {
            let chk = cursor.checkpoint();
            let before = cursor.offset();
            match operator_step(&self.op, &self.parser, cursor) {
                Ok(step) => {
                    rest.push(step);
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

        // Fold from the right: a f1 b f2 c is f1(a, f2(b, c)).
        let (mut func, mut acc) = match rest.pop() {
            None => return Ok(first),
            Some(last) => last,
        };
        while let Some((prev_func, lhs)) = rest.pop() {
            acc = func(lhs, acc);
            func = prev_func;
        }
        Ok(func(first, acc))
    }
}

/// Parse one or more `parser`s separated by `op`, folding them from the right
/// with the functions `op` produces: `a ^ b ^ c` is `a ^ (b ^ c)`.
///
/// A failed `op` and operand pair is undone and ends the chain.
pub fn chain_r1<C, T, P, O, F>(parser: P, op: O) -> ChainR1P<P, O, F>
where
    C: Cursor,
    P: Parser<C, T> + Clone,
    O: Parser<C, F> + Clone,
    F: Fn(T, T) -> T,
{
    ChainR1P {
        parser,
        op,
        phantom: PhantomData,
    }
}

fn operator_step<C, T, P, O, F>(op: &O, parser: &P, cursor: &mut C) -> Result<(F, T), ParseError>
where
    C: Cursor,
    P: Parser<C, T>,
    O: Parser<C, F>,
{
    let func = op.parse(cursor)?;
    let rhs = parser.parse(cursor)?;
    Ok((func, rhs))
}
