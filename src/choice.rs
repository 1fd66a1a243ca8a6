use crate::{Cursor, ParseError, Parser};

/*========================================*/
/*          Parser: Or                    */
/*========================================*/

/// The type returned by [`or`] and [`Parser::or`].
#[derive(Clone)]
pub struct OrP<P1, P2> {
    first: P1,
    second: P2,
}

impl<C, T, P1, P2> Parser<C, T> for OrP<P1, P2>
where
    C: Cursor,
    P1: Parser<C, T> + Clone,
    P2: Parser<C, T> + Clone,
{
    fn name(&self) -> String {
        format!("{} or {}", self.first.name(), self.second.name())
    }

    fn parse(&self, cursor: &mut C) -> Result<T, ParseError> {
        let start = cursor.offset();
        let first_err = match self.first.parse(cursor) {
            Ok(value) => return Ok(value),
            Err(err) if cursor.offset() != start => return Err(err),
            Err(err) => err,
        };
        match self.second.parse(cursor) {
            Ok(value) => Ok(value),
            Err(err) if cursor.offset() != start => Err(err),
            Err(err) => Err(ParseError::Alternatives {
                offset: start,
                causes: vec![first_err, err],
            }),
        }
    }
}

/// Parse `first`, or `second` if `first` fails without consuming input.
///
/// If `first` fails after consuming input, its error is returned and `second`
/// is never run. Wrap `first` in [`attempt`] to try `second` regardless.
pub fn or<C, T, P1, P2>(first: P1, second: P2) -> OrP<P1, P2>
where
    C: Cursor,
    P1: Parser<C, T> + Clone,
    P2: Parser<C, T> + Clone,
{
    OrP { first, second }
}

/*========================================*/
/*          Parser: Attempt               */
/*========================================*/

/// The type returned by [`attempt`] and [`Parser::attempt`].
#[derive(Clone)]
pub struct AttemptP<P>(P);

impl<C: Cursor, T, P: Parser<C, T> + Clone> Parser<C, T> for AttemptP<P> {
    fn name(&self) -> String {
        self.0.name()
    }

    fn parse(&self, cursor: &mut C) -> Result<T, ParseError> {
        let chk = cursor.checkpoint();
        let result = self.0.parse(cursor);
        if result.is_err() {
            cursor.restore(chk);
        }
        result
    }
}

/// Parse `parser`, restoring the cursor if it fails. The error is still returned.
pub fn attempt<C: Cursor, T, P: Parser<C, T> + Clone>(parser: P) -> AttemptP<P> {
    AttemptP(parser)
}

/*========================================*/
/*          Parser: Choice                */
/*========================================*/

/// Collections of alternatives that [`choice`] accepts: tuples of two to ten
/// parsers with the same output type, or a `Vec` of them.
pub trait ChoiceTuple {}

/// The type returned by [`choice`] and [`try_choice`].
#[derive(Clone)]
pub struct Choice<S> {
    label: String,
    parsers: S,
    try_prefix: bool,
}

/// Parse the first of `parsers` that succeeds, under the same committed policy
/// as [`or`].
///
/// If every alternative fails without consuming input, the error is
/// [`ParseError::Expected`] with `label` and every alternative's error. If an
/// alternative fails after consuming input, no later one is tried, and the
/// errors collected so far are returned.
pub fn choice<S: ChoiceTuple>(label: &str, parsers: S) -> Choice<S> {
    Choice {
        label: label.to_owned(),
        parsers,
        try_prefix: false,
    }
}

/// Like [`choice`], but every alternative except the last is wrapped in
/// [`attempt`]. If all of them fail, the last alternative's error is returned
/// as is.
pub fn try_choice<S: ChoiceTuple>(label: &str, parsers: S) -> Choice<S> {
    Choice {
        label: label.to_owned(),
        parsers,
        try_prefix: true,
    }
}

impl<S> Choice<S> {
    /// Run one alternative. Returns `Some` if the whole choice is decided by it.
    fn branch<C, T, P>(
        &self,
        parser: &P,
        is_last: bool,
        start: usize,
        cursor: &mut C,
        causes: &mut Vec<ParseError>,
    ) -> Option<Result<T, ParseError>>
    where
        C: Cursor,
        P: Parser<C, T>,
    {
        let chk = cursor.checkpoint();
        match parser.parse(cursor) {
            Ok(value) => Some(Ok(value)),
            Err(err) if self.try_prefix && is_last => Some(Err(err)),
            Err(err) if self.try_prefix => {
                cursor.restore(chk);
                causes.push(err);
                None
            }
            Err(err) => {
                causes.push(err);
                if cursor.offset() != start {
                    Some(Err(self.expected(start, causes)))
                } else {
                    None
                }
            }
        }
    }

    fn expected(&self, offset: usize, causes: &mut Vec<ParseError>) -> ParseError {
        ParseError::Expected {
            label: self.label.clone(),
            offset,
            causes: std::mem::take(causes),
        }
    }
}

impl<P> ChoiceTuple for Vec<P> {}

impl<C, T, P> Parser<C, T> for Choice<Vec<P>>
where
    C: Cursor,
    P: Parser<C, T> + Clone,
{
    fn name(&self) -> String {
        self.label.clone()
    }

    fn parse(&self, cursor: &mut C) -> Result<T, ParseError> {
        let start = cursor.offset();
        let mut causes = Vec::new();
        let len = self.parsers.len();
        for (i, parser) in self.parsers.iter().enumerate() {
            if let Some(result) = self.branch(parser, i + 1 == len, start, cursor, &mut causes) {
                return result;
            }
        }
        Err(self.expected(start, &mut causes))
    }
}

macro_rules! define_choice {
    ($last:tt, $( ($idx:tt, $parser:ident) ),*) => {
        impl<$( $parser ),*> ChoiceTuple for ($( $parser, )*) {}

        impl<C, T, $( $parser ),*> Parser<C, T> for Choice<($( $parser, )*)>
        where
            C: Cursor,
            $( $parser: Parser<C, T> + Clone ),*
        {
            fn name(&self) -> String {
                self.label.clone()
            }

            fn parse(&self, cursor: &mut C) -> Result<T, ParseError> {
                let start = cursor.offset();
                let mut causes = Vec::new();
                $(
                    let is_last = $idx == $last;
                    if let Some(result) =
                        self.branch(&self.parsers.$idx, is_last, start, cursor, &mut causes)
                    {
                        return result;
                    }
                )*
                Err(self.expected(start, &mut causes))
            }
        }
    };
}

define_choice!(1, (0, P0), (1, P1));
define_choice!(2, (0, P0), (1, P1), (2, P2));
define_choice!(3, (0, P0), (1, P1), (2, P2), (3, P3));
define_choice!(4, (0, P0), (1, P1), (2, P2), (3, P3), (4, P4));
define_choice!(5, (0, P0), (1, P1), (2, P2), (3, P3), (4, P4), (5, P5));
define_choice!(6, (0, P0), (1, P1), (2, P2), (3, P3), (4, P4), (5, P5), (6, P6));
define_choice!(
    7,
    (0, P0),
    (1, P1),
    (2, P2),
    (3, P3),
    (4, P4),
    (5, P5),
    (6, P6),
    (7, P7)
);
define_choice!(
    8,
    (0, P0),
    (1, P1),
    (2, P2),
    (3, P3),
    (4, P4),
    (5, P5),
    (6, P6),
    (7, P7),
    (8, P8)
);
define_choice!(
    9,
    (0, P0),
    (1, P1),
    (2, P2),
    (3, P3),
    (4, P4),
    (5, P5),
    (6, P6),
    (7, P7),
    (8, P8),
    (9, P9)
);
