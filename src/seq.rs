use crate::{Cursor, ParseError, Parser};

/*========================================*/
/*          Parser: Seq                   */
/*========================================*/

/// Tuples of parsers that [`tuple`] accepts: every tuple of two to ten elements.
pub trait SeqTuple {}

/// The type returned by [`tuple`] and [`Parser::and`].
#[derive(Clone)]
pub struct Seq<S>(S);

/// Parse each parser in the tuple `parsers` in order, producing a tuple of
/// their outputs. Fails at the first failing element, leaving the consumption
/// of the elements before it.
pub fn tuple<S: SeqTuple>(parsers: S) -> Seq<S> {
    Seq(parsers)
}

macro_rules! define_seq {
    ($( ($idx:tt, $type:ident, $parser:ident) ),*) => {
        impl<$( $parser ),*> SeqTuple for ($( $parser, )*) {}

        impl<C, $( $type, )* $( $parser ),*> Parser<C, ($( $type, )*)>
        for Seq<($( $parser, )*)>
        where
            C: Cursor,
            $( $parser: Parser<C, $type> + Clone ),*
        {
            fn name(&self) -> String {
                let names: Vec<String> = vec![$( self.0.$idx.name() ),*];
                format!("({})", names.join(", "))
            }

            fn parse(&self, cursor: &mut C) -> Result<($( $type, )*), ParseError> {
                Ok(( $( self.0.$idx.parse(cursor)?, )* ))
            }
        }
    };
}

define_seq!((0, T0, P0), (1, T1, P1));
define_seq!((0, T0, P0), (1, T1, P1), (2, T2, P2));
define_seq!((0, T0, P0), (1, T1, P1), (2, T2, P2), (3, T3, P3));
define_seq!((0, T0, P0), (1, T1, P1), (2, T2, P2), (3, T3, P3), (4, T4, P4));
define_seq!(
    (0, T0, P0),
    (1, T1, P1),
    (2, T2, P2),
    (3, T3, P3),
    (4, T4, P4),
    (5, T5, P5)
);
define_seq!(
    (0, T0, P0),
    (1, T1, P1),
    (2, T2, P2),
    (3, T3, P3),
    (4, T4, P4),
    (5, T5, P5),
    (6, T6, P6)
);
define_seq!(
    (0, T0, P0),
    (1, T1, P1),
    (2, T2, P2),
    (3, T3, P3),
    (4, T4, P4),
    (5, T5, P5),
    (6, T6, P6),
    (7, T7, P7)
);
define_seq!(
    (0, T0, P0),
    (1, T1, P1),
    (2, T2, P2),
    (3, T3, P3),
    (4, T4, P4),
    (5, T5, P5),
    (6, T6, P6),
    (7, T7, P7),
    (8, T8, P8)
);
define_seq!(
    (0, T0, P0),
    (1, T1, P1),
    (2, T2, P2),
    (3, T3, P3),
    (4, T4, P4),
    (5, T5, P5),
    (6, T6, P6),
    (7, T7, P7),
    (8, T8, P8),
    (9, T9, P9)
);
