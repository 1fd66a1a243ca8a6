use parser_rd::lexer::{LexError, Lexer, Machine, StateFn, Token};
use parser_rd::{
    any_item, end, fail, finish, item, lift2, lift3, lift4, list, match_item, option, parse, ret,
    satisfy, wrap, Cursor, IterCursor, ParseError, Parser,
};

/*========================================*/
/*          Lexer to Parser               */
/*========================================*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Ident,
    Number,
    Equals,
    Semi,
}

fn lex_statement(m: &mut Machine<Tag>) -> Result<Option<StateFn<Tag>>, LexError> {
    let ch = match m.read() {
        None => return Ok(None),
        Some(ch) => ch,
    };
    match ch {
        '=' => m.emit(Tag::Equals),
        ';' => m.emit(Tag::Semi),
        c if c.is_whitespace() => m.drop_span(),
        c if c.is_ascii_digit() => {
            while m.peek().map_or(false, |c| c.is_ascii_digit()) {
                m.read();
            }
            m.emit(Tag::Number);
        }
        c if c.is_alphabetic() => {
            while m.peek().map_or(false, char::is_alphanumeric) {
                m.read();
            }
            m.emit(Tag::Ident);
        }
        other => return Err(LexError::new(format!("unexpected {:?}", other))),
    }
    Ok(Some(StateFn::new(lex_statement)))
}

fn lex(input: &str) -> Lexer<Tag> {
    Lexer::new(StateFn::new(lex_statement), input)
}

type Tokens = IterCursor<Lexer<Tag>>;

fn tag(expected: Tag) -> impl Parser<Tokens, Token<Tag>> + Clone {
    satisfy::<Tokens, _>(move |token: &Token<Tag>| token.tag == expected)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Binding {
    name: String,
    value: i64,
}

fn binding() -> impl Parser<Tokens, Binding> + Clone {
    lift3(
        |name: Token<Tag>, _equals, value: Token<Tag>| {
            value.body.parse::<i64>().map(|value| Binding {
                name: name.body,
                value,
            })
        },
        tag(Tag::Ident),
        tag(Tag::Equals),
        tag(Tag::Number),
    )
    .terminated(tag(Tag::Semi))
}

#[test]
fn test_lex_then_parse() {
    let result = parse(lex("x = 42;"), &finish(binding()));
    assert_eq!(
        result,
        Ok(Binding {
            name: "x".to_owned(),
            value: 42
        })
    );
}

#[test]
fn test_lex_then_parse_many() {
    let result = parse(lex("a = 1;\nbee = 22;  c3 = 333;"), &finish(binding().many0()));
    let names: Vec<(String, i64)> = result
        .unwrap()
        .into_iter()
        .map(|b| (b.name, b.value))
        .collect();
    assert_eq!(
        names,
        vec![
            ("a".to_owned(), 1),
            ("bee".to_owned(), 22),
            ("c3".to_owned(), 333)
        ]
    );
}

#[test]
fn test_token_positions() {
    let tokens: Vec<Token<Tag>> = lex("a = 1;\nbb = 2;").collect();
    let bb = &tokens[4];
    assert_eq!(bb.tag, Tag::Ident);
    assert_eq!(bb.body, "bb");
    assert_eq!(bb.line, 2);
    assert_eq!(bb.start, 7);
    assert_eq!(bb.span, 2);
}

#[test]
fn test_parse_error_offset_is_token_index() {
    let err = parse(lex("x = = 1;"), &binding()).unwrap_err();
    assert_eq!(err.offset(), Some(2));
    assert!(matches!(err, ParseError::Predicate { .. }));
}

#[test]
fn test_lex_error_reaches_caller() {
    let mut cursor = IterCursor::new(lex("x = 4$;"));
    let result = binding().parse(&mut cursor);
    assert_eq!(result, Err(ParseError::EndOfInput { offset: 3 }));

    let lexer = cursor.into_source();
    let lex_err = lexer.err().cloned();
    assert_eq!(lex_err, Some(LexError::new("unexpected '$'")));

    let err = ParseError::from(LexError::new("unexpected '$'"));
    assert_eq!(err.to_string(), "lex error: unexpected '$'");
    assert_eq!(err.offset(), None);
}

/*========================================*/
/*          Generic Element Parsers       */
/*========================================*/

type Ints = IterCursor<std::vec::IntoIter<i32>>;

#[test]
fn test_item_sequence() {
    let parser = item::<Ints>(1).and(item::<Ints>(2));
    assert_eq!(parse(vec![1, 2, 3], &parser), Ok((1, 2)));
    assert_eq!(
        parse(vec![1, 2, 3], &finish(parser)),
        Err(ParseError::Unparsed {
            offset: 2,
            remaining: "3".to_owned()
        })
    );
}

#[test]
fn test_end() {
    assert_eq!(parse(Vec::<i32>::new(), &end()), Ok(()));
    assert!(parse(vec![1], &end()).is_err());
}

#[test]
fn test_match_item_consumes_nothing_on_failure() {
    let positive = match_item::<Ints, _, _>(|n: &i32| {
        if *n > 0 {
            Ok(())
        } else {
            Err(format!("{} is not positive", n))
        }
    });

    let mut cursor = IterCursor::new(vec![-1]);
    let err = positive.parse(&mut cursor).unwrap_err();
    assert_eq!(
        err,
        ParseError::Predicate {
            offset: 0,
            found: "-1".to_owned(),
            message: "-1 is not positive".to_owned()
        }
    );
    assert_eq!(cursor.offset(), 0);
}

#[test]
fn test_bind_length_prefix() {
    let counted = any_item::<Ints>().bind(|n: i32| any_item::<Ints>().count(n as usize));
    assert_eq!(parse(vec![2, 7, 8, 9], &counted), Ok(vec![7, 8]));
    assert_eq!(
        parse(vec![3, 7, 8], &counted),
        Err(ParseError::EndOfInput { offset: 3 })
    );
}

#[test]
fn test_ret_and_fail() {
    assert_eq!(parse(vec![1], &ret(5)), Ok(5));
    assert_eq!(
        parse(vec![1], &fail::<i32>("nope")),
        Err(ParseError::Failure {
            offset: 0,
            message: "nope".to_owned()
        })
    );
}

#[test]
fn test_lift_reports_transform_at_start() {
    let add = lift2(
        |a: i32, b: i32| a.checked_add(b).ok_or("overflow"),
        any_item::<Ints>(),
        any_item::<Ints>(),
    );
    assert_eq!(parse(vec![2, 3], &add), Ok(5));
    assert_eq!(
        parse(vec![i32::MAX, 1], &add),
        Err(ParseError::Transform {
            offset: 0,
            message: "overflow".to_owned()
        })
    );

    let sum4 = lift4(
        |a: i32, b: i32, c: i32, d: i32| Ok::<i32, String>(a + b + c + d),
        any_item::<Ints>(),
        any_item::<Ints>(),
        any_item::<Ints>(),
        any_item::<Ints>(),
    );
    assert_eq!(parse(vec![1, 2, 3, 4], &sum4), Ok(10));
}

#[test]
fn test_list() {
    let parser = list(vec![item::<Ints>(1), item::<Ints>(2), item::<Ints>(3)]);
    assert_eq!(parse(vec![1, 2, 3], &parser), Ok(vec![1, 2, 3]));
    assert!(parse(vec![1, 3], &parser).is_err());
}

#[test]
fn test_option_restores() {
    let parser = option(0, item::<Ints>(5)).and(any_item::<Ints>());
    assert_eq!(parse(vec![1], &parser), Ok((0, 1)));
    assert_eq!(parse(vec![5, 1], &parser), Ok((5, 1)));
}

#[test]
fn test_wrap() {
    let parser = wrap(item::<Ints>(0), any_item::<Ints>(), item::<Ints>(0));
    assert_eq!(parse(vec![0, 7, 0], &parser), Ok(7));
}

/*========================================*/
/*          Error Reports                 */
/*========================================*/

#[test]
fn test_error_report() {
    colored::control::set_override(false);

    let source = "let x = 1\nlet y = ?";
    let err = ParseError::Predicate {
        offset: 18,
        found: "'?'".to_owned(),
        message: "expected a digit".to_owned(),
    };
    let report = err.report("input.txt", source);
    assert_eq!(report.position().line, 1);
    assert_eq!(report.position().utf8_col, 8);

    let expected = [
        "parse error: expected a digit, found '?'",
        " --> input.txt:2:9",
        "  |",
        "2 |let y = ?",
        "  |        ^ here",
        "  |",
    ]
    .join("\n");
    assert_eq!(report.to_string(), expected);
}
