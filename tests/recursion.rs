use parser_rd::text::{char, take_while1};
use parser_rd::{choice, fix, parse_str, FixRef, ParseError, Parser, TextCursor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

type Op = fn(i64, i64) -> i64;

fn number() -> impl Parser<TextCursor, i64> + Clone {
    take_while1(|c| c.is_ascii_digit()).try_map(|digits: String| digits.parse::<i64>())
}

fn plus() -> impl Parser<TextCursor, Op> + Clone {
    char('+').constant((|a: i64, b: i64| a + b) as Op)
}

fn times() -> impl Parser<TextCursor, Op> + Clone {
    char('*').constant((|a: i64, b: i64| a * b) as Op)
}

fn operator() -> impl Parser<TextCursor, Op> + Clone {
    choice("operator", (plus(), times()))
}

#[test]
fn test_left_chain_sum() {
    let sum = number().chain_l1(plus());
    assert_eq!(parse_str("1+2+3+4+5", &sum), Ok(15));
}

#[test]
fn test_left_chain_product() {
    let product = number().chain_l1(times());
    assert_eq!(parse_str("2*3*4*5", &product), Ok(120));
}

#[test]
fn test_chains_without_precedence() {
    let left = number().chain_l1(operator());
    let right = number().chain_r1(operator());
    assert_eq!(parse_str("1+2*3+4", &left), Ok(13));
    assert_eq!(parse_str("1+2*3+4", &right), Ok(15));
}

#[test]
fn test_chain_single_operand() {
    let left = number().chain_l1(operator());
    let right = number().chain_r1(operator());
    assert_eq!(parse_str("7", &left), Ok(7));
    assert_eq!(parse_str("7", &right), Ok(7));
}

#[test]
fn test_chain_requires_an_operand() {
    let left = number().chain_l1(operator());
    assert!(parse_str("+1", &left).is_err());
}

#[test]
fn test_chain_undoes_dangling_operator() {
    let left = number().chain_l1(operator()).and(char('+'));
    assert_eq!(parse_str("1+2+", &left), Ok((3, '+')));
    let right = number().chain_r1(operator()).and(char('*'));
    assert_eq!(parse_str("2*3*", &right), Ok((6, '*')));
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tree {
    Leaf(char),
    Pair(Box<Tree>, Box<Tree>),
}

fn leaf(c: char) -> Tree {
    Tree::Leaf(c)
}

fn pair(a: Tree, b: Tree) -> Tree {
    Tree::Pair(Box::new(a), Box::new(b))
}

#[test]
fn test_chain_associativity() {
    let operand = take_while1(|c| c.is_ascii_lowercase())
        .try_map(|s: String| s.chars().next().ok_or("empty"))
        .map(leaf);
    let comma = char(',').constant(pair as fn(Tree, Tree) -> Tree);

    let left = operand.clone().chain_l1(comma.clone());
    let right = operand.chain_r1(comma);

    let (a, b, c) = (leaf('a'), leaf('b'), leaf('c'));
    assert_eq!(
        parse_str("a,b,c", &left),
        Ok(pair(pair(a.clone(), b.clone()), c.clone()))
    );
    assert_eq!(parse_str("a,b,c", &right), Ok(pair(a, pair(b, c))));
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Lit(i64),
    Group(Box<Expr>),
}

fn expression() -> impl Parser<TextCursor, Expr> + Clone {
    fix(|expr: FixRef<TextCursor, Expr>| {
        let group = expr
            .preceded(char('('))
            .terminated(char(')'))
            .map(|inner| Expr::Group(Box::new(inner)));
        choice("expression", (number().map(Expr::Lit), group))
    })
}

#[test]
fn test_fix_group() {
    assert_eq!(
        parse_str("(9)", &expression()),
        Ok(Expr::Group(Box::new(Expr::Lit(9))))
    );
    assert_eq!(parse_str("9", &expression()), Ok(Expr::Lit(9)));
}

#[test]
fn test_fix_deep_nesting() {
    let depth = 200;
    let input = format!("{}42{}", "(".repeat(depth), ")".repeat(depth));
    let mut expected = Expr::Lit(42);
    for _ in 0..depth {
        expected = Expr::Group(Box::new(expected));
    }
    assert_eq!(parse_str(&input, &expression()), Ok(expected));
}

#[test]
fn test_fix_unclosed_group() {
    // The group alternative consumed input, so its failure decides the choice.
    let err = parse_str("((9)", &expression()).unwrap_err();
    match err {
        ParseError::Expected { label, offset, causes } => {
            assert_eq!(label, "expression");
            assert_eq!(offset, 0);
            assert_eq!(causes.last(), Some(&ParseError::EndOfInput { offset: 4 }));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_fix_builds_once() {
    static BUILDS: AtomicUsize = AtomicUsize::new(0);

    let parens = fix(|nested: FixRef<TextCursor, ()>| {
        BUILDS.fetch_add(1, Ordering::SeqCst);
        nested
            .opt()
            .preceded(char('('))
            .terminated(char(')'))
            .constant(())
    });
    assert_eq!(BUILDS.load(Ordering::SeqCst), 0);
    for input in ["()", "(())", "((()))"] {
        assert_eq!(parse_str(input, &parens), Ok(()));
    }
    let copy = parens.clone();
    assert_eq!(parse_str("(())", &copy), Ok(()));
    assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
}

#[test]
fn test_fix_shared_across_threads() {
    static BUILDS: AtomicUsize = AtomicUsize::new(0);

    let parser = fix(|expr: FixRef<TextCursor, Expr>| {
        BUILDS.fetch_add(1, Ordering::SeqCst);
        let group = expr
            .preceded(char('('))
            .terminated(char(')'))
            .map(|inner| Expr::Group(Box::new(inner)));
        choice("expression", (number().map(Expr::Lit), group))
    });

    thread::scope(|scope| {
        for n in 0..8 {
            let parser = &parser;
            scope.spawn(move || {
                let input = format!("(({}))", n);
                let expected = Expr::Group(Box::new(Expr::Group(Box::new(Expr::Lit(n)))));
                assert_eq!(parse_str(&input, parser), Ok(expected));
            });
        }
    });
    assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
}
