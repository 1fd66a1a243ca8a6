use parser_rd::text::{char, finish, regex, space, string};
use parser_rd::{choice, fix, parse_str, FixRef, Parser, TextCursor};
use std::error::Error;
use std::str::FromStr;

// > echo "(1 - 2 - 3) * sqrt(4) / 6" | cargo run --example calc
// -1.3333333333333333

type BinOp = fn(f64, f64) -> f64;

/// Parse `parser`, then skip any whitespace after it.
fn lexeme<T, P>(parser: P) -> impl Parser<TextCursor, T> + Clone
where
    P: Parser<TextCursor, T> + Clone,
{
    parser.terminated(space().skip_many())
}

fn make_calculator() -> Result<impl Parser<TextCursor, f64> + Clone, Box<dyn Error>> {
    let num = lexeme(regex(r#"[-+]?[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?"#)?)
        .try_map(|text: String| f64::from_str(&text))
        .named("number");

    let calc = fix(move |calc: FixRef<TextCursor, f64>| {
        let parens = calc
            .clone()
            .preceded(lexeme(char('(')))
            .terminated(lexeme(char(')')));
        let sqrt = calc
            .clone()
            .preceded(lexeme(string("sqrt")).and(lexeme(char('('))))
            .terminated(lexeme(char(')')))
            .map(f64::sqrt);
        let expr_0 = choice("numeric expression", (num.clone(), parens, sqrt));

        // Multiplication and Division
        let mult_op = choice(
            "'*' or '/'",
            (
                lexeme(char('*')).constant((|n: f64, m: f64| n * m) as BinOp),
                lexeme(char('/')).constant((|n: f64, m: f64| n / m) as BinOp),
            ),
        );
        let expr_1 = expr_0.chain_l1(mult_op);

        // Addition and Subtraction
        let add_op = choice(
            "'+' or '-'",
            (
                lexeme(char('+')).constant((|n: f64, m: f64| n + m) as BinOp),
                lexeme(char('-')).constant((|n: f64, m: f64| n - m) as BinOp),
            ),
        );
        expr_1.chain_l1(add_op)
    });

    Ok(finish(calc.preceded(space().skip_many())))
}

fn main() -> Result<(), Box<dyn Error>> {
    use std::io;

    let parser = make_calculator()?;
    let input = io::read_to_string(io::stdin())?;
    match parse_str(&input, &parser) {
        Err(err) => println!("{}", err.report("stdin", &input)),
        Ok(n) => println!("{}", n),
    }
    Ok(())
}
