use parser_rd::text::{finish, regex, space, string};
use parser_rd::{choice, fix, parse_str, wrap, FixRef, Parser, TextCursor};
use std::error::Error;
use std::fmt;

// A small JSON parser. Leaves out string escapes and other details that would make
// it longer without showing anything new about the combinators.

// > echo '{"a": [1, 2.5, null], "b": true}' | cargo run --example json

#[derive(Debug, Clone)]
pub enum Json {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Json>),
    Object(Vec<(String, Json)>),
}

impl Json {
    fn write(&self, f: &mut fmt::Formatter, indent: usize) -> fmt::Result {
        use Json::*;

        match self {
            Null => write!(f, "null"),
            Bool(b) => write!(f, "{}", b),
            Number(n) => write!(f, "{}", n),
            String(s) => write!(f, "\"{}\"", s),
            Array(elems) if elems.is_empty() => write!(f, "[]"),
            Array(elems) => {
                writeln!(f, "[")?;
                for (i, elem) in elems.iter().enumerate() {
                    write!(f, "{:indent$}", "", indent = 2 * (indent + 1))?;
                    elem.write(f, indent + 1)?;
                    let comma = if i + 1 == elems.len() { "" } else { "," };
                    writeln!(f, "{}", comma)?;
                }
                write!(f, "{:indent$}]", "", indent = 2 * indent)
            }
            Object(entries) if entries.is_empty() => write!(f, "{{}}"),
            Object(entries) => {
                writeln!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    write!(f, "{:indent$}\"{}\": ", "", key, indent = 2 * (indent + 1))?;
                    value.write(f, indent + 1)?;
                    let comma = if i + 1 == entries.len() { "" } else { "," };
                    writeln!(f, "{}", comma)?;
                }
                write!(f, "{:indent$}}}", "", indent = 2 * indent)
            }
        }
    }
}

impl fmt::Display for Json {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write(f, 0)
    }
}

fn lexeme<T, P>(parser: P) -> impl Parser<TextCursor, T> + Clone
where
    P: Parser<TextCursor, T> + Clone,
{
    parser.terminated(space().skip_many())
}

fn token(text: &str) -> impl Parser<TextCursor, String> + Clone {
    lexeme(string(text))
}

fn make_json_parser() -> Result<impl Parser<TextCursor, Json> + Clone, Box<dyn Error>> {
    use std::str::FromStr;

    let number_p = lexeme(regex(r"-?[0-9]+(\.[0-9]+)?([eE][-+]?[0-9]+)?")?)
        .try_map(|text: String| f64::from_str(&text))
        .map(Json::Number);
    let plain_string_p = lexeme(regex(r#""([^"\\]|\\.)*""#)?)
        .map(|quoted: String| quoted[1..quoted.len() - 1].to_owned())
        .named("string");

    let json_p = fix(move |json: FixRef<TextCursor, Json>| {
        let null_p = token("null").constant(Json::Null);
        let bool_p = choice(
            "boolean",
            (
                token("true").constant(Json::Bool(true)),
                token("false").constant(Json::Bool(false)),
            ),
        );
        let string_p = plain_string_p.clone().map(Json::String);

        let elems_p = json.clone().sep_by(token(","));
        let array_p = wrap(token("["), elems_p, token("]")).map(Json::Array);

        let entry_p = plain_string_p.clone().terminated(token(":")).and(json);
        let entries_p = entry_p.sep_by(token(","));
        let object_p = wrap(token("{"), entries_p, token("}")).map(Json::Object);

        choice(
            "json value",
            (null_p, bool_p, number_p.clone(), string_p, array_p, object_p),
        )
    });

    Ok(finish(json_p.preceded(space().skip_many())))
}

fn main() -> Result<(), Box<dyn Error>> {
    use std::io;

    let parser = make_json_parser()?;
    let input = io::read_to_string(io::stdin())?;
    match parse_str(&input, &parser) {
        Err(err) => println!("{}", err.report("stdin", &input)),
        Ok(json) => println!("{}", json),
    }
    Ok(())
}
