#![cfg(feature = "regex")]

//! Runs the parser cases in `tests/*.tests.txt`.
//!
//! A case file is a sequence of sections. `Parser` describes a parser in a small
//! postfix language (see [`build_parser`]), `Input` gives the text to run it on,
//! and `Expect Ok` / `Expect Err` gives the expected output or error message.
//! Every line of a section's body starts with `>`.

use parser_rd::text::{char, consumed, finish, position, regex, space, string, take_till, take_while1};
use parser_rd::{
    attempt, choice, parse_str, try_choice, tuple, BoxedParser, Parser, TextCursor,
};
use std::fmt;
use std::fs;
use std::path::Path;

type StrParser = BoxedParser<TextCursor, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Ok,
    Err,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::Ok => write!(f, "Ok"),
            Outcome::Err => write!(f, "Err"),
        }
    }
}

#[derive(Debug, Clone)]
enum Section {
    Parser(String),
    Input(String),
    /// The expected outcome, its 0-based line in the file, and the expected text.
    Expect(Outcome, u32, String),
}

/*========================================*/
/*          Case File Format              */
/*========================================*/

fn case_file_parser() -> impl Parser<TextCursor, Vec<Section>> + Clone {
    let comment = take_till(|c| c == '\n').preceded(char('#')).constant(());
    let blank = choice("whitespace", (space().constant(()), comment)).skip_many();
    let keyword = |word: &str| string(word).terminated(blank.clone());

    let body_line = take_till(|c| c == '\n')
        .preceded(char(' '))
        .opt()
        .preceded(char('>'))
        .terminated(blank.clone())
        .map(Option::unwrap_or_default);
    let body = body_line.many1().map(|lines| lines.join("\n"));

    let outcome = choice(
        "Ok or Err",
        (
            keyword("Ok").constant(Outcome::Ok),
            keyword("Err").constant(Outcome::Err),
        ),
    );
    let expect = tuple((position(), outcome.preceded(keyword("Expect")), body.clone()))
        .map(|(pos, outcome, text)| Section::Expect(outcome, pos.line, text));
    let section = choice(
        "section header",
        (
            body.clone().preceded(keyword("Parser")).map(Section::Parser),
            body.preceded(keyword("Input")).map(Section::Input),
            expect,
        ),
    );

    finish(section.many0().preceded(blank))
}

/*========================================*/
/*          Parser Descriptions           */
/*========================================*/

#[derive(Debug, Clone)]
struct Rejected(String);

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "oops something went wrong: {}", self.0)
    }
}

fn show_list(items: Vec<String>) -> String {
    format!("[{}]", items.join(" "))
}

/// Operands for the postfix parser language.
struct Stack(Vec<StrParser>);

impl Stack {
    fn pop(&mut self, word: &str) -> StrParser {
        match self.0.pop() {
            Some(parser) => parser,
            None => panic!("`{}` is missing an operand", word),
        }
    }

    fn unary<P>(&mut self, word: &str, build: impl FnOnce(StrParser) -> P)
    where
        P: Parser<TextCursor, String> + Clone + 'static,
    {
        let a = self.pop(word);
        self.0.push(Box::new(build(a)));
    }

    fn binary<P>(&mut self, word: &str, build: impl FnOnce(StrParser, StrParser) -> P)
    where
        P: Parser<TextCursor, String> + Clone + 'static,
    {
        let b = self.pop(word);
        let a = self.pop(word);
        self.0.push(Box::new(build(a, b)));
    }

    fn ternary<P>(&mut self, word: &str, build: impl FnOnce(StrParser, StrParser, StrParser) -> P)
    where
        P: Parser<TextCursor, String> + Clone + 'static,
    {
        let c = self.pop(word);
        let b = self.pop(word);
        let a = self.pop(word);
        self.0.push(Box::new(build(a, b, c)));
    }
}

/// Build a parser from a postfix description such as `"a" "b" tuple2 many0`.
///
/// `"text"` is a literal string, `/re/` a regex, and `digits` / `space` are
/// char classes. Every other word is a combinator applied to the operands
/// before it. An invalid regex is reported as an `Err` outcome.
fn build_parser(description: &str) -> Result<StrParser, String> {
    let mut stack = Stack(Vec::new());

    for word in description.split_whitespace() {
        let quoted = |delim: char| {
            (word.len() >= 2 && word.starts_with(delim) && word.ends_with(delim))
                .then(|| &word[1..word.len() - 1])
        };
        if let Some(text) = quoted('"') {
            stack.0.push(Box::new(string(text)));
            continue;
        }
        if let Some(pattern) = quoted('/') {
            stack.0.push(Box::new(regex(pattern).map_err(|err| err.to_string())?));
            continue;
        }

        match word {
            "digits" => stack.0.push(Box::new(take_while1(|c| c.is_ascii_digit()))),
            "space" => stack.0.push(Box::new(space().map(|c: char| c.to_string()))),

            // Mapping
            "constant" => stack.unary(word, |p| p.constant("constant".to_owned())),
            "map" => stack.unary(word, |p| p.map(|s| format!("(map {})", s))),
            "try_map" => stack.unary(word, |p| {
                p.try_map(|s: String| {
                    if s.contains("ok") {
                        Ok(format!("(ok {})", s))
                    } else {
                        Err(Rejected(s))
                    }
                })
            }),
            "assert_short" => stack.unary(word, |p| {
                p.assert(|s: &String| s.len() <= 2, |s: &String| format!("too long: {}", s))
            }),
            "consumed" => stack.unary(word, consumed),
            "named" => stack.unary(word, |p| p.named("thing")),
            "look_ahead" => {
                stack.unary(word, |p| p.look_ahead().map(|s| format!("(peek {})", s)))
            }

            // Repetition
            "opt" => stack.unary(word, |p| {
                p.opt()
                    .map(|s: Option<String>| s.unwrap_or_else(|| ".".to_owned()))
            }),
            "many0" => stack.unary(word, |p| p.many0().map(show_list)),
            "many1" => stack.unary(word, |p| p.many1().map(show_list)),
            "count2" => stack.unary(word, |p| p.count(2).map(show_list)),
            "skip_many" => stack.unary(word, |p| p.skip_many().constant("()".to_owned())),
            "sep_by" => stack.binary(word, |p, sep| p.sep_by(sep).map(show_list)),
            "sep_by1" => stack.binary(word, |p, sep| p.sep_by1(sep).map(show_list)),
            "many_till" => stack.binary(word, |p, end| p.many_till(end).map(show_list)),

            // Sequencing
            "preceded" => stack.binary(word, |prev, p| p.preceded(prev)),
            "terminated" => stack.binary(word, |p, next| p.terminated(next)),
            "tuple2" => stack.binary(word, |a, b| {
                tuple((a, b)).map(|(a, b)| format!("(tuple {} {})", a, b))
            }),
            "tuple3" => stack.ternary(word, |a, b, c| {
                tuple((a, b, c)).map(|(a, b, c)| format!("(tuple {} {} {})", a, b, c))
            }),

            // Choice
            "attempt" => stack.unary(word, attempt),
            "or" => stack.binary(word, |a, b| a.or(b)),
            "choice2" => stack.binary(word, |a, b| choice("choice", (a, b))),
            "choice3" => stack.ternary(word, |a, b, c| choice("choice", (a, b, c))),
            "try_choice2" => stack.binary(word, |a, b| try_choice("choice", (a, b))),

            _ => panic!("unknown word `{}` in parser description", word),
        }
    }

    let mut parsers = stack.0;
    assert_eq!(parsers.len(), 1, "parser description must leave one parser: {}", description);
    Ok(parsers.remove(0))
}

/*========================================*/
/*          Running Cases                 */
/*========================================*/

fn run(description: &str, input: &str) -> (Outcome, String) {
    match build_parser(description) {
        Err(msg) => (Outcome::Err, msg),
        Ok(parser) => match parse_str(input, &finish(parser)) {
            Ok(output) => (Outcome::Ok, output),
            Err(err) => (Outcome::Err, err.to_string()),
        },
    }
}

/// Print `text` as a section body, the way it appears in a case file.
fn print_body(header: &str, text: &str) {
    println!("{}", header);
    if text.is_empty() {
        println!(">");
    }
    for line in text.lines() {
        println!("> {}", line);
    }
}

/// Returns the number of cases run. Panics on the first failing case.
fn run_case_file(file_name: &str, sections: Vec<Section>) -> usize {
    let mut description = String::new();
    let mut input = String::new();
    let mut num_cases = 0;

    for section in sections {
        let (outcome, line, expected) = match section {
            Section::Parser(text) => {
                description = text;
                continue;
            }
            Section::Input(text) => {
                input = text;
                continue;
            }
            Section::Expect(outcome, line, text) => (outcome, line, text),
        };

        let (actual_outcome, actual) = run(&description, &input);
        if (actual_outcome, actual.as_str()) != (outcome, expected.as_str()) {
            print_body("Parser", &description);
            print_body("Input", &input);
            print_body(&format!("Expected {}", outcome), &expected);
            print_body(&format!("Actual {}", actual_outcome), &actual);
            panic!("case failed at {}:{}", file_name, line + 1);
        }
        num_cases += 1;
    }
    num_cases
}

#[test]
fn run_parser_tests() {
    colored::control::set_override(false);

    let case_parser = case_file_parser();
    let mut case_files: Vec<_> = fs::read_dir(Path::new("tests"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.is_file() && path.to_string_lossy().ends_with(".tests.txt"))
        .collect();
    case_files.sort();
    assert!(!case_files.is_empty(), "no case files found");

    for path in case_files {
        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
        let contents = fs::read_to_string(&path).unwrap();
        let sections = match parse_str(&contents, &case_parser) {
            Ok(sections) => sections,
            Err(err) => panic!("{}", err.report(&file_name, &contents)),
        };
        let num_cases = run_case_file(&file_name, sections);
        println!("{}: {} cases passed", file_name, num_cases);
    }
}
