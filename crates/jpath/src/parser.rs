//! A `nom`-based parser for `$`-rooted path queries.
use super::ast::{PathExpression, Segment, Selector};
use crate::error::JPathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{alpha1, char, i64 as nom_i64, multispace0},
    combinator::{map, opt, recognize, value},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded},
};

// --- Main Public Parser ---

pub fn parse_path(input: &str) -> Result<PathExpression, JPathError> {
    let trimmed = input.trim();
    if !trimmed.starts_with('$') {
        return Err(JPathError::MissingRoot(input.to_string()));
    }
    match query(trimmed) {
        Ok(("", segments)) => {
            let has_zero_step = segments
                .iter()
                .flat_map(|seg| seg.selectors.iter())
                .any(|sel| matches!(sel, Selector::Slice { step: Some(0), .. }));
            if has_zero_step {
                return Err(JPathError::ZeroStep(input.to_string()));
            }
            Ok(PathExpression::new(trimmed, segments))
        }
        Ok((rem, _)) => Err(JPathError::JPathParse(
            input.to_string(),
            format!("Parser did not consume all input. Remainder: '{}'", rem),
        )),
        Err(e) => Err(JPathError::JPathParse(input.to_string(), e.to_string())),
    }
}

// --- Combinators ---

fn query(input: &str) -> IResult<&str, Vec<Segment>> {
    preceded(char('$'), many0(segment)).parse(input)
}

fn segment(input: &str) -> IResult<&str, Segment> {
    // `..` must be tried before the single-dot member form.
    alt((descendant_segment, child_segment)).parse(input)
}

fn descendant_segment(input: &str) -> IResult<&str, Segment> {
    map(
        preceded(
            tag(".."),
            alt((
                bracket,
                map(wildcard, |s| vec![s]),
                map(identifier, |name| vec![Selector::Name(name.to_string())]),
            )),
        ),
        Segment::descendant,
    )
    .parse(input)
}

fn child_segment(input: &str) -> IResult<&str, Segment> {
    alt((
        map(dot_member, |s| Segment::child(vec![s])),
        map(bracket, Segment::child),
    ))
    .parse(input)
}

fn dot_member(input: &str) -> IResult<&str, Selector> {
    preceded(
        char('.'),
        alt((
            wildcard,
            map(identifier, |name| Selector::Name(name.to_string())),
        )),
    )
    .parse(input)
}

// --- Bracket Selectors ---

fn bracket(input: &str) -> IResult<&str, Vec<Selector>> {
    delimited(
        char('['),
        separated_list1(char(','), ws(bracket_selector)),
        char(']'),
    )
    .parse(input)
}

fn bracket_selector(input: &str) -> IResult<&str, Selector> {
    // Slices must be tried before plain indices: `1:3` starts like `1`.
    alt((quoted_name, slice, index, wildcard)).parse(input)
}

fn quoted_name(input: &str) -> IResult<&str, Selector> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        |s: &str| Selector::Name(s.to_string()),
    )
    .parse(input)
}

fn index(input: &str) -> IResult<&str, Selector> {
    map(nom_i64, Selector::Index).parse(input)
}

fn slice(input: &str) -> IResult<&str, Selector> {
    map(
        (
            opt(ws(nom_i64)),
            char(':'),
            opt(ws(nom_i64)),
            opt(preceded(char(':'), opt(ws(nom_i64)))),
        ),
        |(start, _, end, step)| Selector::Slice {
            start,
            end,
            step: step.flatten(),
        },
    )
    .parse(input)
}

fn wildcard(input: &str) -> IResult<&str, Selector> {
    value(Selector::Wildcard, char('*')).parse(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '-'),
    ))
    .parse(input)
}

/// A combinator that takes a parser `inner` and produces a parser that consumes surrounding whitespace.
fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}
