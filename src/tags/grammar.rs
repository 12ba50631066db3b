//! Nom grammar for a single normalized (lowercase) tag token.
//!
//! ```text
//! token    = "compact" | "a" | "v" | random | turn | chaos
//! random   = "r" [ "-" digits "-" digits | "-" digits | digits "-" digits | digits ]
//! turn     = "t" [ digits ] [ "m" digits ] [ "-" digits ]
//! chaos    = "cm" [ digits ] [ "-" digits ] | "c"
//! ```

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1},
    combinator::{all_consuming, map, map_res, opt, recognize, value},
    sequence::{pair, preceded, tuple},
    IResult,
};

use super::{ChaosForm, ChaosSpec, RandomSpec, Tag, TurnSpec};

/// Parse one lowercase token into a [`Tag`]; `None` if outside the grammar.
pub fn parse_token(token: &str) -> Option<Tag> {
    all_consuming(tag_token)(token).ok().map(|(_, tag)| tag)
}

fn tag_token(input: &str) -> IResult<&str, Tag> {
    alt((
        value(Tag::Compact, all_consuming(tag("compact"))),
        all_consuming(chaos_multi),
        value(Tag::Chaos(ChaosSpec::bare()), all_consuming(tag("c"))),
        all_consuming(turn),
        all_consuming(random),
        value(Tag::DeactivateExempt, all_consuming(tag("a"))),
        value(Tag::CompactExempt, all_consuming(tag("v"))),
    ))(input)
}

fn number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |digits: &str| digits.parse::<u32>())(input)
}

fn random(input: &str) -> IResult<&str, Tag> {
    let (input, _) = char('r')(input)?;
    let (input, selector) = opt(alt((
        recognize(tuple((char('-'), digit1, char('-'), digit1))),
        recognize(pair(char('-'), digit1)),
        recognize(tuple((digit1, char('-'), digit1))),
        digit1,
    )))(input)?;
    Ok((
        input,
        Tag::Random(RandomSpec::new(selector.unwrap_or_default())),
    ))
}

fn turn(input: &str) -> IResult<&str, Tag> {
    let (input, _) = char('t')(input)?;
    let (input, current) = opt(number)(input)?;
    let (input, max_exec) = opt(preceded(char('m'), number))(input)?;
    let (input, count) = opt(preceded(char('-'), number))(input)?;
    Ok((
        input,
        Tag::Turn(TurnSpec {
            current: current.unwrap_or(1),
            max_exec: max_exec.unwrap_or(1),
            count: count.unwrap_or(1),
        }),
    ))
}

fn chaos_multi(input: &str) -> IResult<&str, Tag> {
    map(
        preceded(
            tag("cm"),
            pair(opt(number), opt(preceded(char('-'), number))),
        ),
        |(max_exec, count)| {
            Tag::Chaos(ChaosSpec {
                form: ChaosForm::Counted,
                max_exec: max_exec.unwrap_or(1),
                count: count.unwrap_or(1),
            })
        },
    )(input)
}
