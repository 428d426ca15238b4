// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Shared building blocks of the value parsers.

use std::borrow::Cow;

use chumsky::error::{Rich, RichPattern};
use chumsky::extra::ParserExtra;
use chumsky::input::{Input, Stream};
use chumsky::label::LabelError;
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;

use crate::error::ParseError;

/// Failure reasons when a specific value was expected but not found.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueExpected {
    /// A valid calendar date was expected
    Date,
    /// A 32-bit unsigned integer value was expected
    U32,
    /// A positive 32-bit unsigned integer value was expected
    PositiveU32,
    /// Period date-times must have consistent timezone (both UTC or both floating)
    MismatchedTimezone,
    /// A rule part occurred more than once
    RRuleDuplicatePart,
    /// The FREQ rule part is missing
    RRuleRequiredFreq,
}

impl From<ValueExpected> for RichPattern<'_, char> {
    fn from(expected: ValueExpected) -> Self {
        match expected {
            ValueExpected::Date => Self::Label(Cow::Borrowed("invalid date")),
            ValueExpected::U32 => Self::Label(Cow::Borrowed("u32 out of range")),
            ValueExpected::PositiveU32 => Self::Label(Cow::Borrowed("positive u32")),
            ValueExpected::MismatchedTimezone => Self::Label(Cow::Borrowed(
                "period date-times must have consistent timezone",
            )),
            ValueExpected::RRuleDuplicatePart => {
                Self::Label(Cow::Borrowed("rule part must not occur more than once"))
            }
            ValueExpected::RRuleRequiredFreq => {
                Self::Label(Cow::Borrowed("FREQ rule part is required"))
            }
        }
    }
}

/// Run `parser` over the whole of `src`, turning its errors into a
/// [`ParseError`] labelled with `kind`.
pub(crate) fn parse_with<'src, O, P>(
    kind: &'static str,
    parser: P,
    src: &'src str,
) -> Result<O, ParseError>
where
    P: Parser<'src, Stream<std::str::Chars<'src>>, O, extra::Err<Rich<'src, char>>>,
{
    let stream = Stream::from_iter(src.chars());
    parser
        .parse(stream)
        .into_result()
        .map_err(|errs| ParseError::syntax(kind, &errs))
}

/// Parse u32 (1 or more digits)
pub(crate) fn u32_any<'src, I, E>() -> impl Parser<'src, I, u32, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    select! { c @ '0'..='9' => c }
        .repeated()
        .at_least(1)
        .at_most(10) // u32 max is 10 digits: 4_294_967_295
        .collect::<String>()
        .try_map_with(|str, e| {
            lexical::parse::<u32, _>(&str)
                .map_err(|_| E::Error::expected_found([ValueExpected::U32], None, e.span()))
        })
}

/// Parse a positive u32
pub(crate) fn u32_non_zero<'src, I, E>() -> impl Parser<'src, I, u32, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    u32_any().try_map(|v, span| match v {
        0 => Err(E::Error::expected_found(
            [ValueExpected::PositiveU32],
            None,
            span,
        )),
        v => Ok(v),
    })
}

/// `"+"` / `"-"` / nothing, `true` unless negative
pub(crate) fn is_positive<'src, I, E>() -> impl Parser<'src, I, bool, E> + Copy
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    select! { c @ ('+' | '-') => c }
        .or_not()
        .map(|c| !matches!(c, Some('-')))
}

macro_rules! define_digit_select {
    ($fname:ident : $ty:ty => { $($ch:literal),+ $(,)? }) => {
        #[allow(trivial_numeric_casts, clippy::cast_lossless, clippy::char_lit_as_u8, clippy::cast_possible_wrap)]
        pub(crate) const fn $fname<'src, I, E>() -> impl Parser<'src, I, $ty, E> + Copy
        where
            I: Input<'src, Token = char, Span = SimpleSpan>,
            E: ParserExtra<'src, I>,
        {
            select! {
                $(
                    $ch => (($ch as u8 - b'0') as $ty),
                )+
            }
        }
    };
}

define_digit_select!(u8_0_1 : u8 => { '0', '1' });
define_digit_select!(u8_0_2 : u8 => { '0', '1', '2' });
define_digit_select!(u8_0_3 : u8 => { '0', '1', '2', '3' });
define_digit_select!(u8_0_5 : u8 => { '0', '1', '2', '3', '4', '5' });
define_digit_select!(u8_0_9 : u8 => { '0', '1', '2', '3', '4', '5', '6', '7', '8', '9' });
define_digit_select!(u8_1_9 : u8 => { '1', '2', '3', '4', '5', '6', '7', '8', '9' });
define_digit_select!(i8_0_1 : i8 => { '0', '1' });
define_digit_select!(i8_0_2 : i8 => { '0', '1', '2' });
define_digit_select!(i8_0_3 : i8 => { '0', '1', '2', '3' });
define_digit_select!(i8_0_9 : i8 => { '0', '1', '2', '3', '4', '5', '6', '7', '8', '9' });
define_digit_select!(i8_1_2 : i8 => { '1', '2' });
define_digit_select!(i8_1_4 : i8 => { '1', '2', '3', '4' });
define_digit_select!(i8_1_9 : i8 => { '1', '2', '3', '4', '5', '6', '7', '8', '9' });
define_digit_select!(i16_0_5 : i16 => { '0', '1', '2', '3', '4', '5' });
define_digit_select!(i16_0_6 : i16 => { '0', '1', '2', '3', '4', '5', '6' });
define_digit_select!(i16_0_9 : i16 => { '0', '1', '2', '3', '4', '5', '6', '7', '8', '9' });
define_digit_select!(i16_1_2 : i16 => { '1', '2' });
define_digit_select!(i16_1_9 : i16 => { '1', '2', '3', '4', '5', '6', '7', '8', '9' });
