//! A small parser that groups raw TLE text into name + element-line sets

use crate::{
    tle_set::{MalformedGroup, MalformedReason, TleSet},
    CATALOG_FIELD_LEN, LINE1_TAG, LINE2_TAG, MIN_ELEMENT_LINE_LEN,
};
use globe_types::prelude::UnstructuredTle;
use nom::{
    bytes::complete::{take, take_till},
    character::complete::{char, one_of},
    combinator::{eof, not, opt, verify},
    error::ErrorKind,
    multi::fold_many0,
    Err::Error,
};
use tracing::debug;

pub type Result<I, O, E = ParseError<I>> = std::result::Result<(I, O), nom::Err<E>>;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ParseError<I> {
    #[error("Element line is too short")]
    ShortElementLine,
    #[error("Parse error")]
    Nom(I, ErrorKind),
}

pub trait ParseErrorExt {
    fn is_failure(&self) -> bool;
}

impl<I> ParseErrorExt for nom::Err<ParseError<I>> {
    fn is_failure(&self) -> bool {
        matches!(self, nom::Err::Failure(_))
    }
}

/// Splits raw TLE text into groups. Every non-blank line that isn't an
/// element line starts a new group; malformed groups are collected rather than
/// failing the whole set.
pub fn parse_tle_set(set: &str) -> Result<&str, TleSet> {
    let (s, acc) = fold_many0(
        tle_line,
        GroupAccumulator::default,
        |acc, line| acc.push(line),
    )(set)?;
    Ok((s, acc.finish()))
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum TleLine<'a> {
    Blank,
    Name(&'a str),
    Element(ElementLine<'a>),
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct ElementLine<'a> {
    number: char,
    catalog: &'a str,
    text: &'a str,
}

fn tle_line(s: &str) -> Result<&str, TleLine> {
    let (s, _) = not(eof)(s)?;
    let (s, raw) = take_till(|c: char| c == '\n')(s)?;
    let (s, _) = opt(char('\n'))(s)?;

    let raw = raw.trim_end_matches('\r');
    let trimmed = raw.trim();
    let line = if trimmed.is_empty() {
        TleLine::Blank
    } else if let Ok((_, el)) = element_line(trimmed) {
        TleLine::Element(el)
    } else {
        TleLine::Name(raw)
    };
    Ok((s, line))
}

fn element_line(line: &str) -> Result<&str, ElementLine> {
    let (s, number) = one_of("12")(line)?;
    let (s, _) = char(' ')(s)?;
    let (s, catalog) = verify(take(CATALOG_FIELD_LEN), |c: &str| {
        let c = c.trim_start();
        !c.is_empty() && c.chars().all(|ch| ch.is_ascii_alphanumeric())
    })(s)?;
    if line.len() < MIN_ELEMENT_LINE_LEN {
        return Err(Error(ParseError::ShortElementLine));
    }
    Ok((
        s,
        ElementLine {
            number,
            catalog: catalog.trim_start(),
            text: line,
        },
    ))
}

#[derive(Default)]
struct GroupAccumulator<'a> {
    set: TleSet,
    pending: Option<PendingGroup<'a>>,
}

struct PendingGroup<'a> {
    name: Option<&'a str>,
    lines: Vec<ElementLine<'a>>,
}

impl<'a> GroupAccumulator<'a> {
    fn push(mut self, line: TleLine<'a>) -> Self {
        match line {
            TleLine::Blank => (),
            TleLine::Name(name) => {
                self.flush();
                self.pending = Some(PendingGroup {
                    name: Some(name),
                    lines: Vec::with_capacity(2),
                });
            }
            TleLine::Element(el) => self
                .pending
                .get_or_insert_with(|| PendingGroup {
                    name: None,
                    lines: Vec::with_capacity(2),
                })
                .lines
                .push(el),
        }
        self
    }

    fn flush(&mut self) {
        if let Some(group) = self.pending.take() {
            match group.into_tle() {
                Ok(tle) => self.set.entries.push(tle),
                Err(m) => {
                    debug!(name = ?m.name, reason = %m.reason, "Skipping malformed TLE group");
                    self.set.malformed.push(m);
                }
            }
        }
    }

    fn finish(mut self) -> TleSet {
        self.flush();
        self.set
    }
}

impl<'a> PendingGroup<'a> {
    fn into_tle(self) -> std::result::Result<UnstructuredTle, MalformedGroup> {
        let name = self.name;
        let malformed = |reason| MalformedGroup {
            name: name.map(str::to_owned),
            reason,
        };

        let Some(name) = name else {
            return Err(malformed(MalformedReason::MissingName));
        };
        let [l1, l2] = self.lines.as_slice() else {
            return Err(malformed(MalformedReason::WrongLineCount(self.lines.len())));
        };
        if l1.number != LINE1_TAG || l2.number != LINE2_TAG {
            return Err(malformed(MalformedReason::LineOrder));
        }
        if l1.catalog != l2.catalog {
            return Err(malformed(MalformedReason::CatalogMismatch));
        }

        Ok(UnstructuredTle {
            name: name.to_owned(),
            line1: l1.text.to_owned(),
            line2: l2.text.to_owned(),
        })
    }
}

impl<I> nom::error::ParseError<I> for ParseError<I> {
    fn from_error_kind(s: I, kind: ErrorKind) -> Self {
        ParseError::Nom(s, kind)
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}
