use std::fmt::Write as _;

use arrayvec::ArrayVec;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of balls in every draw.
pub const DRAW_SIZE: usize = 15;
/// Smallest drawable ball.
pub const BALL_MIN: u8 = 1;
/// Largest drawable ball.
pub const BALL_MAX: u8 = 25;

/// One historical lottery result: an id, a date, and a fixed-length set of
/// drawn balls. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub id: u32,
    pub date: NaiveDate,
    pub balls: [u8; DRAW_SIZE],
}

/// An in-memory, ordered collection of draws parsed from a CSV archive.
///
/// Draw ids are monotonically increasing in the source data; the archive
/// preserves source order and never mutates a draw after parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawArchive {
    draws: Vec<Draw>,
}

/// A CSV row that could not be turned into a [`Draw`].
///
/// `row` is the 1-based index of the offending data row (the header does not
/// count).
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseError {
    #[display("no data rows found after the header")]
    Empty,
    #[display("row {row}: missing field")]
    MissingField { row: usize },
    #[display("row {row}: invalid draw id {value:?}")]
    InvalidDrawId { row: usize, value: String },
    #[display("row {row}: invalid date {value:?}, expected dd/mm/yyyy")]
    InvalidDate { row: usize, value: String },
    #[display("row {row}: invalid ball {value:?}")]
    InvalidBall { row: usize, value: String },
    #[display("row {row}: ball {ball} is outside 1..=25")]
    BallOutOfRange { row: usize, ball: u8 },
    #[display("row {row}: expected 15 balls, got {got}")]
    WrongBallCount { row: usize, got: usize },
}

impl DrawArchive {
    /// Parses a CSV archive: a header line followed by rows of the form
    /// `drawId,dd/mm/yyyy,n1,...,n15[,extra columns]`.
    ///
    /// Rows are validated strictly: a row whose ball sequence does not parse
    /// cleanly to exactly [`DRAW_SIZE`] balls in range is rejected with the
    /// offending row index, never silently truncated or carried as garbage.
    /// Columns beyond the balls (prize data in the source files) are ignored,
    /// as are blank lines.
    pub fn parse_csv(text: &str) -> Result<Self, ParseError> {
        let mut draws = Vec::new();
        for (index, line) in text.trim().lines().skip(1).enumerate() {
            let row = index + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            draws.push(parse_row(row, line)?);
        }
        if draws.is_empty() {
            return Err(ParseError::Empty);
        }
        Ok(Self { draws })
    }

    /// Builds an archive from already-validated draws. Used by tests and by
    /// callers that synthesize draw sequences.
    #[must_use]
    pub fn from_draws(draws: Vec<Draw>) -> Self {
        Self { draws }
    }

    #[must_use]
    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.draws.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Draw> {
        self.draws.get(index)
    }

    /// The most recent draw in the archive (source order is oldest first).
    #[must_use]
    pub fn latest(&self) -> Option<&Draw> {
        self.draws.last()
    }
}

fn parse_row(row: usize, line: &str) -> Result<Draw, ParseError> {
    let mut fields = line.split(',');

    let id_field = fields
        .next()
        .ok_or(ParseError::MissingField { row })?
        .trim();
    let id = id_field.parse().map_err(|_| ParseError::InvalidDrawId {
        row,
        value: id_field.to_owned(),
    })?;

    let date_field = fields
        .next()
        .ok_or(ParseError::MissingField { row })?
        .trim();
    let date = NaiveDate::parse_from_str(date_field, "%d/%m/%Y").map_err(|_| {
        ParseError::InvalidDate {
            row,
            value: date_field.to_owned(),
        }
    })?;

    let mut balls = ArrayVec::<u8, DRAW_SIZE>::new();
    for field in fields.take(DRAW_SIZE) {
        let field = field.trim();
        let ball: u8 = field.parse().map_err(|_| ParseError::InvalidBall {
            row,
            value: field.to_owned(),
        })?;
        if !(BALL_MIN..=BALL_MAX).contains(&ball) {
            return Err(ParseError::BallOutOfRange { row, ball });
        }
        balls.push(ball);
    }

    let got = balls.len();
    let balls = balls
        .into_inner()
        .map_err(|_| ParseError::WrongBallCount { row, got })?;

    Ok(Draw { id, date, balls })
}

/// Formats a ball sequence as a space-separated list for log lines and
/// command output.
#[must_use]
pub fn format_balls(balls: &[u8]) -> String {
    let mut out = String::with_capacity(balls.len() * 3);
    for (i, ball) in balls.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write!(&mut out, "{ball:02}").unwrap();
    }
    out
}
