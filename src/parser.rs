//! Fixed-grammar record parser.
//!
//! Records are `<station>;<temperature>\n` where the temperature matches
//! `-?[0-9]+\.[0-9]`. Digits are accumulated as integer tenths instead of
//! going through a general float parser; only the final division produces
//! an `f64`.

use cmov::Cmov;

use crate::error::{BrcError, BrcResult};
use crate::memops::find_byte;

/// One parsed line. Borrows the station name from the input buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record<'a> {
    pub station: &'a [u8],
    pub temperature: f64,
}

#[inline(always)]
fn digit(b: u8) -> Option<i64> {
    let d = b.wrapping_sub(b'0');
    (d <= 9).then_some(d as i64)
}

#[inline(always)]
fn push_digit(tenths: i64, d: i64) -> Result<i64, &'static str> {
    tenths
        .checked_mul(10)
        .and_then(|v| v.checked_add(d))
        .ok_or("temperature out of range")
}

/// Parses a temperature of the form `[-]d+.d` from the start of `bytes`.
///
/// Returns the value and the number of bytes consumed. Anything after the
/// fractional digit is left for the caller.
#[cfg_attr(feature = "profiled", inline(never))]
pub fn parse_temperature(bytes: &[u8]) -> Result<(f64, usize), &'static str> {
    let is_negative = bytes.first() == Some(&b'-');
    let digits_start = is_negative as usize;

    let mut cursor = digits_start;
    let mut tenths: i64 = 0;
    while let Some(d) = bytes.get(cursor).copied().and_then(digit) {
        tenths = push_digit(tenths, d)?;
        cursor += 1;
    }
    if cursor == digits_start {
        return Err("expected a digit in temperature");
    }

    if bytes.get(cursor) != Some(&b'.') {
        return Err("expected '.' in temperature");
    }
    let fraction = bytes
        .get(cursor + 1)
        .copied()
        .and_then(digit)
        .ok_or("expected one fractional digit")?;
    tenths = push_digit(tenths, fraction)?;

    let negated = -tenths;
    tenths.cmovnz(&negated, is_negative as u8);

    Ok((tenths as f64 / 10.0, cursor + 2))
}

/// Walks the records of one chunk front to back.
///
/// `base_offset` is where the chunk starts in the file; it is only used to
/// report absolute positions in errors.
pub struct RecordCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    base_offset: usize,
}

impl<'a> RecordCursor<'a> {
    pub fn new(bytes: &'a [u8], base_offset: usize) -> Self {
        RecordCursor {
            bytes,
            pos: 0,
            base_offset,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn malformed(&self, at: usize, reason: &'static str) -> BrcError {
        BrcError::malformed(self.base_offset + at, reason)
    }

    /// Advances past exactly one record.
    ///
    /// Returns `Ok(None)` once the chunk is exhausted. Blank lines are
    /// skipped; a line without `;` or with a malformed temperature fails.
    #[cfg_attr(feature = "profiled", inline(never))]
    pub fn next_record(&mut self) -> BrcResult<Option<Record<'a>>> {
        let bytes = self.bytes;
        while bytes.get(self.pos) == Some(&b'\n') {
            self.pos += 1;
        }
        if self.pos >= bytes.len() {
            return Ok(None);
        }

        let start = self.pos;
        let line = &bytes[start..];

        let delim_idx = match find_byte::<b';'>(line) {
            Some(idx) => idx,
            None => return Err(self.malformed(start, "missing ';' separator")),
        };
        let station = &line[..delim_idx];
        if find_byte::<b'\n'>(station).is_some() {
            return Err(self.malformed(start, "missing ';' separator"));
        }

        let (temperature, consumed) = parse_temperature(&line[delim_idx + 1..])
            .map_err(|reason| self.malformed(start, reason))?;

        let end = delim_idx + 1 + consumed;
        match line.get(end) {
            None => self.pos = start + end,
            Some(b'\n') => self.pos = start + end + 1,
            Some(_) => {
                return Err(self.malformed(start, "expected line terminator after temperature"));
            }
        }

        Ok(Some(Record {
            station,
            temperature,
        }))
    }
}
