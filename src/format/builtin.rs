//! Stock formatters selectable from configuration

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use super::{FormatError, ValueFormatter};

fn check_pattern(pattern: &str) -> Result<(), FormatError> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(FormatError::InvalidPattern(pattern.to_string()));
    }
    Ok(())
}

/// Reparses a date/time value and prints it with another pattern.
///
/// Patterns use chrono's strftime syntax. Input that carries no time part
/// is accepted when the input pattern itself is date-only.
#[derive(Debug, Clone)]
pub struct DateFormatter {
    input: String,
    output: String,
}

impl DateFormatter {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Result<Self, FormatError> {
        let input = input.into();
        let output = output.into();
        check_pattern(&input)?;
        check_pattern(&output)?;
        Ok(Self { input, output })
    }
}

impl ValueFormatter for DateFormatter {
    fn format(&self, raw: &str) -> Result<String, FormatError> {
        let mut out = String::new();
        let written = match NaiveDateTime::parse_from_str(raw, &self.input) {
            Ok(dt) => write!(out, "{}", dt.format(&self.output)),
            Err(_) => {
                let date = NaiveDate::parse_from_str(raw, &self.input)
                    .map_err(|e| FormatError::invalid(raw, e.to_string()))?;
                write!(out, "{}", date.format(&self.output))
            }
        };
        // Time specifiers in the output pattern cannot be rendered from a bare date
        written.map_err(|_| FormatError::invalid(raw, format!("cannot render as '{}'", self.output)))?;
        Ok(out)
    }
}

/// Prints a numeric value with a fixed number of fraction digits.
///
/// Rounding works on the decimal digits of the input, half away from zero,
/// so any precision the database sends is kept exactly.
#[derive(Debug, Clone, Default)]
pub struct DecimalFormatter {
    scale: usize,
    prefix: String,
    suffix: String,
}

impl DecimalFormatter {
    pub fn new(scale: usize) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }
}

impl ValueFormatter for DecimalFormatter {
    fn format(&self, raw: &str) -> Result<String, FormatError> {
        let number = DecimalDigits::parse(raw.trim())
            .ok_or_else(|| FormatError::invalid(raw, "not a number"))?;

        Ok(format!(
            "{}{}{}",
            self.prefix,
            number.round(self.scale),
            self.suffix
        ))
    }
}

const MAX_EXPONENT: i64 = 4096;

/// Decimal number held as digit values split at the decimal point
#[derive(Debug)]
struct DecimalDigits {
    negative: bool,
    int: Vec<u8>,
    frac: Vec<u8>,
}

impl DecimalDigits {
    /// Accepts `[+-]digits[.digits][e[+-]digits]` with at least one digit
    fn parse(text: &str) -> Option<Self> {
        let (negative, rest) = match text.as_bytes().first()? {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };

        let (mantissa, exponent) = match rest.find(|c: char| c == 'e' || c == 'E') {
            Some(pos) => (&rest[..pos], rest[pos + 1..].parse::<i64>().ok()?),
            None => (rest, 0),
        };
        if exponent.abs() > MAX_EXPONENT {
            return None;
        }

        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part
            .bytes()
            .chain(frac_part.bytes())
            .all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let mut digits: Vec<u8> = int_part
            .bytes()
            .chain(frac_part.bytes())
            .map(|b| b - b'0')
            .collect();

        let mut point = int_part.len() as i64 + exponent;
        if point < 0 {
            let pad = point.unsigned_abs() as usize;
            digits.splice(0..0, std::iter::repeat(0).take(pad));
            point = 0;
        }
        let point = point as usize;
        if point > digits.len() {
            digits.resize(point, 0);
        }
        let frac = digits.split_off(point);

        Some(Self {
            negative,
            int: digits,
            frac,
        })
    }

    fn round(mut self, scale: usize) -> String {
        let round_up = self.frac.get(scale).is_some_and(|&d| d >= 5);
        self.frac.resize(scale, 0);

        let mut digits = self.int;
        digits.extend_from_slice(&self.frac);

        if round_up {
            let mut carry = true;
            for d in digits.iter_mut().rev() {
                if *d == 9 {
                    *d = 0;
                } else {
                    *d += 1;
                    carry = false;
                    break;
                }
            }
            if carry {
                digits.insert(0, 1);
            }
        }

        let (int, frac) = digits.split_at(digits.len() - scale);
        let leading = int.iter().position(|&d| d != 0).unwrap_or(int.len());
        let int = &int[leading..];

        let mut out = String::with_capacity(digits.len() + 2);
        if self.negative && digits.iter().any(|&d| d != 0) {
            out.push('-');
        }
        if int.is_empty() {
            out.push('0');
        } else {
            out.extend(int.iter().map(|&d| char::from(b'0' + d)));
        }
        if scale > 0 {
            out.push('.');
            out.extend(frac.iter().map(|&d| char::from(b'0' + d)));
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextCase {
    Upper,
    Lower,
    Trim,
}

/// Infallible text transforms
#[derive(Debug, Clone, Copy)]
pub struct CaseFormatter {
    case: TextCase,
}

impl CaseFormatter {
    pub fn new(case: TextCase) -> Self {
        Self { case }
    }
}

impl ValueFormatter for CaseFormatter {
    fn format(&self, raw: &str) -> Result<String, FormatError> {
        Ok(match self.case {
            TextCase::Upper => raw.to_uppercase(),
            TextCase::Lower => raw.to_lowercase(),
            TextCase::Trim => raw.trim().to_string(),
        })
    }
}
