//! Command decoding.
//!
//! Grammar: `<target: 1-2 digits><verb: letter><argument>`.
//!
//! | verb | meaning          | argument                          |
//! |------|------------------|-----------------------------------|
//! | `T`  | mode             | digits                            |
//! | `M`  | text             | rest of line, verbatim            |
//! | `P`  | alphabet         | digits                            |
//! | `R`  | random style     | digits                            |
//! | `S`  | indicator state  | digits                            |
//! | `L`  | brightness       | digits                            |
//! | `C`  | color            | one sub-slot digit, index digits  |
//!
//! The decoder only checks shape. Whether an argument is acceptable for a
//! verb (brightness 0-15, alphabet 60/61, ...) is decided by the supervisor.

use core::fmt;
use heapless::String;

/// Longest text accepted by the text verb, in bytes
pub const MAX_TEXT_LEN: usize = 64;

/// Command addressee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Target {
    /// `0`: every applicable unit
    Broadcast,
    /// `1`: top front logic display
    Top,
    /// `2`: bottom front logic display
    Bottom,
    /// `3`: rear logic display
    Rear,
    /// `4`: front PSI indicator
    FrontIndicator,
    /// `5`: rear PSI indicator
    RearIndicator,
}

impl Target {
    /// Map a wire target number to a target
    pub fn from_number(n: u32) -> Option<Self> {
        match n {
            0 => Some(Target::Broadcast),
            1 => Some(Target::Top),
            2 => Some(Target::Bottom),
            3 => Some(Target::Rear),
            4 => Some(Target::FrontIndicator),
            5 => Some(Target::RearIndicator),
            _ => None,
        }
    }

    /// Wire target number
    pub fn number(self) -> u8 {
        match self {
            Target::Broadcast => 0,
            Target::Top => 1,
            Target::Bottom => 2,
            Target::Rear => 3,
            Target::FrontIndicator => 4,
            Target::RearIndicator => 5,
        }
    }
}

/// Decoded verb and its argument
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verb {
    /// `T`: display/indicator mode or effect trigger
    Mode(u32),
    /// `M`: scroll text
    Text(String<MAX_TEXT_LEN>),
    /// `P`: font selector (60 primary, 61 secondary)
    Alphabet(u32),
    /// `R`: random density style
    Style(u32),
    /// `S`: indicator state
    IndicatorState(u32),
    /// `L`: brightness level
    Brightness(u32),
    /// `C`: indicator color slot assignment
    Color { slot: u8, index: u32 },
}

/// One decoded protocol line
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    pub target: Target,
    pub verb: Verb,
}

/// Reasons a line could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Fewer than two bytes
    LineTooShort,
    /// Line does not start with a target digit
    MissingTarget,
    /// No verb letter after the target
    MissingVerb,
    /// Verb letter is not part of the protocol
    UnknownVerb(u8),
    /// Numeric argument is empty or contains a non-digit
    NonNumericArgument,
    /// Numeric argument does not fit in 32 bits
    ArgumentOutOfRange,
    /// Text argument is not valid UTF-8
    InvalidText,
    /// Target number above 5
    TargetOutOfRange,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::LineTooShort => f.write_str("command too short"),
            DecodeError::MissingTarget => f.write_str("missing target digits"),
            DecodeError::MissingVerb => f.write_str("missing command letter"),
            DecodeError::UnknownVerb(v) => {
                if v.is_ascii_graphic() {
                    write!(f, "unknown command '{}'", *v as char)
                } else {
                    write!(f, "unknown command 0x{:02X}", v)
                }
            }
            DecodeError::NonNumericArgument => f.write_str("argument must be numeric"),
            DecodeError::ArgumentOutOfRange => f.write_str("argument out of range"),
            DecodeError::InvalidText => f.write_str("text is not valid UTF-8"),
            DecodeError::TargetOutOfRange => f.write_str("target must be 0-5"),
        }
    }
}

/// Decode one line (terminator already stripped)
pub fn decode(line: &[u8]) -> Result<Command, DecodeError> {
    if line.len() < 2 {
        return Err(DecodeError::LineTooShort);
    }

    let digits = line
        .iter()
        .take(2)
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return Err(DecodeError::MissingTarget);
    }
    let target_number = parse_digits(&line[..digits])?;

    let (&verb_byte, argument) = line[digits..]
        .split_first()
        .ok_or(DecodeError::MissingVerb)?;
    if !verb_byte.is_ascii_alphabetic() {
        return Err(DecodeError::MissingVerb);
    }

    let target = Target::from_number(target_number).ok_or(DecodeError::TargetOutOfRange)?;

    let verb = match verb_byte.to_ascii_uppercase() {
        b'T' => Verb::Mode(parse_number(argument)?),
        b'M' => Verb::Text(parse_text(argument)?),
        b'P' => Verb::Alphabet(parse_number(argument)?),
        b'R' => Verb::Style(parse_number(argument)?),
        b'S' => Verb::IndicatorState(parse_number(argument)?),
        b'L' => Verb::Brightness(parse_number(argument)?),
        b'C' => parse_color(argument)?,
        other => return Err(DecodeError::UnknownVerb(other)),
    };

    Ok(Command { target, verb })
}

/// Parse a numeric argument, ignoring trailing spaces
fn parse_number(bytes: &[u8]) -> Result<u32, DecodeError> {
    let trimmed = match bytes.iter().rposition(|b| *b != b' ') {
        Some(end) => &bytes[..=end],
        None => &[],
    };
    parse_digits(trimmed)
}

fn parse_digits(bytes: &[u8]) -> Result<u32, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::NonNumericArgument);
    }
    let mut value: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return Err(DecodeError::NonNumericArgument);
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u32::from(b - b'0')))
            .ok_or(DecodeError::ArgumentOutOfRange)?;
    }
    Ok(value)
}

/// Take the rest of the line as text, truncated to `MAX_TEXT_LEN` bytes.
///
/// A multi-byte character cut by the truncation is dropped; any other
/// invalid sequence rejects the line.
fn parse_text(bytes: &[u8]) -> Result<String<MAX_TEXT_LEN>, DecodeError> {
    let bytes = &bytes[..bytes.len().min(MAX_TEXT_LEN)];
    let text = match core::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) if e.error_len().is_none() => {
            core::str::from_utf8(&bytes[..e.valid_up_to()]).map_err(|_| DecodeError::InvalidText)?
        }
        Err(_) => return Err(DecodeError::InvalidText),
    };

    let mut out = String::new();
    out.push_str(text).map_err(|_| DecodeError::InvalidText)?;
    Ok(out)
}

fn parse_color(argument: &[u8]) -> Result<Verb, DecodeError> {
    let (&slot, index) = argument
        .split_first()
        .ok_or(DecodeError::NonNumericArgument)?;
    if !slot.is_ascii_digit() {
        return Err(DecodeError::NonNumericArgument);
    }
    Ok(Verb::Color {
        slot: slot - b'0',
        index: parse_number(index)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn text(s: &str) -> Verb {
        let mut out = String::new();
        out.push_str(s).unwrap();
        Verb::Text(out)
    }

    #[test]
    fn test_decode_mode_broadcast() {
        let cmd = decode(b"0T1").unwrap();
        assert_eq!(cmd.target, Target::Broadcast);
        assert_eq!(cmd.verb, Verb::Mode(1));
    }

    #[test]
    fn test_decode_lowercase_verb() {
        let cmd = decode(b"3t20").unwrap();
        assert_eq!(cmd.target, Target::Rear);
        assert_eq!(cmd.verb, Verb::Mode(20));
    }

    #[test]
    fn test_decode_two_digit_target() {
        let cmd = decode(b"05S2").unwrap();
        assert_eq!(cmd.target, Target::RearIndicator);
        assert_eq!(cmd.verb, Verb::IndicatorState(2));
    }

    #[test]
    fn test_decode_text_preserves_case() {
        let cmd = decode(b"1MHello World").unwrap();
        assert_eq!(cmd.target, Target::Top);
        assert_eq!(cmd.verb, text("Hello World"));
    }

    #[test]
    fn test_decode_empty_text() {
        assert_eq!(decode(b"2M").unwrap().verb, text(""));
    }

    #[test]
    fn test_text_truncated() {
        let mut line = [b'A'; 2 + 100];
        line[0] = b'0';
        line[1] = b'M';
        match decode(&line).unwrap().verb {
            Verb::Text(s) => assert_eq!(s.len(), MAX_TEXT_LEN),
            other => panic!("unexpected verb {:?}", other),
        }
    }

    #[test]
    fn test_text_cut_multibyte_dropped() {
        // 63 ASCII bytes then a 2-byte character straddling the limit
        let mut line = b"0M".to_vec();
        line.extend(core::iter::repeat(b'x').take(63));
        line.extend("é".as_bytes());
        match decode(&line).unwrap().verb {
            Verb::Text(s) => assert_eq!(s.len(), 63),
            other => panic!("unexpected verb {:?}", other),
        }
    }

    #[test]
    fn test_invalid_text() {
        assert_eq!(decode(b"1M\xFF\xFE"), Err(DecodeError::InvalidText));
    }

    #[test]
    fn test_decode_color() {
        let cmd = decode(b"4C111").unwrap();
        assert_eq!(cmd.target, Target::FrontIndicator);
        assert_eq!(cmd.verb, Verb::Color { slot: 1, index: 11 });
    }

    #[test]
    fn test_color_without_index() {
        assert_eq!(decode(b"4C1"), Err(DecodeError::NonNumericArgument));
        assert_eq!(decode(b"4C"), Err(DecodeError::NonNumericArgument));
        assert_eq!(decode(b"4Cx3"), Err(DecodeError::NonNumericArgument));
    }

    #[test]
    fn test_brightness_out_of_range_is_decoded() {
        // Range is the supervisor's business
        assert_eq!(decode(b"0L20").unwrap().verb, Verb::Brightness(20));
    }

    #[test]
    fn test_trailing_space_tolerated() {
        assert_eq!(decode(b"0T1  ").unwrap().verb, Verb::Mode(1));
    }

    #[test]
    fn test_errors() {
        assert_eq!(decode(b""), Err(DecodeError::LineTooShort));
        assert_eq!(decode(b"0"), Err(DecodeError::LineTooShort));
        assert_eq!(decode(b"T1"), Err(DecodeError::MissingTarget));
        assert_eq!(decode(b"00"), Err(DecodeError::MissingVerb));
        assert_eq!(decode(b"01"), Err(DecodeError::MissingVerb));
        assert_eq!(decode(b"0?1"), Err(DecodeError::MissingVerb));
        assert_eq!(decode(b"0X1"), Err(DecodeError::UnknownVerb(b'X')));
        assert_eq!(decode(b"0T"), Err(DecodeError::NonNumericArgument));
        assert_eq!(decode(b"0T1a"), Err(DecodeError::NonNumericArgument));
        assert_eq!(decode(b"0T99999999999"), Err(DecodeError::ArgumentOutOfRange));
        assert_eq!(decode(b"6T1"), Err(DecodeError::TargetOutOfRange));
        assert_eq!(decode(b"12T1"), Err(DecodeError::TargetOutOfRange));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(DecodeError::UnknownVerb(b'X').to_string(), "unknown command 'X'");
        assert_eq!(DecodeError::UnknownVerb(0x01).to_string(), "unknown command 0x01");
        assert_eq!(DecodeError::TargetOutOfRange.to_string(), "target must be 0-5");
    }

    #[test]
    fn test_target_number_roundtrip() {
        for n in 0..=5 {
            assert_eq!(u32::from(Target::from_number(n).unwrap().number()), n);
        }
    }

    proptest! {
        #[test]
        fn test_decode_never_panics(line in proptest::collection::vec(any::<u8>(), 0..100)) {
            let _ = decode(&line);
        }

        #[test]
        fn test_numeric_verbs_decode(target in 0u32..=5, value in any::<u32>(), verb_idx in 0usize..5) {
            let letters = [b'T', b'P', b'R', b'S', b'L'];
            let line = format!("{}{}{}", target, letters[verb_idx] as char, value);
            let cmd = decode(line.as_bytes()).unwrap();
            prop_assert_eq!(u32::from(cmd.target.number()), target);
            let decoded = match cmd.verb {
                Verb::Mode(v)
                | Verb::Alphabet(v)
                | Verb::Style(v)
                | Verb::IndicatorState(v)
                | Verb::Brightness(v) => v,
                _ => unreachable!(),
            };
            prop_assert_eq!(decoded, value);
        }
    }
}
