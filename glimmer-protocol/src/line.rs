//! Line accumulation for the serial byte stream.
//!
//! Bytes arrive one at a time from the UART. A line ends at `\r` or `\n`;
//! both terminators are accepted so `\r\n` terminals work (the second
//! terminator produces an empty line, which is ignored).

use heapless::Vec;

/// Longest accepted line, terminator excluded
pub const MAX_LINE_LEN: usize = 80;

/// Result of feeding a terminator byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineEvent<'a> {
    /// A complete, non-empty line
    Line(&'a [u8]),
    /// The line exceeded capacity and was discarded
    Overflow,
}

/// Collects bytes into lines of at most `N` bytes
#[derive(Debug, Clone)]
pub struct LineAccumulator<const N: usize = MAX_LINE_LEN> {
    buffer: Vec<u8, N>,
    /// Set after a line was handed out; the buffer is cleared on the next byte
    consumed: bool,
    /// Set once the current line overflowed; bytes are dropped until a terminator
    discarding: bool,
}

impl<const N: usize> Default for LineAccumulator<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LineAccumulator<N> {
    /// Create an empty accumulator
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            consumed: false,
            discarding: false,
        }
    }

    /// Drop any partial line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.consumed = false;
        self.discarding = false;
    }

    /// Feed a single byte
    ///
    /// Returns `Some` when a terminator completes a line (or an overflowed
    /// line), `None` otherwise.
    pub fn push(&mut self, byte: u8) -> Option<LineEvent<'_>> {
        if self.consumed {
            self.buffer.clear();
            self.consumed = false;
        }

        match byte {
            b'\r' | b'\n' => {
                if self.discarding {
                    self.discarding = false;
                    self.buffer.clear();
                    return Some(LineEvent::Overflow);
                }
                if self.buffer.is_empty() {
                    return None;
                }
                self.consumed = true;
                Some(LineEvent::Line(&self.buffer))
            }
            _ => {
                if !self.discarding && self.buffer.push(byte).is_err() {
                    self.discarding = true;
                    self.buffer.clear();
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed<'a, const N: usize>(acc: &'a mut LineAccumulator<N>, bytes: &[u8]) -> Option<LineEvent<'a>> {
        let (last, rest) = bytes.split_last()?;
        for &b in rest {
            assert_eq!(acc.push(b), None);
        }
        acc.push(*last)
    }

    #[test]
    fn test_line_on_newline() {
        let mut acc = LineAccumulator::<MAX_LINE_LEN>::new();
        assert_eq!(feed(&mut acc, b"0T1\n"), Some(LineEvent::Line(b"0T1")));
    }

    #[test]
    fn test_crlf_yields_single_line() {
        let mut acc = LineAccumulator::<MAX_LINE_LEN>::new();
        assert_eq!(feed(&mut acc, b"1MHI\r"), Some(LineEvent::Line(b"1MHI")));
        assert_eq!(acc.push(b'\n'), None);
        assert_eq!(feed(&mut acc, b"0T20\r"), Some(LineEvent::Line(b"0T20")));
    }

    #[test]
    fn test_empty_lines_ignored() {
        let mut acc = LineAccumulator::<8>::new();
        assert_eq!(acc.push(b'\n'), None);
        assert_eq!(acc.push(b'\r'), None);
    }

    #[test]
    fn test_overflow_discards_whole_line() {
        let mut acc = LineAccumulator::<4>::new();
        for &b in b"0MTOOLONG" {
            assert_eq!(acc.push(b), None);
        }
        assert_eq!(acc.push(b'\n'), Some(LineEvent::Overflow));
        // Next line is unaffected
        assert_eq!(feed(&mut acc, b"0T1\n"), Some(LineEvent::Line(b"0T1")));
    }

    #[test]
    fn test_exact_capacity_fits() {
        let mut acc = LineAccumulator::<3>::new();
        assert_eq!(feed(&mut acc, b"0T1\n"), Some(LineEvent::Line(b"0T1")));
    }

    #[test]
    fn test_reset_drops_partial() {
        let mut acc = LineAccumulator::<8>::new();
        acc.push(b'0');
        acc.push(b'T');
        acc.reset();
        assert_eq!(feed(&mut acc, b"1T0\n"), Some(LineEvent::Line(b"1T0")));
    }
}
