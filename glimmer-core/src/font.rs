//! Glyph tables for the scrolling text mode.
//!
//! Each glyph is 4 columns by 5 rows. A row is stored with bit 0 as the
//! leftmost column, matching grid column order. The tables below are
//! written left-to-right for readability and mirrored at compile time.

/// Glyph width in columns
pub const GLYPH_WIDTH: u8 = 4;

/// Columns advanced per character (glyph plus one blank column)
pub const CHAR_PITCH: i16 = 5;

/// Glyph height in rows
pub const GLYPH_ROWS: usize = 5;

/// A glyph bitmap, one entry per row
pub type Glyph = [u8; GLYPH_ROWS];

const BLANK: Glyph = [0; GLYPH_ROWS];

/// Font selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alphabet {
    /// Latin letters, digits and punctuation
    #[default]
    Primary,
    /// Stylised glyph alphabet for A-Z
    Secondary,
}

impl Alphabet {
    /// Wire argument for the alphabet verb
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            60 => Some(Alphabet::Primary),
            61 => Some(Alphabet::Secondary),
            _ => None,
        }
    }
}

/// Mirror a 4-bit row written MSB-first so bit 0 becomes the leftmost column
const fn mirror(rows: Glyph) -> Glyph {
    let mut out = [0u8; GLYPH_ROWS];
    let mut i = 0;
    while i < GLYPH_ROWS {
        out[i] = (rows[i] & 0x0F).reverse_bits() >> 4;
        i += 1;
    }
    out
}

macro_rules! glyphs {
    ($($row:expr),* $(,)?) => {
        [$(mirror($row)),*]
    };
}

#[rustfmt::skip]
const LETTERS: [Glyph; 26] = glyphs![
    [0b0110, 0b1001, 0b1111, 0b1001, 0b1001], // A
    [0b1110, 0b1001, 0b1110, 0b1001, 0b1110], // B
    [0b0111, 0b1000, 0b1000, 0b1000, 0b0111], // C
    [0b1110, 0b1001, 0b1001, 0b1001, 0b1110], // D
    [0b1111, 0b1000, 0b1110, 0b1000, 0b1111], // E
    [0b1111, 0b1000, 0b1110, 0b1000, 0b1000], // F
    [0b0111, 0b1000, 0b1011, 0b1001, 0b0111], // G
    [0b1001, 0b1001, 0b1111, 0b1001, 0b1001], // H
    [0b1110, 0b0100, 0b0100, 0b0100, 0b1110], // I
    [0b0111, 0b0010, 0b0010, 0b1010, 0b0100], // J
    [0b1001, 0b1010, 0b1100, 0b1010, 0b1001], // K
    [0b1000, 0b1000, 0b1000, 0b1000, 0b1111], // L
    [0b1001, 0b1111, 0b1111, 0b1001, 0b1001], // M
    [0b1001, 0b1101, 0b1111, 0b1011, 0b1001], // N
    [0b0110, 0b1001, 0b1001, 0b1001, 0b0110], // O
    [0b1110, 0b1001, 0b1110, 0b1000, 0b1000], // P
    [0b0110, 0b1001, 0b1001, 0b1011, 0b0111], // Q
    [0b1110, 0b1001, 0b1110, 0b1010, 0b1001], // R
    [0b0111, 0b1000, 0b0110, 0b0001, 0b1110], // S
    [0b1110, 0b0100, 0b0100, 0b0100, 0b0100], // T
    [0b1001, 0b1001, 0b1001, 0b1001, 0b0110], // U
    [0b1001, 0b1001, 0b1001, 0b0110, 0b0110], // V
    [0b1001, 0b1001, 0b1111, 0b1111, 0b1001], // W
    [0b1001, 0b1001, 0b0110, 0b1001, 0b1001], // X
    [0b1010, 0b1010, 0b0100, 0b0100, 0b0100], // Y
    [0b1111, 0b0001, 0b0110, 0b1000, 0b1111], // Z
];

#[rustfmt::skip]
const DIGITS: [Glyph; 10] = glyphs![
    [0b0110, 0b1011, 0b1101, 0b1001, 0b0110], // 0
    [0b0100, 0b1100, 0b0100, 0b0100, 0b1110], // 1
    [0b1110, 0b0001, 0b0110, 0b1000, 0b1111], // 2
    [0b1110, 0b0001, 0b0110, 0b0001, 0b1110], // 3
    [0b1001, 0b1001, 0b1111, 0b0001, 0b0001], // 4
    [0b1111, 0b1000, 0b1110, 0b0001, 0b1110], // 5
    [0b0110, 0b1000, 0b1110, 0b1001, 0b0110], // 6
    [0b1111, 0b0001, 0b0010, 0b0100, 0b0100], // 7
    [0b0110, 0b1001, 0b0110, 0b1001, 0b0110], // 8
    [0b0110, 0b1001, 0b0111, 0b0001, 0b0110], // 9
];

#[rustfmt::skip]
const SECONDARY_LETTERS: [Glyph; 26] = glyphs![
    [0b1001, 0b0101, 0b0011, 0b0101, 0b1001], // A
    [0b1111, 0b1001, 0b0000, 0b1001, 0b1111], // B
    [0b1111, 0b0001, 0b0001, 0b0001, 0b0011], // C
    [0b0001, 0b0011, 0b0101, 0b1001, 0b1111], // D
    [0b1000, 0b0100, 0b0110, 0b0101, 0b1111], // E
    [0b1111, 0b1000, 0b0110, 0b0001, 0b1111], // F
    [0b0110, 0b1001, 0b0000, 0b1001, 0b0110], // G
    [0b1111, 0b0000, 0b1111, 0b0000, 0b1111], // H
    [0b0100, 0b0100, 0b0100, 0b0100, 0b0100], // I
    [0b1110, 0b0001, 0b0001, 0b0001, 0b1110], // J
    [0b1111, 0b1000, 0b1000, 0b1000, 0b1111], // K
    [0b1000, 0b1000, 0b1001, 0b1010, 0b1100], // L
    [0b1111, 0b1001, 0b1001, 0b0110, 0b0000], // M
    [0b1101, 0b1010, 0b1010, 0b1010, 0b1011], // N
    [0b1111, 0b1001, 0b1001, 0b1001, 0b1111], // O
    [0b1111, 0b1001, 0b0001, 0b0001, 0b0001], // P
    [0b1111, 0b0001, 0b1111, 0b1000, 0b1000], // Q
    [0b0110, 0b1001, 0b0001, 0b0010, 0b1100], // R
    [0b0011, 0b0100, 0b1000, 0b0100, 0b0011], // S
    [0b0110, 0b0110, 0b0110, 0b0110, 0b1111], // T
    [0b1111, 0b0000, 0b0000, 0b0000, 0b1111], // U
    [0b1001, 0b0110, 0b0000, 0b0110, 0b1001], // V
    [0b1111, 0b1001, 0b0110, 0b1001, 0b1111], // W
    [0b1001, 0b1010, 0b0100, 0b1010, 0b1001], // X
    [0b1001, 0b0110, 0b0110, 0b0110, 0b0110], // Y
    [0b1010, 0b0101, 0b1010, 0b0101, 0b1010], // Z
];

fn punctuation(c: char) -> Option<Glyph> {
    #[rustfmt::skip]
    let rows = match c {
        '-'  => [0b0000, 0b0000, 0b0110, 0b0000, 0b0000],
        '.'  => [0b0000, 0b0000, 0b0000, 0b0000, 0b0100],
        ','  => [0b0000, 0b0000, 0b0000, 0b0100, 0b1000],
        '!'  => [0b0100, 0b0100, 0b0100, 0b0000, 0b0100],
        '?'  => [0b0110, 0b1001, 0b0010, 0b0000, 0b0010],
        ':'  => [0b0000, 0b0100, 0b0000, 0b0100, 0b0000],
        '\'' => [0b0100, 0b0100, 0b0000, 0b0000, 0b0000],
        '/'  => [0b0001, 0b0010, 0b0010, 0b0100, 0b1000],
        '+'  => [0b0000, 0b0100, 0b1110, 0b0100, 0b0000],
        '='  => [0b0000, 0b1111, 0b0000, 0b1111, 0b0000],
        '*'  => [0b1010, 0b0100, 0b1010, 0b0000, 0b0000],
        '<'  => [0b0010, 0b0100, 0b1000, 0b0100, 0b0010],
        '>'  => [0b1000, 0b0100, 0b0010, 0b0100, 0b1000],
        _ => return None,
    };
    Some(mirror(rows))
}

/// Look up the bitmap for a character. Unknown characters are blank.
///
/// Letters are case-insensitive. The secondary alphabet only restyles
/// letters; digits and punctuation use the primary shapes.
pub fn glyph(alphabet: Alphabet, c: char) -> Glyph {
    let upper = c.to_ascii_uppercase();
    match upper {
        'A'..='Z' => {
            let idx = (upper as u8 - b'A') as usize;
            match alphabet {
                Alphabet::Primary => LETTERS[idx],
                Alphabet::Secondary => SECONDARY_LETTERS[idx],
            }
        }
        '0'..='9' => DIGITS[(upper as u8 - b'0') as usize],
        _ => punctuation(upper).unwrap_or(BLANK),
    }
}
