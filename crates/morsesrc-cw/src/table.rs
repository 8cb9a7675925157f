use bitvec::prelude::*;
use phf::phf_map;

static MORSE_TABLE: phf::Map<char, MorseSymbol> = phf_map! {
    'A' => MorseSymbol::from_marks(".-"),
    'B' => MorseSymbol::from_marks("-..."),
    'C' => MorseSymbol::from_marks("-.-."),
    'D' => MorseSymbol::from_marks("-.."),
    'E' => MorseSymbol::from_marks("."),
    'F' => MorseSymbol::from_marks("..-."),
    'G' => MorseSymbol::from_marks("--."),
    'H' => MorseSymbol::from_marks("...."),
    'I' => MorseSymbol::from_marks(".."),
    'J' => MorseSymbol::from_marks(".---"),
    'K' => MorseSymbol::from_marks("-.-"),
    'L' => MorseSymbol::from_marks(".-.."),
    'M' => MorseSymbol::from_marks("--"),
    'N' => MorseSymbol::from_marks("-."),
    'O' => MorseSymbol::from_marks("---"),
    'P' => MorseSymbol::from_marks(".--."),
    'Q' => MorseSymbol::from_marks("--.-"),
    'R' => MorseSymbol::from_marks(".-."),
    'S' => MorseSymbol::from_marks("..."),
    'T' => MorseSymbol::from_marks("-"),
    'U' => MorseSymbol::from_marks("..-"),
    'V' => MorseSymbol::from_marks("...-"),
    'W' => MorseSymbol::from_marks(".--"),
    'X' => MorseSymbol::from_marks("-..-"),
    'Y' => MorseSymbol::from_marks("-.--"),
    'Z' => MorseSymbol::from_marks("--.."),
    '0' => MorseSymbol::from_marks("-----"),
    '1' => MorseSymbol::from_marks(".----"),
    '2' => MorseSymbol::from_marks("..---"),
    '3' => MorseSymbol::from_marks("...--"),
    '4' => MorseSymbol::from_marks("....-"),
    '5' => MorseSymbol::from_marks("....."),
    '6' => MorseSymbol::from_marks("-...."),
    '7' => MorseSymbol::from_marks("--..."),
    '8' => MorseSymbol::from_marks("---.."),
    '9' => MorseSymbol::from_marks("----."),
    '.' => MorseSymbol::from_marks(".-.-.-"),
    ',' => MorseSymbol::from_marks("--..--"),
    '?' => MorseSymbol::from_marks("..--.."),
    '\'' => MorseSymbol::from_marks(".----."),
    '!' => MorseSymbol::from_marks("-.-.--"),
    '/' => MorseSymbol::from_marks("-..-."),
    '(' => MorseSymbol::from_marks("-.--."),
    ')' => MorseSymbol::from_marks("-.--.-"),
    '&' => MorseSymbol::from_marks(".-..."),
    ':' => MorseSymbol::from_marks("---..."),
    ';' => MorseSymbol::from_marks("-.-.-."),
    '=' => MorseSymbol::from_marks("-...-"),
    '+' => MorseSymbol::from_marks(".-.-."),
    '-' => MorseSymbol::from_marks("-....-"),
    '_' => MorseSymbol::from_marks("..--.-"),
    '"' => MorseSymbol::from_marks(".-..-."),
    '$' => MorseSymbol::from_marks("...-..-"),
    '@' => MorseSymbol::from_marks(".--.-."),
};

/// A keyed Morse element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    /// One unit of tone.
    Dot,
    /// Three units of tone.
    Dash,
}

/// Dot/dash pattern of one character, packed as a length and a bit pattern.
///
/// Bit `k` of the pattern (least significant first) is the `k`-th element:
/// 0 for a dot, 1 for a dash. A length of zero marks an unsupported character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MorseSymbol {
    length: u8,
    pattern: u8,
}

impl MorseSymbol {
    /// Symbol with no elements.
    pub const EMPTY: Self = Self {
        length: 0,
        pattern: 0,
    };

    /// Maximum number of elements a symbol can hold.
    pub const MAX_LEN: usize = u8::BITS as usize;

    /// Create a symbol from a raw length and bit pattern. Bits above `length` are ignored.
    pub const fn new(length: u8, pattern: u8) -> Self {
        let length = if length as usize > Self::MAX_LEN {
            Self::MAX_LEN as u8
        } else {
            length
        };
        let mask = if length as usize == Self::MAX_LEN {
            u8::MAX
        } else {
            (1u8 << length) - 1
        };
        Self {
            length,
            pattern: pattern & mask,
        }
    }

    /// Pack a mark string such as `".-."` into a symbol.
    pub const fn from_marks(marks: &str) -> Self {
        let bytes = marks.as_bytes();
        assert!(bytes.len() <= Self::MAX_LEN, "too many elements in symbol");
        let mut pattern = 0u8;
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'-' {
                pattern |= 1 << i;
            }
            i += 1;
        }
        Self {
            length: bytes.len() as u8,
            pattern,
        }
    }

    pub fn len(&self) -> usize {
        self.length as usize
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn pattern(&self) -> u8 {
        self.pattern
    }

    /// Elements in keying order.
    pub fn elements(&self) -> impl Iterator<Item = Element> + '_ {
        self.pattern.view_bits::<Lsb0>()[..self.len()]
            .iter()
            .by_vals()
            .map(|dash| if dash { Element::Dash } else { Element::Dot })
    }
}

impl std::fmt::Display for MorseSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for element in self.elements() {
            let mark = match element {
                Element::Dot => '.',
                Element::Dash => '-',
            };
            write!(f, "{}", mark)?;
        }
        Ok(())
    }
}

/// Look up the symbol for a character, ignoring ASCII case.
///
/// Characters outside the table (including space and newline) return
/// [`MorseSymbol::EMPTY`].
pub fn lookup(ch: char) -> MorseSymbol {
    MORSE_TABLE
        .get(&ch.to_ascii_uppercase())
        .copied()
        .unwrap_or(MorseSymbol::EMPTY)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERNATIONAL: &[(char, &str)] = &[
        ('A', ".-"),
        ('B', "-..."),
        ('C', "-.-."),
        ('D', "-.."),
        ('E', "."),
        ('F', "..-."),
        ('G', "--."),
        ('H', "...."),
        ('I', ".."),
        ('J', ".---"),
        ('K', "-.-"),
        ('L', ".-.."),
        ('M', "--"),
        ('N', "-."),
        ('O', "---"),
        ('P', ".--."),
        ('Q', "--.-"),
        ('R', ".-."),
        ('S', "..."),
        ('T', "-"),
        ('U', "..-"),
        ('V', "...-"),
        ('W', ".--"),
        ('X', "-..-"),
        ('Y', "-.--"),
        ('Z', "--.."),
        ('0', "-----"),
        ('1', ".----"),
        ('2', "..---"),
        ('3', "...--"),
        ('4', "....-"),
        ('5', "....."),
        ('6', "-...."),
        ('7', "--..."),
        ('8', "---.."),
        ('9', "----."),
        ('.', ".-.-.-"),
        (',', "--..--"),
        ('?', "..--.."),
        ('/', "-..-."),
        ('=', "-...-"),
        ('+', ".-.-."),
        ('@', ".--.-."),
    ];

    #[test]
    fn table_matches_international_alphabet() {
        for &(ch, marks) in INTERNATIONAL {
            assert_eq!(lookup(ch).to_string(), marks, "symbol for {:?}", ch);
        }
    }

    #[test]
    fn lookup_ignores_case() {
        for ch in 'a'..='z' {
            assert_eq!(lookup(ch), lookup(ch.to_ascii_uppercase()));
            assert!(!lookup(ch).is_empty());
        }
    }

    #[test]
    fn unmapped_characters_are_empty() {
        for ch in [' ', '\n', '\t', '#', '%', '\u{e9}', '\u{3042}'] {
            assert!(lookup(ch).is_empty(), "{:?} should be unmapped", ch);
        }
    }

    #[test]
    fn pattern_is_lsb_first() {
        // ".-.-.-": dashes at element 1, 3 and 5.
        let period = lookup('.');
        assert_eq!(period.len(), 6);
        assert_eq!(period.pattern(), 0b10_1010);
    }

    #[test]
    fn new_masks_bits_above_length() {
        let sym = MorseSymbol::new(2, 0b1111_1110);
        assert_eq!(sym.pattern(), 0b10);
        assert_eq!(sym.to_string(), ".-");
    }

    #[test]
    fn longest_symbol_fits() {
        let dollar = lookup('$');
        assert_eq!(dollar.len(), 7);
        let elements: Vec<_> = dollar.elements().collect();
        assert_eq!(elements.len(), 7);
        assert_eq!(elements[3], Element::Dash);
    }
}
