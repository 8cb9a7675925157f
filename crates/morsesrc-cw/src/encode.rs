use crate::table::{lookup, Element};

/// Silence between keyed elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gap {
    /// Between the elements of one character.
    IntraChar,
    /// After the last element of a character.
    InterChar,
    /// Between words, and at the end of the transmission.
    InterWord,
}

/// One scheduled tone or gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Tone(Element),
    Gap(Gap),
}

impl Token {
    pub fn is_tone(&self) -> bool {
        matches!(self, Token::Tone(_))
    }
}

/// Flat tone/gap schedule for a piece of text.
pub type Timeline = Vec<Token>;

/// Encode text into a timeline of tones and gaps.
///
/// Each element is followed by an intra-character gap, and the gap after the
/// last element of a character becomes an inter-character gap. A space adds an
/// inter-word gap. Characters without a Morse symbol are dropped without
/// leaving a gap. The timeline always ends with one inter-word gap.
pub fn encode(text: &str) -> Timeline {
    let mut timeline = Timeline::new();

    for ch in text.chars() {
        if ch == ' ' {
            timeline.push(Token::Gap(Gap::InterWord));
            continue;
        }

        let symbol = lookup(ch);
        if symbol.is_empty() {
            continue;
        }

        for element in symbol.elements() {
            timeline.push(Token::Tone(element));
            timeline.push(Token::Gap(Gap::IntraChar));
        }

        if let Some(last) = timeline.last_mut() {
            *last = Token::Gap(Gap::InterChar);
        }
    }

    timeline.push(Token::Gap(Gap::InterWord));
    timeline
}
