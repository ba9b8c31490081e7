// Chord symbols as structured values.
//
// A chord is carried through the pipeline as root + quality + extension
// rather than as a string, so the melody stage can look up pitch ranges by
// quality and the cadence stage can swap a root without slicing text. The
// textual form (`Display` / `FromStr`) is plain concatenation: `maj7`,
// `bIIImin79`, `Cmaj7`, `G7`.
//
// Also holds the generation tables consumed by progression.rs: the seven
// quality entries with their extension sets, and the borrowed-chord entries.

use crate::error::{ComposeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    fn symbol(self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        }
    }
}

/// Natural pitch letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    pub const ALL: [Letter; 7] = [
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::A,
        Letter::B,
    ];

    fn from_char(c: char) -> Option<Letter> {
        Letter::ALL
            .into_iter()
            .find(|l| l.as_char() == c)
    }

    fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }
}

/// Chord root: an absolute pitch letter or a scale degree relative to the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Root {
    Letter(Letter, Accidental),
    /// `step` is 1-7, written as a roman numeral.
    Degree(u8, Accidental),
}

const NUMERALS: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];

impl Root {
    pub fn letter(letter: Letter) -> Self {
        Root::Letter(letter, Accidental::Natural)
    }

    pub fn flat_degree(step: u8) -> Self {
        Root::Degree(step, Accidental::Flat)
    }

    pub fn degree(step: u8) -> Self {
        Root::Degree(step, Accidental::Natural)
    }

    /// Parse a root from the front of `s`; returns the root and the bytes consumed.
    fn parse_prefix(s: &str) -> Option<(Root, usize)> {
        let mut chars = s.chars();
        let first = chars.next()?;
        if let Some(letter) = Letter::from_char(first) {
            let accidental = match chars.next() {
                Some('#') => Accidental::Sharp,
                Some('b') => Accidental::Flat,
                _ => Accidental::Natural,
            };
            let len = 1 + accidental.symbol().len();
            return Some((Root::Letter(letter, accidental), len));
        }

        let (accidental, rest) = match first {
            'b' => (Accidental::Flat, &s[1..]),
            '#' => (Accidental::Sharp, &s[1..]),
            _ => (Accidental::Natural, s),
        };
        // Longest numeral first so "III" is not read as "I".
        let mut best: Option<(u8, usize)> = None;
        for (i, numeral) in NUMERALS.iter().enumerate() {
            if rest.starts_with(numeral) && best.is_none_or(|(_, len)| numeral.len() > len) {
                best = Some((i as u8 + 1, numeral.len()));
            }
        }
        let (step, len) = best?;
        Some((
            Root::Degree(step, accidental),
            accidental.symbol().len() + len,
        ))
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Root::Letter(letter, acc) => write!(f, "{}{}", letter.as_char(), acc.symbol()),
            Root::Degree(step, acc) => {
                let numeral = NUMERALS
                    .get((*step as usize).wrapping_sub(1))
                    .copied()
                    .unwrap_or("?");
                write!(f, "{}{}", acc.symbol(), numeral)
            }
        }
    }
}

/// Harmonic quality. `Major` is the plain triad and is spelled as nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    Major,
    Maj7,
    Min7,
    Dom7,
    Min7b5,
    Min6,
    Min11,
    Dim7,
    Aug7,
}

impl Quality {
    /// Spelled qualities, longest spelling first for prefix matching.
    const SPELLED: [Quality; 8] = [
        Quality::Min7b5,
        Quality::Min11,
        Quality::Maj7,
        Quality::Min7,
        Quality::Dom7,
        Quality::Min6,
        Quality::Dim7,
        Quality::Aug7,
    ];

    pub fn spelling(self) -> &'static str {
        match self {
            Quality::Major => "",
            Quality::Maj7 => "maj7",
            Quality::Min7 => "min7",
            Quality::Dom7 => "dom7",
            Quality::Min7b5 => "min7b5",
            Quality::Min6 => "min6",
            Quality::Min11 => "min11",
            Quality::Dim7 => "dim7",
            Quality::Aug7 => "aug7",
        }
    }

    fn parse_prefix(s: &str) -> (Quality, usize) {
        Quality::SPELLED
            .into_iter()
            .find(|q| s.starts_with(q.spelling()))
            .map(|q| (q, q.spelling().len()))
            .unwrap_or((Quality::Major, 0))
    }
}

/// Serialized as its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ChordSymbol {
    pub root: Option<Root>,
    pub quality: Quality,
    /// Extension suffix such as `9`, `maj7#11`, `b13`; empty for none.
    pub extension: String,
}

impl ChordSymbol {
    pub fn new(root: Option<Root>, quality: Quality, extension: &str) -> Self {
        ChordSymbol {
            root,
            quality,
            extension: extension.to_string(),
        }
    }

    /// Same chord with a different root; quality and extension are kept.
    pub fn with_root(&self, root: Root) -> Self {
        ChordSymbol {
            root: Some(root),
            ..self.clone()
        }
    }
}

impl fmt::Display for ChordSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(root) = &self.root {
            write!(f, "{root}")?;
        }
        write!(f, "{}{}", self.quality.spelling(), self.extension)
    }
}

impl FromStr for ChordSymbol {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ComposeError::InvalidInput("empty chord symbol".into()));
        }
        let (root, root_len) = match Root::parse_prefix(s) {
            Some((root, len)) => (Some(root), len),
            None => (None, 0),
        };
        let rest = &s[root_len..];
        let (quality, quality_len) = Quality::parse_prefix(rest);
        let extension = &rest[quality_len..];
        if extension.chars().any(char::is_whitespace) {
            return Err(ComposeError::InvalidInput(format!(
                "chord symbol '{s}' contains whitespace"
            )));
        }
        Ok(ChordSymbol::new(root, quality, extension))
    }
}

impl From<ChordSymbol> for String {
    fn from(chord: ChordSymbol) -> String {
        chord.to_string()
    }
}

impl TryFrom<String> for ChordSymbol {
    type Error = ComposeError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// An ordered chord sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChordProgression {
    pub chords: Vec<ChordSymbol>,
}

impl ChordProgression {
    pub fn new(chords: Vec<ChordSymbol>) -> Self {
        ChordProgression { chords }
    }

    /// Parse each token with `ChordSymbol::from_str`.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let chords = tokens
            .iter()
            .map(|t| t.as_ref().parse())
            .collect::<Result<Vec<_>>>()?;
        Ok(ChordProgression { chords })
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }
}

impl fmt::Display for ChordProgression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, chord) in self.chords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{chord}")?;
        }
        write!(f, "]")
    }
}

// ---------------------------------------------------------------------------
// Generation tables
// ---------------------------------------------------------------------------

/// One row of the quality table: a (possibly degree-rooted) quality and the
/// extensions it may carry. The empty extension means "none".
#[derive(Debug, Clone, Copy)]
pub struct QualityEntry {
    pub root: Option<Root>,
    pub quality: Quality,
    pub extensions: &'static [&'static str],
}

pub static QUALITY_TABLE: [QualityEntry; 7] = [
    QualityEntry {
        root: None,
        quality: Quality::Maj7,
        extensions: &["", "9", "maj7#11", "13"],
    },
    QualityEntry {
        root: None,
        quality: Quality::Min7,
        extensions: &["", "9", "11", "b13"],
    },
    QualityEntry {
        root: None,
        quality: Quality::Dom7,
        extensions: &["", "9", "11", "13"],
    },
    QualityEntry {
        root: None,
        quality: Quality::Min7b5,
        extensions: &["", "b9", "11", "b13"],
    },
    QualityEntry {
        root: Some(Root::Degree(3, Accidental::Flat)),
        quality: Quality::Min7,
        extensions: &["", "9", "11", "b13"],
    },
    QualityEntry {
        root: Some(Root::Degree(2, Accidental::Flat)),
        quality: Quality::Dom7,
        extensions: &["", "9", "11", "13"],
    },
    QualityEntry {
        root: Some(Root::Degree(6, Accidental::Flat)),
        quality: Quality::Dom7,
        extensions: &["", "9", "11", "13"],
    },
];

/// Borrowed chords: roots outside the key, always without extension.
pub static BORROWED_TABLE: [(Root, Quality); 3] = [
    (Root::Degree(2, Accidental::Flat), Quality::Dom7),
    (Root::Degree(3, Accidental::Flat), Quality::Min7),
    (Root::Degree(6, Accidental::Flat), Quality::Min7),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_concatenates_parts() {
        let chord = ChordSymbol::new(Some(Root::flat_degree(3)), Quality::Min7, "9");
        assert_eq!(chord.to_string(), "bIIImin79");
        let plain = ChordSymbol::new(None, Quality::Maj7, "");
        assert_eq!(plain.to_string(), "maj7");
    }

    #[test]
    fn parses_letter_rooted_chords() {
        let chord: ChordSymbol = "Cmaj7".parse().unwrap();
        assert_eq!(chord.root, Some(Root::letter(Letter::C)));
        assert_eq!(chord.quality, Quality::Maj7);
        assert_eq!(chord.extension, "");

        let g7: ChordSymbol = "G7".parse().unwrap();
        assert_eq!(g7.root, Some(Root::letter(Letter::G)));
        assert_eq!(g7.quality, Quality::Major);
        assert_eq!(g7.extension, "7");

        let fsharp: ChordSymbol = "F#min7b5".parse().unwrap();
        assert_eq!(fsharp.root, Some(Root::Letter(Letter::F, Accidental::Sharp)));
        assert_eq!(fsharp.quality, Quality::Min7b5);
    }

    #[test]
    fn parses_degree_rooted_chords() {
        let chord: ChordSymbol = "bIIImin7b13".parse().unwrap();
        assert_eq!(chord.root, Some(Root::flat_degree(3)));
        assert_eq!(chord.quality, Quality::Min7);
        assert_eq!(chord.extension, "b13");

        let vi: ChordSymbol = "bVIdom7".parse().unwrap();
        assert_eq!(vi.root, Some(Root::flat_degree(6)));
        assert_eq!(vi.quality, Quality::Dom7);
    }

    #[test]
    fn every_table_symbol_round_trips() {
        for entry in QUALITY_TABLE {
            for ext in entry.extensions {
                let chord = ChordSymbol::new(entry.root, entry.quality, ext);
                let parsed: ChordSymbol = chord.to_string().parse().unwrap();
                assert_eq!(parsed, chord, "round trip failed for {chord}");
            }
        }
        for (root, quality) in BORROWED_TABLE {
            let chord = ChordSymbol::new(Some(root), quality, "");
            let parsed: ChordSymbol = chord.to_string().parse().unwrap();
            assert_eq!(parsed, chord);
        }
    }

    #[test]
    fn empty_symbol_is_rejected() {
        let err = "  ".parse::<ChordSymbol>().unwrap_err();
        assert!(matches!(err, ComposeError::InvalidInput(_)));
    }

    #[test]
    fn with_root_keeps_quality_and_extension() {
        let chord: ChordSymbol = "bIIdom79".parse().unwrap();
        let moved = chord.with_root(Root::letter(Letter::E));
        assert_eq!(moved.to_string(), "Edom79");
    }

    #[test]
    fn progression_serializes_as_symbol_list() {
        let prog = ChordProgression::parse(&["bIIImin7", "Cmaj7"]).unwrap();
        let json = serde_json::to_string(&prog).unwrap();
        assert_eq!(json, r#"["bIIImin7","Cmaj7"]"#);
        let back: ChordProgression = serde_json::from_str(&json).unwrap();
        assert_eq!(back, prog);
    }

    #[test]
    fn progression_display() {
        let prog = ChordProgression::parse(&["Cmaj7", "Dmin7", "G7"]).unwrap();
        assert_eq!(prog.to_string(), "[Cmaj7, Dmin7, G7]");
        assert_eq!(prog.len(), 3);
    }
}
