//! Locale-style string ordering for country names.
//!
//! Compares the way a root-locale collator does, level by level: base
//! characters first (ignoring accents and case), then accents, then case with
//! lower case sorting first, and finally raw code points so that the order is
//! total. On the base level whitespace sorts before punctuation, punctuation
//! before other symbols, symbols before digits and digits before letters.

use std::cmp::Ordering;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Root collation order of the common punctuation marks.
const PUNCTUATION_ORDER: &[char] = &[
    '_', '-', '\u{2010}', '\u{2013}', '\u{2014}', ',', ';', ':', '!', '¡', '?', '¿', '.',
    '\u{2026}', '\'', '\u{2018}', '\u{2019}', '"', '\u{201C}', '\u{201D}', '(', ')', '[', ']',
    '{', '}',
];

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Primary {
    Space,
    Punctuation(usize),
    Symbol(char),
    Digit(u32),
    Letter(char),
}

/// Letters that do not decompose under NFD but collate with a Latin base.
fn fold_letter(c: char) -> Option<&'static str> {
    match c {
        'ø' => Some("o"),
        'æ' => Some("ae"),
        'œ' => Some("oe"),
        'ß' => Some("ss"),
        'ł' => Some("l"),
        'đ' | 'ð' => Some("d"),
        'þ' => Some("th"),
        'ı' => Some("i"),
        _ => None,
    }
}

fn classify(c: char) -> Primary {
    if c.is_whitespace() {
        Primary::Space
    } else if let Some(index) = PUNCTUATION_ORDER.iter().position(|p| *p == c) {
        Primary::Punctuation(index)
    } else if let Some(digit) = c.to_digit(10) {
        Primary::Digit(digit)
    } else if c.is_alphanumeric() {
        Primary::Letter(c)
    } else {
        Primary::Symbol(c)
    }
}

/// Precomputed comparison key; ordering keys equals ordering the strings
/// with [`locale_compare`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollationKey {
    primary: Vec<Primary>,
    accents: Vec<char>,
    case: Vec<u8>,
    raw: String,
}

pub fn collation_key(s: &str) -> CollationKey {
    let mut primary = Vec::with_capacity(s.len());
    let mut accents = Vec::new();
    let mut case = Vec::with_capacity(s.len());

    for c in s.nfd() {
        if is_combining_mark(c) {
            accents.push(c);
            continue;
        }
        case.push(u8::from(c.is_uppercase()));
        for lower in c.to_lowercase() {
            match fold_letter(lower) {
                Some(folded) => primary.extend(folded.chars().map(Primary::Letter)),
                None => primary.push(classify(lower)),
            }
        }
    }

    CollationKey {
        primary,
        accents,
        case,
        raw: s.to_string(),
    }
}

pub fn locale_compare(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b))
}
