//! Turns display names into comparable term sets.
//!
//! The pipeline lowercases, splits on UAX #29 word boundaries, drops stop
//! words, splits known compounds ("Deckenleuchte" into "decken" and
//! "leuchte"), folds umlauts and strips common German inflection endings.

use std::collections::BTreeSet;

use unicode_segmentation::UnicodeSegmentation;

const GERMAN_STOPWORDS: &[&str] = &[
    "aber", "alle", "allem", "allen", "aller", "alles", "als", "also", "am", "an", "ander", "andere",
    "anderem", "anderen", "anderer", "anderes", "auch", "auf", "aus", "bei", "bin", "bis", "bist",
    "da", "damit", "dann", "das", "dass", "daß", "dein", "dem", "den", "der", "des", "dich", "die",
    "dies", "diese", "dir", "doch", "dort", "du", "durch", "ein", "eine", "einem", "einen", "einer",
    "eines", "er", "es", "für", "hat", "hier", "ich", "ihr", "im", "in", "ist", "jede", "kein",
    "man", "mit", "nach", "nicht", "noch", "nur", "ob", "oder", "ohne", "sein", "sich", "sie",
    "sind", "so", "über", "um", "und", "uns", "unter", "vom", "von", "vor", "wie", "wir", "zu",
    "zum", "zur",
];

const ENGLISH_STOPWORDS: &[&str] = &["and", "of", "off", "on", "the"];

/// Dictionary words a compound may be split into, in their raw lowercase form.
const COMPOUND_DICTIONARY: &[&str] = &[
    "außen", "balkon", "beleuchtung", "boden", "decke", "decken", "dimmen", "einbau", "flur",
    "garage", "garten", "helligkeit", "innen", "keller", "kinder", "küche", "lampe", "licht",
    "leuchte", "melde", "objekt", "objekte", "rück", "schalten", "schlaf", "sockel", "spiegel",
    "spot", "status", "steh", "strahler", "terrasse", "treppe", "wand", "wert", "wohn", "zimmer",
];

const MIN_WORD_SIZE: usize = 5;
const MIN_SUBWORD_SIZE: usize = 4;
const MAX_SUBWORD_SIZE: usize = 15;

/// Normalizes names into term sets used by the heuristic index.
#[derive(Debug, Clone)]
pub struct TextAnalyzer {
    stopwords: BTreeSet<String>,
    dictionary: BTreeSet<String>,
}

impl Default for TextAnalyzer {
    fn default() -> Self {
        Self::new(
            GERMAN_STOPWORDS.iter().chain(ENGLISH_STOPWORDS).copied(),
            COMPOUND_DICTIONARY.iter().copied(),
        )
    }
}

impl TextAnalyzer {
    pub fn new<'a>(
        stopwords: impl IntoIterator<Item = &'a str>,
        dictionary: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            stopwords: stopwords.into_iter().map(str::to_lowercase).collect(),
            dictionary: dictionary.into_iter().map(str::to_lowercase).collect(),
        }
    }

    pub fn terms(&self, text: &str) -> BTreeSet<String> {
        let lowercase = text.to_lowercase();
        let mut terms = BTreeSet::new();
        for token in lowercase.unicode_words() {
            if self.stopwords.contains(token) {
                continue;
            }
            for subword in self.decompound(token) {
                terms.insert(stem(&normalize(subword)));
            }
            terms.insert(stem(&normalize(token)));
        }
        terms.remove("");
        terms
    }

    /// Longest dictionary word starting at each position of `token`.
    fn decompound<'t>(&self, token: &'t str) -> Vec<&'t str> {
        let boundaries: Vec<usize> = token
            .char_indices()
            .map(|(index, _)| index)
            .chain(std::iter::once(token.len()))
            .collect();
        let char_count = boundaries.len() - 1;
        if char_count < MIN_WORD_SIZE {
            return Vec::new();
        }

        let mut subwords = Vec::new();
        for start in 0..char_count {
            let longest = (MIN_SUBWORD_SIZE..=MAX_SUBWORD_SIZE.min(char_count - start))
                .rev()
                .map(|len| &token[boundaries[start]..boundaries[start + len]])
                .find(|part| part.len() < token.len() && self.dictionary.contains(*part));
            if let Some(part) = longest {
                subwords.push(part);
            }
        }
        subwords
    }
}

/// Folds umlauts and `ae`/`oe`/`ue` spellings, expands `ß`.
pub fn normalize(token: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Consonant,
        Vowel,
        Umlaut,
    }

    let mut out = String::with_capacity(token.len());
    let mut state = State::Consonant;
    for c in token.chars() {
        match c {
            'a' | 'o' => {
                out.push(c);
                state = State::Umlaut;
            }
            'u' => {
                out.push(c);
                state = if state == State::Consonant {
                    State::Umlaut
                } else {
                    State::Vowel
                };
            }
            'e' => {
                if state != State::Umlaut {
                    out.push(c);
                }
                state = State::Vowel;
            }
            'i' | 'q' | 'y' => {
                out.push(c);
                state = State::Vowel;
            }
            'ä' => {
                out.push('a');
                state = State::Vowel;
            }
            'ö' => {
                out.push('o');
                state = State::Vowel;
            }
            'ü' => {
                out.push('u');
                state = State::Vowel;
            }
            'ß' => {
                out.push_str("ss");
                state = State::Consonant;
            }
            _ => {
                out.push(c);
                state = State::Consonant;
            }
        }
    }
    out
}

/// Light stemming: strips plural and case endings, leaves the stem readable.
pub fn stem(token: &str) -> String {
    let mut chars: Vec<char> = token
        .chars()
        .map(|c| match c {
            'ä' | 'à' | 'á' | 'â' => 'a',
            'ö' | 'ò' | 'ó' | 'ô' => 'o',
            'ï' | 'ì' | 'í' | 'î' => 'i',
            'ü' | 'ù' | 'ú' | 'û' => 'u',
            _ => c,
        })
        .collect();
    let len = strip_inflection(&chars);
    chars.truncate(len);
    let len = strip_suffix(&chars);
    chars.truncate(len);
    chars.into_iter().collect()
}

fn st_ending(c: char) -> bool {
    matches!(c, 'b' | 'd' | 'f' | 'g' | 'h' | 'k' | 'l' | 'm' | 'n' | 't')
}

fn strip_inflection(s: &[char]) -> usize {
    let len = s.len();
    if len > 5 && s[len - 3..] == ['e', 'r', 'n'] {
        return len - 3;
    }
    if len > 4 && s[len - 2] == 'e' && matches!(s[len - 1], 'm' | 'n' | 'r' | 's') {
        return len - 2;
    }
    if len > 3 && s[len - 1] == 'e' {
        return len - 1;
    }
    if len > 3 && s[len - 1] == 's' && st_ending(s[len - 2]) {
        return len - 1;
    }
    len
}

fn strip_suffix(s: &[char]) -> usize {
    let len = s.len();
    if len > 5 && s[len - 3..] == ['e', 's', 't'] {
        return len - 3;
    }
    if len > 4 && s[len - 2..] == ['e', 'r'] {
        return len - 2;
    }
    if len > 4 && s[len - 2..] == ['s', 't'] && st_ending(s[len - 3]) {
        return len - 2;
    }
    len
}
