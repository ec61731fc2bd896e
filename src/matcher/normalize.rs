use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Canonical form of an ingredient name.
///
/// Two ingredient names denote the same ingredient iff their tokens are equal.
/// A token may be empty (all-whitespace input); callers drop those before
/// indexing or querying.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize an ingredient name: trim, lower-case, strip diacritics,
/// collapse internal whitespace.
///
/// No stemming or plural handling: "tomate" and "tomates" stay distinct.
pub fn normalize(raw: &str) -> Token {
    let lowered = raw.trim().to_lowercase();

    // Decompose so accents become standalone combining marks, drop them,
    // then recompose what is left (Hangul syllables have no marks to drop)
    let stripped: String = lowered
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .nfc()
        .collect();

    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    Token(collapsed)
}

/// Normalize a list of names into a set of non-empty tokens.
pub fn normalize_all<I, S>(names: I) -> std::collections::BTreeSet<Token>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| normalize(name.as_ref()))
        .filter(|token| !token.is_empty())
        .collect()
}
