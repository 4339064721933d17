//! Era keys and era inference from dataset file names.

use std::{borrow::Borrow, fmt::Display};

use lazy_static::lazy_static;
use regex::Regex;

/// Literal prefix carried by every normalized era key.
pub const ERA_PREFIX: &str = "Run";

lazy_static! {
    static ref ERA_IN_PATH: Regex =
        Regex::new(r"/store/(?:data|mc)/(Run20\d{2}[A-I])/").expect("static era pattern");
}

/// Accept `2024F` or `Run2024F` and return `Run2024F`.
///
/// Surrounding whitespace is trimmed first and an empty input stays empty.
pub fn normalize_era_key(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if raw.starts_with(ERA_PREFIX) {
        raw.to_string()
    } else {
        format!("{ERA_PREFIX}{raw}")
    }
}

/// Pull the first `Run20XX[A-I]` directory segment out of a list of logical file names,
/// e.g. `/store/data/Run2024G/ScoutingPFRun3/...`. Returns an empty string if none match.
pub fn infer_era_from_paths<I, S>(paths: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    paths
        .into_iter()
        .find_map(|p| {
            ERA_IN_PATH
                .captures(p.as_ref())
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        })
        .unwrap_or_default()
}

/// A normalized era identifier such as `Run2024G`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EraKey(String);

impl EraKey {
    /// Normalize `raw` into an era key (see [`normalize_era_key`]).
    pub fn new(raw: &str) -> Self {
        Self(normalize_era_key(raw))
    }
    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
    /// True for the "no key" value.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    /// Four-digit year, when the key has the conventional `Run<YYYY><L>` shape.
    pub fn year(&self) -> Option<u16> {
        let (year, _) = self.split_conventional()?;
        year.parse().ok()
    }
    /// Trailing era letter, when the key has the conventional `Run<YYYY><L>` shape.
    pub fn letter(&self) -> Option<char> {
        self.split_conventional().map(|(_, letter)| letter)
    }
    fn split_conventional(&self) -> Option<(&str, char)> {
        let rest = self.0.strip_prefix(ERA_PREFIX)?;
        if rest.len() != 5 {
            return None;
        }
        let (year, letter) = rest.split_at(4);
        let letter = letter.chars().next()?;
        (year.chars().all(|c| c.is_ascii_digit()) && letter.is_ascii_uppercase())
            .then_some((year, letter))
    }
}

impl Display for EraKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EraKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<EraKey> for String {
    fn from(value: EraKey) -> Self {
        value.0
    }
}

impl AsRef<str> for EraKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EraKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}
