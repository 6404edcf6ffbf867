//! Key allocation for the three ordering scopes of a work plan
//!
//! Goals are keyed by a letter unique within their work plan, objectives by a
//! positive number unique within their goal, and outputs by a letter unique
//! within their objective. Everything here is a pure function over the keys
//! currently held by siblings; callers fetch the sibling set from the store.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::plan::EntityId;

/// Maximum number of letter-keyed siblings (goals per work plan, outputs per objective)
pub const LETTER_CAPACITY: usize = 26;

/// Errors raised while parsing a proposed key
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("{0} is required")]
    Empty(ScopeKind),
    #[error("'{0}' is not a single letter A-Z")]
    NotALetter(String),
    #[error("'{0}' is not a positive objective number")]
    NotANumber(String),
}

/// A single uppercase letter A-Z
///
/// Parsing accepts either case and always stores the uppercase form, so
/// equality between two `Letter`s is the case-insensitive comparison the
/// uniqueness rules ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Letter(char);

impl Letter {
    /// Build a letter from a char, normalizing to uppercase
    pub fn new(c: char) -> Option<Self> {
        if c.is_ascii_alphabetic() {
            Some(Self(c.to_ascii_uppercase()))
        } else {
            None
        }
    }

    pub fn as_char(self) -> char {
        self.0
    }

    /// All 26 letters in alphabetical order
    pub fn alphabet() -> impl Iterator<Item = Letter> {
        ('A'..='Z').map(Letter)
    }

    /// Parse an optional letter: blank input means "unset"
    pub fn parse_optional(raw: &str) -> Result<Option<Self>, KeyError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed.parse().map(Some)
    }
}

impl FromStr for Letter {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Letter::new(c).ok_or_else(|| KeyError::NotALetter(s.to_string())),
            _ => Err(KeyError::NotALetter(s.to_string())),
        }
    }
}

impl TryFrom<String> for Letter {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Letter> for String {
    fn from(letter: Letter) -> Self {
        letter.0.to_string()
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three key families of the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    GoalLetter,
    ObjectiveNumber,
    OutputLetter,
}

impl ScopeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScopeKind::GoalLetter => "goal_letter",
            ScopeKind::ObjectiveNumber => "objective_number",
            ScopeKind::OutputLetter => "output_letter",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScopeKind::GoalLetter => "Goal letter",
            ScopeKind::ObjectiveNumber => "Objective number",
            ScopeKind::OutputLetter => "Output letter",
        };
        f.write_str(label)
    }
}

impl FromStr for ScopeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "goal_letter" => Ok(ScopeKind::GoalLetter),
            "objective_number" => Ok(ScopeKind::ObjectiveNumber),
            "output_letter" => Ok(ScopeKind::OutputLetter),
            other => Err(format!(
                "Invalid scope '{}'. Valid scopes: goal_letter, objective_number, output_letter",
                other
            )),
        }
    }
}

/// Parse a proposed objective number; zero and blanks are rejected
pub fn parse_objective_number(raw: &str) -> Result<u32, KeyError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(KeyError::Empty(ScopeKind::ObjectiveNumber));
    }
    match trimmed.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(KeyError::NotANumber(raw.to_string())),
    }
}

/// First letter A-Z not in `used`
///
/// When all 26 letters are taken this returns 'A', which collides. Callers
/// that create entities must check [`LETTER_CAPACITY`] first.
pub fn suggest_next_letter(used: &BTreeSet<Letter>) -> Letter {
    Letter::alphabet()
        .find(|letter| !used.contains(letter))
        .unwrap_or(Letter('A'))
}

/// Smallest positive integer not in `used`
pub fn suggest_next_number(used: &BTreeSet<u32>) -> u32 {
    // At most used.len() numbers can be taken, so a gap exists at or below len + 1.
    let upper = u32::try_from(used.len()).unwrap_or(u32::MAX).saturating_add(1);
    (1..=upper).find(|n| !used.contains(n)).unwrap_or(1)
}

/// Check whether `key` is free among `siblings`, ignoring the entity `exclude`
///
/// `exclude` is the id of the entity being updated, so that re-saving an
/// entity under its own key is not reported as a duplicate.
pub fn is_unique<K, I>(key: &K, siblings: I, exclude: Option<EntityId>) -> bool
where
    K: PartialEq,
    I: IntoIterator<Item = (EntityId, K)>,
{
    !siblings
        .into_iter()
        .any(|(id, sibling_key)| Some(id) != exclude && sibling_key == *key)
}

/// Every letter used more than once, in order of first repetition
///
/// Unset letters are skipped.
pub fn duplicate_letters<I>(letters: I) -> Vec<Letter>
where
    I: IntoIterator<Item = Option<Letter>>,
{
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for letter in letters.into_iter().flatten() {
        if !seen.insert(letter) && !duplicates.contains(&letter) {
            duplicates.push(letter);
        }
    }
    duplicates
}
