use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::GameError;

static ALPHABET_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/alphabet");

/// A single letter: the glyph shown as an option and the transliteration
/// shown as the prompt. Two letters are the same letter when their glyphs
/// match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Letter {
    pub arabic: String,
    pub latin: String,
}

impl Letter {
    pub fn new(arabic: impl Into<String>, latin: impl Into<String>) -> Self {
        Self {
            arabic: arabic.into(),
            latin: latin.into(),
        }
    }

    pub fn same_glyph(&self, other: &Letter) -> bool {
        self.arabic == other.arabic
    }
}

#[derive(Deserialize)]
struct AlphabetFile {
    #[allow(dead_code)]
    name: String,
    letters: Vec<Letter>,
}

/// Immutable set of letters a session draws from. Never empty and never
/// holds the same glyph twice.
#[derive(Debug, Clone, PartialEq)]
pub struct LetterPool {
    letters: Vec<Letter>,
}

impl LetterPool {
    pub fn new(letters: Vec<Letter>) -> Result<Self, GameError> {
        if letters.is_empty() {
            return Err(GameError::EmptyPool);
        }

        let mut seen = HashSet::new();
        for letter in &letters {
            if !seen.insert(letter.arabic.as_str()) {
                return Err(GameError::DuplicateLetter(letter.arabic.clone()));
            }
        }

        Ok(Self { letters })
    }

    /// The 28 letters of the Arabic alphabet bundled with the binary.
    pub fn builtin() -> Result<Self, GameError> {
        Self::embedded("arabic")
    }

    pub fn embedded(name: &str) -> Result<Self, GameError> {
        let file_name = format!("{name}.json");
        let contents = ALPHABET_DIR
            .get_file(&file_name)
            .and_then(|f| f.contents_utf8())
            .ok_or(GameError::MissingLetterData(file_name))?;

        Self::from_json(contents)
    }

    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let file: AlphabetFile = serde_json::from_str(json)?;
        Self::new(file.letters)
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn letters(&self) -> &[Letter] {
        &self.letters
    }
}
