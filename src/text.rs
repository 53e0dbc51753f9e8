// text.rs

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordStats {
    pub chars: usize,
    pub lines: usize,
    pub words: usize,
    pub unique: usize,
}

impl WordStats {
    pub fn rows(&self) -> [(&'static str, usize); 4] {
        [
            ("chars", self.chars),
            ("lines", self.lines),
            ("words", self.words),
            ("unique", self.unique),
        ]
    }
}

/// A final line without a trailing newline still counts as a line.
pub fn word_stats(text: &str) -> WordStats {
    let words: Vec<&str> = WORD.find_iter(text).map(|m| m.as_str()).collect();
    let unique: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
    let newlines = text.matches('\n').count();
    let lines = newlines + usize::from(!text.is_empty() && !text.ends_with('\n'));
    WordStats {
        chars: text.chars().count(),
        lines,
        words: words.len(),
        unique: unique.len(),
    }
}

/// Ignores case and anything that is not an ASCII letter or digit.
pub fn is_palindrome(s: &str) -> bool {
    let cleaned: Vec<char> = s
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    cleaned.iter().eq(cleaned.iter().rev())
}

fn signature(word: &str) -> Vec<char> {
    let mut letters: Vec<char> = word
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_lowercase)
        .collect();
    letters.sort_unstable();
    letters
}

/// Candidates built from the same letters as `word`, excluding `word` itself.
pub fn anagrams<'a, I>(word: &str, candidates: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let target = signature(word);
    let word_lower = word.to_lowercase();
    candidates
        .into_iter()
        .filter(|c| signature(c) == target && c.to_lowercase() != word_lower)
        .collect()
}
