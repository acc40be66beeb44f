//! Folder-prefix removal for rendered alignment text.
//!
//! Single-sequence files written by the FASTA driver carry `<folder>_<id>`
//! headers, so an aligner run over them reports names like `BB11001_1aab_`.
//! [`PrefixStripper`] turns those back into `1aab_`. It works on text after
//! serialization and knows nothing about MSF structure.

use regex::Regex;

/// Removes `<prefix>_` from the start of every whitespace-delimited token.
#[derive(Debug, Clone)]
pub struct PrefixStripper {
    pattern: Regex,
}

impl PrefixStripper {
    /// Builds a stripper for `prefix`, matched literally.
    pub fn new(prefix: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(r"(^|\s){}_(\S+)", regex::escape(prefix)))?;
        Ok(Self { pattern })
    }

    /// Applies the substitution line by line; line breaks are preserved.
    pub fn apply(&self, text: &str) -> String {
        text.split('\n')
            .map(|line| self.pattern.replace_all(line, "${1}${2}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Convenience wrapper around [`PrefixStripper`].
pub fn strip_prefix(text: &str, prefix: &str) -> Result<String, regex::Error> {
    Ok(PrefixStripper::new(prefix)?.apply(text))
}
