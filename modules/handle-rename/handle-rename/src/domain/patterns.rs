//! Reference patterns for one handle.
//!
//! Three forms are recognised, always applied in this order:
//! 1. mention: `@alice`
//! 2. path link: `<prefix>/alice` (e.g. `/pagina/alice`)
//! 3. bare word: `alice`
//!
//! The `regex` crate has no look-around, so boundaries are checked by hand against the
//! handle charset. A match is only accepted when the character after it (and for bare
//! words, also the one before it) is not a handle character. Text already rewritten to a
//! new handle that contains the old one (`alice` -> `alice_2024`) is therefore never
//! matched a second time.

use regex::{Regex, RegexBuilder};

use crate::domain::error::DomainError;
use crate::domain::handle::is_handle_char;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Mention,
    PathLink,
    BareWord,
}

impl PatternKind {
    pub const ORDER: [PatternKind; 3] = [
        PatternKind::Mention,
        PatternKind::PathLink,
        PatternKind::BareWord,
    ];

    fn needs_leading_boundary(self) -> bool {
        matches!(self, PatternKind::BareWord)
    }
}

/// Compiled patterns and SQL needles for an old handle.
#[derive(Debug, Clone)]
pub struct ReferencePatterns {
    handle: String,
    compiled: Vec<(PatternKind, Regex)>,
    needles: Vec<String>,
}

impl ReferencePatterns {
    pub fn new(handle: &str, path_prefix: &str, case_sensitive: bool) -> Result<Self, DomainError> {
        let escaped = regex::escape(handle);
        let prefix = path_prefix.trim_end_matches('/');

        let mut compiled = Vec::with_capacity(PatternKind::ORDER.len());
        for kind in PatternKind::ORDER {
            // group 1 is the lead kept verbatim in the replacement
            let source = match kind {
                PatternKind::Mention => format!("(@){escaped}"),
                PatternKind::PathLink => format!("({}/){escaped}", regex::escape(prefix)),
                PatternKind::BareWord => format!("(){escaped}"),
            };
            let re = RegexBuilder::new(&source)
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(|e| DomainError::validation("old_handle", e.to_string()))?;
            compiled.push((kind, re));
        }

        let lowered = handle.to_lowercase();
        let needles = vec![
            format!("@{lowered}"),
            format!("{}/{lowered}", prefix.to_lowercase()),
            lowered,
        ];

        Ok(Self {
            handle: handle.to_owned(),
            compiled,
            needles,
        })
    }

    #[must_use]
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Lower-cased literal substrings for the SQL `LIKE` prefilter.
    #[must_use]
    pub fn needles(&self) -> &[String] {
        &self.needles
    }

    /// Apply every pattern in order. Returns `None` when the text is unchanged.
    #[must_use]
    pub fn rewrite(&self, text: &str, new_handle: &str) -> Option<String> {
        let mut current = text.to_owned();
        for (kind, re) in &self.compiled {
            if let Some(next) = replace_bounded(re, *kind, &current, new_handle) {
                current = next;
            }
        }
        (current != text).then_some(current)
    }

    /// Whether any pattern matches `text` with proper boundaries.
    #[must_use]
    pub fn is_referenced_in(&self, text: &str) -> bool {
        self.compiled
            .iter()
            .any(|(kind, re)| next_bounded_match(re, *kind, text, 0).is_some())
    }
}

/// Next match at or after `from` that satisfies the boundary rules of `kind`.
/// Returns `(start, end, lead_end)`.
fn next_bounded_match(
    re: &Regex,
    kind: PatternKind,
    text: &str,
    mut from: usize,
) -> Option<(usize, usize, usize)> {
    while from <= text.len() {
        let caps = re.captures_at(text, from)?;
        let whole = caps.get(0)?;
        let lead_end = caps.get(1).map_or(whole.start(), |m| m.end());

        let trailing_ok = text[whole.end()..]
            .chars()
            .next()
            .is_none_or(|c| !is_handle_char(c));
        let leading_ok = !kind.needs_leading_boundary()
            || text[..whole.start()]
                .chars()
                .next_back()
                .is_none_or(|c| !is_handle_char(c));

        if trailing_ok && leading_ok {
            return Some((whole.start(), whole.end(), lead_end));
        }
        from = whole.start()
            + text[whole.start()..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
    }
    None
}

fn replace_bounded(re: &Regex, kind: PatternKind, text: &str, new_handle: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut from = 0;
    let mut replaced = false;

    while let Some((start, end, lead_end)) = next_bounded_match(re, kind, text, from) {
        out.push_str(&text[last..start]);
        out.push_str(&text[start..lead_end]);
        out.push_str(new_handle);
        last = end;
        from = end;
        replaced = true;
    }

    if !replaced {
        return None;
    }
    out.push_str(&text[last..]);
    Some(out)
}
