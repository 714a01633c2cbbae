//! Entry segmentation with escalating strategies.
//!
//! A year block is split into candidate entries. The default strategy treats
//! blank-line-separated paragraphs as entries; when a paragraph turns out to
//! bundle several entries the pipeline re-segments that paragraph with a
//! line-oriented strategy, keeping indented continuation lines attached.

use std::fmt;

/// Segmentation heuristic, ordered from most to least permissive about
/// where an entry ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strategy {
    /// Level 0: an entry runs until the next blank line.
    Paragraph,
    /// Level 1: an entry ends at a line break followed by a blank line or an
    /// unindented line.
    Line,
    /// Level 2: same boundaries as [`Strategy::Line`]; the last level tried
    /// before a block is given up.
    LineRetry,
}

impl Strategy {
    /// First level at which the pipeline stops escalating; no strategy exists
    /// at or above it.
    pub const TERMINAL_LEVEL: u8 = 3;

    /// Strategy for a numeric level, or `None` once the terminal level is reached.
    #[must_use]
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Paragraph),
            1 => Some(Self::Line),
            2 => Some(Self::LineRetry),
            _ => None,
        }
    }

    #[must_use]
    pub fn level(self) -> u8 {
        match self {
            Self::Paragraph => 0,
            Self::Line => 1,
            Self::LineRetry => 2,
        }
    }

    /// Next strategy to try after this one, if any.
    #[must_use]
    pub fn escalate(self) -> Option<Self> {
        Self::from_level(self.level() + 1)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paragraph => write!(f, "paragraph"),
            Self::Line => write!(f, "line"),
            Self::LineRetry => write!(f, "line-retry"),
        }
    }
}

/// Prepared block text ready for segmentation.
///
/// Whitespace-only lines are cleared and two newlines are appended so every
/// candidate has a terminating boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmenter {
    text: String,
}

impl Segmenter {
    #[must_use]
    pub fn new(block: &str) -> Self {
        let mut text = block
            .split('\n')
            .map(|line| if line.trim().is_empty() { "" } else { line })
            .collect::<Vec<_>>()
            .join("\n");
        text.push_str("\n\n");
        Self { text }
    }

    /// Lazily yields candidate entries. Each call scans from the start.
    #[must_use]
    pub fn segments(&self, strategy: Strategy) -> Segments<'_> {
        Segments {
            text: &self.text,
            position: 0,
            strategy,
        }
    }
}

/// Iterator over candidate entries of a [`Segmenter`].
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    text: &'a str,
    position: usize,
    strategy: Strategy,
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.text.get(self.position..)?;
        let start = self.position + rest.find(|ch: char| !ch.is_whitespace())?;

        let (end, resume) = match self.strategy {
            Strategy::Paragraph => {
                let end = start + self.text[start..].find("\n\n")?;
                (end, end + 2)
            }
            Strategy::Line | Strategy::LineRetry => {
                let end = line_entry_end(self.text, start)?;
                (end, end + 1)
            }
        };

        self.position = resume;
        Some(&self.text[start..end])
    }
}

/// Finds the first line break at or after `start` that is followed by
/// another line break or by a non-whitespace character.
fn line_entry_end(text: &str, start: usize) -> Option<usize> {
    text[start..]
        .match_indices('\n')
        .map(|(offset, _)| start + offset)
        .find(|&index| {
            text[index + 1..]
                .chars()
                .next()
                .is_some_and(|next| next == '\n' || !next.is_whitespace())
        })
}

/// Collects the candidates of `block` under `strategy`.
#[must_use]
pub fn segment(block: &str, strategy: Strategy) -> Vec<String> {
    Segmenter::new(block)
        .segments(strategy)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BLOCK: &str = "\
First Title, by Someone                                  101
 [Subtitle: Part One]

Second Title, by Other                                    102
Third Title, by Third                                     103
   \t
Fourth Title                                              104
";

    #[test]
    fn test_strategy_levels_round_trip() {
        for level in 0..Strategy::TERMINAL_LEVEL {
            let strategy = Strategy::from_level(level).unwrap();
            assert_eq!(strategy.level(), level);
        }
        assert!(Strategy::from_level(Strategy::TERMINAL_LEVEL).is_none());
    }

    #[test]
    fn test_strategy_escalation_stops_after_level_two() {
        assert_eq!(Strategy::Paragraph.escalate(), Some(Strategy::Line));
        assert_eq!(Strategy::Line.escalate(), Some(Strategy::LineRetry));
        assert_eq!(Strategy::LineRetry.escalate(), None);
    }

    #[test]
    fn test_segmenter_clears_whitespace_only_lines() {
        let segmenter = Segmenter::new("a\n  \t \nb");
        assert_eq!(segmenter.text, "a\n\nb\n\n");
    }

    #[test]
    fn test_paragraph_strategy_splits_on_blank_lines() {
        let candidates = segment(BLOCK, Strategy::Paragraph);
        assert_eq!(candidates.len(), 3);
        assert!(candidates[0].starts_with("First Title"));
        assert!(candidates[0].ends_with("[Subtitle: Part One]"));
        assert!(candidates[1].contains("Second Title"));
        assert!(candidates[1].contains("Third Title"));
        assert!(candidates[2].starts_with("Fourth Title"));
    }

    #[test]
    fn test_line_strategy_keeps_indented_continuations() {
        let candidates = segment(BLOCK, Strategy::Line);
        assert_eq!(candidates.len(), 4);
        assert!(candidates[0].contains("[Subtitle: Part One]"));
        assert!(candidates[1].starts_with("Second Title"));
        assert!(!candidates[1].contains("Third Title"));
        assert!(candidates[2].starts_with("Third Title"));
    }

    #[test]
    fn test_line_retry_matches_line_strategy() {
        assert_eq!(
            segment(BLOCK, Strategy::Line),
            segment(BLOCK, Strategy::LineRetry)
        );
    }

    #[test]
    fn test_segments_are_deterministic_across_calls() {
        let segmenter = Segmenter::new(BLOCK);
        let first: Vec<_> = segmenter.segments(Strategy::Paragraph).collect();
        let second: Vec<_> = segmenter.segments(Strategy::Paragraph).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_segment_empty_block_yields_nothing() {
        assert!(segment("", Strategy::Paragraph).is_empty());
        assert!(segment("   \n\n  ", Strategy::Line).is_empty());
    }

    #[test]
    fn test_segment_without_trailing_newline() {
        let candidates = segment("Only Entry 5", Strategy::Line);
        assert_eq!(candidates, vec!["Only Entry 5".to_string()]);
    }
}
