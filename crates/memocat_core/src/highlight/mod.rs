//! Regex-driven per-line syntax highlighting for memo dialects.
//!
//! # Responsibility
//! - Map each memo line to styled spans using a static rule table.
//! - Resolve overlapping rule matches: later rules override earlier ones.
//!
//! # Invariants
//! - Rules are applied in declaration order; the last matching rule wins on
//!   every overlapped byte.
//! - Returned spans never overlap and lie within the line.
//! - Span boundaries are byte offsets on UTF-8 character boundaries.

use crate::model::MemoKind;
use once_cell::sync::Lazy;
use regex::Regex;

/// Style classes of the shell-memo dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightStyle {
    /// `$ command` lines.
    Command,
    /// `* header` lines.
    Header,
    /// `- subheader` lines.
    Subheader,
    /// `# comment` lines.
    Comment,
    /// `---` horizontal rules.
    Separator,
    /// `> program output` lines.
    Output,
    /// `! important` lines.
    Exclame,
    /// `? open question` lines.
    Question,
    /// `--long-option` lines.
    CommandOption,
}

/// Render hints for one style class.
///
/// Color names are SVG color keywords so any frontend can resolve them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSpec {
    pub color: &'static str,
    pub bold: bool,
    pub italic: bool,
}

impl HighlightStyle {
    /// Returns the render hints for this style class.
    pub fn spec(self) -> StyleSpec {
        match self {
            Self::Command => spec("darkblue", false, false),
            Self::Header => spec("black", true, false),
            Self::Subheader => spec("darkslategray", true, false),
            Self::Comment => spec("darkgreen", false, true),
            Self::Separator => spec("darkgray", false, false),
            Self::Output => spec("darkmagenta", false, false),
            Self::Exclame => spec("red", false, false),
            Self::Question => spec("magenta", false, false),
            Self::CommandOption => spec("darkslateblue", false, false),
        }
    }
}

fn spec(color: &'static str, bold: bool, italic: bool) -> StyleSpec {
    StyleSpec {
        color,
        bold,
        italic,
    }
}

/// One styled byte range within a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledSpan {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
    /// Winning style class.
    pub style: HighlightStyle,
}

struct HighlightRule {
    pattern: Regex,
    style: HighlightStyle,
}

impl HighlightRule {
    fn new(pattern: &str, style: HighlightStyle) -> Self {
        Self {
            // Rule patterns are compile-time constants; a failure here is a
            // programming error caught by the rule-table test.
            pattern: Regex::new(pattern).expect("valid highlight rule pattern"),
            style,
        }
    }
}

// Rule order is meaningful: `---` lines match the subheader/option rules
// too, and only declaration order makes the separator style win.
static SHELL_RULES: Lazy<Vec<HighlightRule>> = Lazy::new(|| {
    vec![
        HighlightRule::new(r"^\s*\$\s+.*$", HighlightStyle::Command),
        HighlightRule::new(r"^\s*\*\s+.*$", HighlightStyle::Header),
        HighlightRule::new(r"^\s*-\s+.*$", HighlightStyle::Subheader),
        HighlightRule::new(r"^\s*!\s+.*$", HighlightStyle::Exclame),
        HighlightRule::new(r"^\s*\?\s+.*$", HighlightStyle::Question),
        HighlightRule::new(r"^\s*>\s+.*$", HighlightStyle::Output),
        HighlightRule::new(r"^\s*#.*$", HighlightStyle::Comment),
        HighlightRule::new(r"^\s*-{2}.*$", HighlightStyle::CommandOption),
        HighlightRule::new(r"^\s*-{3,}.*$", HighlightStyle::Separator),
    ]
});

/// Line highlighter for one memo dialect.
#[derive(Clone, Copy)]
pub struct Highlighter {
    rules: &'static [HighlightRule],
}

impl Highlighter {
    /// Returns the highlighter for a memo kind, `None` when the kind has no
    /// highlighting.
    pub fn for_kind(kind: MemoKind) -> Option<Self> {
        match kind {
            MemoKind::Plain => None,
            MemoKind::Shell => Some(Self {
                rules: SHELL_RULES.as_slice(),
            }),
        }
    }

    /// Highlights one line, returning non-overlapping spans in order.
    pub fn highlight_line(&self, line: &str) -> Vec<StyledSpan> {
        if line.is_empty() {
            return Vec::new();
        }

        // Later rules overwrite earlier ones byte-wise; the rule table relies
        // on this for lines matching several patterns.
        let mut styles: Vec<Option<HighlightStyle>> = vec![None; line.len()];
        for rule in self.rules {
            for found in rule.pattern.find_iter(line) {
                for slot in &mut styles[found.start()..found.end()] {
                    *slot = Some(rule.style);
                }
            }
        }

        coalesce(&styles)
    }

    /// Highlights a whole document line by line.
    ///
    /// The outer vector has one entry per line of `text`, in order.
    pub fn highlight(&self, text: &str) -> Vec<Vec<StyledSpan>> {
        text.lines().map(|line| self.highlight_line(line)).collect()
    }
}

fn coalesce(styles: &[Option<HighlightStyle>]) -> Vec<StyledSpan> {
    let mut spans = Vec::new();
    let mut current: Option<(usize, HighlightStyle)> = None;

    for (index, slot) in styles.iter().enumerate() {
        match (current, slot) {
            (None, Some(style)) => current = Some((index, *style)),
            (Some((start, style)), Some(next)) if style != *next => {
                spans.push(StyledSpan {
                    start,
                    end: index,
                    style,
                });
                current = Some((index, *next));
            }
            (Some((start, style)), None) => {
                spans.push(StyledSpan {
                    start,
                    end: index,
                    style,
                });
                current = None;
            }
            _ => {}
        }
    }

    if let Some((start, style)) = current {
        spans.push(StyledSpan {
            start,
            end: styles.len(),
            style,
        });
    }

    spans
}
