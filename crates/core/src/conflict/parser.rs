//! Conflict-marker line classification.
//!
//! A [`MarkerParser`] walks the lines of one file and assigns each line to a
//! region of a conflict block. Markers are recognised purely by their
//! literal seven-character prefix; nothing after the prefix is inspected.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The three conflict-marker lines emitted by merge tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// `<<<<<<<` -- opens a conflict, "ours" follows.
    Start,
    /// `=======` -- separates "ours" from "theirs".
    Separator,
    /// `>>>>>>>` -- closes a conflict.
    End,
}

impl MarkerKind {
    /// The literal prefix that identifies this marker.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Start => "<<<<<<<",
            Self::Separator => "=======",
            Self::End => ">>>>>>>",
        }
    }

    /// Detect a marker at the start of `line`.
    ///
    /// Prefixes are checked in the order start, separator, end. They share no
    /// leading character, so at most one can match.
    pub fn detect(line: &str) -> Option<Self> {
        [Self::Start, Self::Separator, Self::End]
            .into_iter()
            .find(|kind| line.starts_with(kind.prefix()))
    }
}

/// Where the cursor sits relative to conflict markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParserState {
    /// Outside any conflict block.
    #[default]
    Normal,
    /// Between `<<<<<<<` and `=======`.
    InOurs,
    /// Between `=======` and `>>>>>>>`.
    InTheirs,
}

impl std::fmt::Display for ParserState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::InOurs => write!(f, "in_ours"),
            Self::InTheirs => write!(f, "in_theirs"),
        }
    }
}

/// How a `=======` line is handled when no `<<<<<<<` is open.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeparatorPolicy {
    /// Any separator line enters "theirs", whatever the current state.
    /// Content after a stray separator is dropped up to the next `>>>>>>>`.
    #[default]
    Literal,
    /// A separator only enters "theirs" from inside "ours". A stray
    /// separator line is still dropped but the state does not change.
    Guarded,
}

/// The classification assigned to a single input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// Ordinary content outside any conflict.
    KeptNormal,
    /// Content from the "ours" side of a conflict.
    KeptOurs,
    /// Content from the "theirs" side of a conflict.
    DiscardedTheirs,
    /// A marker line.
    DiscardedMarker(MarkerKind),
}

impl LineClass {
    /// `true` if the line survives into the output.
    pub fn is_kept(self) -> bool {
        matches!(self, Self::KeptNormal | Self::KeptOurs)
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Single-pass conflict-marker state machine for one file.
#[derive(Debug, Clone, Default)]
pub struct MarkerParser {
    state: ParserState,
    policy: SeparatorPolicy,
}

impl MarkerParser {
    /// A parser in the `Normal` state using [`SeparatorPolicy::Literal`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser in the `Normal` state using the given separator policy.
    pub fn with_policy(policy: SeparatorPolicy) -> Self {
        Self {
            state: ParserState::Normal,
            policy,
        }
    }

    /// Current state.
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Classify `line` and advance the state machine.
    pub fn classify(&mut self, line: &str) -> LineClass {
        if let Some(kind) = MarkerKind::detect(line) {
            self.state = match (kind, self.policy) {
                (MarkerKind::Start, _) => ParserState::InOurs,
                (MarkerKind::Separator, SeparatorPolicy::Literal) => ParserState::InTheirs,
                (MarkerKind::Separator, SeparatorPolicy::Guarded) => match self.state {
                    ParserState::InOurs => ParserState::InTheirs,
                    other => other,
                },
                (MarkerKind::End, _) => ParserState::Normal,
            };
            return LineClass::DiscardedMarker(kind);
        }

        match self.state {
            ParserState::Normal => LineClass::KeptNormal,
            ParserState::InOurs => LineClass::KeptOurs,
            ParserState::InTheirs => LineClass::DiscardedTheirs,
        }
    }
}

/// `true` if any line of `input` starts with a conflict-marker prefix.
pub fn has_conflict_markers(input: &str) -> bool {
    input
        .split_inclusive('\n')
        .any(|line| MarkerKind::detect(line).is_some())
}
