//! Collapsing conflict blocks to their "ours" side.
//!
//! [`resolve_str`] is the pure text rewrite. [`ConflictResolver`] wraps it
//! with the file round trip: read everything, rewrite, write everything back.

use std::path::Path;

use tracing::{debug, info, warn};

use super::parser::{LineClass, MarkerKind, MarkerParser, ParserState, SeparatorPolicy};
use super::writer::{self, WriteMode};
use crate::errors::ResolveError;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Per-file tally of how lines were classified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Lines outside any conflict.
    pub kept_normal: usize,
    /// "Ours" lines kept from conflict blocks.
    pub kept_ours: usize,
    /// "Theirs" lines dropped.
    pub discarded_theirs: usize,
    /// Marker lines dropped.
    pub discarded_markers: usize,
    /// Number of `<<<<<<<` lines seen.
    pub conflict_blocks: usize,
    /// The file ended while a conflict was still open.
    pub unterminated: bool,
}

impl ResolveStats {
    fn record(&mut self, class: LineClass) {
        match class {
            LineClass::KeptNormal => self.kept_normal += 1,
            LineClass::KeptOurs => self.kept_ours += 1,
            LineClass::DiscardedTheirs => self.discarded_theirs += 1,
            LineClass::DiscardedMarker(kind) => {
                self.discarded_markers += 1;
                if kind == MarkerKind::Start {
                    self.conflict_blocks += 1;
                }
            }
        }
    }

    /// Total number of input lines.
    pub fn total_lines(&self) -> usize {
        self.kept_normal + self.kept_ours + self.discarded_theirs + self.discarded_markers
    }

    /// `true` if at least one line was dropped.
    pub fn changed(&self) -> bool {
        self.discarded_theirs + self.discarded_markers > 0
    }
}

/// Output of a text rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The kept lines, concatenated in original order.
    pub content: String,
    /// Classification tally.
    pub stats: ResolveStats,
}

/// What happened to one command-line path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The path does not exist; nothing was attempted.
    Skipped,
    /// The file was rewritten.
    Resolved(ResolveStats),
}

// ---------------------------------------------------------------------------
// Text rewrite
// ---------------------------------------------------------------------------

/// Rewrite `input`, keeping normal and "ours" lines.
///
/// Lines are split after each `\n`; every kept line retains its own ending
/// bytes, so `\r\n` files and a missing final newline survive untouched.
pub fn resolve_str(input: &str, policy: SeparatorPolicy) -> Resolution {
    let mut parser = MarkerParser::with_policy(policy);
    let mut stats = ResolveStats::default();
    let mut content = String::with_capacity(input.len());

    for line in input.split_inclusive('\n') {
        let class = parser.classify(line);
        stats.record(class);
        if class.is_kept() {
            content.push_str(line);
        }
    }
    stats.unterminated = parser.state() != ParserState::Normal;
    if stats.unterminated {
        debug!(state = %parser.state(), "input ends inside a conflict block");
    }

    Resolution { content, stats }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Per-file behavior knobs. The default reproduces the plain tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub separator_policy: SeparatorPolicy,
    pub write_mode: WriteMode,
}

/// Rewrites files in place, one at a time.
#[derive(Debug, Clone, Default)]
pub struct ConflictResolver {
    options: ResolveOptions,
}

impl ConflictResolver {
    pub fn new(options: ResolveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve every conflict in the file at `path` and write it back.
    ///
    /// The file is rewritten even when it contains no markers. On a read or
    /// decoding failure the file is not touched; on a write failure it may be
    /// left partially written unless [`WriteMode::Atomic`] is in effect.
    pub fn resolve_file(&self, path: &Path) -> Result<ResolveStats, ResolveError> {
        let bytes = std::fs::read(path).map_err(|source| ResolveError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let input = String::from_utf8(bytes).map_err(|source| ResolveError::InvalidUtf8 {
            path: path.to_path_buf(),
            source,
        })?;

        let Resolution { content, stats } = resolve_str(&input, self.options.separator_policy);

        if stats.unterminated {
            warn!(path = %path.display(), "file ends inside a conflict block");
        }
        if stats.changed() {
            info!(
                path = %path.display(),
                lines = stats.total_lines(),
                blocks = stats.conflict_blocks,
                kept_ours = stats.kept_ours,
                discarded_theirs = stats.discarded_theirs,
                "conflicts resolved"
            );
        } else {
            debug!(path = %path.display(), "no conflict markers");
        }

        writer::write_content(path, &content, self.options.write_mode).map_err(|source| {
            ResolveError::Write {
                path: path.to_path_buf(),
                source,
            }
        })?;

        Ok(stats)
    }

    /// Resolve `path` if it exists.
    ///
    /// A missing path is skipped without error and without calling
    /// `on_start`. Otherwise `on_start` runs before any I/O on the file.
    pub fn resolve_path<F>(&self, path: &Path, on_start: F) -> Result<FileOutcome, ResolveError>
    where
        F: FnOnce(&Path),
    {
        if !path.exists() {
            debug!(path = %path.display(), "path does not exist, skipping");
            return Ok(FileOutcome::Skipped);
        }

        on_start(path);
        self.resolve_file(path).map(FileOutcome::Resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(input: &str) -> String {
        resolve_str(input, SeparatorPolicy::Literal).content
    }

    #[test]
    fn test_concrete_scenario() {
        let input = "line1\n<<<<<<< HEAD\nmine\n=======\ntheirs\n>>>>>>> branch\nline2\n";
        assert_eq!(resolve(input), "line1\nmine\nline2\n");
    }

    #[test]
    fn test_ours_preservation_with_prefix_and_suffix() {
        let prefix = "fn main() {\n";
        let ours = "    let a = 1;\n    let b = 2;\n";
        let theirs = "    let a = 10;\n";
        let suffix = "}\n";
        let input = format!(
            "{prefix}<<<<<<< ours-ref\n{ours}=======\n{theirs}>>>>>>> theirs-ref\n{suffix}"
        );
        assert_eq!(resolve(&input), format!("{prefix}{ours}{suffix}"));
    }

    #[test]
    fn test_multiple_blocks() {
        let input = "a\n<<<<<<<\n1\n=======\n2\n>>>>>>>\nb\n<<<<<<< HEAD\n3\n=======\n4\n>>>>>>> x\nc\n";
        let res = resolve_str(input, SeparatorPolicy::Literal);
        assert_eq!(res.content, "a\n1\nb\n3\nc\n");
        assert_eq!(res.stats.conflict_blocks, 2);
        assert_eq!(res.stats.discarded_markers, 6);
        assert_eq!(res.stats.discarded_theirs, 2);
        assert_eq!(res.stats.total_lines(), 13);
    }

    #[test]
    fn test_no_markers_is_identity() {
        let input = "one\r\ntwo\n\nthree <<<<<<< inline\n   =======\nno newline";
        let res = resolve_str(input, SeparatorPolicy::Literal);
        assert_eq!(res.content, input);
        assert!(!res.stats.changed());
    }

    #[test]
    fn test_empty_input() {
        let res = resolve_str("", SeparatorPolicy::Literal);
        assert_eq!(res.content, "");
        assert_eq!(res.stats, ResolveStats::default());
    }

    #[test]
    fn test_crlf_endings_preserved() {
        let input = "a\r\n<<<<<<< HEAD\r\nmine\r\n=======\r\ntheirs\r\n>>>>>>> b\r\nz\r\n";
        assert_eq!(resolve(input), "a\r\nmine\r\nz\r\n");
    }

    #[test]
    fn test_marker_without_trailing_newline() {
        let input = "a\n<<<<<<< HEAD\nmine\n=======\ntheirs\n>>>>>>> b";
        assert_eq!(resolve(input), "a\nmine\n");
    }

    #[test]
    fn test_unterminated_in_ours_keeps_lines() {
        let res = resolve_str("a\n<<<<<<< HEAD\nmine\nmore\n", SeparatorPolicy::Literal);
        assert_eq!(res.content, "a\nmine\nmore\n");
        assert!(res.stats.unterminated);
    }

    #[test]
    fn test_unterminated_in_theirs_drops_tail() {
        let res = resolve_str("a\n<<<<<<<\nmine\n=======\ngone\n", SeparatorPolicy::Literal);
        assert_eq!(res.content, "a\nmine\n");
        assert!(res.stats.unterminated);
    }

    #[test]
    fn test_stray_separator_by_policy() {
        let input = "a\n=======\nb\n>>>>>>>\nc\n";
        assert_eq!(resolve_str(input, SeparatorPolicy::Literal).content, "a\nc\n");
        assert_eq!(resolve_str(input, SeparatorPolicy::Guarded).content, "a\nb\nc\n");
    }

    #[test]
    fn test_idempotent() {
        let input = "x\n<<<<<<< HEAD\nmine\n=======\ntheirs\n>>>>>>> b\ny\n=======\nz\n";
        let once = resolve(input);
        let twice = resolve(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_resolve_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conflicted.txt");
        std::fs::write(&path, "line1\n<<<<<<< HEAD\nmine\n=======\ntheirs\n>>>>>>> branch\nline2\n")
            .unwrap();

        let stats = ConflictResolver::default().resolve_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "line1\nmine\nline2\n");
        assert_eq!(stats.conflict_blocks, 1);
        assert_eq!(stats.kept_ours, 1);
    }

    #[test]
    fn test_resolve_file_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();

        ConflictResolver::default().resolve_file(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"");
    }

    #[test]
    fn test_resolve_file_invalid_utf8_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        let original = b"caf\xe9\n<<<<<<< HEAD\nx\n=======\ny\n>>>>>>> b\n".to_vec();
        std::fs::write(&path, &original).unwrap();

        let err = ConflictResolver::default().resolve_file(&path).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidUtf8 { .. }));
        assert_eq!(std::fs::read(&path).unwrap(), original);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_file_read_only_is_write_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.txt");
        let original = "a\n<<<<<<< HEAD\nmine\n=======\ntheirs\n>>>>>>> b\n";
        std::fs::write(&path, original).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o444)).unwrap();

        // Privileged users can write regardless of mode bits.
        if std::fs::OpenOptions::new().write(true).open(&path).is_ok() {
            return;
        }

        for write_mode in [WriteMode::InPlace, WriteMode::Atomic] {
            let resolver = ConflictResolver::new(ResolveOptions {
                write_mode,
                ..ResolveOptions::default()
            });
            let err = resolver.resolve_file(&path).unwrap_err();
            assert!(matches!(err, ResolveError::Write { .. }), "{write_mode}: {err}");
            assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
        }
    }

    #[test]
    fn test_resolve_file_missing_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConflictResolver::default()
            .resolve_file(&dir.path().join("nope.txt"))
            .unwrap_err();
        assert!(matches!(err, ResolveError::Read { .. }));
    }

    #[test]
    fn test_resolve_path_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut started = false;
        let outcome = ConflictResolver::default()
            .resolve_path(&dir.path().join("nope.txt"), |_| started = true)
            .unwrap();
        assert_eq!(outcome, FileOutcome::Skipped);
        assert!(!started);
    }

    #[test]
    fn test_resolve_path_reports_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, "plain\n").unwrap();

        let mut seen = None;
        let outcome = ConflictResolver::default()
            .resolve_path(&path, |p| seen = Some(p.to_path_buf()))
            .unwrap();
        assert!(matches!(outcome, FileOutcome::Resolved(_)));
        assert_eq!(seen.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_options_flow_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        std::fs::write(&path, "a\n=======\nb\n").unwrap();

        let resolver = ConflictResolver::new(ResolveOptions {
            separator_policy: SeparatorPolicy::Guarded,
            write_mode: WriteMode::Atomic,
        });
        resolver.resolve_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\n");
        assert_eq!(resolver.options().write_mode, WriteMode::Atomic);
    }
}
