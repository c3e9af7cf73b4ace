//! Name-status diff parsing.
//!
//! The backend supplies one stanza per changed file:
//!
//! ```text
//! M\tsrc/lib.rs
//! A\tdocs/new.md
//! R100\told.txt\tnew.txt
//! ```
//!
//! The status code is `A`dded, `M`odified, `T` (type change, folded into
//! Modified), `D`eleted, or `R`enamed/`C`opied with a trailing similarity
//! percentage and an old/new path pair. Stanzas matching no pattern are
//! skipped with a warning rather than failing the parse: "not yet loaded"
//! and backend format drift are expected conditions, not errors.

use tracing::warn;

use crate::error::{DiffError, DiffResult};
use crate::files::{ChangeStatus, FileEntry, RevisionFiles};
use crate::intern::PathPool;

/// Parse raw name-status text into a revision-file record.
///
/// `staged` tags every produced entry; pass `true` for captures taken
/// against the index. Unrecognized stanzas are skipped, never fatal.
pub fn parse_diff(pool: &mut PathPool, raw: &str, staged: bool) -> RevisionFiles {
    let mut files = RevisionFiles::new();
    for line in raw.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        match parse_stanza(pool, line, staged) {
            Ok(entry) => files.files.push(entry),
            Err(DiffError::UnknownStatus { stanza }) => {
                warn!(stanza = %stanza, "skipping unrecognized diff stanza");
            }
        }
    }
    files
}

/// Build the working-copy record from its three captures.
///
/// The unstaged (worktree-vs-index) capture comes first; staged
/// (index-vs-HEAD) entries follow for paths not already present; untracked
/// paths are appended as synthetic [`ChangeStatus::Added`] entries.
pub fn parse_combined_status(
    pool: &mut PathPool,
    staged_text: &str,
    unstaged_text: &str,
    untracked: &[String],
) -> RevisionFiles {
    let mut files = parse_diff(pool, unstaged_text, false);
    let staged = parse_diff(pool, staged_text, true);
    for entry in staged.files {
        if !files.files.iter().any(|e| e.path == entry.path) {
            files.files.push(entry);
        }
    }
    for path in untracked {
        let handle = pool.intern(path);
        if !files.files.iter().any(|e| e.path == handle) {
            files
                .files
                .push(FileEntry::new(handle, ChangeStatus::Added, false));
        }
    }
    files
}

/// Parse one stanza into a file entry.
fn parse_stanza(pool: &mut PathPool, line: &str, staged: bool) -> DiffResult<FileEntry> {
    let unknown = || DiffError::UnknownStatus {
        stanza: line.to_string(),
    };

    let mut fields = line.split('\t');
    let code = fields.next().ok_or_else(unknown)?;
    let (kind, rest) = code.split_at(code.len().min(1));

    match kind {
        "A" | "M" | "T" | "D" => {
            let path = fields.next().filter(|p| !p.is_empty()).ok_or_else(unknown)?;
            if fields.next().is_some() || !rest.is_empty() {
                return Err(unknown());
            }
            let status = match kind {
                "A" => ChangeStatus::Added,
                "D" => ChangeStatus::Deleted,
                _ => ChangeStatus::Modified,
            };
            Ok(FileEntry::new(pool.intern(path), status, staged))
        }
        "R" | "C" => {
            let similarity: u8 = rest.parse().map_err(|_| unknown())?;
            let old = fields.next().filter(|p| !p.is_empty()).ok_or_else(unknown)?;
            let new = fields.next().filter(|p| !p.is_empty()).ok_or_else(unknown)?;
            if fields.next().is_some() || similarity > 100 {
                return Err(unknown());
            }
            let status = if kind == "R" {
                ChangeStatus::Renamed
            } else {
                ChangeStatus::Copied
            };
            Ok(FileEntry {
                path: pool.intern(new),
                old_path: Some(pool.intern(old)),
                status,
                similarity,
                staged,
            })
        }
        _ => Err(unknown()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modified_stanza() {
        let mut pool = PathPool::new();
        let files = parse_diff(&mut pool, "M\tfoo.txt", false);
        assert_eq!(files.len(), 1);
        let change = &files.resolve(&pool)[0];
        assert_eq!(change.path, "foo.txt");
        assert_eq!(change.status, ChangeStatus::Modified);
        assert!(!change.staged);
    }

    #[test]
    fn rename_stanza_with_similarity() {
        let mut pool = PathPool::new();
        let files = parse_diff(&mut pool, "R100\told.txt\tnew.txt", false);
        let change = &files.resolve(&pool)[0];
        assert_eq!(change.path, "new.txt");
        assert_eq!(change.old_path.as_deref(), Some("old.txt"));
        assert_eq!(change.status, ChangeStatus::Renamed);
        assert_eq!(change.similarity, 100);
    }

    #[test]
    fn copy_stanza() {
        let mut pool = PathPool::new();
        let files = parse_diff(&mut pool, "C075\tsrc/a.rs\tsrc/b.rs", true);
        let change = &files.resolve(&pool)[0];
        assert_eq!(change.status, ChangeStatus::Copied);
        assert_eq!(change.similarity, 75);
        assert_eq!(change.old_path.as_deref(), Some("src/a.rs"));
        assert!(change.staged);
    }

    #[test]
    fn type_change_folds_into_modified() {
        let mut pool = PathPool::new();
        let files = parse_diff(&mut pool, "T\tlink", false);
        assert_eq!(files.files[0].status, ChangeStatus::Modified);
    }

    #[test]
    fn unknown_stanzas_are_skipped() {
        let mut pool = PathPool::new();
        let raw = "M\ta.txt\nX\tb.txt\nnot a stanza\nD\tc.txt";
        let files = parse_diff(&mut pool, raw, false);
        let paths: Vec<String> = files.resolve(&pool).into_iter().map(|c| c.path).collect();
        assert_eq!(paths, vec!["a.txt", "c.txt"]);
    }

    #[test]
    fn rename_without_similarity_is_anomalous() {
        let mut pool = PathPool::new();
        let files = parse_diff(&mut pool, "R\told.txt\tnew.txt", false);
        assert!(files.is_empty());
    }

    #[test]
    fn crlf_lines_are_tolerated() {
        let mut pool = PathPool::new();
        let files = parse_diff(&mut pool, "M\ta.txt\r\nA\tb.txt\r\n", false);
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn combined_status_merges_captures() {
        let mut pool = PathPool::new();
        let files = parse_combined_status(
            &mut pool,
            "M\tstaged-only.txt\nM\tboth.txt",
            "M\tboth.txt\nD\tworktree-only.txt",
            &["untracked.txt".to_string()],
        );
        let changes = files.resolve(&pool);
        let paths: Vec<&str> = changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["both.txt", "worktree-only.txt", "staged-only.txt", "untracked.txt"]
        );

        // The unstaged capture wins for paths present in both.
        assert!(!changes[0].staged);
        assert!(changes[2].staged);
        assert_eq!(changes[3].status, ChangeStatus::Added);
    }

    #[test]
    fn untracked_duplicates_are_not_appended_twice() {
        let mut pool = PathPool::new();
        let files = parse_combined_status(
            &mut pool,
            "",
            "A\tfresh.txt",
            &["fresh.txt".to_string()],
        );
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn empty_input_parses_to_empty_record() {
        let mut pool = PathPool::new();
        assert!(parse_diff(&mut pool, "", false).is_empty());
        assert!(parse_diff(&mut pool, "\n\n", false).is_empty());
    }
}
