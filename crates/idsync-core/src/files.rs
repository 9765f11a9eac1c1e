//! Local file naming and directory traversal.
//!
//! Names are derived only from an entity's name (or id) and its export kind,
//! so repeated exports land on the same paths. Writes go through a temporary
//! file in the destination directory and are renamed into place, so a reader
//! never sees a partially written file.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{SyncError, SyncResult};

/// Kind tag embedded in typed file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Idm,
    Script,
    Meta,
    Idp,
}

impl ExportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idm => "idm",
            Self::Script => "script",
            Self::Meta => "meta",
            Self::Idp => "idp",
        }
    }

    /// Suffix matched when scanning a directory for files of this kind.
    pub fn json_suffix(self) -> String {
        format!(".{}.json", self.as_str())
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Make a name safe to use as a file name.
///
/// Strips a leading URL scheme, turns spaces into `-` and drops everything
/// outside `[A-Za-z0-9-_.~]`.
pub fn sanitize(name: &str) -> String {
    let trimmed = name
        .strip_prefix("https://")
        .or_else(|| name.strip_prefix("http://"))
        .unwrap_or(name);
    trimmed
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            c if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~') => Some(c),
            _ => None,
        })
        .collect()
}

/// `<sanitized name>.<kind>.json`
pub fn typed_filename(name: &str, kind: ExportKind) -> String {
    typed_filename_with_ext(name, kind, "json")
}

/// `<sanitized name>.<kind>.<ext>`
pub fn typed_filename_with_ext(name: &str, kind: ExportKind, ext: &str) -> String {
    format!("{}.{}.{}", sanitize(name), kind, ext)
}

/// Realm label used in bulk file names: each path segment title-cased and
/// concatenated (`alpha` becomes `Alpha`, `a/b` becomes `AB`).
pub fn realm_label(realm: &str) -> String {
    realm
        .split('/')
        .filter(|s| !s.is_empty())
        .map(title_case)
        .collect()
}

fn title_case(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Default name of a bulk export file, e.g. `allAlphaScripts.script.json`.
pub fn bulk_filename(realm: &str, what: &str, kind: ExportKind) -> String {
    format!("all{}{}.{}.json", realm_label(realm), what, kind)
}

/// Serialize `value` as 2-space indented JSON.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T, context: &str) -> SyncResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| SyncError::json(context, e))
}

/// Atomically write `text` to `path`, creating parent directories.
pub fn write_text(path: &Path, text: &str) -> SyncResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|e| SyncError::io(&parent, e))?;

    let mut tmp = NamedTempFile::new_in(&parent).map_err(|e| SyncError::io(&parent, e))?;
    tmp.write_all(text.as_bytes())
        .map_err(|e| SyncError::io(path, e))?;
    tmp.persist(path).map_err(|e| SyncError::io(path, e.error))?;
    debug!(path = %path.display(), bytes = text.len(), "wrote file");
    Ok(())
}

/// Atomically write `value` as pretty JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> SyncResult<()> {
    let text = to_pretty_json(value, &path.display().to_string())?;
    write_text(path, &text)
}

pub fn read_text(path: &Path) -> SyncResult<String> {
    std::fs::read_to_string(path).map_err(|e| SyncError::io(path, e))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> SyncResult<T> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|e| SyncError::json(path.display().to_string(), e))
}

/// A file found while scanning a directory.
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub path: PathBuf,
    /// Path relative to the scanned root, `/`-separated.
    pub relative: String,
}

impl LocalFile {
    /// Relative path with `suffix` removed; used as the entity id.
    pub fn stem(&self, suffix: &str) -> &str {
        strip_suffix_ignore_case(&self.relative, suffix).unwrap_or(&self.relative)
    }
}

/// Collect files under `dir` whose names end with `suffix` (case-insensitive).
///
/// Non-matching files are ignored. Results are ordered by relative path.
pub fn collect_files(dir: &Path, suffix: &str, recursive: bool) -> SyncResult<Vec<LocalFile>> {
    if !dir.is_dir() {
        return Err(SyncError::io(
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(if recursive { usize::MAX } else { 1 })
        .sort_by_file_name();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
            SyncError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(dir)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if strip_suffix_ignore_case(&relative, suffix).is_none() {
            continue;
        }
        files.push(LocalFile {
            path: entry.path().to_path_buf(),
            relative,
        });
    }
    debug!(dir = %dir.display(), suffix, count = files.len(), "scanned directory");
    Ok(files)
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    if s.len() < suffix.len() || !s.is_char_boundary(s.len() - suffix.len()) {
        return None;
    }
    let (head, tail) = s.split_at(s.len() - suffix.len());
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

/// Path under `dir` for a raw entity export; ids containing `/` nest.
///
/// Empty, `.` and `..` segments are dropped so the result never leaves `dir`.
pub fn entity_path(dir: &Path, id: &str) -> PathBuf {
    let mut segments: Vec<&str> = id
        .split('/')
        .filter(|s| !matches!(*s, "" | "." | ".."))
        .collect();
    let leaf = format!("{}.json", segments.pop().unwrap_or(id));
    segments
        .into_iter()
        .fold(dir.to_path_buf(), |path, segment| path.join(segment))
        .join(leaf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("My Script (v2)!"), "My-Script-v2");
        assert_eq!(sanitize("https://idp.example.com/x"), "idp.example.comx");
        assert_eq!(sanitize("a_b.c~d-e"), "a_b.c~d-e");
    }

    #[test]
    fn test_typed_filename_is_deterministic() {
        assert_eq!(typed_filename("managed", ExportKind::Idm), "managed.idm.json");
        assert_eq!(
            typed_filename_with_ext("Decision Node", ExportKind::Script, "js"),
            "Decision-Node.script.js"
        );
        assert_eq!(
            typed_filename("google", ExportKind::Idp),
            typed_filename("google", ExportKind::Idp)
        );
    }

    #[test]
    fn test_realm_label_and_bulk_filename() {
        assert_eq!(realm_label("alpha"), "Alpha");
        assert_eq!(realm_label("/parent/child"), "ParentChild");
        assert_eq!(realm_label("/"), "");
        assert_eq!(
            bulk_filename("alpha", "Scripts", ExportKind::Script),
            "allAlphaScripts.script.json"
        );
    }

    #[test]
    fn test_write_json_uses_two_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");
        write_json(&path, &json!({"a": [1]})).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n  \"a\": [\n    1\n  ]\n}");
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.json");
        write_text(&path, "old").unwrap();
        write_text(&path, "new").unwrap();
        assert_eq!(read_text(&path).unwrap(), "new");
        // no temp files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_collect_files_filters_by_suffix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.json"), "{}").unwrap();
        std::fs::write(dir.path().join("a.JSON"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("ui")).unwrap();
        std::fs::write(dir.path().join("ui/themes.json"), "{}").unwrap();

        let flat = collect_files(dir.path(), ".json", false).unwrap();
        let names: Vec<&str> = flat.iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(names, vec!["a.JSON", "b.json"]);

        let deep = collect_files(dir.path(), ".json", true).unwrap();
        let ids: Vec<&str> = deep.iter().map(|f| f.stem(".json")).collect();
        assert_eq!(ids, vec!["a", "b", "ui/themes"]);
    }

    #[test]
    fn test_collect_files_missing_dir() {
        let result = collect_files(Path::new("/nonexistent/dir"), ".json", false);
        assert!(matches!(result, Err(SyncError::Io { .. })));
    }

    #[test]
    fn test_entity_path_nests_on_slash() {
        let path = entity_path(Path::new("/out"), "ui/configuration");
        assert_eq!(path, PathBuf::from("/out/ui/configuration.json"));
        let dotted = entity_path(Path::new("/out"), "org.apache.felix.fileinstall");
        assert_eq!(dotted, PathBuf::from("/out/org.apache.felix.fileinstall.json"));
    }

    #[test]
    fn test_entity_path_stays_under_dir() {
        let dir = Path::new("/out");
        assert_eq!(entity_path(dir, "../../etc/passwd"), dir.join("etc/passwd.json"));
        assert_eq!(entity_path(dir, "ui/./../theme"), dir.join("ui/theme.json"));
        let bare = entity_path(dir, "..");
        assert!(bare.starts_with(dir));
        assert_eq!(bare.parent(), Some(dir));
    }
}
