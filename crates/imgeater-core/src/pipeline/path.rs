//! Destination path construction from untrusted filenames.

use std::fmt;
use std::path::Path;

/// Placeholder used when a filename is empty after sanitizing.
pub const PLACEHOLDER_NAME: &str = "undefined";

/// Prefix that marks a thumbnail next to its original.
pub const THUMBNAIL_PREFIX: &str = "min_";

const SEPARATOR: char = '/';

/// A normalized, traversal-safe destination for a stored file.
///
/// The filename component never contains a separator and is never empty, and
/// the whole path never contains a doubled separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationPath(String);

impl DestinationPath {
    /// Build a destination inside `directory` for an untrusted `filename`.
    ///
    /// Every `/` and `\` is removed from the filename rather than escaped, so
    /// nested or parent paths collapse into a single flat name.
    pub fn resolve(directory: &str, filename: &str) -> Self {
        let mut name: String = filename
            .chars()
            .filter(|c| *c != SEPARATOR && *c != '\\')
            .collect();
        if name.is_empty() {
            name = PLACEHOLDER_NAME.to_string();
        }

        if directory.is_empty() {
            return Self(name);
        }

        Self(collapse_separators(&format!("{directory}{SEPARATOR}{name}")))
    }

    /// The filename component.
    pub fn file_name(&self) -> &str {
        match self.0.rfind(SEPARATOR) {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Directory part including its trailing separator, or "" for a bare name.
    fn dir_prefix(&self) -> &str {
        match self.0.rfind(SEPARATOR) {
            Some(idx) => &self.0[..=idx],
            None => "",
        }
    }

    /// Sibling path of the thumbnail: same directory, `min_` + filename.
    pub fn thumbnail(&self) -> DestinationPath {
        Self(format!(
            "{}{}{}",
            self.dir_prefix(),
            THUMBNAIL_PREFIX,
            self.file_name()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl AsRef<Path> for DestinationPath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

impl fmt::Display for DestinationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Replace every run of separators with a single one.
fn collapse_separators(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_sep = false;
    for c in path.chars() {
        let is_sep = c == SEPARATOR;
        if !(is_sep && prev_sep) {
            out.push(c);
        }
        prev_sep = is_sep;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(dir: &str, name: &str) -> String {
        DestinationPath::resolve(dir, name).as_str().to_string()
    }

    #[test]
    fn test_empty_inputs_use_placeholder() {
        assert_eq!(resolve("", ""), "undefined");
        assert_eq!(resolve("", "/"), "undefined");
        assert_eq!(resolve("files", "///"), "files/undefined");
    }

    #[test]
    fn test_separators_stripped_from_filename() {
        assert_eq!(resolve("a/b", "x/y.jpg"), "a/b/xy.jpg");
        assert_eq!(resolve("a/b", "../../etc/passwd"), "a/b/....etcpasswd");
        assert_eq!(resolve("a", "x\\y.png"), "a/xy.png");
    }

    #[test]
    fn test_trailing_separator_not_duplicated() {
        assert_eq!(resolve("a/b/", "x/y.jpg"), "a/b/xy.jpg");
        assert_eq!(resolve("a//b///", "y.jpg"), "a/b/y.jpg");
    }

    #[test]
    fn test_leading_separator_preserved() {
        assert_eq!(resolve("/tmp/", "pic.png"), "/tmp/pic.png");
        assert_eq!(resolve("/", "pic.png"), "/pic.png");
    }

    #[test]
    fn test_empty_directory_returns_name_only() {
        assert_eq!(resolve("", "pic.gif"), "pic.gif");
    }

    #[test]
    fn test_never_empty_and_no_separator_in_name() {
        let dirs = ["", "/", "a", "a/", "/a//b/"];
        let names = ["", "/", "//x//", "a/b/c.png", "\\", "plain.jpg"];
        for dir in dirs {
            for name in names {
                let path = DestinationPath::resolve(dir, name);
                assert!(!path.as_str().is_empty());
                assert!(!path.file_name().is_empty());
                assert!(!path.file_name().contains('/'));
                assert!(!path.file_name().contains('\\'));
                assert!(!path.as_str().contains("//"), "{dir:?} + {name:?}");
            }
        }
    }

    #[test]
    fn test_thumbnail_path() {
        let path = DestinationPath::resolve("files/", "cat.png");
        assert_eq!(path.file_name(), "cat.png");
        assert_eq!(path.thumbnail().as_str(), "files/min_cat.png");

        let bare = DestinationPath::resolve("", "cat.png");
        assert_eq!(bare.thumbnail().as_str(), "min_cat.png");
    }

    #[test]
    fn test_thumbnail_ignores_name_inside_directory() {
        let path = DestinationPath::resolve("cat.png", "cat.png");
        assert_eq!(path.thumbnail().as_str(), "cat.png/min_cat.png");
    }
}
