//! Declaration-site records for tests and subtests.

use std::fmt;

/// An immutable record naming the place where a test or subtest was declared.
///
/// Tags are created once, in `static` items generated by the declaration
/// macros, and live for the whole process. A tag's identity is its address:
/// two declaration sites never share one, even when their descriptions match.
#[derive(Debug)]
pub struct Tag {
    pub desc: &'static str,
    pub file: &'static str,
    pub line: u32,
}

impl Tag {
    pub const fn new(desc: &'static str, file: &'static str, line: u32) -> Self {
        Self { desc, file, line }
    }

    /// Process-wide identity of this tag.
    pub fn identity(&'static self) -> u64 {
        self as *const Tag as usize as u64
    }

    /// The declaring file with any leading directories stripped.
    pub fn file_name(&self) -> &'static str {
        file_name(self.file)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.desc, self.file_name(), self.line)
    }
}

/// Returns the last component of a source path.
///
/// `/`, `\` and `:` all count as separators so that paths produced on any
/// host shorten the same way; a trailing separator is kept as part of the
/// name rather than yielding an empty string.
pub fn file_name(path: &str) -> &str {
    let bytes = path.as_bytes();
    let mut start = 0;
    for (i, b) in bytes.iter().enumerate() {
        if matches!(b, b'/' | b'\\' | b':') && i + 1 < bytes.len() {
            start = i + 1;
        }
    }
    &path[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    static FIRST: Tag = Tag::new("same", "src/a.rs", 1);
    static SECOND: Tag = Tag::new("same", "src/a.rs", 1);

    #[test]
    fn test_identity_is_per_declaration() {
        assert_ne!(FIRST.identity(), SECOND.identity());
        assert_eq!(FIRST.identity(), FIRST.identity());
    }

    #[test]
    fn test_file_name_strips_directories() {
        assert_eq!(file_name("src/bin/demo.rs"), "demo.rs");
        assert_eq!(file_name(r"C:\work\tests\demo.rs"), "demo.rs");
        assert_eq!(file_name("demo.rs"), "demo.rs");
        assert_eq!(file_name("odd/"), "odd/");
    }

    #[test]
    fn test_display_uses_short_file() {
        assert_eq!(FIRST.to_string(), "same (a.rs:1)");
    }
}
