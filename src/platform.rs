//! Platform policy for directory creation.
//!
//! Windows refuses to create a drive root such as `C:\`, so directory
//! creation on that platform short-circuits for those paths. The platform is
//! an explicit value so the policy can be exercised on any host.

use std::path::Path;

/// The host family, as far as path policy is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Windows: drive roots cannot be created.
    Windows,
    /// Everything else.
    Other,
}

impl Platform {
    /// The platform this binary was compiled for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Other
        }
    }

    /// Whether `make_dir` on `path` must be skipped on this platform.
    #[must_use]
    pub fn skips_make_dir(self, path: &Path) -> bool {
        self == Self::Windows && is_drive_root(path)
    }
}

/// Check whether `path` is a bare drive-root specifier like `C:\`.
///
/// Matches exactly three characters with a colon in second position.
#[must_use]
pub fn is_drive_root(path: &Path) -> bool {
    let Some(s) = path.to_str() else {
        return false;
    };
    let chars: Vec<char> = s.chars().collect();
    chars.len() == 3 && chars[1] == ':'
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(r"C:\", true)]
    #[case("d:/", true)]
    #[case(r"Z:\", true)]
    #[case("C:", false)]
    #[case(r"C:\dir", false)]
    #[case("/", false)]
    #[case("abc", false)]
    #[case("", false)]
    fn test_is_drive_root(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(is_drive_root(Path::new(path)), expected);
    }

    #[test]
    fn test_skip_only_on_windows() {
        assert!(Platform::Windows.skips_make_dir(Path::new(r"C:\")));
        assert!(!Platform::Other.skips_make_dir(Path::new(r"C:\")));
        assert!(!Platform::Windows.skips_make_dir(Path::new(r"C:\data")));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_current_is_other() {
        assert_eq!(Platform::current(), Platform::Other);
    }

    #[cfg(windows)]
    #[test]
    fn test_current_is_windows() {
        assert_eq!(Platform::current(), Platform::Windows);
    }
}
