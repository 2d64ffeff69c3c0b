//! Version selection for the external packaging library.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

const LATEST: &str = "latest";

/// Which release of the packaging library to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    /// Unpinned; the package manager picks the newest release.
    Latest,
    /// Exact version string, passed through unvalidated.
    Pinned(String),
}

impl VersionSelector {
    /// Package requirement understood by the installer (`pkg` or `pkg==1.2.3`).
    pub fn requirement(&self, package: &str) -> String {
        match self {
            Self::Latest => package.to_string(),
            Self::Pinned(version) => format!("{package}=={version}"),
        }
    }
}

impl FromStr for VersionSelector {
    type Err = Infallible;

    /// Blank input and any casing of `latest` select [`VersionSelector::Latest`].
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(LATEST) {
            Ok(Self::Latest)
        } else {
            Ok(Self::Pinned(trimmed.to_string()))
        }
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST),
            Self::Pinned(version) => f.write_str(version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> VersionSelector {
        raw.parse().expect("infallible")
    }

    #[test]
    fn latest_is_case_insensitive() {
        assert_eq!(parse("latest"), VersionSelector::Latest);
        assert_eq!(parse("LATEST"), VersionSelector::Latest);
        assert_eq!(parse(""), VersionSelector::Latest);
    }

    #[test]
    fn pinned_version_renders_exact_requirement() {
        let selector = parse(" 1.4.2 ");
        assert_eq!(selector, VersionSelector::Pinned("1.4.2".to_string()));
        assert_eq!(selector.requirement("hivecraft"), "hivecraft==1.4.2");
        assert_eq!(selector.to_string(), "1.4.2");
    }

    #[test]
    fn latest_renders_bare_package() {
        assert_eq!(VersionSelector::Latest.requirement("hivecraft"), "hivecraft");
    }
}
