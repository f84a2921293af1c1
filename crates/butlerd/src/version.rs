//! Daemon version metadata carried in every error reply.

/// Immutable version strings copied into every request context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    version: String,
    version_string: String,
}

impl VersionInfo {
    /// Creates version metadata from explicit strings.
    pub fn new(version: impl Into<String>, version_string: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            version_string: version_string.into(),
        }
    }

    /// Derives version metadata from this crate's package version.
    #[must_use]
    pub fn from_package() -> Self {
        let version = env!("CARGO_PKG_VERSION");
        Self::new(version, format!("v{version}"))
    }

    /// Bare version, for example `1.2.3`.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Display form reported to clients as `butlerVersion`.
    #[must_use]
    pub fn version_string(&self) -> &str {
        &self.version_string
    }
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self::from_package()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_version_is_prefixed() {
        let info = VersionInfo::from_package();
        assert_eq!(info.version(), env!("CARGO_PKG_VERSION"));
        assert_eq!(info.version_string(), format!("v{}", env!("CARGO_PKG_VERSION")));
    }
}
