//! Build metadata generated by the build script

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Product service used when neither the config file nor the CLI names one
pub fn default_api_url() -> &'static str {
    DEFAULT_API_URL
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}

/// Text shown by `--version`
pub fn long_version() -> String {
    format!(
        "{} (git {}, built {})",
        env!("CARGO_PKG_VERSION"),
        git_hash(),
        build_time()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_version_carries_build_metadata() {
        let version = long_version();
        assert!(version.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(version.contains(git_hash()));
        assert!(default_api_url().starts_with("http"));
    }
}
