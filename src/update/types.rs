//! Update descriptor models.
//!
//! Wire shape of the update-check endpoint:
//! `{ versionCode, versionName, changelog, downloadInfo }`.

use serde::Deserialize;
use thiserror::Error;

/// Build-time fallback URL for update packages.
pub const BUNDLED_PACKAGE_URL: &str =
    "https://github.com/tunegrab/tunegrab/releases/latest/download/tunegrab.tar.gz";

/// Update flow errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    /// Descriptor asked for an explicit link but carried none.
    #[error("Malformed update descriptor: useBundledUpdateLink is false but updateLink is missing")]
    MalformedDescriptor,
}

/// Download portion of an update descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadInfo {
    /// Whether to use the build-time bundled link instead of `update_link`.
    #[serde(default)]
    pub use_bundled_update_link: bool,
    /// Server-supplied download URL; required when the bundled link is off.
    #[serde(default)]
    pub update_link: Option<String>,
}

/// A parsed update-check response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDescriptor {
    /// Monotonic build number of the offered version.
    #[serde(default)]
    pub version_code: u32,
    /// Human-readable version string.
    #[serde(default)]
    pub version_name: String,
    /// Release notes shown in the prompt.
    #[serde(default)]
    pub changelog: String,
    /// Where to fetch the package from.
    #[serde(default)]
    pub download_info: DownloadInfo,
}

impl UpdateDescriptor {
    /// Resolves the download URL for this descriptor.
    ///
    /// A descriptor with `use_bundled_update_link == false` and an empty or
    /// absent link is malformed; it is rejected instead of dereferenced.
    pub fn resolve_download_url(&self) -> Result<String, UpdateError> {
        if self.download_info.use_bundled_update_link {
            return Ok(BUNDLED_PACKAGE_URL.to_string());
        }

        match self.download_info.update_link.as_deref() {
            Some(link) if !link.trim().is_empty() => Ok(link.to_string()),
            _ => Err(UpdateError::MalformedDescriptor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_descriptor() {
        let descriptor: UpdateDescriptor = serde_json::from_str(
            r#"{
                "versionCode": 31,
                "versionName": "1.3.1",
                "changelog": "Fixes",
                "downloadInfo": { "useBundledUpdateLink": true, "updateLink": null }
            }"#,
        )
        .expect("parse");

        assert_eq!(descriptor.version_code, 31);
        assert_eq!(descriptor.version_name, "1.3.1");
        assert!(descriptor.download_info.use_bundled_update_link);
    }

    #[test]
    fn test_resolve_bundled_url() {
        let descriptor = UpdateDescriptor {
            download_info: DownloadInfo {
                use_bundled_update_link: true,
                update_link: None,
            },
            ..UpdateDescriptor::default()
        };

        assert_eq!(
            descriptor.resolve_download_url().expect("url"),
            BUNDLED_PACKAGE_URL
        );
    }

    #[test]
    fn test_resolve_explicit_url() {
        let descriptor = UpdateDescriptor {
            download_info: DownloadInfo {
                use_bundled_update_link: false,
                update_link: Some("https://example.com/pkg.tar.gz".to_string()),
            },
            ..UpdateDescriptor::default()
        };

        assert_eq!(
            descriptor.resolve_download_url().expect("url"),
            "https://example.com/pkg.tar.gz"
        );
    }

    #[test]
    fn test_missing_link_is_malformed() {
        let descriptor = UpdateDescriptor {
            download_info: DownloadInfo {
                use_bundled_update_link: false,
                update_link: None,
            },
            ..UpdateDescriptor::default()
        };

        assert_eq!(
            descriptor.resolve_download_url(),
            Err(UpdateError::MalformedDescriptor)
        );
    }

    #[test]
    fn test_blank_link_is_malformed() {
        let descriptor = UpdateDescriptor {
            download_info: DownloadInfo {
                use_bundled_update_link: false,
                update_link: Some("   ".to_string()),
            },
            ..UpdateDescriptor::default()
        };

        assert_eq!(
            descriptor.resolve_download_url(),
            Err(UpdateError::MalformedDescriptor)
        );
    }
}
