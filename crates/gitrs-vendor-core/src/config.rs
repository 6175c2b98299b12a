use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::platform::PlatformKey;
use crate::retry::RetryPolicy;

/// Where release archives are published.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Prefix of the download URL; the version and archive name are appended.
    pub base_url: String,
    /// Release tag to install.
    pub version: String,
    /// Per-platform digest overrides keyed by platform key ("linux-x64") or
    /// OS name ("linux"). At most one key per platform.
    pub digests: BTreeMap<String, String>,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            base_url: "https://github.com/Axosoft/git-rs/releases/download".to_string(),
            version: "0.1.1".to_string(),
            digests: BTreeMap::new(),
        }
    }
}

impl ReleaseConfig {
    /// Download URL for the given platform's archive.
    pub fn source_url(&self, platform: PlatformKey) -> String {
        format!(
            "{}/{}/{}.zip",
            self.base_url.trim_end_matches('/'),
            self.version.trim_matches('/'),
            platform.archive_identifier()
        )
    }

    /// Expected digest for `platform`: the configured override if any, else the built-in one.
    pub fn digest_for(&self, platform: PlatformKey) -> String {
        self.digests
            .iter()
            .find(|(key, _)| key.parse::<PlatformKey>().ok() == Some(platform))
            .map(|(_, d)| d.trim().to_ascii_lowercase())
            .unwrap_or_else(|| platform.expected_digest().to_string())
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (key, digest) in &self.digests {
            let platform = key
                .parse::<PlatformKey>()
                .with_context(|| format!("[release.digests] has unknown key '{}'", key))?;
            if !seen.insert(platform) {
                bail!("[release.digests] has more than one key for {}", platform);
            }
            let digest = digest.trim();
            if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                bail!(
                    "[release.digests] {} is not a hex SHA-256 digest: '{}'",
                    key,
                    digest
                );
            }
        }
        Ok(())
    }
}

/// libcurl timeouts and redirect limits for the download stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    pub connect_timeout_secs: u64,
    /// Upper bound for the whole transfer (0 = no limit).
    pub timeout_secs: u64,
    /// Abort when slower than this many bytes/sec for `low_speed_time_secs`.
    pub low_speed_limit_bytes: u32,
    pub low_speed_time_secs: u64,
    pub max_redirections: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 600,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            max_redirections: 10,
        }
    }
}

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of download attempts (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

impl RetryConfig {
    fn validate(&self) -> Result<()> {
        if !self.base_delay_secs.is_finite() || self.base_delay_secs < 0.0 {
            bail!(
                "[retry] base_delay_secs must be a non-negative number of seconds, got {}",
                self.base_delay_secs
            );
        }
        Ok(())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        let max_delay = Duration::from_secs(cfg.max_delay_secs);
        RetryPolicy {
            max_attempts: cfg.max_attempts.max(1),
            // out-of-range values only reach here without load_from_path
            base_delay: Duration::try_from_secs_f64(cfg.base_delay_secs.max(0.0))
                .unwrap_or(max_delay),
            max_delay,
        }
    }
}

/// Installer configuration loaded from `~/.config/gitrs-vendor/config.toml`.
/// Every field is optional; missing ones take the built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Vendor directory, relative to the working directory.
    pub vendor_dir: String,
    pub release: ReleaseConfig,
    pub transfer: TransferConfig,
    /// Optional retry policy; if missing, the download is attempted once.
    pub retry: Option<RetryConfig>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            vendor_dir: "vendor".to_string(),
            release: ReleaseConfig::default(),
            transfer: TransferConfig::default(),
            retry: None,
        }
    }
}

impl InstallerConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryPolicy::from)
            .unwrap_or_else(RetryPolicy::single_attempt)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("gitrs-vendor")?;
    Ok(xdg_dirs.get_config_home().join("config.toml"))
}

/// Parse and validate a config file.
pub fn load_from_path(path: &Path) -> Result<InstallerConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: InstallerConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    cfg.release.validate()?;
    if let Some(retry) = &cfg.retry {
        retry.validate()?;
    }
    Ok(cfg)
}

/// Load `explicit` if given, else the XDG config file if it exists, else defaults.
/// Never writes a config file.
pub fn load(explicit: Option<&Path>) -> Result<InstallerConfig> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }
    let path = config_path()?;
    if !path.exists() {
        tracing::debug!("no config at {}, using defaults", path.display());
        return Ok(InstallerConfig::default());
    }
    load_from_path(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = InstallerConfig::default();
        assert_eq!(cfg.vendor_dir, "vendor");
        assert_eq!(cfg.release.version, "0.1.1");
        assert_eq!(cfg.transfer.connect_timeout_secs, 30);
        assert!(cfg.retry.is_none());
        assert_eq!(cfg.retry_policy().max_attempts, 1);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = InstallerConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: InstallerConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.vendor_dir, cfg.vendor_dir);
        assert_eq!(parsed.release.base_url, cfg.release.base_url);
        assert_eq!(parsed.transfer.timeout_secs, cfg.transfer.timeout_secs);
    }

    #[test]
    fn source_url_uses_release_layout() {
        let release = ReleaseConfig::default();
        assert_eq!(
            release.source_url(PlatformKey::LinuxX64),
            "https://github.com/Axosoft/git-rs/releases/download/0.1.1/x86_64-unknown-linux-gnu.zip"
        );
        let mirror = ReleaseConfig {
            base_url: "http://127.0.0.1:8080/releases/".to_string(),
            version: "0.2.0".to_string(),
            digests: BTreeMap::new(),
        };
        assert_eq!(
            mirror.source_url(PlatformKey::MacosX64),
            "http://127.0.0.1:8080/releases/0.2.0/x86_64-apple-darwin.zip"
        );
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            vendor_dir = "third_party"

            [release]
            version = "0.2.0"

            [release.digests]
            linux-x64 = "ABCDEF0123456789abcdef0123456789abcdef0123456789abcdef0123456789"

            [transfer]
            connect_timeout_secs = 5
        "#;
        let cfg: InstallerConfig = toml::from_str(toml).unwrap();
        cfg.release.validate().unwrap();
        assert_eq!(cfg.vendor_dir, "third_party");
        assert_eq!(cfg.release.version, "0.2.0");
        assert_eq!(
            cfg.release.base_url,
            "https://github.com/Axosoft/git-rs/releases/download"
        );
        assert_eq!(
            cfg.release.digest_for(PlatformKey::LinuxX64),
            "abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789"
        );
        assert_eq!(
            cfg.release.digest_for(PlatformKey::MacosX64),
            PlatformKey::MacosX64.expected_digest()
        );
        assert_eq!(cfg.transfer.connect_timeout_secs, 5);
        assert_eq!(cfg.transfer.max_redirections, 10);
    }

    #[test]
    fn config_rejects_bad_digest_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "vendor_dir = \"vendor\"\n[release.digests]\nlinux-x64 = \"nothex\"\n",
        )
        .unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("not a hex SHA-256"));
    }

    #[test]
    fn config_rejects_unknown_digest_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[release.digests]\nsparc-64 = \"00\"\n",
        )
        .unwrap();
        assert!(load_from_path(&path).is_err());
    }

    #[test]
    fn config_toml_retry_section() {
        let toml = r#"
            vendor_dir = "vendor"

            [retry]
            max_attempts = 3
            base_delay_secs = 0.5
            max_delay_secs = 15
        "#;
        let cfg: InstallerConfig = toml::from_str(toml).unwrap();
        let retry = cfg.retry.as_ref().unwrap();
        assert_eq!(retry.max_attempts, 3);
        assert!((retry.base_delay_secs - 0.5).abs() < 1e-9);
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(15));
    }

    #[test]
    fn partial_retry_section_takes_defaults() {
        let cfg: InstallerConfig = toml::from_str("[retry]\nmax_attempts = 3\n").unwrap();
        let retry = cfg.retry.as_ref().unwrap();
        assert_eq!(retry.max_attempts, 3);
        assert!((retry.base_delay_secs - 0.25).abs() < 1e-9);
        assert_eq!(retry.max_delay_secs, 30);
        assert_eq!(cfg.retry_policy().base_delay, Duration::from_millis(250));
    }

    #[test]
    fn config_rejects_infinite_retry_delay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[retry]\nmax_attempts = 2\nbase_delay_secs = inf\n").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("base_delay_secs"));

        fs::write(&path, "[retry]\nbase_delay_secs = -1.0\n").unwrap();
        assert!(load_from_path(&path).is_err());
    }

    #[test]
    fn out_of_range_delay_does_not_panic_policy_conversion() {
        let retry = RetryConfig {
            max_attempts: 2,
            base_delay_secs: f64::INFINITY,
            max_delay_secs: 5,
        };
        let policy = RetryPolicy::from(&retry);
        assert_eq!(policy.base_delay, Duration::from_secs(5));
    }

    #[test]
    fn os_name_digest_key_overrides_its_platform() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let digest = "ab".repeat(32);
        fs::write(
            &path,
            format!("[release.digests]\nlinux = \"{}\"\nDarwin = \"{}\"\n", digest, "CD".repeat(32)),
        )
        .unwrap();
        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg.release.digest_for(PlatformKey::LinuxX64), digest);
        assert_eq!(cfg.release.digest_for(PlatformKey::MacosX64), "cd".repeat(32));
        assert_eq!(
            cfg.release.digest_for(PlatformKey::WindowsX64),
            PlatformKey::WindowsX64.expected_digest()
        );
    }

    #[test]
    fn config_rejects_two_keys_for_one_platform() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            format!(
                "[release.digests]\nlinux = \"{}\"\nlinux-x64 = \"{}\"\n",
                "ab".repeat(32),
                "cd".repeat(32)
            ),
        )
        .unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("more than one key for linux-x64"));
    }
}
