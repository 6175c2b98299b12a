//! Supported platforms and their prebuilt archive table.

use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;

/// Platform a prebuilt archive exists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformKey {
    WindowsX64,
    LinuxX64,
    MacosX64,
}

/// One row of the release table. All per-platform values are read from here.
struct PlatformRow {
    key: PlatformKey,
    archive_identifier: &'static str,
    expected_digest: &'static str,
}

static PLATFORMS: [PlatformRow; 3] = [
    PlatformRow {
        key: PlatformKey::WindowsX64,
        archive_identifier: "x86_64-pc-windows-msvc",
        expected_digest: "f4039505b0c4a7de3dd5494c79df60187888a2ee76882a153f21e237928a85fb",
    },
    PlatformRow {
        key: PlatformKey::LinuxX64,
        archive_identifier: "x86_64-unknown-linux-gnu",
        expected_digest: "43d29654621fd4222ad22bb49fe0bec203463de5dbef4895637cc5782fdfa83b",
    },
    PlatformRow {
        key: PlatformKey::MacosX64,
        archive_identifier: "x86_64-apple-darwin",
        expected_digest: "a74dfbb53af0c72eea7a751fb928d0bd1ad37f6ae22fc7bc813f17d62df04fdd",
    },
];

impl PlatformKey {
    pub const ALL: [PlatformKey; 3] = [
        PlatformKey::WindowsX64,
        PlatformKey::LinuxX64,
        PlatformKey::MacosX64,
    ];

    /// Maps an operating system identifier to a platform key.
    ///
    /// Accepts both Rust's `std::env::consts::OS` names (`windows`, `macos`)
    /// and Node-style names (`win32`, `darwin`), case-insensitively.
    pub fn from_os(os: &str) -> Option<Self> {
        match os.trim().to_ascii_lowercase().as_str() {
            "windows" | "win32" => Some(PlatformKey::WindowsX64),
            "linux" => Some(PlatformKey::LinuxX64),
            "macos" | "darwin" => Some(PlatformKey::MacosX64),
            _ => None,
        }
    }

    /// Like [`PlatformKey::from_os`], but only for an x86-64 CPU, since every
    /// published archive is an x86-64 build. `arch` uses `std::env::consts::ARCH`
    /// names; Node's `x64` is accepted too.
    pub fn from_os_arch(os: &str, arch: &str) -> Option<Self> {
        match arch.trim().to_ascii_lowercase().as_str() {
            "x86_64" | "x64" | "amd64" => Self::from_os(os),
            _ => None,
        }
    }

    /// Key for the running machine, if an archive is published for it.
    pub fn detect() -> Option<Self> {
        Self::from_os_arch(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKey::WindowsX64 => "windows-x64",
            PlatformKey::LinuxX64 => "linux-x64",
            PlatformKey::MacosX64 => "macos-x64",
        }
    }

    /// Target triple the release archive is named after.
    pub fn archive_identifier(&self) -> &'static str {
        self.row().archive_identifier
    }

    /// Lowercase hex SHA-256 of the published archive.
    pub fn expected_digest(&self) -> &'static str {
        self.row().expected_digest
    }

    fn row(&self) -> &'static PlatformRow {
        let index = match self {
            PlatformKey::WindowsX64 => 0,
            PlatformKey::LinuxX64 => 1,
            PlatformKey::MacosX64 => 2,
        };
        let row = &PLATFORMS[index];
        debug_assert_eq!(row.key, *self);
        row
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformKey {
    type Err = anyhow::Error;

    /// Parses either a platform key (`linux-x64`) or an OS identifier (`linux`).
    fn from_str(s: &str) -> Result<Self> {
        if let Some(key) = Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
        {
            return Ok(key);
        }
        match Self::from_os(s) {
            Some(key) => Ok(key),
            None => bail!("unknown platform '{}'", s),
        }
    }
}
