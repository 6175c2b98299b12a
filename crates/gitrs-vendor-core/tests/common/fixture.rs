//! Fixture release archives built at test time.

use gitrs_vendor_core::config::{InstallerConfig, ReleaseConfig};
use gitrs_vendor_core::PlatformKey;
use sha2::{Digest, Sha256};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

pub const GITRS_BYTES: &[u8] = b"#!/bin/sh\necho gitrs fixture 0.1.1\n";

/// Zip bytes with the given entries.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut w = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        w.start_file(*name, SimpleFileOptions::default().unix_permissions(0o755))
            .unwrap();
        w.write_all(data).unwrap();
    }
    w.finish().unwrap().into_inner()
}

/// The release bundle: a single `bin/gitrs`.
pub fn gitrs_bundle() -> Vec<u8> {
    zip_bytes(&[("bin/gitrs", GITRS_BYTES)])
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Config pointing at `base_url` with the Linux digest set to `digest`.
pub fn config_for(base_url: &str, digest: &str) -> InstallerConfig {
    let mut release = ReleaseConfig {
        base_url: format!("{}/releases/download", base_url),
        ..ReleaseConfig::default()
    };
    release
        .digests
        .insert(PlatformKey::LinuxX64.as_str().to_string(), digest.to_string());
    let mut cfg = InstallerConfig {
        release,
        ..InstallerConfig::default()
    };
    cfg.transfer.connect_timeout_secs = 5;
    cfg.transfer.timeout_secs = 30;
    cfg
}
