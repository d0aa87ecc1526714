//! Code signing configuration.

use serde::Deserialize;
use std::path::PathBuf;

/// Authenticode signing configuration for the installer.
///
/// Signing only happens when all three values are present and both paths
/// exist on disk. Anything less skips signing with a warning; it is never an
/// error.
///
/// # Configuration
///
/// ```toml
/// [security]
/// signtool_path = "C:/Program Files (x86)/Windows Kits/10/bin/x64/signtool.exe"
/// certificate_path = "cert.pfx"
/// certificate_password = "secret"
/// ```
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    /// Path to the signing tool (`signtool.exe`).
    ///
    /// Default: None (unsigned)
    pub signtool_path: Option<PathBuf>,

    /// Path to the PKCS#12 certificate (.pfx).
    ///
    /// Default: None
    pub certificate_path: Option<PathBuf>,

    /// Password protecting the certificate.
    ///
    /// Default: None
    pub certificate_password: Option<String>,
}

impl std::fmt::Debug for SecuritySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecuritySettings")
            .field("signtool_path", &self.signtool_path)
            .field("certificate_path", &self.certificate_path)
            .field(
                "certificate_password",
                &self.certificate_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
