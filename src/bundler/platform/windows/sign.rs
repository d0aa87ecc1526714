//! Authenticode signing of the generated installer.
//!
//! Signing is best-effort: every problem is reported as a [`SigningWarning`]
//! and never changes the outcome of the installer stage.

use crate::bundler::{
    error::Error,
    process::{CommandSpec, ProcessRunner},
    settings::SecuritySettings,
};
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;
use tokio_util::sync::CancellationToken;

/// Reason the installer was left unsigned.
#[derive(Debug, ThisError)]
pub enum SigningWarning {
    /// A credential was not configured.
    #[error("signing skipped: no {0} configured")]
    NotConfigured(&'static str),

    /// A configured path does not exist.
    #[error("signing skipped: {what} not found at {}", path.display())]
    Missing {
        /// Which credential is missing
        what: &'static str,
        /// Path that was checked
        path: PathBuf,
    },

    /// The signing tool could not be started or was cancelled.
    #[error("signing tool could not run: {0}")]
    Launch(String),

    /// The signing tool reported failure.
    #[error("signing tool exited with code {0}")]
    Failed(i32),
}

/// Complete, verified signing credentials.
#[derive(Clone, Copy, Debug)]
pub struct SigningCredentials<'a> {
    /// Signing tool executable
    pub tool: &'a Path,
    /// PKCS#12 certificate
    pub certificate: &'a Path,
    /// Certificate password
    pub password: &'a str,
}

/// Check that every credential is present and both paths exist.
pub fn credentials(security: &SecuritySettings) -> Result<SigningCredentials<'_>, SigningWarning> {
    let tool = non_empty_path(security.signtool_path.as_deref())
        .ok_or(SigningWarning::NotConfigured("signing tool"))?;
    let certificate = non_empty_path(security.certificate_path.as_deref())
        .ok_or(SigningWarning::NotConfigured("certificate"))?;
    let password = security
        .certificate_password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or(SigningWarning::NotConfigured("certificate password"))?;

    if !tool.is_file() {
        return Err(SigningWarning::Missing {
            what: "signing tool",
            path: tool.to_path_buf(),
        });
    }
    if !certificate.is_file() {
        return Err(SigningWarning::Missing {
            what: "certificate",
            path: certificate.to_path_buf(),
        });
    }

    Ok(SigningCredentials {
        tool,
        certificate,
        password,
    })
}

fn non_empty_path(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

/// `signtool sign` invocation with SHA-256 digests and RFC 3161 timestamping.
pub fn signing_command(
    credentials: &SigningCredentials<'_>,
    timestamp_url: &str,
    target: &Path,
) -> CommandSpec {
    CommandSpec::new(credentials.tool)
        .arg("sign")
        .arg("/f")
        .arg(credentials.certificate)
        .arg("/p")
        .arg_secret(credentials.password)
        .args(["/fd", "sha256", "/tr", timestamp_url, "/td", "sha256"])
        .arg(target)
}

/// Sign `target` if the credentials allow it.
pub async fn sign_file(
    runner: &ProcessRunner,
    security: &SecuritySettings,
    timestamp_url: &str,
    target: &Path,
    cancel: &CancellationToken,
) -> Result<(), SigningWarning> {
    let credentials = credentials(security)?;
    let command = signing_command(&credentials, timestamp_url, target);

    runner
        .log()
        .write(&format!("Signing {}", target.display()));

    let code = runner.run(&command, cancel).await.map_err(|e| match e {
        Error::CommandFailed { error, .. } => SigningWarning::Launch(error.to_string()),
        other => SigningWarning::Launch(other.to_string()),
    })?;

    if code != 0 {
        return Err(SigningWarning::Failed(code));
    }
    Ok(())
}
