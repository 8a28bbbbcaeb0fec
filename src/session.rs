//! Session storage (encrypted file)
//!
//! The access token, refresh token and cached user are stored encrypted
//! with AES-256-GCM in ~/.config/sosmed/session.enc.
//! The encryption key is derived from machine-specific identifiers.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{LoginData, User};
use crate::paths;

const NONCE_SIZE: usize = 12;

/// What survives between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token
    pub access_token: String,
    /// Refresh token
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Cached user object
    pub user: User,
}

impl From<LoginData> for Session {
    fn from(data: LoginData) -> Self {
        Self {
            access_token: data.access_token,
            refresh_token: data.refresh_token,
            user: data.user,
        }
    }
}

/// Get machine ID for key derivation (cross-platform)
fn get_machine_id() -> String {
    // Linux: /etc/machine-id or /var/lib/dbus/machine-id
    #[cfg(target_os = "linux")]
    {
        for candidate in ["/etc/machine-id", "/var/lib/dbus/machine-id"] {
            if let Ok(id) = fs::read_to_string(candidate) {
                return id.trim().to_string();
            }
        }
    }

    // macOS: IOPlatformUUID via ioreg
    #[cfg(target_os = "macos")]
    {
        if let Ok(output) = std::process::Command::new("ioreg")
            .args(["-rd1", "-c", "IOPlatformExpertDevice"])
            .output()
        {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if let Some(uuid) = stdout
                .lines()
                .find(|l| l.contains("IOPlatformUUID"))
                .and_then(|l| l.split('"').nth(3))
            {
                return uuid.to_string();
            }
        }
    }

    // Fallback: home directory path
    dirs::home_dir().map_or_else(
        || "sosmed-fallback-key".to_string(),
        |p| p.to_string_lossy().to_string(),
    )
}

/// Derive encryption key from machine-specific data
fn derive_key() -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(get_machine_id().as_bytes());
    if let Some(home) = dirs::home_dir() {
        hasher.update(home.to_string_lossy().as_bytes());
    }
    hasher.update(b"sosmed-session-v1");
    hasher.finalize().into()
}

/// Encrypted on-disk session
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store at the default location
    pub fn open() -> Result<Self> {
        Ok(Self::at(paths::session_path()?))
    }

    /// Store at a specific path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File backing this store
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved session, if any.
    ///
    /// A file that cannot be decrypted (e.g. copied from another machine)
    /// is treated as no session.
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let encrypted = fs::read(&self.path).context("Failed to read session file")?;
        if encrypted.len() < NONCE_SIZE {
            return Ok(None);
        }

        let (nonce_bytes, ciphertext) = encrypted.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);
        let cipher = Aes256Gcm::new_from_slice(&derive_key())
            .map_err(|_| anyhow::anyhow!("Invalid key length"))?;

        let Ok(plaintext) = cipher.decrypt(nonce, ciphertext) else {
            tracing::warn!("Ignoring undecryptable session at {}", self.path.display());
            return Ok(None);
        };

        let session = serde_json::from_slice(&plaintext).context("Invalid session contents")?;
        Ok(Some(session))
    }

    /// Persist a session, replacing any previous one
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }

        let json = serde_json::to_vec(session)?;
        let cipher = Aes256Gcm::new_from_slice(&derive_key())
            .map_err(|_| anyhow::anyhow!("Invalid key length"))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, json.as_slice())
            .map_err(|_| anyhow::anyhow!("Failed to encrypt session"))?;

        let mut output = nonce_bytes.to_vec();
        output.extend(ciphertext);
        fs::write(&self.path, output).context("Failed to write session file")?;

        // Set restrictive permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    /// Replace the cached user, keeping the tokens
    pub fn update_user(&self, user: &User) -> Result<()> {
        if let Some(mut session) = self.load()? {
            session.user = user.clone();
            self.save(&session)?;
        }
        Ok(())
    }

    /// Forget the session
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove session file"),
        }
    }
}
