//! Session persistence boundary
//!
//! The only place the persisted session is read or written. When no
//! storage location exists, reads return absent and writes are dropped
//! silently, so callers never special-case the environment.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::models::User;

use super::tokens::Session;

pub struct SessionStore {
    backend: Backend,
}

enum Backend {
    /// TOML file under the platform config dir, mirrored in memory.
    File {
        path: PathBuf,
        cached: Mutex<Option<Session>>,
    },
    /// Memory only; used by tests.
    Memory {
        cached: Mutex<Option<Session>>,
    },
    /// No usable storage location on this platform.
    Disabled,
}

impl SessionStore {
    /// Store backed by the platform config directory, degrading to a
    /// disabled store when none exists.
    pub fn open_default() -> Self {
        match crate::config::session_path() {
            Some(path) => Self::open(path),
            None => {
                tracing::warn!("No config directory available; session will not persist");
                Self {
                    backend: Backend::Disabled,
                }
            }
        }
    }

    /// Store backed by a specific file, loading whatever session is
    /// already there. An unreadable file is treated as no session.
    pub fn open(path: PathBuf) -> Self {
        let cached = match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable session file: {e}");
                    None
                }
            },
            Err(_) => None,
        };
        Self {
            backend: Backend::File {
                path,
                cached: Mutex::new(cached),
            },
        }
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory {
                cached: Mutex::new(None),
            },
        }
    }

    pub fn session(&self) -> Option<Session> {
        match &self.backend {
            Backend::File { cached, .. } | Backend::Memory { cached } => {
                cached.lock().expect("session store poisoned").clone()
            }
            Backend::Disabled => None,
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.session().map(|s| s.token)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.session().map(|s| s.refresh_token)
    }

    pub fn user(&self) -> Option<User> {
        self.session().map(|s| s.user)
    }

    /// Replace the stored session. Persistence failures are logged and
    /// never surfaced; the in-memory copy always wins for this process.
    pub fn set(&self, session: Session) {
        match &self.backend {
            Backend::File { path, cached } => {
                *cached.lock().expect("session store poisoned") = Some(session.clone());
                if let Err(e) = write_session(path, &session) {
                    tracing::warn!("Failed to persist session: {e:#}");
                }
            }
            Backend::Memory { cached } => {
                *cached.lock().expect("session store poisoned") = Some(session);
            }
            Backend::Disabled => {}
        }
    }

    pub fn clear(&self) {
        match &self.backend {
            Backend::File { path, cached } => {
                *cached.lock().expect("session store poisoned") = None;
                if path.exists() {
                    if let Err(e) = fs::remove_file(path) {
                        tracing::warn!("Failed to remove session file: {e}");
                    }
                }
            }
            Backend::Memory { cached } => {
                *cached.lock().expect("session store poisoned") = None;
            }
            Backend::Disabled => {}
        }
    }
}

fn write_session(path: &PathBuf, session: &Session) -> anyhow::Result<()> {
    use anyhow::Context;

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("Failed to create config directory")?;
    }
    let content = toml::to_string_pretty(session).context("Failed to serialize session")?;
    fs::write(path, content).context("Failed to write session file")?;

    // Restrictive permissions: the file contains tokens
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        fs::set_permissions(path, perms).context("Failed to set session file permissions")?;
    }

    Ok(())
}
