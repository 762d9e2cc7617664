//! Browser profile (user data directory) management.
//!
//! Each spawned browser gets its own user data directory so runs never
//! share cache or compositor state.
//!
//! # Example
//!
//! ```no_run
//! use paint_timeline::driver::Profile;
//!
//! # fn example() -> paint_timeline::Result<()> {
//! let profile = Profile::new_temp()?;
//! println!("Profile at: {}", profile.path().display());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// Profile
// ============================================================================

/// A browser user data directory.
///
/// Temporary profiles created with [`Profile::new_temp()`] are deleted when
/// the `Profile` is dropped. Profiles created with [`Profile::from_path()`]
/// persist after the program exits.
pub struct Profile {
    /// Optional temporary directory handle (keeps temp dir alive).
    _temp_dir: Option<TempDir>,

    /// Path to the profile directory.
    path: PathBuf,
}

impl Profile {
    /// Creates a new temporary profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new_temp() -> Result<Self> {
        let temp_dir = TempDir::with_prefix("paint-timeline-")
            .map_err(|e| Error::config(format!("Failed to create temp profile: {e}")))?;

        let path = temp_dir.path().to_path_buf();
        debug!(path = %path.display(), "Created temporary profile");

        Ok(Self {
            _temp_dir: Some(temp_dir),
            path,
        })
    }

    /// Uses an existing profile directory.
    ///
    /// If the directory doesn't exist, it is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            fs::create_dir_all(&path).map_err(|e| {
                Error::config(format!(
                    "Failed to create profile directory at {}: {}",
                    path.display(),
                    e
                ))
            })?;
            debug!(path = %path.display(), "Created profile directory");
        } else {
            debug!(path = %path.display(), "Using existing profile directory");
        }

        Ok(Self {
            _temp_dir: None,
            path,
        })
    }

    /// Returns the path to the profile directory.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the directory is removed on drop.
    #[inline]
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self._temp_dir.is_some()
    }

    /// Returns the `--user-data-dir` argument for this profile.
    #[must_use]
    pub fn to_arg(&self) -> String {
        format!("--user-data-dir={}", self.path.display())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_profile_removed_on_drop() {
        let profile = Profile::new_temp().expect("temp profile");
        let path = profile.path().to_path_buf();
        assert!(path.exists());
        assert!(profile.is_temporary());

        drop(profile);
        assert!(!path.exists());
    }

    #[test]
    fn test_from_path_creates_directory() {
        let root = TempDir::new().expect("temp dir");
        let target = root.path().join("nested").join("profile");

        let profile = Profile::from_path(&target).expect("profile");
        assert!(target.exists());
        assert!(!profile.is_temporary());
        assert!(profile.to_arg().starts_with("--user-data-dir="));
    }
}
