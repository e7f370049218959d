//! Ignore rules for the raw asset tree
//!
//! Editors and operating systems litter asset folders with files that must
//! never be imported. Two sources of patterns:
//! 1. Built-in junk patterns (always active)
//! 2. A `.syncignore` file at the raw root (gitignore syntax, optional)

use anyhow::Result;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};

const SYNCIGNORE_FILE: &str = ".syncignore";

/// Combined ignore filter applied at event ingest and during reconciliation
pub struct IgnoreRules {
    raw_root: PathBuf,
    syncignore: Option<Gitignore>,
}

impl IgnoreRules {
    /// Load rules for a raw root, picking up `.syncignore` if present
    pub fn load(raw_root: &Path) -> Result<Self> {
        let ignore_path = raw_root.join(SYNCIGNORE_FILE);
        let syncignore = if ignore_path.exists() {
            let mut builder = GitignoreBuilder::new(raw_root);
            builder.add(&ignore_path);
            Some(builder.build()?)
        } else {
            None
        };

        Ok(Self {
            raw_root: raw_root.to_path_buf(),
            syncignore,
        })
    }

    /// True if the path must not produce imports
    pub fn should_ignore(&self, path: &Path) -> bool {
        if self.is_junk(path) {
            return true;
        }

        if let Some(ref syncignore) = self.syncignore {
            // Anchored patterns expect paths relative to the raw root.
            let relative = path.strip_prefix(&self.raw_root).unwrap_or(path);
            let is_dir = self.raw_root.join(relative).is_dir();
            if syncignore.matched(relative, is_dir).is_ignore() {
                return true;
            }
        }

        false
    }

    /// Built-in patterns: editor temp files, OS junk, VCS metadata
    fn is_junk(&self, path: &Path) -> bool {
        for component in path.components() {
            if let std::path::Component::Normal(name) = component {
                match name.to_string_lossy().as_ref() {
                    ".git" | ".svn" | SYNCIGNORE_FILE => return true,
                    _ => {}
                }
            }
        }

        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };

        // Vim swap files
        if filename.ends_with(".swp") || filename.ends_with(".swo") || filename.ends_with(".swn") {
            return true;
        }

        // Vim/Emacs backups and Emacs auto-save/lock files
        if filename.ends_with('~')
            || (filename.starts_with('#') && filename.ends_with('#'))
            || filename.starts_with(".#")
        {
            return true;
        }

        // macOS
        if filename == ".DS_Store" || filename.starts_with("._") {
            return true;
        }

        // Windows
        if filename == "Thumbs.db" || filename == "desktop.ini" {
            return true;
        }

        false
    }
}
