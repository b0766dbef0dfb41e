//! Host (Windows) to guest (WSL) path translation.

/// Rewrites drive-letter paths into their mount point under the guest.
#[derive(Debug, Clone)]
pub struct PathTranslator {
    mount_root: String,
}

impl Default for PathTranslator {
    fn default() -> Self {
        Self::new("/mnt")
    }
}

impl PathTranslator {
    pub fn new(mount_root: impl Into<String>) -> Self {
        let mount_root = mount_root.into();
        let trimmed = mount_root.trim_end_matches('/');
        Self {
            mount_root: if trimmed.is_empty() {
                "/".to_string()
            } else {
                trimmed.to_string()
            },
        }
    }

    /// `C:\Users\me\a.png` becomes `/mnt/c/Users/me/a.png`.
    ///
    /// Backslashes are normalised first. Anything that does not start with a
    /// drive letter followed by `:/` is returned as normalised, so guest paths
    /// pass through unchanged.
    pub fn to_guest_path(&self, host: &str) -> String {
        let normalized = host.replace('\\', "/");
        match split_drive(&normalized) {
            Some((drive, rest)) => {
                let root = self.mount_root.trim_end_matches('/');
                format!("{}/{}/{}", root, drive.to_ascii_lowercase(), rest)
            }
            None => normalized,
        }
    }
}

fn split_drive(path: &str) -> Option<(char, &str)> {
    let mut chars = path.chars();
    let drive = chars.next().filter(char::is_ascii_alphabetic)?;
    path[1..].strip_prefix(":/").map(|rest| (drive, rest))
}
