//! Transactional artifact publishing.
//!
//! Artifacts are staged in a temporary directory, then each one replaces its
//! destination via temp file + rename. If any publish step fails, files
//! already published are restored from backups (or removed if they did not
//! exist before), so a failed run leaves the previous artifacts in place.
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

struct StagedFile {
    staged: PathBuf,
    dest: PathBuf,
}

pub struct Staging {
    dir: TempDir,
    files: Vec<StagedFile>,
}

impl Staging {
    /// Create a staging directory inside `parent`.
    pub fn new_in(parent: &Path) -> Result<Self> {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        let dir = tempfile::Builder::new()
            .prefix(".hmeta-staging-")
            .tempdir_in(parent)
            .with_context(|| format!("create staging dir in {}", parent.display()))?;
        Ok(Self {
            dir,
            files: Vec::new(),
        })
    }

    /// Stage `bytes` for publication at `dest`. Files publish in staging order.
    pub fn stage(&mut self, dest: &Path, bytes: &[u8]) -> Result<()> {
        if self.files.iter().any(|file| file.dest == dest) {
            return Err(anyhow!("{} staged twice", dest.display()));
        }
        let staged = self
            .dir
            .path()
            .join(format!("{}.staged", self.files.len()));
        fs::write(&staged, bytes).with_context(|| format!("write {}", staged.display()))?;
        self.files.push(StagedFile {
            staged,
            dest: dest.to_path_buf(),
        });
        Ok(())
    }

    /// Publish every staged file, rolling back on the first failure.
    pub fn publish(self) -> Result<Vec<PathBuf>> {
        let backup_root = self.dir.path().join("backup");
        fs::create_dir_all(&backup_root)
            .with_context(|| format!("create {}", backup_root.display()))?;
        let mut published = Vec::new();
        let mut backups: Vec<(PathBuf, PathBuf)> = Vec::new();
        let mut created: Vec<PathBuf> = Vec::new();
        for (idx, file) in self.files.iter().enumerate() {
            if file.dest.exists() {
                let backup = backup_root.join(idx.to_string());
                if let Err(err) = fs::copy(&file.dest, &backup)
                    .with_context(|| format!("backup {}", file.dest.display()))
                {
                    rollback_publish(&backups, &created);
                    return Err(err);
                }
                backups.push((file.dest.clone(), backup));
            } else {
                created.push(file.dest.clone());
            }

            if let Err(err) = publish_file(&file.staged, &file.dest) {
                rollback_publish(&backups, &created);
                return Err(err);
            }
            tracing::debug!(path = %file.dest.display(), "published artifact");
            published.push(file.dest.clone());
        }
        Ok(published)
    }
}

fn publish_file(source: &Path, dest: &Path) -> Result<()> {
    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    let bytes = fs::read(source).with_context(|| format!("read {}", source.display()))?;
    let mut tmp =
        NamedTempFile::new_in(parent).with_context(|| format!("publish {}", dest.display()))?;
    tmp.write_all(&bytes)
        .with_context(|| format!("publish {}", dest.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("sync {}", dest.display()))?;
    tmp.persist(dest)
        .map_err(|err| err.error)
        .with_context(|| format!("publish {}", dest.display()))?;
    Ok(())
}

fn rollback_publish(backups: &[(PathBuf, PathBuf)], created: &[PathBuf]) {
    for path in created {
        remove_created(path);
    }
    for (dest, backup) in backups {
        if let Err(err) = publish_file(backup, dest) {
            tracing::error!(path = %dest.display(), error = %format!("{err:#}"), "rollback failed");
        }
    }
}

/// Remove an artifact this publish created. Returns false if it is still there.
fn remove_created(path: &Path) -> bool {
    if !path.exists() {
        return true;
    }
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "rollback removal failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_writes_all_files_and_cleans_staging() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let a = temp.path().join("a.xml");
        let b = temp.path().join("out/b.md5");
        fs::write(&a, b"old").expect("seed previous artifact");

        let mut staging = Staging::new_in(temp.path()).expect("create staging");
        staging.stage(&a, b"new-a").expect("stage a");
        staging.stage(&b, b"new-b").expect("stage b");
        let published = staging.publish().expect("publish");

        assert_eq!(published, vec![a.clone(), b.clone()]);
        assert_eq!(fs::read(&a).expect("read a"), b"new-a");
        assert_eq!(fs::read(&b).expect("read b"), b"new-b");
        let mut leftovers: Vec<String> = fs::read_dir(temp.path())
            .expect("list temp dir")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        leftovers.sort();
        assert_eq!(leftovers, ["a.xml", "out"]);
    }

    #[test]
    fn failed_publish_restores_previous_artifacts() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let a = temp.path().join("a.xml");
        let fresh = temp.path().join("fresh.md5");
        // A directory at the destination cannot be backed up or replaced.
        let blocked = temp.path().join("blocked");
        fs::create_dir_all(blocked.join("inner")).expect("create blocking dir");
        fs::write(&a, b"old").expect("seed previous artifact");

        let mut staging = Staging::new_in(temp.path()).expect("create staging");
        staging.stage(&a, b"new-a").expect("stage a");
        staging.stage(&fresh, b"new-fresh").expect("stage fresh");
        staging.stage(&blocked, b"never").expect("stage blocked");
        assert!(staging.publish().is_err());

        assert_eq!(fs::read(&a).expect("read a"), b"old");
        assert!(!fresh.exists());
    }

    #[test]
    fn rollback_removal_reports_what_it_could_not_remove() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let file = temp.path().join("created.xml");
        fs::write(&file, b"partial").expect("write created artifact");
        let dir = temp.path().join("created-dir");
        fs::create_dir(&dir).expect("create dir");

        assert!(remove_created(&file));
        assert!(!file.exists());
        assert!(remove_created(&temp.path().join("never-created")));
        assert!(!remove_created(&dir));
        assert!(dir.exists());
    }

    #[test]
    fn staging_same_destination_twice_is_rejected() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let dest = temp.path().join("a.xml");
        let mut staging = Staging::new_in(temp.path()).expect("create staging");
        staging.stage(&dest, b"one").expect("stage once");
        assert!(staging.stage(&dest, b"two").is_err());
    }
}
