//! Artifact naming and atomic file writes.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::{DeclutterError, Result};

/// The kinds of artifact an operation can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// The decluttered page
    Cleaned,
    /// The page with every table removed
    NoTables,
    /// Only the tables, one after another
    TablesOnly,
    /// Main content as plain text
    Content,
}

impl ArtifactKind {
    /// Suffix appended to the source file stem.
    pub fn suffix(self) -> &'static str {
        match self {
            ArtifactKind::Cleaned => "_cleaned",
            ArtifactKind::NoTables => "_no_tables",
            ArtifactKind::TablesOnly => "_tables_only",
            ArtifactKind::Content => "_content",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Content => "txt",
            ArtifactKind::Cleaned | ArtifactKind::NoTables | ArtifactKind::TablesOnly => "html",
        }
    }
}

/// Where artifacts are written.
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Directory for artifacts (default: next to the source file)
    pub out_dir: Option<PathBuf>,
}

impl OutputConfig {
    /// Derives the destination of an artifact from the source path.
    ///
    /// # Example
    ///
    /// ```rust
    /// use declutter_core::{ArtifactKind, OutputConfig};
    /// use std::path::Path;
    ///
    /// let config = OutputConfig::default();
    /// let dest = config.destination(Path::new("docs/page.html"), ArtifactKind::TablesOnly);
    /// assert_eq!(dest, Path::new("docs/page_tables_only.html"));
    /// ```
    pub fn destination(&self, source: &Path, kind: ArtifactKind) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let file_name = format!("{}{}.{}", stem, kind.suffix(), kind.extension());

        match &self.out_dir {
            Some(dir) => dir.join(file_name),
            None => source.with_file_name(file_name),
        }
    }
}

/// A rendered artifact paired with its destination.
#[derive(Debug, Clone)]
pub struct ProcessedOutput {
    pub kind: ArtifactKind,
    pub content: String,
    pub destination: PathBuf,
}

impl ProcessedOutput {
    pub fn new(kind: ArtifactKind, content: String, destination: PathBuf) -> Self {
        Self { kind, content, destination }
    }

    /// Writes the artifact, consuming the in-memory copy.
    pub fn write(self) -> Result<PathBuf> {
        write_output(&self.content, &self.destination)?;
        tracing::info!(kind = ?self.kind, path = %self.destination.display(), bytes = self.content.len(), "wrote artifact");
        Ok(self.destination)
    }
}

/// Writes `content` to `destination`, replacing any existing file.
///
/// The bytes go to a temporary file in the destination directory which is
/// flushed and then renamed over the destination. On any failure the
/// temporary file is removed and an existing destination is left as it was.
/// A replaced file keeps its permissions; a new one is created `0644` on unix.
///
/// # Errors
///
/// Returns [`DeclutterError::WriteError`] if the directory cannot be created
/// or written to, or the rename fails.
pub fn write_output(content: &str, destination: &Path) -> Result<()> {
    let staged = stage(content, destination)?;
    commit(staged, destination)
}

/// Writes several artifacts, staging all of them before any is moved into place.
///
/// If any artifact cannot be staged nothing is written.
pub fn write_outputs(outputs: Vec<ProcessedOutput>) -> Result<Vec<PathBuf>> {
    let staged = outputs
        .iter()
        .map(|output| stage(&output.content, &output.destination))
        .collect::<Result<Vec<_>>>()?;

    let mut written = Vec::with_capacity(outputs.len());
    for (output, temp) in outputs.into_iter().zip(staged) {
        commit(temp, &output.destination)?;
        tracing::info!(kind = ?output.kind, path = %output.destination.display(), bytes = output.content.len(), "wrote artifact");
        written.push(output.destination);
    }
    Ok(written)
}

fn write_error(destination: &Path) -> impl Fn(io::Error) -> DeclutterError + '_ {
    move |source| DeclutterError::WriteError { path: destination.to_path_buf(), source }
}

fn stage(content: &str, destination: &Path) -> Result<NamedTempFile> {
    let write_error = write_error(destination);

    if destination.is_dir() {
        return Err(write_error(io::Error::other("destination is a directory")));
    }

    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(&write_error)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".declutter-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(&write_error)?;
    temp.write_all(content.as_bytes()).map_err(&write_error)?;
    temp.as_file().sync_all().map_err(&write_error)?;

    let permissions = match fs::metadata(destination) {
        Ok(existing) => Some(existing.permissions()),
        Err(_) => default_permissions(),
    };
    if let Some(permissions) = permissions {
        temp.as_file().set_permissions(permissions).map_err(&write_error)?;
    }

    Ok(temp)
}

fn commit(temp: NamedTempFile, destination: &Path) -> Result<()> {
    temp.persist(destination).map_err(|e| write_error(destination)(e.error))?;
    Ok(())
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_destination_next_to_source() {
        let config = OutputConfig::default();
        let dest = config.destination(Path::new("/data/report.htm"), ArtifactKind::Cleaned);
        assert_eq!(dest, PathBuf::from("/data/report_cleaned.html"));

        let dest = config.destination(Path::new("/data/report.html"), ArtifactKind::Content);
        assert_eq!(dest, PathBuf::from("/data/report_content.txt"));
    }

    #[test]
    fn test_destination_in_out_dir() {
        let config = OutputConfig { out_dir: Some(PathBuf::from("/out")) };
        let dest = config.destination(Path::new("/data/report.html"), ArtifactKind::NoTables);
        assert_eq!(dest, PathBuf::from("/out/report_no_tables.html"));
    }

    #[test]
    fn test_write_output_overwrites() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("page_cleaned.html");

        write_output("first", &dest).unwrap();
        write_output("second", &dest).unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "second");
        let leftovers: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_write_output_creates_out_dir() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("nested").join("out.html");
        write_output("x", &dest).unwrap();
        assert!(dest.exists());
    }

    #[test]
    fn test_write_output_into_missing_parent_file() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let dest = blocker.join("out.html");
        let result = write_output("x", &dest);
        assert!(matches!(result, Err(DeclutterError::WriteError { .. })));
        assert!(!dest.exists());
    }

    #[test]
    fn test_write_output_refuses_directory() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("taken.html");
        fs::create_dir(&dest).unwrap();

        assert!(matches!(write_output("x", &dest), Err(DeclutterError::WriteError { .. })));
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_outputs_stages_everything_first() {
        let tmp = TempDir::new().unwrap();
        let first = tmp.path().join("a_tables_only.html");
        let second = tmp.path().join("a_no_tables.html");
        fs::create_dir(&second).unwrap();

        let result = write_outputs(vec![
            ProcessedOutput::new(ArtifactKind::TablesOnly, "<table></table>".into(), first.clone()),
            ProcessedOutput::new(ArtifactKind::NoTables, "<p>x</p>".into(), second),
        ]);

        assert!(matches!(result, Err(DeclutterError::WriteError { .. })));
        assert!(!first.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_output_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let fresh = tmp.path().join("fresh.html");
        write_output("new", &fresh).unwrap();
        assert_eq!(fs::metadata(&fresh).unwrap().permissions().mode() & 0o777, 0o644);

        let existing = tmp.path().join("existing.html");
        fs::write(&existing, "old").unwrap();
        fs::set_permissions(&existing, fs::Permissions::from_mode(0o640)).unwrap();
        write_output("new", &existing).unwrap();
        assert_eq!(fs::metadata(&existing).unwrap().permissions().mode() & 0o777, 0o640);
        assert_eq!(fs::read_to_string(&existing).unwrap(), "new");
    }

    #[test]
    fn test_processed_output_write() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("t.html");
        let written = ProcessedOutput::new(ArtifactKind::TablesOnly, "<table></table>".into(), dest.clone())
            .write()
            .unwrap();
        assert_eq!(written, dest);
        assert_eq!(fs::read_to_string(dest).unwrap(), "<table></table>");
    }
}
