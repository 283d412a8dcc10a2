use crate::{
    config::Config,
    error::{Error, Result},
    pipeline::{ConversionStats, WriteStatus},
};
use serde::Serialize;
use std::{
    fs,
    io::Write,
    path::{Component, Path, PathBuf},
};
use tracing::{debug, info};

const SUMMARY_FILE: &str = "summary.json";

/// Summary of a conversion run, persisted as `summary.json`.
#[derive(Debug, Serialize)]
pub(crate) struct WriteSummary<'a> {
    /// Entries in the source collection
    pub total_records: usize,

    /// Files written
    pub converted: usize,

    /// Writes that failed
    pub failed: usize,

    /// Entries without a usable body
    pub skipped: usize,

    /// Execution duration in seconds
    pub duration_secs: f64,

    /// Output directory path
    pub output_directory: &'a str,

    /// Per-record outcomes
    pub files: Vec<FileSummary<'a>>,

    /// Generation timestamp
    pub generated_at: String,
}

/// Summary of a single output file.
#[derive(Debug, Serialize)]
pub(crate) struct FileSummary<'a> {
    /// Source key of the record
    pub key: &'a str,

    /// Output filename
    pub filename: String,

    /// Write outcome
    pub status: &'a WriteStatus,
}

/// Writes converted bodies to output files.
#[derive(Debug, Clone)]
pub(crate) struct Writer {
    output_dir: PathBuf,
    extension: String,
}

impl Writer {
    /// Creates a new writer from configuration.
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            extension: config.extension.clone(),
        }
    }

    /// Returns the output path for a sanitized title.
    pub(crate) fn output_path(&self, stem: &str) -> PathBuf {
        self.output_dir.join(format!("{stem}.{}", self.extension))
    }

    /// Checks that `stem` names a single file inside the output directory.
    ///
    /// Compact titles keep `/` and `..`, so a title such as `../notes` or
    /// `/etc/motd` would otherwise resolve outside `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] for `path` when the stem is absolute, has a
    /// `.`/`..` component, or spans more than one path component.
    pub(crate) fn check_stem(stem: &str, path: &Path) -> Result<()> {
        let mut components = Path::new(stem).components();
        let single = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );

        if single && !stem.contains(['/', '\\']) {
            return Ok(());
        }

        Err(Error::rejected_target(
            path,
            "title does not name a single file inside the output directory",
        ))
    }

    /// Creates the output directory if it doesn't exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub(crate) fn ensure_output_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir).map_err(|e| Error::io(&self.output_dir, e))
    }

    /// Writes `content` to `path`, replacing any existing file.
    ///
    /// # Process
    ///
    /// 1. Writes content to a hidden staging file next to the target
    /// 2. Syncs the staging file to disk
    /// 3. Renames it over the target path
    ///
    /// A reader never sees a half-written file, and rerunning on the same
    /// input leaves byte-identical output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if any step fails; the staging file is
    /// removed in that case.
    pub(crate) fn write_file(path: &Path, content: &str, slot: usize) -> Result<()> {
        let temp_path = staging_path(path, slot);

        let result = (|| {
            let mut temp_file = fs::File::create(&temp_path)?;
            temp_file.write_all(content.as_bytes())?;
            temp_file.sync_all()?;
            drop(temp_file);
            fs::rename(&temp_path, path)
        })();

        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(Error::write(path, e));
        }

        debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }

    /// Async counterpart of [`Writer::write_file`].
    #[cfg(feature = "async")]
    pub(crate) async fn write_file_async(path: PathBuf, content: String, slot: usize) -> Result<()> {
        let temp_path = staging_path(&path, slot);

        let result = async {
            tokio::fs::write(&temp_path, content.as_bytes()).await?;
            tokio::fs::rename(&temp_path, &path).await
        }
        .await;

        if let Err(e) = result {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(Error::write(&path, e));
        }

        debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }

    /// Writes a summary JSON file with the outcome of every record.
    ///
    /// # Errors
    ///
    /// Returns an error if the summary file cannot be written.
    pub(crate) fn write_summary(&self, stats: &ConversionStats) -> Result<PathBuf> {
        let summary = WriteSummary {
            total_records: stats.total_records,
            converted: stats.converted,
            failed: stats.failed,
            skipped: stats.skipped,
            duration_secs: stats.duration.as_secs_f64(),
            output_directory: &stats.output_directory,
            files: stats
                .files
                .iter()
                .map(|f| FileSummary {
                    key: &f.key,
                    filename: f
                        .path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    status: &f.status,
                })
                .collect(),
            generated_at: chrono::Local::now()
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        };

        let summary_path = self.output_dir.join(SUMMARY_FILE);
        let file =
            fs::File::create(&summary_path).map_err(|e| Error::io(&summary_path, e))?;

        serde_json::to_writer_pretty(file, &summary).map_err(Error::from)?;

        info!("Wrote summary to {}", summary_path.display());
        Ok(summary_path)
    }
}

/// Staging file for a write. `slot` keeps concurrent writes to the same
/// target from sharing one.
fn staging_path(path: &Path, slot: usize) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{slot}.partial"))
}
