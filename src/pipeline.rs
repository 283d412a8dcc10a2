use crate::{
    config::Config,
    console::Console,
    error::{Error, Result},
    record::ReleaseNoteRecord,
    text::BodyConverter,
    writer::Writer,
};
use serde::Serialize;
use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, info, instrument, warn};

/// Outcome of writing one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WriteStatus {
    /// File was written
    Created,
    /// Write failed; the rest of the batch went on
    Failed {
        /// Error message
        error: String,
    },
    /// Dry run, nothing written
    DryRun,
}

/// What happened to a single record.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    /// Source key of the record
    pub key: String,

    /// Sanitized title used as the file base name
    pub title: String,

    /// Target output path
    pub path: PathBuf,

    /// Write outcome
    pub status: WriteStatus,
}

/// Statistics collected during pipeline execution.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionStats {
    /// Entries in the source collection
    pub total_records: usize,

    /// Files written
    pub converted: usize,

    /// Writes that failed
    pub failed: usize,

    /// Entries without a usable body
    pub skipped: usize,

    /// Total execution time
    pub duration: Duration,

    /// Output directory path
    pub output_directory: String,

    /// Per-record outcomes, in source order
    pub files: Vec<FileOutcome>,
}

impl ConversionStats {
    /// Creates statistics from the per-record outcomes.
    #[must_use]
    pub fn new(
        total_records: usize,
        skipped: usize,
        files: Vec<FileOutcome>,
        duration: Duration,
        output_directory: String,
    ) -> Self {
        let converted = files
            .iter()
            .filter(|f| f.status == WriteStatus::Created)
            .count();
        let failed = files
            .iter()
            .filter(|f| matches!(f.status, WriteStatus::Failed { .. }))
            .count();

        Self {
            total_records,
            converted,
            failed,
            skipped,
            duration,
            output_directory,
            files,
        }
    }

    /// Returns true if every processed record was written (or would be, on a dry run).
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failed == 0
    }

    /// Returns the outcomes of failed writes.
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files
            .iter()
            .filter(|f| matches!(f.status, WriteStatus::Failed { .. }))
    }

    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║            Conversion Summary                         ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!(
            "║ Records:              {:>8}                        ║",
            self.total_records
        );
        println!(
            "║   - Converted:        {:>8}                        ║",
            self.converted
        );
        println!(
            "║   - Failed:           {:>8}                        ║",
            self.failed
        );
        println!(
            "║   - Skipped:          {:>8}                        ║",
            self.skipped
        );
        println!("║ Output Directory:                                     ║");
        println!(
            "║   {}                                              ║",
            self.output_directory
        );
        println!(
            "║ Total time:           {:>8.2}s                     ║",
            self.duration.as_secs_f64()
        );
        println!("╚═══════════════════════════════════════════════════════╝\n");
    }
}

/// A converted record waiting to be written.
#[derive(Debug)]
struct WriteJob {
    key: String,
    title: String,
    path: PathBuf,
    content: String,
    /// Set when the title would place the file outside the output directory
    rejected: Option<Error>,
}

impl WriteJob {
    fn outcome(self, status: WriteStatus) -> FileOutcome {
        FileOutcome {
            key: self.key,
            title: self.title,
            path: self.path,
            status,
        }
    }
}

/// Converts release-note records into text files.
#[derive(Debug)]
pub struct Pipeline {
    config: Config,
    converter: BodyConverter,
    writer: Writer,
    console: Arc<Console>,
}

impl Pipeline {
    /// Creates a new pipeline with the given configuration.
    ///
    /// Diagnostic lines go to stdout/stderr; see [`Pipeline::with_console`].
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let converter = BodyConverter::new(config.remove_artifacts);
        let writer = Writer::new(&config);

        Ok(Self {
            config,
            converter,
            writer,
            console: Arc::new(Console::stdio()),
        })
    }

    /// Sends diagnostic lines to `console` instead of stdio.
    #[must_use]
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = Arc::new(console);
        self
    }

    /// Executes the conversion and returns statistics.
    ///
    /// # Process
    ///
    /// For each record, in source order:
    /// 1. Sanitize the title and convert the body
    /// 2. Print `title : <title>`
    /// 3. Write the body to `<title>.<ext>`, replacing any existing file
    /// 4. Print a confirmation, or the error if the write failed
    ///
    /// A failed write is recorded in the stats and the batch continues.
    /// All writes have completed when this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be loaded or the output
    /// directory cannot be created. Per-record write failures are not errors.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use relnote_conv::{Config, Pipeline};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = Config::builder()
    ///     .input_file("releaseNotes.json")
    ///     .output_dir("notes")
    ///     .build()?;
    ///
    /// let stats = Pipeline::new(config)?.run()?;
    /// stats.print_summary();
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self), fields(source = %self.config.source))]
    pub fn run(self) -> Result<ConversionStats> {
        let start_time = Instant::now();
        let (jobs, total_records, skipped) = self.prepare()?;

        let mut files = Vec::with_capacity(jobs.len());
        for (slot, mut job) in jobs.into_iter().enumerate() {
            self.console.title(&job.title);

            let result = match job.rejected.take() {
                Some(e) => Err(e),
                None if self.config.dry_run => {
                    files.push(job.outcome(WriteStatus::DryRun));
                    continue;
                }
                None => Writer::write_file(&job.path, &job.content, slot),
            };

            let status = match result {
                Ok(()) => {
                    self.console.created();
                    WriteStatus::Created
                }
                Err(e) => {
                    debug!("Record '{}': {}", job.key, e);
                    self.console.failed(&e);
                    WriteStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };

            files.push(job.outcome(status));
        }

        self.finish(total_records, skipped, files, start_time)
    }

    /// Executes the conversion with every write dispatched as a tokio task.
    ///
    /// Title lines are printed in source order as writes are dispatched;
    /// confirmations arrive in completion order. Every task is joined
    /// before this returns.
    ///
    /// # Errors
    ///
    /// Same as [`Pipeline::run`], plus [`crate::Error::Runtime`] if a
    /// write task panics.
    #[cfg(feature = "async")]
    #[instrument(skip(self), fields(source = %self.config.source))]
    pub async fn run_async(self) -> Result<ConversionStats> {
        use tokio::task::JoinSet;

        let start_time = Instant::now();
        let (jobs, total_records, skipped) = self.prepare()?;

        let mut tasks = JoinSet::new();
        for (slot, mut job) in jobs.into_iter().enumerate() {
            self.console.title(&job.title);

            let console = Arc::clone(&self.console);
            let dry_run = self.config.dry_run;
            tasks.spawn(async move {
                let result = match job.rejected.take() {
                    Some(e) => Err(e),
                    None if dry_run => return (slot, job.outcome(WriteStatus::DryRun)),
                    None => {
                        Writer::write_file_async(job.path.clone(), job.content.clone(), slot)
                            .await
                    }
                };
                let status = match result {
                    Ok(()) => {
                        console.created();
                        WriteStatus::Created
                    }
                    Err(e) => {
                        debug!("Record '{}': {}", job.key, e);
                        console.failed(&e);
                        WriteStatus::Failed {
                            error: e.to_string(),
                        }
                    }
                };
                (slot, job.outcome(status))
            });
        }

        let mut indexed = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(|e| Error::runtime(format!("write task failed: {e}")))?;
            indexed.push(outcome);
        }
        indexed.sort_by_key(|(slot, _)| *slot);
        let files = indexed.into_iter().map(|(_, outcome)| outcome).collect();

        self.finish(total_records, skipped, files, start_time)
    }

    /// Loads the source and converts every record into a write job.
    fn prepare(&self) -> Result<(Vec<WriteJob>, usize, usize)> {
        info!("Loading records from {}", self.config.source);
        let set = self.config.source.load()?;

        if set.is_empty() {
            warn!("No release notes found in {}", self.config.source);
        } else {
            info!(
                "Loaded {} records ({} skipped)",
                set.records.len(),
                set.skipped.len()
            );
        }

        if self.config.dry_run {
            warn!("Dry run mode enabled - skipping file writes");
        } else if !set.records.is_empty() {
            self.writer.ensure_output_dir()?;
        }

        let jobs = set
            .records
            .iter()
            .map(|record| self.convert(record))
            .collect();

        Ok((jobs, set.total(), set.skipped.len()))
    }

    fn convert(&self, record: &ReleaseNoteRecord) -> WriteJob {
        let title = record.file_stem(self.config.title_style);
        let path = self.writer.output_path(&title);
        let rejected = Writer::check_stem(&title, &path).err();

        WriteJob {
            key: record.key.clone(),
            title,
            path,
            content: self.converter.convert(&record.body),
            rejected,
        }
    }

    fn finish(
        &self,
        total_records: usize,
        skipped: usize,
        files: Vec<FileOutcome>,
        start_time: Instant,
    ) -> Result<ConversionStats> {
        let stats = ConversionStats::new(
            total_records,
            skipped,
            files,
            start_time.elapsed(),
            self.config.output_dir.display().to_string(),
        );

        if self.config.write_summary && !self.config.dry_run {
            self.writer.write_summary(&stats)?;
        }

        if stats.is_complete() {
            info!(
                "✓ Converted {} of {} records in {:.2}s",
                stats.converted,
                stats.total_records,
                stats.duration.as_secs_f64()
            );
        } else {
            warn!(
                "Converted {} of {} records, {} write(s) failed",
                stats.converted, stats.total_records, stats.failed
            );
        }

        Ok(stats)
    }
}
