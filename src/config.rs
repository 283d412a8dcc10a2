use crate::error::{Error, Result};
use crate::source::{BundledDataset, RecordSource};
use crate::text::TitleStyle;
use std::path::{PathBuf, MAIN_SEPARATOR};

const DEFAULT_EXTENSION: &str = "txt";

/// Configuration for the conversion pipeline.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Where records are read from
    pub source: RecordSource,

    /// Directory output files are written into
    pub output_dir: PathBuf,

    /// Output file extension, without the leading dot
    pub extension: String,

    /// How titles become file names
    pub title_style: TitleStyle,

    /// Apply the `\sx+` artifact cleanup to bodies
    pub remove_artifacts: bool,

    /// Dry run mode (no file writes)
    pub dry_run: bool,

    /// Write a `summary.json` next to the output files
    pub write_summary: bool,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use relnote_conv::{BundledDataset, Config};
    ///
    /// let config = Config::builder()
    ///     .dataset(BundledDataset::ReleaseNotes2024)
    ///     .output_dir("./notes")
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file doesn't exist or is not a file
    /// - The extension is empty or contains a dot or path separator
    /// - The output path exists but is not a directory
    pub fn validate(&self) -> Result<()> {
        if let RecordSource::File(ref path) = self.source {
            if !path.exists() {
                return Err(Error::config(format!(
                    "Input file does not exist: {}",
                    path.display()
                )));
            }

            if !path.is_file() {
                return Err(Error::config(format!(
                    "Input path is not a file: {}",
                    path.display()
                )));
            }
        }

        if self.extension.is_empty() {
            return Err(Error::config("extension must not be empty"));
        }

        if self.extension.contains('.')
            || self.extension.contains('/')
            || self.extension.contains(MAIN_SEPARATOR)
        {
            return Err(Error::config(format!(
                "extension '{}' must be a bare suffix like \"txt\"",
                self.extension
            )));
        }

        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(Error::config(format!(
                "Output path is not a directory: {}",
                self.output_dir.display()
            )));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: RecordSource::default(),
            output_dir: PathBuf::from("."),
            extension: DEFAULT_EXTENSION.to_string(),
            title_style: TitleStyle::default(),
            remove_artifacts: true,
            dry_run: false,
            write_summary: false,
        }
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    source: Option<RecordSource>,
    output_dir: Option<PathBuf>,
    extension: Option<String>,
    title_style: Option<TitleStyle>,
    remove_artifacts: Option<bool>,
    dry_run: bool,
    write_summary: bool,
}

impl ConfigBuilder {
    /// Sets the record source.
    #[must_use]
    pub fn source(mut self, source: RecordSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Reads records from a bundled dataset.
    #[must_use]
    pub fn dataset(self, dataset: BundledDataset) -> Self {
        self.source(RecordSource::Bundled(dataset))
    }

    /// Reads records from a JSON file.
    #[must_use]
    pub fn input_file(self, path: impl Into<PathBuf>) -> Self {
        self.source(RecordSource::File(path.into()))
    }

    /// Sets the output directory (defaults to the working directory).
    #[must_use]
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Sets the output file extension, without the leading dot.
    #[must_use]
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = Some(ext.into());
        self
    }

    /// Sets how titles become file names.
    #[must_use]
    pub fn title_style(mut self, style: TitleStyle) -> Self {
        self.title_style = Some(style);
        self
    }

    /// Enables or disables the `\sx+` artifact cleanup.
    #[must_use]
    pub fn remove_artifacts(mut self, enabled: bool) -> Self {
        self.remove_artifacts = Some(enabled);
        self
    }

    /// Enables dry run mode (no file writes).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Enables writing `summary.json` after the batch.
    #[must_use]
    pub fn write_summary(mut self, enabled: bool) -> Self {
        self.write_summary = enabled;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let config = Config {
            source: self.source.unwrap_or_default(),
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from(".")),
            extension: self
                .extension
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
            title_style: self.title_style.unwrap_or_default(),
            remove_artifacts: self.remove_artifacts.unwrap_or(true),
            dry_run: self.dry_run,
            write_summary: self.write_summary,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_default_config() {
        let config = Config::builder().build().unwrap();

        assert_eq!(
            config.source,
            RecordSource::Bundled(BundledDataset::FallReleaseNotes)
        );
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.extension, "txt");
        assert_eq!(config.title_style, TitleStyle::Compact);
        assert!(config.remove_artifacts);
        assert!(!config.dry_run);
        assert!(!config.write_summary);
    }

    #[test]
    fn test_missing_input_file() {
        let result = Config::builder()
            .input_file("/nonexistent/path/notes.json")
            .build();

        assert!(result.unwrap_err().is_config());
    }

    #[test]
    fn test_input_must_be_a_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let result = Config::builder().input_file(temp.path()).build();

        assert!(result.is_err());
    }

    #[test]
    fn test_existing_input_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("notes.json");
        file.write_str("{}").unwrap();

        let config = Config::builder().input_file(file.path()).build().unwrap();
        assert_eq!(config.source, RecordSource::File(file.path().to_path_buf()));
    }

    #[test]
    fn test_invalid_extension() {
        assert!(Config::builder().extension("").build().is_err());
        assert!(Config::builder().extension(".txt").build().is_err());
        assert!(Config::builder().extension("a/b").build().is_err());
        assert!(Config::builder().extension("md").build().is_ok());
    }

    #[test]
    fn test_output_dir_must_be_a_directory() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("taken");
        file.write_str("").unwrap();

        assert!(Config::builder().output_dir(file.path()).build().is_err());
        assert!(
            Config::builder()
                .output_dir(temp.child("not-yet-created").path())
                .build()
                .is_ok()
        );
    }
}
