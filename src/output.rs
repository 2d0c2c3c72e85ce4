use anyhow::anyhow;
use formatx::formatx;
use std::fmt::{Debug, Display, Formatter};
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// The separate files a run can produce.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OutputLocation {
    Summary,
    Hourly,
}

impl Display for OutputLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                OutputLocation::Summary => "summary",
                OutputLocation::Hourly => "hourly",
            }
        )
    }
}

pub trait Output: Debug {
    fn writer_for_location(&self, location: OutputLocation) -> anyhow::Result<impl Write>;
    /// Whether this output can be considered a no-op and therefore that any code that only writes to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Writes each location to its own file, named by filling the location into a template such
/// as `"heating_{}.csv"`.
#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_template: String,
}

impl FileOutput {
    pub fn new(directory_path: PathBuf, file_template: String) -> Self {
        Self {
            directory_path,
            file_template,
        }
    }

    /// Outputs placed next to the input file, e.g. `house.json` gives `house_summary.csv`.
    pub fn beside_input_file(input_file: &Path) -> Self {
        let directory_path = input_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let stem = input_file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "jaz".to_string());

        Self::new(directory_path, format!("{stem}_{{}}.csv"))
    }

    fn file_path(&self, location: OutputLocation) -> anyhow::Result<PathBuf> {
        let file_name = formatx!(&self.file_template, location.to_string())
            .map_err(|e| anyhow!("Invalid output file template '{}': {e:?}", self.file_template))?;
        Ok(self.directory_path.join(file_name))
    }
}

impl Output for FileOutput {
    fn writer_for_location(&self, location: OutputLocation) -> anyhow::Result<impl Write> {
        Ok(BufWriter::new(File::create(self.file_path(location)?)?))
    }
}

impl Output for &FileOutput {
    fn writer_for_location(&self, location: OutputLocation) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for_location(self, location)
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location(&self, _location: OutputLocation) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}
