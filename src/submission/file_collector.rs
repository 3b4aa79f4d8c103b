use std::path::{Path, PathBuf};

use log::{debug, trace, warn};
use walkdir::WalkDir;

/// A regular file found directly inside a submission folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFile {
    /// Base name of the file, used for matching
    pub file_name: String,

    /// Full path to the file
    pub path: PathBuf,

    /// Size in bytes, `None` when the metadata could not be read
    pub size: Option<u64>,
}

/// Contents of a submission folder at one point in time
#[derive(Debug, Clone, Default)]
pub struct DirectoryListing {
    /// Files in enumeration order (sorted by name)
    pub files: Vec<SubmissionFile>,

    /// Entries that could not be read and were left out
    pub skipped: Vec<PathBuf>,
}

/// File collector for listing submission folders
#[derive(Debug)]
pub struct FileCollector {
    /// Whether symlinks to files are treated as files
    follow_links: bool,
}

impl Default for FileCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl FileCollector {
    /// Create a new file collector that follows symlinks
    pub fn new() -> Self {
        Self { follow_links: true }
    }

    pub fn with_follow_links(follow_links: bool) -> Self {
        Self { follow_links }
    }

    /// List the regular files directly inside `dir`, without recursing.
    ///
    /// Entries that fail to read (permissions, removed mid-listing) are
    /// recorded in `skipped`. An error is only returned when `dir` itself
    /// cannot be read.
    pub fn collect_files(&self, dir: impl AsRef<Path>) -> Result<DirectoryListing, walkdir::Error> {
        let dir = dir.as_ref();
        debug!("Collecting files from directory: {}", dir.display());

        let mut listing = DirectoryListing::default();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.follow_links)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => return Err(err),
                Err(err) => {
                    warn!("Skipping unreadable entry in {}: {}", dir.display(), err);
                    if let Some(path) = err.path() {
                        listing.skipped.push(path.to_path_buf());
                    }
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                trace!("Ignoring non-file entry: {}", entry.path().display());
                continue;
            }

            let size = match entry.metadata() {
                Ok(metadata) => Some(metadata.len()),
                Err(err) => {
                    debug!("Could not read size of {}: {}", entry.path().display(), err);
                    None
                }
            };

            trace!("Found file: {} ({:?} bytes)", entry.path().display(), size);
            listing.files.push(SubmissionFile {
                file_name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path().to_path_buf(),
                size,
            });
        }

        debug!(
            "Collected {} files ({} skipped) from {}",
            listing.files.len(),
            listing.skipped.len(),
            dir.display()
        );
        Ok(listing)
    }
}
