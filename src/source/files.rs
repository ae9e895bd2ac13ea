use codespan_reporting::files::{Error as FilesError, Files, SimpleFile};
use std::ops::Range;
use std::path::{Path, PathBuf};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SourceFileId(usize);

#[derive(Debug)]
pub struct SourceFile {
    relative_path: PathBuf,
    /// `Files` implementation with the name being the path relative to the root
    file: SimpleFile<String, String>,
}

impl SourceFile {
    /// Load a `SourceFile` from the file system
    pub fn load(abs_path: PathBuf, root: &Path) -> Result<SourceFile, SourceFileError> {
        SourceFile::load_private(&abs_path, root)
            .map_err(|error| SourceFileError { error, abs_path })
    }

    fn load_private(abs_path: &Path, root: &Path) -> Result<SourceFile, SourceFileErrorType> {
        let relative_path = abs_path.strip_prefix(root)?.to_path_buf();

        let file_name = relative_path
            .to_str()
            .ok_or_else(|| SourceFileErrorType::NonUtf8Path(relative_path.clone()))?
            .to_owned();

        let source = std::fs::read_to_string(abs_path)?;

        Ok(SourceFile {
            relative_path,
            file: SimpleFile::new(file_name, source),
        })
    }

    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    pub fn file(&self) -> &SimpleFile<String, String> {
        &self.file
    }
}

#[derive(Debug)]
pub struct SourceFileError {
    error: SourceFileErrorType,
    abs_path: PathBuf,
}

impl SourceFileError {
    /// An entry of `root` which couldn't be read while walking it
    pub fn walk(err: walkdir::Error, root: &Path) -> SourceFileError {
        let abs_path = err.path().unwrap_or(root).to_path_buf();

        SourceFileError {
            error: SourceFileErrorType::Io(err.into()),
            abs_path,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}", self.abs_path.display())
    }

    pub fn message(&self) -> &'static str {
        match &self.error {
            SourceFileErrorType::InvalidPathPrefix => {
                "The file path doesn't start with the root path."
            }
            SourceFileErrorType::Io(_) => "An I/O error occured while reading the file",
            SourceFileErrorType::NonUtf8Path(_) => "File path must be utf-8 encoded",
        }
    }

    pub fn note(&self) -> Option<String> {
        match &self.error {
            SourceFileErrorType::InvalidPathPrefix => None,
            SourceFileErrorType::Io(err) => Some(format!("detailled error: {}", err)),
            SourceFileErrorType::NonUtf8Path(rel_path) => {
                Some(format!("relative path: {}", rel_path.display()))
            }
        }
    }
}

#[derive(Debug)]
pub enum SourceFileErrorType {
    InvalidPathPrefix,
    /// Missing file or directory, or content which isn't utf-8
    Io(std::io::Error),
    NonUtf8Path(PathBuf),
}

impl From<std::path::StripPrefixError> for SourceFileErrorType {
    fn from(_err: std::path::StripPrefixError) -> Self {
        SourceFileErrorType::InvalidPathPrefix
    }
}

impl From<std::io::Error> for SourceFileErrorType {
    fn from(err: std::io::Error) -> Self {
        SourceFileErrorType::Io(err)
    }
}

/// A file database that can store multiple source files.
///
/// This is taking as is from `codespan_reporting::files::SimpleFiles` with
/// the added ability to iterate over the files
#[derive(Debug, Default)]
pub struct SourceFiles {
    files: Vec<SourceFile>,
}

impl SourceFiles {
    /// Create a new files database.
    pub fn new() -> SourceFiles {
        SourceFiles { files: Vec::new() }
    }

    /// Add a file to the database, returning the handle that can be used to
    /// refer to it again.
    pub fn add_file(&mut self, file: SourceFile) -> SourceFileId {
        let file_id = self.files.len();
        self.files.push(file);
        SourceFileId(file_id)
    }

    /// Get the file corresponding to the given id.
    pub fn get(&self, file_id: SourceFileId) -> Option<&SimpleFile<String, String>> {
        self.files.get(file_id.0).map(|f| &f.file)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SourceFileId, &'_ SourceFile)> + '_ {
        self.files
            .iter()
            .enumerate()
            .map(|(i, v)| (SourceFileId(i), v))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<'a> Files<'a> for SourceFiles {
    type FileId = SourceFileId;
    type Name = String;
    type Source = &'a String;

    fn name(&self, file_id: Self::FileId) -> Result<String, FilesError> {
        Ok(self.get(file_id).ok_or(FilesError::FileMissing)?.name().clone())
    }

    fn source(&'a self, file_id: Self::FileId) -> Result<&'a String, FilesError> {
        Ok(self.get(file_id).ok_or(FilesError::FileMissing)?.source())
    }

    fn line_index(
        &self,
        file_id: Self::FileId,
        byte_index: usize,
    ) -> Result<usize, FilesError> {
        self.get(file_id)
            .ok_or(FilesError::FileMissing)?
            .line_index((), byte_index)
    }

    fn line_range(
        &self,
        file_id: Self::FileId,
        line_index: usize,
    ) -> Result<Range<usize>, FilesError> {
        self.get(file_id)
            .ok_or(FilesError::FileMissing)?
            .line_range((), line_index)
    }
}
