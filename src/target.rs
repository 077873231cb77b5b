//! Turning the command-line argument into the file to watch and the program to build from it.

use camino::Utf8Path;
use camino::Utf8PathBuf;

use crate::error::MissingArgument;

/// How many characters are removed from the end of the source path to get the output path.
///
/// This is the length of `.cpp`. It's applied by position, not by looking at the extension, so
/// `prog.c` becomes `pr`.
pub const SUFFIX_LEN: usize = 4;

/// The source file being watched and the path the compiler writes the program to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    source: Utf8PathBuf,
    output: Utf8PathBuf,
}

impl WatchTarget {
    /// Resolve the first positional command-line argument into a [`WatchTarget`].
    ///
    /// Fails with [`MissingArgument`] if no argument or an empty argument was given.
    pub fn resolve(file: Option<&str>) -> Result<Self, MissingArgument> {
        let file = match file {
            Some(file) if !file.is_empty() => file,
            _ => return Err(MissingArgument),
        };

        let output = strip_fixed_suffix(file);
        if !has_fixed_length_extension(file) {
            tracing::warn!(
                file,
                output,
                "Source file doesn't end in a three-letter extension, so the output path is \
                probably wrong"
            );
        }

        let target = Self {
            source: file.into(),
            output: output.into(),
        };
        tracing::debug!(source = %target.source, output = %target.output, "Resolved watch target");
        Ok(target)
    }

    /// The source file, as given on the command line.
    pub fn source(&self) -> &Utf8Path {
        &self.source
    }

    /// The path the compiler writes the program to.
    pub fn output(&self) -> &Utf8Path {
        &self.output
    }

    /// The path to execute the compiled program from.
    ///
    /// A bare file name is prefixed with `./` so it's never looked up in `$PATH`.
    pub fn run_path(&self) -> Utf8PathBuf {
        if self.output.is_relative() && self.output.components().count() == 1 {
            Utf8Path::new(".").join(&self.output)
        } else {
            self.output.clone()
        }
    }

    /// The directory containing the source file.
    pub fn source_dir(&self) -> &Utf8Path {
        match self.source.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        }
    }

    /// The final component of the source path, if it has one.
    pub fn source_file_name(&self) -> Option<&str> {
        self.source.file_name()
    }
}

/// Remove the last [`SUFFIX_LEN`] characters from `file`.
///
/// Names with [`SUFFIX_LEN`] characters or fewer become empty.
fn strip_fixed_suffix(file: &str) -> &str {
    match file.char_indices().rev().nth(SUFFIX_LEN - 1) {
        Some((index, _)) => &file[..index],
        None => "",
    }
}

fn has_fixed_length_extension(file: &str) -> bool {
    Utf8Path::new(file)
        .extension()
        .map_or(false, |extension| extension.chars().count() == SUFFIX_LEN - 1)
}
