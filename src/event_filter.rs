//! Deciding which filesystem events are changes to the watched file.

use std::path::Path;

use notify_debouncer_full::notify::Event;
use notify_debouncer_full::notify::EventKind;

/// A change to the watched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEvent {
    /// The file was modified or (re)created.
    ///
    /// Editors like `vim` write a temporary file and move it over the original, so creations and
    /// renames onto the file count too.
    Modify,
    /// The file was removed or moved away.
    Remove,
}

/// Classify `event` with respect to the file named `file_name` in the watched directory.
///
/// Returns `None` for events about other files and for non-mutating events.
pub fn file_event(event: &Event, file_name: &str) -> Option<FileEvent> {
    let removed = match event.kind {
        EventKind::Remove(_) => true,
        EventKind::Any | EventKind::Other | EventKind::Create(_) | EventKind::Modify(_) => false,
        EventKind::Access(_) => {
            // Non-mutating event, ignore these.
            return None;
        }
    };

    let path = event
        .paths
        .iter()
        .find(|path| names_file(path, file_name))?;

    if removed || !path.exists() {
        Some(FileEvent::Remove)
    } else {
        Some(FileEvent::Modify)
    }
}

fn names_file(path: &Path, file_name: &str) -> bool {
    path.file_name().map_or(false, |name| name == file_name)
}
