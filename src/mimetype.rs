//! MIME type guessing for plugin dispatch.
//!
//! The registry selects a backend for a file by its guessed MIME type. The
//! guess tries the file extension first and falls back to sniffing the
//! leading bytes of the file content.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// How many leading bytes to read for content sniffing.
const SNIFF_LEN: usize = 512;

/// Guess the MIME type of a file.
///
/// Returns `None` when neither the extension nor the file content yields a
/// known type. A file that cannot be read falls back to `None` as well;
/// existence checks are the caller's concern.
pub fn guess_mimetype(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();

    if let Some(mime) = mime_guess::from_path(path).first() {
        return Some(mime.essence_str().to_string());
    }

    let mut head = [0u8; SNIFF_LEN];
    let read = File::open(path)
        .and_then(|mut file| file.read(&mut head))
        .ok()?;
    infer::get(&head[..read]).map(|kind| kind.mime_type().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_by_extension() {
        // Extension lookup does not touch the filesystem.
        assert_eq!(
            guess_mimetype("report.pdf").as_deref(),
            Some("application/pdf")
        );
        assert_eq!(guess_mimetype("notes.txt").as_deref(), Some("text/plain"));
    }

    #[test]
    fn test_guess_by_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("document");
        std::fs::write(&path, b"%PDF-1.7\n...").unwrap();
        assert_eq!(guess_mimetype(&path).as_deref(), Some("application/pdf"));
    }

    #[test]
    fn test_unknown_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob");
        std::fs::write(&path, b"nothing recognizable here").unwrap();
        assert_eq!(guess_mimetype(&path), None);
    }

    #[test]
    fn test_missing_file() {
        assert_eq!(guess_mimetype("/does/not/exist"), None);
    }
}
