//! File payloads handed to the engine by drops and the file picker.

use std::fmt;
use std::rc::Rc;

/// An in-memory file: a name plus immutable shared bytes.
///
/// Cloning (and [`FileBlob::slice`]) is cheap, the bytes are reference counted.
#[derive(Clone, PartialEq, Eq)]
pub struct FileBlob {
    name: String,
    bytes: Rc<[u8]>,
}

impl FileBlob {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: Rc::from(bytes.into()),
        }
    }

    /// File name as reported by the host (no path).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// A view over the whole file, sharing the same bytes.
    pub fn slice(&self) -> FileBlob {
        self.clone()
    }

    /// Contents decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl fmt::Debug for FileBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileBlob")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_shares_bytes() {
        let file = FileBlob::new("notes.txt", b"hello".to_vec());
        let slice = file.slice();

        assert_eq!(slice.name(), "notes.txt");
        assert_eq!(slice.bytes(), b"hello");
        assert!(std::ptr::eq(file.bytes().as_ptr(), slice.bytes().as_ptr()));
    }

    #[test]
    fn test_text_is_lossy() {
        let file = FileBlob::new("bin", vec![b'o', b'k', 0xff]);
        assert_eq!(file.text(), "ok\u{fffd}");
        assert_eq!(file.len(), 3);
    }
}
