//! DOM-style events dispatched to node listeners.
//!
//! Events carry a kind, a default-prevented flag and, for drag/drop, a
//! [`DataTransfer`] payload. Payloads come in the two shapes hosts produce:
//! an item list (each item may or may not be a file) or a plain file list.

use super::file::FileBlob;

/// Event kinds the engine listens for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Value of a text field changed (keystroke level).
    Input,
    /// Checked state of a checkbox or radio changed.
    Change,
    Click,
    DragOver,
    Drop,
    DragEnd,
}

/// One entry of an item-list transfer.
#[derive(Clone, Debug, PartialEq)]
pub enum TransferItem {
    File(FileBlob),
    Text(String),
}

impl TransferItem {
    /// `"file"` or `"string"`, as the drag/drop item kinds are named.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Text(_) => "string",
        }
    }

    pub fn as_file(&self) -> Option<FileBlob> {
        match self {
            Self::File(file) => Some(file.clone()),
            Self::Text(_) => None,
        }
    }
}

/// Drag/drop payload.
#[derive(Clone, Debug, PartialEq)]
pub enum DataTransfer {
    Items(Vec<TransferItem>),
    Files(Vec<FileBlob>),
}

impl DataTransfer {
    /// The file a drop resolves to.
    ///
    /// Item lists only look at the first item, and only if it is a file.
    /// File lists take the first file.
    pub fn first_file(&self) -> Option<FileBlob> {
        match self {
            Self::Items(items) => items.first().and_then(TransferItem::as_file),
            Self::Files(files) => files.first().cloned(),
        }
    }

    pub fn clear(&mut self) {
        match self {
            Self::Items(items) => items.clear(),
            Self::Files(files) => files.clear(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Items(items) => items.len(),
            Self::Files(files) => files.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A dispatched event.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    kind: EventKind,
    default_prevented: bool,
    data_transfer: Option<DataTransfer>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            default_prevented: false,
            data_transfer: None,
        }
    }

    pub fn with_transfer(kind: EventKind, transfer: DataTransfer) -> Self {
        Self {
            kind,
            default_prevented: false,
            data_transfer: Some(transfer),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Suppress the host's default handling (e.g. opening a dropped file).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn data_transfer(&self) -> Option<&DataTransfer> {
        self.data_transfer.as_ref()
    }

    pub fn data_transfer_mut(&mut self) -> Option<&mut DataTransfer> {
        self.data_transfer.as_mut()
    }
}
