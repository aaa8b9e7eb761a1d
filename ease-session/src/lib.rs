//! Editing session for the Ease MD editor
//!
//!     The session sits between a host (desktop shell, CLI, tests) and the conversion core
//!     in ease-babel. It tracks the open document, whether it is dirty, which view is
//!     authoritative, and persists drafts, recent files and preferences in a key-value
//!     store supplied by the host.
//!
//!     Nothing here blocks or spawns: deferred work (draft saves, outline rebuilds) is
//!     recorded as deadlines and run when the host calls `Session::tick`. Questions for
//!     the user go through the `Host` trait.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── session.rs              # Session: open, save, drafts, images, views
//!     ├── host.rs                 # Host callbacks
//!     ├── store.rs                # KeyValueStore, memory and JSON file stores
//!     ├── drafts.rs               # Per-document drafts
//!     ├── recent.rs               # Recent files list
//!     ├── prefs.rs                # Stored preferences
//!     ├── debounce.rs             # Deadline-based debouncing
//!     ├── gate.rs                 # Latest-request-wins gate
//!     ├── tree.rs                 # Folder tree scanning
//!     ├── assets.rs               # Inserted image locations
//!     ├── upload.rs               # External image uploader
//!     └── lib.rs
pub mod assets;
pub mod debounce;
pub mod drafts;
pub mod error;
pub mod gate;
pub mod host;
pub mod prefs;
pub mod recent;
pub mod session;
pub mod store;
pub mod tree;
pub mod upload;

pub use error::{Result, SessionError};
pub use host::{FixedAnswer, Host};
pub use session::Session;
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use tree::{scan_markdown_files, scan_tree, TreeEntry};
pub use upload::{ImageUploader, UploadResult};
