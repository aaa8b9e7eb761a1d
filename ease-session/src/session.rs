//! The editing session: one open document plus everything around it.
//!
//! A session owns the document in both representations (structured for the
//! rich view, text for the source view), decides which one is authoritative,
//! and keeps drafts, recent files and the outline in step with edits.
//! Failures never leave the document half-changed: they set [`Session::status`]
//! and are logged.

use crate::assets::{self, ImageTarget};
use crate::debounce::Debouncer;
use crate::drafts;
use crate::error::{Result, SessionError};
use crate::gate::{RequestGate, RequestId};
use crate::host::Host;
use crate::prefs;
use crate::recent;
use crate::store::KeyValueStore;
use crate::tree::{self, TreeEntry};
use crate::upload::ImageUploader;
use ease_babel::common::images;
use ease_babel::document::{word_count, Image};
use ease_babel::formats::markdown::style::apply_newline_style;
use ease_babel::outline::{self, OutlineEntry};
use ease_babel::{load_document, normalize, serialize, Document, LoadContext, Node, NodePath};
use ease_config::{ImageInsertRule, Preferences};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const SAVE_BEFORE_LEAVE_PROMPT: &str =
    "Current document has unsaved changes. Save before leaving?";
pub const RESTORE_DRAFT_PROMPT: &str = "Found an unsaved draft. Restore it?";

pub const STATUS_LOADED: &str = "Loaded file";
pub const STATUS_OPEN_FAILED: &str = "Failed to open file";
pub const STATUS_SAVED: &str = "Saved";
pub const STATUS_SAVE_FAILED: &str = "Failed to save";
pub const STATUS_DRAFT_SAVED: &str = "Draft saved";
pub const STATUS_DRAFT_RESTORED: &str = "Draft restored";
pub const STATUS_NEW_FILE: &str = "New file";
pub const STATUS_IMAGE_INSERTED: &str = "Image inserted";
pub const STATUS_UPLOAD_FAILED: &str = "Image upload failed";

/// Deferred work driven by [`Session::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    SaveDraft,
    RebuildOutline,
}

pub struct Session<S: KeyValueStore, H: Host> {
    store: S,
    host: H,
    prefs: Preferences,
    document: Document,
    source: String,
    source_mode: bool,
    path: Option<PathBuf>,
    folder: Option<PathBuf>,
    created_dirs: BTreeSet<PathBuf>,
    dirty: bool,
    status: String,
    outline: Vec<OutlineEntry>,
    tasks: Debouncer<Task>,
    renders: RequestGate,
    fallback_image_dir: Option<PathBuf>,
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl<S: KeyValueStore, H: Host> Session<S, H> {
    /// Start an empty, untitled session with preferences read from `store`.
    pub fn init(store: S, host: H) -> Self {
        let prefs = prefs::load(&store);
        Self {
            store,
            host,
            prefs,
            document: Document::default(),
            source: String::new(),
            source_mode: false,
            path: None,
            folder: None,
            created_dirs: BTreeSet::new(),
            dirty: false,
            status: String::new(),
            outline: Vec::new(),
            tasks: Debouncer::new(),
            renders: RequestGate::new(),
            fallback_image_dir: assets::default_fallback_dir(),
        }
    }

    /// Write any pending draft and hand the store back.
    pub fn teardown(mut self) -> S {
        if self.tasks.cancel(&Task::SaveDraft) {
            self.save_draft_now();
        }
        self.store
    }

    // Accessors

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn outline(&self) -> &[OutlineEntry] {
        &self.outline
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_source_mode(&self) -> bool {
        self.source_mode
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    pub fn recent_files(&self) -> Vec<PathBuf> {
        recent::load(&self.store)
    }

    /// Earliest pending task deadline, for the host's timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.next_deadline()
    }

    /// The document as Markdown: the source text in source mode, otherwise
    /// the serialized and style-normalized structured document.
    pub fn content(&self) -> String {
        if self.source_mode {
            self.source.clone()
        } else {
            normalize(&serialize(&self.document), &(&self.prefs).into())
        }
    }

    pub fn word_count(&self) -> usize {
        if self.source_mode {
            word_count(&self.source)
        } else {
            self.document.word_count()
        }
    }

    /// Replace the preferences and persist them.
    pub fn set_preferences(&mut self, prefs: Preferences) -> Result<()> {
        prefs::save(&mut self.store, &prefs)?;
        self.prefs = prefs;
        Ok(())
    }

    /// Directory for images of untitled documents.
    pub fn set_fallback_image_dir(&mut self, dir: Option<PathBuf>) {
        self.fallback_image_dir = dir;
    }

    // Internal state changes

    fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
        self.host.status_changed(status);
    }

    fn load_context(&self) -> LoadContext {
        LoadContext {
            document_path: self.path.clone(),
            ..LoadContext::from(&self.prefs)
        }
    }

    /// Replace the whole document with `markdown` in both representations.
    fn set_content(&mut self, markdown: &str) {
        self.document = load_document(markdown, &self.load_context());
        self.source = markdown.to_string();
        self.rebuild_outline();
    }

    fn rebuild_outline(&mut self) {
        self.outline = if self.source_mode {
            outline::from_source(&self.source)
        } else {
            outline::from_document(&self.document)
        };
        self.host.outline_changed(&self.outline);
    }

    fn draft_key(&self) -> String {
        drafts::draft_key(self.path.as_deref())
    }

    fn save_draft_now(&mut self) {
        if !self.prefs.autosave_drafts {
            return;
        }
        let key = self.draft_key();
        let text = self.content();
        match drafts::save(&mut self.store, &key, &text, now_ms()) {
            Ok(true) => self.set_status(STATUS_DRAFT_SAVED),
            Ok(false) => {}
            Err(e) => tracing::warn!(key, "cannot save draft: {e}"),
        }
    }

    fn clear_draft(&mut self) {
        self.tasks.cancel(&Task::SaveDraft);
        let key = self.draft_key();
        if let Err(e) = drafts::clear(&mut self.store, &key) {
            tracing::warn!(key, "cannot clear draft: {e}");
        }
    }

    fn add_recent(&mut self, path: &Path) {
        match recent::push(&mut self.store, path) {
            Ok(list) => self.host.recent_files_changed(&list),
            Err(e) => tracing::warn!(path = %path.display(), "cannot update recent files: {e}"),
        }
    }

    fn mark_edited(&mut self) {
        self.dirty = true;
        let now = Instant::now();
        self.tasks.schedule(
            Task::SaveDraft,
            Duration::from_millis(self.prefs.draft_delay_ms),
            now,
        );
        self.tasks.schedule(
            Task::RebuildOutline,
            Duration::from_millis(self.prefs.outline_delay_ms),
            now,
        );
    }

    /// Pending draft of the current document is written before switching away.
    fn flush_pending_draft(&mut self) {
        if self.tasks.cancel(&Task::SaveDraft) {
            self.save_draft_now();
        }
    }

    // Edits

    /// The rich view changed the document.
    pub fn edit_document(&mut self, document: Document) {
        self.document = document;
        self.mark_edited();
    }

    /// The source view changed the text.
    pub fn edit_source(&mut self, text: impl Into<String>) {
        self.source = text.into();
        self.mark_edited();
    }

    /// Run the tasks due at `now`.
    pub fn tick(&mut self, now: Instant) {
        for task in self.tasks.take_due(now) {
            match task {
                Task::SaveDraft => self.save_draft_now(),
                Task::RebuildOutline => self.rebuild_outline(),
            }
        }
    }

    /// Start an asynchronous render of the source into the rich view.
    pub fn begin_render(&mut self) -> RequestId {
        self.renders.issue()
    }

    /// Apply a finished render unless a newer one was started since.
    pub fn complete_render(&mut self, id: RequestId, markdown: &str) -> bool {
        if !self.renders.accept(id) {
            tracing::debug!(?id, "dropping stale render");
            return false;
        }
        self.document = load_document(markdown, &self.load_context());
        if !self.source_mode {
            self.rebuild_outline();
        }
        true
    }

    // Documents

    /// Ask to save a dirty document. Returns whether leaving may proceed.
    pub fn maybe_save_before_leave(&mut self) -> bool {
        if !self.dirty {
            return true;
        }
        if !self.host.confirm(SAVE_BEFORE_LEAVE_PROMPT) {
            return true;
        }
        self.save()
    }

    /// Offer the stored draft when it differs from `loaded`. Returns whether
    /// the draft was restored.
    pub fn maybe_restore_draft(&mut self, loaded: &str) -> bool {
        let Some(draft) = drafts::load(&self.store, &self.draft_key()) else {
            return false;
        };
        if draft.text.trim().is_empty() || draft.text == loaded {
            return false;
        }
        if !self.host.confirm(RESTORE_DRAFT_PROMPT) {
            return false;
        }
        self.set_content(&draft.text);
        self.dirty = true;
        self.set_status(STATUS_DRAFT_RESTORED);
        true
    }

    /// Open `path`, asking to save the current document first when
    /// `check_dirty` is set.
    pub fn open_path(&mut self, path: impl AsRef<Path>, check_dirty: bool) -> bool {
        let path = path.as_ref();
        if check_dirty && !self.maybe_save_before_leave() {
            return false;
        }
        self.flush_pending_draft();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(path = %path.display(), "cannot open: {e}");
                self.set_status(STATUS_OPEN_FAILED);
                return false;
            }
        };
        self.path = Some(path.to_path_buf());
        self.set_content(&text);
        self.add_recent(path);
        self.dirty = false;
        self.tasks.cancel(&Task::RebuildOutline);
        self.set_status(STATUS_LOADED);
        self.maybe_restore_draft(&text);
        true
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        let text = apply_newline_style(&self.content(), self.prefs.newline_style);
        std::fs::write(path, text).map_err(|e| SessionError::io(path, e))
    }

    /// Save to the current path, or ask for one when untitled.
    pub fn save(&mut self) -> bool {
        let Some(path) = self.path.clone() else {
            return self.save_as(None);
        };
        match self.write_to(&path) {
            Ok(()) => {
                self.dirty = false;
                self.clear_draft();
                self.set_status(STATUS_SAVED);
                true
            }
            Err(e) => {
                tracing::warn!("{e}");
                self.set_status(STATUS_SAVE_FAILED);
                false
            }
        }
    }

    /// Save to `path`, or to one chosen by the host. The document then lives
    /// at the new path and its folder becomes the session folder.
    pub fn save_as(&mut self, path: Option<PathBuf>) -> bool {
        let Some(path) = path.or_else(|| self.host.choose_save_path()) else {
            return false;
        };
        if let Err(e) = self.write_to(&path) {
            tracing::warn!("{e}");
            self.set_status(STATUS_SAVE_FAILED);
            return false;
        }
        // Draft of the previous path (or the untitled one), then of the new one.
        self.clear_draft();
        self.path = Some(path.clone());
        self.folder = path.parent().map(Path::to_path_buf);
        self.add_recent(&path);
        self.clear_draft();
        self.dirty = false;
        self.set_status(STATUS_SAVED);
        true
    }

    /// Reset to an empty untitled document.
    pub fn new_file(&mut self) {
        self.flush_pending_draft();
        self.tasks.cancel(&Task::RebuildOutline);
        self.path = None;
        self.set_content("");
        self.dirty = false;
        self.set_status(STATUS_NEW_FILE);
    }

    /// [`Session::new_file`] behind the save prompt, then offer the untitled draft.
    pub fn new_file_with_prompt(&mut self) -> bool {
        if !self.maybe_save_before_leave() {
            return false;
        }
        self.new_file();
        self.maybe_restore_draft("");
        true
    }

    /// Switch between the rich and source views, carrying the content over.
    pub fn set_source_mode(&mut self, enabled: bool) {
        if enabled == self.source_mode {
            return;
        }
        if enabled {
            self.source = self.content();
        } else {
            self.document = load_document(&self.source, &self.load_context());
        }
        self.source_mode = enabled;
        self.rebuild_outline();
    }

    pub fn toggle_source_mode(&mut self) {
        self.set_source_mode(!self.source_mode);
    }

    // Images

    fn image_target(&self, extension: &str) -> Result<ImageTarget> {
        let target = assets::resolve_image_target(
            extension,
            self.path.as_deref(),
            self.fallback_image_dir.as_deref(),
        )?;
        Ok(match self.prefs.image_insert_rule {
            ImageInsertRule::Absolute => ImageTarget {
                link: target.file.to_string_lossy().replace('\\', "/"),
                ..target
            },
            _ => target,
        })
    }

    fn append_image(&mut self, image: Image) {
        let markdown = images::format_image_markdown(
            image.original.as_deref().unwrap_or(&image.src),
            &image.alt,
        );
        if self.source_mode {
            if !self.source.is_empty() && !self.source.ends_with("\n\n") {
                let missing = if self.source.ends_with('\n') { "\n" } else { "\n\n" };
                self.source.push_str(missing);
            }
            self.source.push_str(&markdown);
            self.source.push('\n');
        } else {
            self.document
                .children
                .push(Node::paragraph(vec![Node::Image(image)]));
        }
        self.mark_edited();
    }

    /// Store `bytes` as an image per the image insertion rule and append it.
    ///
    /// Returns the Markdown source of the inserted image. On upload failure
    /// nothing is inserted and the error carries the uploader output.
    pub fn insert_image(&mut self, bytes: &[u8], extension: &str) -> Result<String> {
        let result = self.insert_image_inner(bytes, extension);
        match &result {
            Ok(_) => self.set_status(STATUS_IMAGE_INSERTED),
            Err(SessionError::Upload(_)) => self.set_status(STATUS_UPLOAD_FAILED),
            Err(e) => tracing::warn!("cannot insert image: {e}"),
        }
        result
    }

    fn insert_image_inner(&mut self, bytes: &[u8], extension: &str) -> Result<String> {
        let target = self.image_target(extension)?;
        std::fs::write(&target.file, bytes).map_err(|e| SessionError::io(&target.file, e))?;

        let image = if self.prefs.image_insert_rule == ImageInsertRule::Upload {
            let uploaded = self.upload(&target.file)?;
            Image {
                src: uploaded,
                original: None,
                alt: String::new(),
                title: None,
            }
        } else {
            Image {
                src: images::data_uri(bytes, images::mime_for_path(&target.file)),
                original: Some(target.link.clone()),
                alt: String::new(),
                title: None,
            }
        };
        let source = image.markdown_source().to_string();
        self.append_image(image);
        Ok(source)
    }

    fn upload(&self, file: &Path) -> Result<String> {
        let uploader = ImageUploader::new(self.prefs.upload_command.clone());
        let result = uploader.upload(file)?;
        match result.url {
            Some(url) if result.success => Ok(url),
            _ => Err(SessionError::Upload(result.merged_output())),
        }
    }

    /// Replace the image at `path` from a `![alt](src)` snippet.
    pub fn update_image(&mut self, path: &NodePath, snippet: &str) -> bool {
        let document_path = self.path.clone();
        if self
            .document
            .update_image(path, snippet, document_path.as_deref())
        {
            self.mark_edited();
            true
        } else {
            false
        }
    }

    /// Remove the image node at `path` and its local file, if any.
    pub fn delete_image(&mut self, path: &NodePath) -> bool {
        let raw = match self.document.node_at(path) {
            Some(Node::Image(image)) => image.markdown_source().to_string(),
            _ => return false,
        };
        if let Some(file) = images::resolve_file_path(&raw, self.path.as_deref()) {
            if file.exists() {
                if let Err(e) = std::fs::remove_file(&file) {
                    tracing::warn!(path = %file.display(), "cannot delete image file: {e}");
                }
            }
        }
        self.document.remove(path);
        self.mark_edited();
        true
    }

    // Folder

    pub fn set_folder(&mut self, folder: Option<PathBuf>) {
        self.folder = folder;
    }

    /// Create `parent/name` and keep it in the tree even while empty.
    pub fn create_folder(&mut self, parent: &Path, name: &str) -> Result<PathBuf> {
        let dir = parent.join(name.trim());
        std::fs::create_dir_all(&dir).map_err(|e| SessionError::io(&dir, e))?;
        self.created_dirs.insert(dir.clone());
        Ok(dir)
    }

    /// Tree of the session folder; empty without one.
    pub fn folder_tree(&self) -> Vec<TreeEntry> {
        match &self.folder {
            Some(folder) => tree::scan_tree(folder, &self.created_dirs),
            None => Vec::new(),
        }
    }
}
