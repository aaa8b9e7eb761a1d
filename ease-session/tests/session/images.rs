use crate::common::{session, write};
use ease_babel::NodePath;
use ease_config::{ImageInsertRule, Preferences};
use ease_session::session::{STATUS_IMAGE_INSERTED, STATUS_UPLOAD_FAILED};
use ease_session::upload::PROBE_PNG;
use ease_session::{MemoryStore, SessionError};

#[test]
fn saved_document_gets_relative_asset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.md");
    write(&path, "Intro\n");

    let mut s = session(MemoryStore::new(), &[]);
    s.open_path(&path, false);
    let link = s.insert_image(&PROBE_PNG, ".png").unwrap();

    assert!(link.starts_with("assets/image-"), "{link}");
    assert_eq!(std::fs::read(dir.path().join(&link)).unwrap(), PROBE_PNG.to_vec());
    assert_eq!(s.status(), STATUS_IMAGE_INSERTED);
    assert!(s.is_dirty());

    let images = s.document().images();
    assert_eq!(images.len(), 1);
    let (_, image) = images[0];
    assert!(image.src.starts_with("data:image/png;base64,"));
    assert_eq!(image.original.as_deref(), Some(link.as_str()));
    assert!(s.content().contains(&format!("]({link})")));
}

#[test]
fn untitled_document_uses_fallback_dir() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = dir.path().join("EaseMD");

    let mut s = session(MemoryStore::new(), &[]);
    s.set_fallback_image_dir(Some(fallback.clone()));
    let link = s.insert_image(b"GIF89a", "gif").unwrap();

    assert!(link.ends_with(".gif"));
    assert!(std::path::Path::new(&link).starts_with(&fallback));
}

#[test]
fn absolute_rule_links_by_full_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.md");
    write(&path, "");

    let mut s = session(MemoryStore::new(), &[]);
    s.set_preferences(Preferences {
        image_insert_rule: ImageInsertRule::Absolute,
        ..Preferences::default()
    })
    .unwrap();
    s.open_path(&path, false);
    let link = s.insert_image(&PROBE_PNG, "png").unwrap();
    assert!(std::path::Path::new(&link).is_absolute());
    assert!(std::path::Path::new(&link).exists());
}

#[test]
fn source_mode_insert_appends_markdown() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.md");
    write(&path, "Intro\n");

    let mut s = session(MemoryStore::new(), &[]);
    s.open_path(&path, false);
    s.set_source_mode(true);
    let link = s.insert_image(&PROBE_PNG, "png").unwrap();
    assert_eq!(s.content(), format!("Intro\n\n![]({link})\n"));
}

#[test]
fn failed_upload_inserts_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.md");
    write(&path, "Intro\n");

    let mut s = session(MemoryStore::new(), &[]);
    s.set_preferences(Preferences {
        image_insert_rule: ImageInsertRule::Upload,
        upload_command: "ease-md-no-such-uploader".into(),
        ..Preferences::default()
    })
    .unwrap();
    s.open_path(&path, false);
    let before = s.document().clone();

    let result = s.insert_image(&PROBE_PNG, "png");
    assert!(matches!(result, Err(SessionError::Upload(_))));
    assert_eq!(s.status(), STATUS_UPLOAD_FAILED);
    assert_eq!(s.document(), &before);
}

#[test]
fn update_and_delete_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.md");
    write(&path, "");

    let mut s = session(MemoryStore::new(), &[]);
    s.open_path(&path, false);
    let link = s.insert_image(&PROBE_PNG, "png").unwrap();
    let file = dir.path().join(&link);
    let image_path = s.document().images()[0].0.clone();

    assert!(s.update_image(&image_path, "![renamed](https://example.com/x.png)"));
    let (_, image) = s.document().images()[0];
    assert_eq!(image.alt, "renamed");
    assert_eq!(image.src, "https://example.com/x.png");
    assert!(!s.update_image(&image_path, "not an image"));

    // Point it back at the local file and delete it.
    assert!(s.update_image(&image_path, &format!("![]({link})")));
    assert!(s.delete_image(&image_path));
    assert!(s.document().images().is_empty());
    assert!(!file.exists());
    assert!(!s.delete_image(&NodePath(vec![42])));
}
