//! Integration tests for the plugin registry.
//!
//! The dynamic loader needs real shared libraries, so these tests drive the
//! registry through a stub [`ModuleLoader`] instead: candidate files are
//! plain files in a temp directory, and the stub decides per file stem
//! whether the "module" loads, what it registers, and records every
//! map/unmap pair through its module handles.

use folio::plugin::{
    Module, ModuleLoader, Plugin, PluginRegistration, PluginRegistry,
};
use folio::{DocumentData, Error, Version};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What the stub loader should register for a given file stem.
struct Behavior {
    name: &'static str,
    mimetypes: &'static [&'static str],
    /// Fill in the document-open slot.
    with_open: bool,
    /// Leave the name unset, so validation rejects the registration after
    /// the module was already mapped.
    malformed: bool,
}

impl Behavior {
    fn backend(name: &'static str, mimetypes: &'static [&'static str]) -> Self {
        Self {
            name,
            mimetypes,
            with_open: true,
            malformed: false,
        }
    }
}

#[derive(Clone, Default)]
struct MapCounters {
    mapped: Arc<AtomicUsize>,
    unmapped: Arc<AtomicUsize>,
}

struct RecordingModule {
    counters: MapCounters,
}

impl Module for RecordingModule {}

impl Drop for RecordingModule {
    fn drop(&mut self) {
        self.counters.unmapped.fetch_add(1, Ordering::SeqCst);
    }
}

struct StubLoader {
    behaviors: HashMap<&'static str, Behavior>,
    counters: MapCounters,
    /// Number of times the registry delegated to this loader at all.
    attempts: Arc<AtomicUsize>,
}

fn open_stub(_path: &Path, password: Option<&str>, _plugin: &Plugin) -> folio::Result<DocumentData> {
    Ok(Box::new(password.map(str::to_string)))
}

impl ModuleLoader for StubLoader {
    fn load(&self, path: &Path) -> folio::Result<Plugin> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        let behavior = self.behaviors.get(stem).ok_or_else(|| {
            Error::ModuleLoadFailed(format!("not a plugin: {}", path.display()))
        })?;

        // "Map" the module; the handle records the matching unmap on drop.
        self.counters.mapped.fetch_add(1, Ordering::SeqCst);
        let module = Box::new(RecordingModule {
            counters: self.counters.clone(),
        });

        let mut registration = PluginRegistration::new();
        if !behavior.malformed {
            registration.set_name(behavior.name);
        }
        registration.set_version(Version::new(1, 0, 0));
        for mimetype in behavior.mimetypes {
            registration.add_mimetype(mimetype);
        }
        if behavior.with_open {
            registration.functions_mut().document_open = Some(open_stub);
        }

        registration.into_plugin(path.to_path_buf(), module)
    }
}

struct Fixture {
    dir: tempfile::TempDir,
    counters: MapCounters,
    attempts: Arc<AtomicUsize>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            counters: MapCounters::default(),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn registry(&self, behaviors: Vec<(&'static str, Behavior)>) -> PluginRegistry {
        PluginRegistry::with_loader(Box::new(StubLoader {
            behaviors: behaviors.into_iter().collect(),
            counters: self.counters.clone(),
            attempts: self.attempts.clone(),
        }))
    }

    /// Create a candidate module file with the platform library extension.
    fn module_file(&self, stem: &str) -> PathBuf {
        let name = format!("{stem}.{}", std::env::consts::DLL_EXTENSION);
        let path = self.dir.path().join(name);
        std::fs::write(&path, b"stub module").unwrap();
        path
    }

    /// Create a document file with the given name and contents.
    fn document_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn mapped(&self) -> usize {
        self.counters.mapped.load(Ordering::SeqCst)
    }

    fn unmapped(&self) -> usize {
        self.counters.unmapped.load(Ordering::SeqCst)
    }

    fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[test]
fn test_idempotent_load() {
    let fixture = Fixture::new();
    let mut registry = fixture.registry(vec![(
        "pdf",
        Behavior::backend("pdf", &["application/pdf"]),
    )]);
    let path = fixture.module_file("pdf");

    registry.load_file(&path).unwrap();
    registry.load_file(&path).unwrap();

    assert_eq!(registry.get_plugins().len(), 1);
    // The second call was a no-op: the loader never saw it.
    assert_eq!(fixture.attempts(), 1);
    assert_eq!(fixture.mapped(), 1);
}

#[test]
fn test_failed_load_leaves_registry_unchanged() {
    let fixture = Fixture::new();
    let mut registry = fixture.registry(vec![(
        "broken",
        Behavior {
            malformed: true,
            ..Behavior::backend("broken", &["application/pdf"])
        },
    )]);

    let unknown = fixture.module_file("garbage");
    let result = registry.load_file(&unknown);
    assert!(matches!(result, Err(Error::ModuleLoadFailed(_))));

    let malformed = fixture.module_file("broken");
    let result = registry.load_file(&malformed);
    assert!(matches!(result, Err(Error::PluginMalformed(_))));

    assert!(registry.get_plugins().is_empty());
    assert!(registry.find_by_mimetype("application/pdf").is_empty());
    // The malformed module was mapped, then unmapped again: no mapping
    // survives a failed load.
    assert_eq!(fixture.mapped(), 1);
    assert_eq!(fixture.unmapped(), 1);
}

#[test]
fn test_directory_scan_resilience() {
    let fixture = Fixture::new();
    let mut registry = fixture.registry(vec![(
        "pdf",
        Behavior::backend("pdf", &["application/pdf"]),
    )]);
    fixture.module_file("pdf");
    fixture.module_file("stale");
    fixture.document_file("notes.txt", b"not a module");

    registry.load_directory(fixture.dir.path()).unwrap();

    let plugins = registry.get_plugins();
    assert_eq!(plugins.len(), 1);
    assert_eq!(plugins[0].name(), "pdf");
}

#[test]
fn test_directory_scan_with_no_plugins() {
    let fixture = Fixture::new();
    let mut registry = fixture.registry(vec![]);
    fixture.module_file("stale");
    fixture.document_file("notes.txt", b"not a module");

    // Readable directory, zero plugins loaded: still overall success.
    registry.load_directory(fixture.dir.path()).unwrap();
    assert!(registry.get_plugins().is_empty());
}

#[test]
fn test_mimetype_dispatch() {
    let fixture = Fixture::new();
    let mut registry = fixture.registry(vec![(
        "pdf",
        Behavior::backend("pdf", &["application/pdf"]),
    )]);
    registry.load_file(fixture.module_file("pdf")).unwrap();

    let matches = registry.find_by_mimetype("application/pdf");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].name(), "pdf");
    assert!(registry.find_by_mimetype("text/plain").is_empty());
}

#[test]
fn test_name_lookup_tie_break() {
    let fixture = Fixture::new();
    let mut registry = fixture.registry(vec![
        ("first", Behavior::backend("dup", &["application/pdf"])),
        ("second", Behavior::backend("dup", &["application/pdf"])),
    ]);
    let first = fixture.module_file("first");
    let second = fixture.module_file("second");
    registry.load_file(&first).unwrap();
    registry.load_file(&second).unwrap();

    // First registered wins, deterministically across repeated calls.
    for _ in 0..3 {
        let plugin = registry.get_plugin("dup").unwrap();
        assert_eq!(plugin.path(), first.canonicalize().unwrap());
    }

    // Both stay registered and reachable through MIME dispatch, in order.
    let matches = registry.find_by_mimetype("application/pdf");
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].path(), first.canonicalize().unwrap());
    assert_eq!(matches[1].path(), second.canonicalize().unwrap());
}

#[test]
fn test_registration_order_is_observable() {
    let fixture = Fixture::new();
    let mut registry = fixture.registry(vec![
        ("pdf", Behavior::backend("pdf", &["application/pdf"])),
        ("epub", Behavior::backend("epub", &["application/epub+zip"])),
    ]);
    registry.load_file(fixture.module_file("pdf")).unwrap();
    registry.load_file(fixture.module_file("epub")).unwrap();

    let names: Vec<_> = registry.get_plugins().iter().map(|p| p.name().to_string()).collect();
    assert_eq!(names, ["pdf", "epub"]);
}

#[test]
fn test_open_document_error_distinction() {
    let fixture = Fixture::new();
    let mut registry = fixture.registry(vec![
        ("pdf", Behavior::backend("pdf", &["application/pdf"])),
        (
            "epub",
            Behavior {
                with_open: false,
                ..Behavior::backend("epub", &["application/epub+zip"])
            },
        ),
    ]);
    registry.load_file(fixture.module_file("pdf")).unwrap();
    registry.load_file(fixture.module_file("epub")).unwrap();

    // Missing file.
    let result = registry.open_document("/does/not/exist.pdf", None);
    assert!(matches!(result, Err(Error::DocumentDoesNotExist(_))));

    // Existing file whose type cannot be guessed.
    let mystery = fixture.document_file("mystery", b"nothing recognizable");
    let result = registry.open_document(&mystery, None);
    assert!(matches!(result, Err(Error::UnsupportedFormat(_))));

    // Known type, but no plugin claims it.
    let text = fixture.document_file("notes.txt", b"plain text");
    let result = registry.open_document(&text, None);
    assert!(matches!(result, Err(Error::UnsupportedFormat(_))));

    // A plugin claims the type but offers no document-open capability.
    let book = fixture.document_file("book.epub", b"zipped pages");
    let result = registry.open_document(&book, None);
    assert!(matches!(result, Err(Error::PluginNotImplemented)));
}

#[test]
fn test_open_document_success() {
    let fixture = Fixture::new();
    let mut registry = fixture.registry(vec![(
        "pdf",
        Behavior::backend("pdf", &["application/pdf"]),
    )]);
    registry.load_file(fixture.module_file("pdf")).unwrap();

    let doc_path = fixture.document_file("report.pdf", b"%PDF-1.7");
    let document = registry.open_document(&doc_path, Some("hunter2")).unwrap();

    assert_eq!(document.plugin().name(), "pdf");
    assert_eq!(document.mimetype(), "application/pdf");
    assert!(document.functions().document_open.is_some());
    // The stub backend stores the password it was handed.
    let stored = document.data().downcast_ref::<Option<String>>().unwrap();
    assert_eq!(stored.as_deref(), Some("hunter2"));
}

#[test]
fn test_teardown_unmaps_every_module() {
    let fixture = Fixture::new();
    let mut registry = fixture.registry(vec![
        ("pdf", Behavior::backend("pdf", &["application/pdf"])),
        ("epub", Behavior::backend("epub", &["application/epub+zip"])),
    ]);
    registry.load_file(fixture.module_file("pdf")).unwrap();
    registry.load_file(fixture.module_file("epub")).unwrap();

    assert_eq!(fixture.mapped(), 2);
    assert_eq!(fixture.unmapped(), 0);

    drop(registry);

    assert_eq!(fixture.mapped(), 2);
    assert_eq!(fixture.unmapped(), 2);
}

#[test]
fn test_explicit_unload() {
    let fixture = Fixture::new();
    let mut registry = fixture.registry(vec![(
        "pdf",
        Behavior::backend("pdf", &["application/pdf"]),
    )]);
    registry.load_file(fixture.module_file("pdf")).unwrap();

    assert!(registry.unload("pdf"));
    assert_eq!(fixture.unmapped(), 1);
    assert!(registry.get_plugin("pdf").is_none());
    assert!(registry.find_by_mimetype("application/pdf").is_empty());
    assert!(!registry.unload("pdf"));
}
