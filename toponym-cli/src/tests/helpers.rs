//! Test helpers for building check workspaces and stub collaborators.

use std::{fs, io::Write, sync::Arc};

use base64::{Engine as _, engine::general_purpose};
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;
use toponym_core::test_support::{RecordingSink, StubFetcher};
use toponym_core::{EntityKind, Tags};

use crate::check::{CheckConfig, Collaborators, CollaboratorBuilder};
use crate::CliError;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    let mut file = fs::File::create(path).expect("create file");
    file.write_all(contents).expect("write file");
}

/// Decode the Base64 PBF fixture `stem` into `dir`.
pub(super) fn decode_pbf_fixture(dir: &Utf8Path, stem: &str) -> Utf8PathBuf {
    let encoded_path = Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(format!("{stem}.osm.pbf.b64"));
    let encoded = fs::read_to_string(&encoded_path).unwrap_or_else(|err| {
        panic!("failed to read base64 fixture {encoded_path}: {err}");
    });
    let cleaned: String = encoded
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace())
        .collect();
    let decoded = general_purpose::STANDARD
        .decode(cleaned.as_bytes())
        .unwrap_or_else(|err| panic!("failed to decode base64 fixture {encoded_path}: {err}"));
    let path = dir.join(format!("{stem}.osm.pbf"));
    write_utf8(&path, &decoded);
    path
}

/// A temporary directory holding an extract and a minimal rules directory.
pub(super) struct CheckWorkspace {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) osm_pbf: Utf8PathBuf,
    pub(super) rules_dir: Utf8PathBuf,
}

impl CheckWorkspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        let osm_pbf = decode_pbf_fixture(&root, "pasteur");
        let rules_dir = root.join("rules");
        write_utf8(&rules_dir.join("deprecated_keys.csv"), b"key\nis_in\n");
        write_utf8(&rules_dir.join("deprecated_tags.csv"), b"key,value\nhighway,ford\n");
        write_utf8(
            &rules_dir.join("corrections.csv"),
            b"pattern,template\n^Ch\\.\\s,Chemin \n",
        );
        Self {
            _dir: dir,
            root,
            osm_pbf,
            rules_dir,
        }
    }
}

/// Serves the fixture's road names and records editor commands.
pub(super) struct StubCollaboratorBuilder {
    pub(super) sink: Arc<RecordingSink>,
}

impl StubCollaboratorBuilder {
    pub(super) fn new() -> Self {
        Self {
            sink: Arc::new(RecordingSink::default()),
        }
    }
}

impl CollaboratorBuilder for StubCollaboratorBuilder {
    fn build(&self, _config: &CheckConfig) -> Result<Collaborators, CliError> {
        let stale = Tags::from([("name".to_owned(), "Ch. Pasteur".to_owned())]);
        let fetcher = StubFetcher::default()
            .with_found(EntityKind::Way, 10, stale.clone())
            .with_found(EntityKind::Relation, 20, stale);
        Ok(Collaborators {
            fetcher: Arc::new(fetcher),
            sink: Arc::clone(&self.sink) as Arc<dyn toponym_core::EditorSink>,
        })
    }
}
