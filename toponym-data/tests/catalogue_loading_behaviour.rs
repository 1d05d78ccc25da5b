//! Behavioural tests for [`load_catalogue`].

use std::cell::RefCell;
use std::fs;

use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;
use toponym_core::{EntityKind, EntityRef, RuleCatalogue};
use toponym_data::{
    CORRECTIONS_FILE, CatalogueLoadError, DEPRECATED_KEYS_FILE, DEPRECATED_TAGS_FILE,
    load_catalogue,
};

struct CatalogueWorld {
    dir: TempDir,
    result: RefCell<Option<Result<RuleCatalogue, CatalogueLoadError>>>,
}

impl CatalogueWorld {
    fn root(&self) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.dir.path().to_path_buf()).expect("utf-8 temp dir")
    }

    fn write(&self, name: &str, contents: &str) {
        fs::write(self.dir.path().join(name), contents).expect("write rules file");
    }

    fn catalogue(&self) -> RuleCatalogue {
        match self.result.borrow_mut().take() {
            Some(Ok(catalogue)) => catalogue,
            other => panic!("expected a loaded catalogue, got {other:?}"),
        }
    }
}

#[fixture]
fn world() -> CatalogueWorld {
    CatalogueWorld {
        dir: tempfile::tempdir().expect("temp dir"),
        result: RefCell::new(None),
    }
}

#[given("a rules directory with deprecated keys and tags")]
fn deprecated_files(world: &CatalogueWorld) {
    world.write(DEPRECATED_KEYS_FILE, "key\nis_in\n");
    world.write(DEPRECATED_TAGS_FILE, "key,value\nhighway,ford\n");
}

#[given("an empty rules directory")]
fn empty_directory(world: &CatalogueWorld) {
    let _ = world;
}

#[given("an exclusion list for ways")]
fn way_exclusions(world: &CatalogueWorld) {
    world.write("excluded_ways.csv", "id\n42\n");
}

#[given("a corrections file with one rewrite and one search-only rule")]
fn corrections_file(world: &CatalogueWorld) {
    world.write(CORRECTIONS_FILE, "pattern,template\n^Ch\\.\\s,Chemin \n\\bSt\\b,\n");
}

#[when("the catalogue is loaded")]
fn load(world: &CatalogueWorld) {
    let result = load_catalogue(&world.root());
    world.result.replace(Some(result));
}

#[then("way 42 is excluded")]
fn way_excluded(world: &CatalogueWorld) {
    let borrowed = world.result.borrow();
    let Some(Ok(catalogue)) = borrowed.as_ref() else {
        panic!("expected a loaded catalogue");
    };
    assert!(catalogue
        .exclusions()
        .contains(EntityRef::new(EntityKind::Way, 42)));
}

#[then("the catalogue holds 2 corrections in file order")]
fn two_corrections(world: &CatalogueWorld) {
    let catalogue = world.catalogue();
    let patterns: Vec<&str> = catalogue
        .corrections()
        .iter()
        .map(|rule| rule.pattern())
        .collect();
    assert_eq!(patterns, [r"^Ch\.\s", r"\bSt\b"]);
    assert!(catalogue.corrections().last().is_some_and(|rule| rule.is_search_only()));
}

#[then("the catalogue holds 0 corrections in file order")]
fn no_corrections(world: &CatalogueWorld) {
    let catalogue = world.catalogue();
    assert!(catalogue.corrections().is_empty());
    assert!(catalogue.is_deprecated_key("is_in"));
}

#[then("loading fails naming deprecated_keys.csv")]
fn missing_keys_file(world: &CatalogueWorld) {
    match world.result.borrow().as_ref() {
        Some(Err(CatalogueLoadError::Open { path, .. })) => {
            assert!(path.ends_with(DEPRECATED_KEYS_FILE));
        }
        other => panic!("expected an open error, got {other:?}"),
    }
}

#[scenario(path = "tests/features/catalogue_loading.feature", index = 0)]
fn complete_directory(world: CatalogueWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/catalogue_loading.feature", index = 1)]
fn optional_files_absent(world: CatalogueWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/catalogue_loading.feature", index = 2)]
fn missing_keys_file_fails(world: CatalogueWorld) {
    let _ = world;
}
