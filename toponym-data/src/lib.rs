//! Adapters between the toponym engine and the outside world.
//!
//! Responsibilities:
//! - Decode OSM PBF files into entity chunks.
//! - Fetch authoritative entity state from the OpenStreetMap API.
//! - Forward highlights and proposals to a JOSM remote-control endpoint.
//! - Load the rule catalogue from CSV and write the label report.
//!
//! Boundaries:
//! - Do not encode validation or correction rules (live in `toponym-core`).
//! - Adapters expose the synchronous core traits and own their async runtime.

mod catalogue;
mod http;
mod josm;
mod osm_api;
mod pbf;
mod report;

pub use catalogue::{
    CORRECTIONS_FILE, CatalogueLoadError, DEPRECATED_KEYS_FILE, DEPRECATED_TAGS_FILE,
    load_catalogue,
};
pub use http::{ClientBuildError, DEFAULT_USER_AGENT};
pub use josm::{DEFAULT_EDITOR_URL, JosmSink, JosmSinkConfig};
pub use osm_api::{DEFAULT_OSM_API_URL, HttpEntityFetcher, HttpEntityFetcherConfig};
pub use pbf::{PbfChunkSource, PbfError};
pub use report::{ReportError, write_label_report, write_label_report_file};
