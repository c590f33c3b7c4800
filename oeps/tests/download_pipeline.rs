//! Integration tests for the download pipeline.
//!
//! These tests drive a [`DownloadSession`] end to end against an in-memory
//! content host:
//! - Facet selection → manifest resolution → fetch → archive → file on disk
//! - Historic year fallback to the 2010 boundary files
//! - Failure, status reporting and restart
//!
//! Run with: `cargo test --test download_pipeline`

use std::collections::HashSet;
use std::future::Future;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use oeps::config::ConfigFile;
use oeps::facet::{FilterCategory, FilterState};
use oeps::fetch::{FetchConfig, RemoteSource};
use oeps::manifest::{resolve, Manifest};
use oeps::provider::{AsyncHttpClient, ProviderError};
use oeps::session::{DownloadSession, SessionConfig, SessionError, SessionStatus};

// ============================================================================
// Helper Functions
// ============================================================================

const BASE: &str = "https://content.test/data_final/";
const LISTING: &str = "https://api.test/metadata";

/// Serves every URL under `BASE` with its own path as the body, plus a
/// two-entry documentation listing. URLs in `failing` answer 500.
#[derive(Clone, Default)]
struct ContentHost {
    failing: Arc<Mutex<HashSet<String>>>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl ContentHost {
    fn fail(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl AsyncHttpClient for ContentHost {
    fn get(&self, url: &str) -> impl Future<Output = Result<Bytes, ProviderError>> + Send {
        let url = url.to_string();
        let host = self.clone();

        async move {
            host.requested.lock().unwrap().push(url.clone());
            if host.failing.lock().unwrap().contains(&url) {
                return Err(ProviderError::Status { url, status: 500 });
            }

            if url == LISTING {
                return Ok(Bytes::from_static(
                    br#"[
                        {"name": "Policy_Variables.md", "download_url": "https://content.test/docs/Policy_Variables.md"},
                        {"name": "Geographic_Boundaries.md", "download_url": "https://content.test/docs/Geographic_Boundaries.md"},
                        {"name": "images", "download_url": null}
                    ]"#,
                ));
            }

            match url.strip_prefix("https://content.test/") {
                Some(path) => Ok(Bytes::from(path.to_string())),
                None => Err(ProviderError::Status { url, status: 404 }),
            }
        }
    }
}

fn session_config(output: &Path) -> SessionConfig {
    SessionConfig {
        source: RemoteSource {
            base_url: BASE.to_string(),
            docs_listing_url: LISTING.to_string(),
        },
        fetch: FetchConfig::default().with_parallel(4),
        output_dir: output.to_path_buf(),
    }
}

fn filters(scales: &[&str], years: &[&str]) -> FilterState {
    let mut filters = FilterState::new();
    for scale in scales {
        filters.toggle_label(scale, FilterCategory::Scale).unwrap();
    }
    for year in years {
        filters.toggle_label(year, FilterCategory::Year).unwrap();
    }
    filters
}

/// Read every file entry of a ZIP as (path, contents).
fn unzip(path: &Path) -> Vec<(String, String)> {
    let bytes = std::fs::read(path).unwrap();
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut files = Vec::new();
    for i in 0..zip.len() {
        let mut file = zip.by_index(i).unwrap();
        if file.is_dir() {
            continue;
        }
        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();
        files.push((file.name().to_string(), contents));
    }
    files
}

fn names(files: &[(String, String)]) -> Vec<&str> {
    files.iter().map(|(name, _)| name.as_str()).collect()
}

// ============================================================================
// Integration Tests
// ============================================================================

/// A historic year pulls its CSVs plus the 2010 geometry for each scale.
#[tokio::test]
async fn test_historic_selection_end_to_end() {
    let temp = tempfile::tempdir().unwrap();
    let host = ContentHost::default();
    let session = DownloadSession::new(host.clone(), session_config(temp.path()));
    let manifest = Manifest::builtin().unwrap();

    let path = session
        .run(
            &manifest,
            &filters(&["State", "County"], &["1990"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let file_name = path.file_name().unwrap().to_str().unwrap();
    assert!(file_name.starts_with("OEPS_DOWNLOAD_"));
    assert!(file_name.ends_with(".zip"));

    let files = unzip(&path);
    let mut expected: Vec<String> = [
        "data/S_1990.csv",
        "data/C_1990.csv",
        "docs/Policy_Variables.md",
        "docs/Geographic_Boundaries.md",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for base in ["states2010", "counties2010"] {
        for suffix in [".dbf", ".prj", ".shp", ".shx", ".cpg"] {
            expected.push(format!("geometry/{}{}", base, suffix));
        }
    }
    let mut actual: Vec<String> = files.iter().map(|(name, _)| name.clone()).collect();
    actual.sort_unstable();
    expected.sort_unstable();
    assert_eq!(actual, expected);

    let csv = files.iter().find(|(n, _)| n == "data/S_1990.csv").unwrap();
    assert_eq!(csv.1, "data_final/full_tables/S_1990.csv");

    assert_eq!(session.status(), SessionStatus::Idle);
}

/// Groups are requested strictly in order: listing, docs, data, geometry.
#[tokio::test]
async fn test_groups_requested_in_order() {
    let temp = tempfile::tempdir().unwrap();
    let host = ContentHost::default();
    let session = DownloadSession::new(host.clone(), session_config(temp.path()));
    let manifest = Manifest::builtin().unwrap();
    let filters = filters(&["Tract"], &["Latest"]);

    session
        .run(&manifest, &filters, &CancellationToken::new())
        .await
        .unwrap();

    let requested = host.requested();
    let rank = |url: &String| {
        if url == LISTING {
            0
        } else if url.contains("/docs/") {
            1
        } else if url.ends_with(".csv") {
            2
        } else {
            3
        }
    };
    let ranks: Vec<_> = requested.iter().map(rank).collect();
    let mut sorted = ranks.clone();
    sorted.sort_unstable();
    assert_eq!(ranks, sorted);

    let selection = resolve(&manifest, &filters);
    assert_eq!(
        requested.len(),
        1 + 2 + selection.datasets.len() + selection.geometry_part_count()
    );
}

/// A failed geometry part fails the session, writes nothing, and a later
/// run with the same filters succeeds.
#[tokio::test]
async fn test_failure_then_restart() {
    let temp = tempfile::tempdir().unwrap();
    let host = ContentHost::default();
    host.fail("https://content.test/data_final/geometryFiles/zcta/zctas2018.prj");
    let session = DownloadSession::new(host.clone(), session_config(temp.path()));
    let manifest = Manifest::builtin().unwrap();
    let filters = filters(&["Zip"], &[]);

    let err = session
        .run(&manifest, &filters, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Fetch(_)));
    assert!(err.to_string().contains("500"));
    assert!(matches!(session.status(), SessionStatus::Failed { .. }));
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);

    host.heal();
    let path = session
        .run(&manifest, &filters, &CancellationToken::new())
        .await
        .unwrap();

    let files = unzip(&path);
    assert!(names(&files).contains(&"geometry/zctas2018.prj"));
    assert!(names(&files).contains(&"data/Z_Latest.csv"));
}

/// Settings saved to disk drive the session the same way.
#[tokio::test]
async fn test_session_from_config_file() {
    let temp = tempfile::tempdir().unwrap();
    let config_path = temp.path().join("config.ini");
    let output = temp.path().join("downloads");

    let mut config = ConfigFile::default();
    config.source.base_url = BASE.to_string();
    config.source.docs_url = LISTING.to_string();
    config.download.parallel = 2;
    config.output.directory = Some(output.clone());
    config.save_to(&config_path).unwrap();

    let config = ConfigFile::load_from(&config_path).unwrap();
    let session = DownloadSession::new(ContentHost::default(), config.session_config());

    let path = session
        .run(
            &Manifest::builtin().unwrap(),
            &filters(&["State"], &["Latest"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(path.starts_with(&output));
    assert_eq!(unzip(&path).len(), 2 + 1 + 5);
}
