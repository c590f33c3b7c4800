//! Static manifests of downloadable resources.
//!
//! Two manifests describe what the content host publishes:
//!
//! - **Datasets**: one CSV table per (scale, year), loaded from JSON. The
//!   default manifest is embedded in the binary; a replacement can be read
//!   from disk.
//! - **Geometries**: a fixed list of boundary shapefiles. Each entry expands
//!   into [`SHP_PARTS`] part-files.
//!
//! [`resolve`] narrows both manifests to a [`Selection`] for a
//! [`FilterState`](crate::facet::FilterState).

mod resolver;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::facet::{FacetError, Scale, Year};

pub use resolver::{resolve, Selection};

/// Shapefile part suffixes. Every geometry entry is fetched as exactly one
/// file per suffix.
pub const SHP_PARTS: [&str; 5] = [".dbf", ".prj", ".shp", ".shx", ".cpg"];

/// Embedded default dataset manifest.
const BUILTIN_DATASETS: &str = include_str!("../../data/csv_files.json");

/// Result type for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Errors that can occur while loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Failed to read a manifest file.
    #[error("failed to read manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid JSON of the expected shape.
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),

    /// An entry carries an unknown scale code or year label.
    #[error("invalid manifest entry '{file}': {source}")]
    InvalidEntry {
        file: String,
        #[source]
        source: FacetError,
    },
}

/// One CSV data table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetEntry {
    pub scale: Scale,
    pub year: Year,
    /// Folder relative to the content host base URL, with trailing slash.
    pub folder: String,
    /// File name without the `.csv` extension.
    pub file: String,
}

impl DatasetEntry {
    /// Name of the file inside the archive.
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.file)
    }

    /// Path relative to the content host base URL.
    pub fn remote_path(&self) -> String {
        format!("{}{}.csv", self.folder, self.file)
    }
}

/// Dataset entry as it appears in the JSON manifest.
#[derive(Debug, Deserialize)]
struct RawDatasetEntry {
    scale: String,
    year: String,
    folder: String,
    file: String,
}

impl TryFrom<RawDatasetEntry> for DatasetEntry {
    type Error = ManifestError;

    fn try_from(raw: RawDatasetEntry) -> Result<Self, Self::Error> {
        let invalid = |source| ManifestError::InvalidEntry {
            file: raw.file.clone(),
            source,
        };
        let scale = Scale::from_code(&raw.scale).map_err(invalid)?;
        let year = raw.year.parse::<Year>().map_err(invalid)?;

        Ok(Self {
            scale,
            year,
            folder: raw.folder,
            file: raw.file,
        })
    }
}

/// One boundary shapefile set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryEntry {
    pub aggregation: Scale,
    pub year: Year,
    pub folder: String,
    pub base_file_name: String,
}

impl GeometryEntry {
    fn new(aggregation: Scale, year: Year, folder: &str, base_file_name: &str) -> Self {
        Self {
            aggregation,
            year,
            folder: folder.to_string(),
            base_file_name: base_file_name.to_string(),
        }
    }

    /// Archive name of the part with the given suffix.
    pub fn part_name(&self, suffix: &str) -> String {
        format!("{}{}", self.base_file_name, suffix)
    }

    /// Remote path of the part with the given suffix.
    pub fn part_path(&self, suffix: &str) -> String {
        format!("{}{}{}", self.folder, self.base_file_name, suffix)
    }
}

/// The published boundary files: one current set per scale and a single
/// 2010 set for every scale except ZCTAs.
fn builtin_geometries() -> Vec<GeometryEntry> {
    vec![
        GeometryEntry::new(Scale::State, Year::Latest, "geometryFiles/state/", "states2018"),
        GeometryEntry::new(Scale::County, Year::Latest, "geometryFiles/county/", "counties2018"),
        GeometryEntry::new(Scale::Tract, Year::Latest, "geometryFiles/tract/", "tracts2018"),
        GeometryEntry::new(Scale::Zip, Year::Latest, "geometryFiles/zcta/", "zctas2018"),
        GeometryEntry::new(Scale::State, Year::Y2010, "geometryFiles/state/", "states2010"),
        GeometryEntry::new(Scale::County, Year::Y2010, "geometryFiles/county/", "counties2010"),
        GeometryEntry::new(Scale::Tract, Year::Y2010, "geometryFiles/tract/", "tracts2010"),
    ]
}

/// The complete set of downloadable resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub datasets: Vec<DatasetEntry>,
    pub geometries: Vec<GeometryEntry>,
}

impl Manifest {
    /// Create a manifest from explicit entry lists.
    pub fn new(datasets: Vec<DatasetEntry>, geometries: Vec<GeometryEntry>) -> Self {
        Self {
            datasets,
            geometries,
        }
    }

    /// The embedded dataset manifest with the built-in geometry list.
    pub fn builtin() -> ManifestResult<Self> {
        Self::from_datasets_json(BUILTIN_DATASETS)
    }

    /// Parse a dataset manifest, pairing it with the built-in geometry list.
    pub fn from_datasets_json(json: &str) -> ManifestResult<Self> {
        let raw: Vec<RawDatasetEntry> = serde_json::from_str(json)?;
        let datasets = raw
            .into_iter()
            .map(DatasetEntry::try_from)
            .collect::<ManifestResult<Vec<_>>>()?;

        Ok(Self::new(datasets, builtin_geometries()))
    }

    /// Load a dataset manifest from disk.
    pub fn load(path: &Path) -> ManifestResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| ManifestError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let manifest = Self::from_datasets_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            datasets = manifest.datasets.len(),
            "Loaded dataset manifest"
        );
        Ok(manifest)
    }

    /// Load from `path` when given, otherwise use the embedded manifest.
    pub fn load_or_builtin(path: Option<&Path>) -> ManifestResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Self::builtin(),
        }
    }
}
