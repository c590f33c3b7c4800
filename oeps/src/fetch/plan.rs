//! Concrete remote locations for a resolved selection.

use std::fmt;

use bytes::Bytes;
use serde::Deserialize;

use super::error::{FetchError, FetchResult};
use crate::manifest::{GeometryEntry, Selection, SHP_PARTS};

/// Logical group of resources. Groups are fetched in declaration order and
/// map one-to-one onto top-level archive folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceGroup {
    Docs,
    Data,
    Geometry,
}

impl ResourceGroup {
    /// Archive folder for the group.
    pub fn folder(self) -> &'static str {
        match self {
            ResourceGroup::Docs => "docs",
            ResourceGroup::Data => "data",
            ResourceGroup::Geometry => "geometry",
        }
    }
}

impl fmt::Display for ResourceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder())
    }
}

/// One remote file to retrieve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// File name inside the archive folder.
    pub name: String,
    pub url: String,
}

impl FetchRequest {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A retrieved payload, paired with its archive name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    pub name: String,
    pub data: Bytes,
}

/// A documentation file advertised by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocLink {
    pub name: String,
    pub url: String,
}

/// Entry in a GitHub contents listing. Directories and submodules carry a
/// null `download_url`.
#[derive(Debug, Deserialize)]
struct ListingItem {
    name: String,
    download_url: Option<String>,
}

/// Parse a directory listing, dropping entries without a download URL.
pub fn parse_listing(url: &str, body: &[u8]) -> FetchResult<Vec<DocLink>> {
    let items: Vec<ListingItem> =
        serde_json::from_slice(body).map_err(|e| FetchError::ListingParse {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    Ok(items
        .into_iter()
        .filter_map(|item| {
            item.download_url.map(|url| DocLink {
                name: item.name,
                url,
            })
        })
        .collect())
}

/// Requests for the documentation group.
pub fn doc_requests(links: &[DocLink]) -> Vec<FetchRequest> {
    links
        .iter()
        .map(|link| FetchRequest::new(link.name.clone(), link.url.clone()))
        .collect()
}

/// Requests for the CSV data group.
pub fn data_requests(base_url: &str, selection: &Selection) -> Vec<FetchRequest> {
    selection
        .datasets
        .iter()
        .map(|d| FetchRequest::new(d.file_name(), join_url(base_url, &d.remote_path())))
        .collect()
}

/// Requests for the geometry group: one per (entry × part suffix), entry-major.
pub fn geometry_requests(base_url: &str, selection: &Selection) -> Vec<FetchRequest> {
    (0..selection.geometry_part_count())
        .map(|index| {
            let (entry, suffix) = geometry_part(&selection.geometries, index);
            FetchRequest::new(
                entry.part_name(suffix),
                join_url(base_url, &entry.part_path(suffix)),
            )
        })
        .collect()
}

/// Recover the geometry entry and part suffix for a flat fetch index.
///
/// # Panics
///
/// Panics if `index` is not below `geometries.len() * SHP_PARTS.len()`.
pub fn geometry_part(geometries: &[GeometryEntry], index: usize) -> (&GeometryEntry, &'static str) {
    (
        &geometries[index / SHP_PARTS.len()],
        SHP_PARTS[index % SHP_PARTS.len()],
    )
}

/// Concatenate a base URL and a relative path with exactly one slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
