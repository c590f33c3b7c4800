//! Download archive assembly.
//!
//! Packs fetched payloads into a single in-memory ZIP with three top-level
//! folders (`data/`, `docs/`, `geometry/`). Entries are stored without
//! compression: CSVs and shapefile parts gain little from deflate and the
//! archive is built once per download.
//!
//! Names are unique within a folder. A second payload with a name already
//! used is stored as `<stem>_<n><ext>` rather than replacing the first.
//!
//! # Example
//!
//! ```ignore
//! use oeps::archive::ArchiveBuilder;
//!
//! let archive = ArchiveBuilder::from_bundle(bundle)
//!     .build(|percent| println!("packing {}%", percent))?;
//! std::fs::write("out.zip", archive.bytes())?;
//! ```

mod error;

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::fetch::{FetchedBundle, FetchedResource, ResourceGroup};

pub use error::{ArchiveError, ArchiveResult};

/// Folder order inside the archive.
const GROUP_ORDER: [ResourceGroup; 3] = [
    ResourceGroup::Data,
    ResourceGroup::Docs,
    ResourceGroup::Geometry,
];

/// Payload bytes written between progress updates.
const PROGRESS_CHUNK: usize = 1 << 20;

/// A finished archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    bytes: Vec<u8>,
    entries: Vec<String>,
}

impl Archive {
    /// The encoded ZIP.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Paths of the file entries, in write order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

/// Collects payloads and writes them as a store-only ZIP.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    data: Vec<FetchedResource>,
    docs: Vec<FetchedResource>,
    geometry: Vec<FetchedResource>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of every payload in a fetched bundle.
    pub fn from_bundle(bundle: FetchedBundle) -> Self {
        Self {
            data: bundle.data,
            docs: bundle.docs,
            geometry: bundle.geometry,
        }
    }

    /// Append payloads to a group's folder.
    pub fn add(mut self, group: ResourceGroup, resources: Vec<FetchedResource>) -> Self {
        self.group_mut(group).extend(resources);
        self
    }

    fn group(&self, group: ResourceGroup) -> &[FetchedResource] {
        match group {
            ResourceGroup::Data => &self.data,
            ResourceGroup::Docs => &self.docs,
            ResourceGroup::Geometry => &self.geometry,
        }
    }

    fn group_mut(&mut self, group: ResourceGroup) -> &mut Vec<FetchedResource> {
        match group {
            ResourceGroup::Data => &mut self.data,
            ResourceGroup::Docs => &mut self.docs,
            ResourceGroup::Geometry => &mut self.geometry,
        }
    }

    fn total_bytes(&self) -> u64 {
        GROUP_ORDER
            .iter()
            .flat_map(|g| self.group(*g))
            .map(|r| r.data.len() as u64)
            .sum()
    }

    /// Write the archive.
    ///
    /// `on_progress` receives a percentage from 0 to 100, based on payload
    /// bytes written. Values never decrease and the last one is 100.
    pub fn build(self, on_progress: impl FnMut(u8)) -> ArchiveResult<Archive> {
        self.build_chunked(PROGRESS_CHUNK, on_progress)
    }

    fn build_chunked(self, chunk: usize, mut on_progress: impl FnMut(u8)) -> ArchiveResult<Archive> {
        let total = self.total_bytes();
        let mut progress = PercentTracker::new(total);
        on_progress(0);

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let mut entries = Vec::with_capacity(self.data.len() + self.docs.len() + self.geometry.len());

        for group in GROUP_ORDER {
            let folder = group.folder();
            writer.add_directory(format!("{}/", folder), stored())?;

            let mut used = HashSet::new();
            for resource in self.group(group) {
                let name = unique_name(&resource.name, &mut used);
                if name != resource.name {
                    tracing::warn!(
                        folder,
                        original = %resource.name,
                        stored_as = %name,
                        "Duplicate archive name, storing under a new name"
                    );
                }

                let path = format!("{}/{}", folder, name);
                let large = resource.data.len() as u64 >= u64::from(u32::MAX);
                writer.start_file(path.clone(), stored().large_file(large))?;
                for part in resource.data.chunks(chunk) {
                    writer.write_all(part)?;
                    if let Some(percent) = progress.advance(part.len() as u64) {
                        on_progress(percent);
                    }
                }
                entries.push(path);
            }
        }

        let bytes = writer.finish()?.into_inner();
        if let Some(percent) = progress.finish() {
            on_progress(percent);
        }

        tracing::debug!(entries = entries.len(), size = bytes.len(), "Archive built");
        Ok(Archive { bytes, entries })
    }

    /// Write the archive on the blocking thread pool.
    pub async fn build_blocking(
        self,
        on_progress: impl FnMut(u8) + Send + 'static,
    ) -> ArchiveResult<Archive> {
        tokio::task::spawn_blocking(move || self.build(on_progress))
            .await
            .map_err(|e| ArchiveError::Worker(e.to_string()))?
    }
}

fn stored() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
}

/// Pick a name not yet in `used`, appending `_2`, `_3`, ... before the
/// extension on collision.
fn unique_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }

    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    };
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}{}", stem, n, ext);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Converts bytes written into whole percentages, reporting only changes.
struct PercentTracker {
    total: u64,
    written: u64,
    last: Option<u8>,
}

impl PercentTracker {
    fn new(total: u64) -> Self {
        Self {
            total,
            written: 0,
            last: Some(0),
        }
    }

    fn advance(&mut self, bytes: u64) -> Option<u8> {
        self.written += bytes;
        let percent = if self.total == 0 {
            100
        } else {
            ((self.written.min(self.total) * 100) / self.total) as u8
        };
        self.report(percent)
    }

    fn finish(&mut self) -> Option<u8> {
        self.report(100)
    }

    fn report(&mut self, percent: u8) -> Option<u8> {
        if self.last.is_some_and(|last| percent <= last) {
            return None;
        }
        self.last = Some(percent);
        Some(percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::io::Read;

    fn resource(name: &str, data: &str) -> FetchedResource {
        FetchedResource {
            name: name.to_string(),
            data: Bytes::from(data.to_string()),
        }
    }

    fn read_back(archive: &Archive) -> Vec<(String, String)> {
        let mut zip = zip::ZipArchive::new(Cursor::new(archive.bytes())).unwrap();
        let mut files = Vec::new();
        for i in 0..zip.len() {
            let mut file = zip.by_index(i).unwrap();
            if file.is_dir() {
                continue;
            }
            assert_eq!(file.compression(), CompressionMethod::Stored);
            let mut contents = String::new();
            file.read_to_string(&mut contents).unwrap();
            files.push((file.name().to_string(), contents));
        }
        files
    }

    #[test]
    fn test_folders_and_contents() {
        let archive = ArchiveBuilder::new()
            .add(ResourceGroup::Docs, vec![resource("README.md", "# docs")])
            .add(ResourceGroup::Data, vec![resource("S_Latest.csv", "a,b\n1,2\n")])
            .add(
                ResourceGroup::Geometry,
                vec![
                    resource("states2018.shp", "shp"),
                    resource("states2018.dbf", "dbf"),
                ],
            )
            .build(|_| {})
            .unwrap();

        assert_eq!(
            read_back(&archive),
            vec![
                ("data/S_Latest.csv".to_string(), "a,b\n1,2\n".to_string()),
                ("docs/README.md".to_string(), "# docs".to_string()),
                ("geometry/states2018.shp".to_string(), "shp".to_string()),
                ("geometry/states2018.dbf".to_string(), "dbf".to_string()),
            ]
        );
        assert_eq!(archive.entries().len(), 4);
    }

    #[test]
    fn test_empty_groups_still_create_folders() {
        let archive = ArchiveBuilder::new().build(|_| {}).unwrap();

        let zip = zip::ZipArchive::new(Cursor::new(archive.bytes())).unwrap();
        let names: Vec<_> = zip.file_names().map(str::to_string).collect();
        assert_eq!(names.len(), 3);
        for folder in ["data/", "docs/", "geometry/"] {
            assert!(names.contains(&folder.to_string()));
        }
        assert!(archive.entries().is_empty());
    }

    #[test]
    fn test_collisions_keep_every_payload() {
        let archive = ArchiveBuilder::new()
            .add(
                ResourceGroup::Data,
                vec![
                    resource("T_2010.csv", "first"),
                    resource("T_2010.csv", "second"),
                    resource("T_2010.csv", "third"),
                ],
            )
            .add(ResourceGroup::Docs, vec![resource("T_2010.csv", "doc")])
            .build(|_| {})
            .unwrap();

        assert_eq!(
            read_back(&archive),
            vec![
                ("data/T_2010.csv".to_string(), "first".to_string()),
                ("data/T_2010_2.csv".to_string(), "second".to_string()),
                ("data/T_2010_3.csv".to_string(), "third".to_string()),
                ("docs/T_2010.csv".to_string(), "doc".to_string()),
            ]
        );
    }

    #[test]
    fn test_progress_is_monotonic_and_ends_at_100() {
        let mut seen = Vec::new();
        ArchiveBuilder::new()
            .add(
                ResourceGroup::Data,
                vec![resource("a.csv", "aaaa"), resource("b.csv", "bbbbbbbbbbbb")],
            )
            .build(|p| seen.push(p))
            .unwrap();

        assert_eq!(seen, vec![0, 25, 100]);
    }

    #[test]
    fn test_progress_advances_within_a_large_file() {
        let mut seen = Vec::new();
        let archive = ArchiveBuilder::new()
            .add(ResourceGroup::Geometry, vec![resource("big.shp", &"x".repeat(100))])
            .build_chunked(10, |p| seen.push(p))
            .unwrap();

        assert_eq!(seen, (0..=100).step_by(10).map(|p| p as u8).collect::<Vec<_>>());
        assert_eq!(read_back(&archive), vec![("geometry/big.shp".to_string(), "x".repeat(100))]);
    }

    #[test]
    fn test_progress_with_no_payload() {
        let mut seen = Vec::new();
        ArchiveBuilder::new().build(|p| seen.push(p)).unwrap();
        assert_eq!(seen, vec![0, 100]);
    }

    #[test]
    fn test_unique_name_without_extension() {
        let mut used = HashSet::new();
        assert_eq!(unique_name("LICENSE", &mut used), "LICENSE");
        assert_eq!(unique_name("LICENSE", &mut used), "LICENSE_2");
        assert_eq!(unique_name(".hidden", &mut used), ".hidden");
        assert_eq!(unique_name(".hidden", &mut used), ".hidden_2");
    }

    #[tokio::test]
    async fn test_build_blocking() {
        let archive = ArchiveBuilder::new()
            .add(ResourceGroup::Data, vec![resource("a.csv", "1")])
            .build_blocking(|_| {})
            .await
            .unwrap();

        assert_eq!(archive.entries(), &["data/a.csv".to_string()]);
    }
}
