//! Narrow the manifests down to the resources a filter selects.

use super::{DatasetEntry, GeometryEntry, Manifest, SHP_PARTS};
use crate::facet::{FilterState, Year};

/// The resources selected for one download.
///
/// Entries keep manifest order. Either list may be empty; that simply means
/// nothing is fetched for the category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub datasets: Vec<DatasetEntry>,
    pub geometries: Vec<GeometryEntry>,
}

impl Selection {
    /// Number of part-files the selected geometries expand into.
    pub fn geometry_part_count(&self) -> usize {
        self.geometries.len() * SHP_PARTS.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty() && self.geometries.is_empty()
    }
}

/// Apply `filters` to `manifest`.
///
/// Datasets must pass both facets directly. Geometries pass the scale facet
/// directly; for the year facet an entry also passes when any historic year
/// is selected and the entry is the 2010 fallback boundary, since that is the
/// only historic boundary published per scale.
pub fn resolve(manifest: &Manifest, filters: &FilterState) -> Selection {
    let datasets: Vec<DatasetEntry> = manifest
        .datasets
        .iter()
        .filter(|d| filters.matches_scale(d.scale) && filters.matches_year(d.year))
        .cloned()
        .collect();

    let historic = filters.requests_historic();
    let geometries: Vec<GeometryEntry> = manifest
        .geometries
        .iter()
        .filter(|g| filters.matches_scale(g.aggregation))
        .filter(|g| {
            filters.matches_year(g.year) || (historic && g.year == Year::HISTORIC_FALLBACK)
        })
        .cloned()
        .collect();

    tracing::debug!(
        filters = %filters,
        datasets = datasets.len(),
        geometries = geometries.len(),
        "Resolved manifest selection"
    );

    Selection {
        datasets,
        geometries,
    }
}
