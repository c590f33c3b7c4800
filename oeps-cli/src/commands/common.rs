//! Facet selection arguments shared by `download` and `resolve`.

use clap::Args;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::MultiSelect;
use oeps::facet::{FilterCategory, FilterState, Scale, Year};
use oeps::manifest::Selection;

use crate::error::CliError;

/// Year and scale filters.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Year to include (1980, 1990, 2000, 2010, Latest). Repeat to add more;
    /// naming a year twice removes it again.
    #[arg(long = "year", value_name = "YEAR")]
    pub years: Vec<String>,

    /// Scale to include (State, County, Tract, Zip). Repeat to add more;
    /// naming a scale twice removes it again.
    #[arg(long = "scale", value_name = "SCALE")]
    pub scales: Vec<String>,

    /// Pick years and scales from a menu
    #[arg(short, long)]
    pub interactive: bool,
}

impl FilterArgs {
    /// Build the filter state. Flags are applied first, then the menu.
    pub fn build(&self) -> Result<FilterState, CliError> {
        let mut filters = apply_labels(FilterState::new(), &self.scales, &self.years)?;
        if self.interactive {
            filters = pick_interactively(&filters)?;
        }
        Ok(filters)
    }
}

/// Toggle each label in order.
pub fn apply_labels(
    mut filters: FilterState,
    scales: &[String],
    years: &[String],
) -> Result<FilterState, CliError> {
    for label in scales {
        filters.toggle_label(label, FilterCategory::Scale)?;
    }
    for label in years {
        filters.toggle_label(label, FilterCategory::Year)?;
    }
    Ok(filters)
}

fn pick_interactively(current: &FilterState) -> Result<FilterState, CliError> {
    let theme = ColorfulTheme::default();

    let scale_labels: Vec<_> = Scale::ALL.iter().map(|s| s.label()).collect();
    let scale_defaults: Vec<_> = Scale::ALL.iter().map(|s| current.scales().contains(s)).collect();
    let picked_scales = MultiSelect::with_theme(&theme)
        .with_prompt("Scales (none selected means all)")
        .items(&scale_labels)
        .defaults(&scale_defaults)
        .interact()?;

    let year_labels: Vec<_> = Year::ALL.iter().map(|y| y.label()).collect();
    let year_defaults: Vec<_> = Year::ALL.iter().map(|y| current.years().contains(y)).collect();
    let picked_years = MultiSelect::with_theme(&theme)
        .with_prompt("Years (none selected means all)")
        .items(&year_labels)
        .defaults(&year_defaults)
        .interact()?;

    let mut filters = FilterState::new();
    for i in picked_scales {
        filters.toggle_scale(Scale::ALL[i]);
    }
    for i in picked_years {
        filters.toggle_year(Year::ALL[i]);
    }
    Ok(filters)
}

/// Print what a selection contains.
pub fn print_selection(filters: &FilterState, selection: &Selection) {
    println!("Filters: {}", filters);
    println!();

    println!("{} ({})", style("Data tables").bold(), selection.datasets.len());
    for dataset in &selection.datasets {
        println!("  {}", dataset.file_name());
    }
    if selection.datasets.is_empty() {
        println!("  (none)");
    }
    println!();

    println!(
        "{} ({} sets, {} files)",
        style("Geometry").bold(),
        selection.geometries.len(),
        selection.geometry_part_count()
    );
    for geometry in &selection.geometries {
        println!(
            "  {} ({} {})",
            geometry.base_file_name,
            geometry.aggregation.label(),
            geometry.year.label()
        );
    }
    if selection.geometries.is_empty() {
        println!("  (none)");
    }
    println!();
    println!("Documentation files are always included.");
}
