//! Command-line front end
//!
//! Argument parsing and text rendering for the `pokedex` binary, which plays
//! the role of the UI: it loads one batch, then lists, searches or shows a
//! single entry.

use std::time::Duration;

use clap::Parser;

use crate::catalog::{display_name, filter_by_name, find_by_id, CatalogEvent, CatalogItem};
use crate::config::ServiceConfig;

/// Placeholder shown for items whose thumbnail could not be fetched
pub const NO_IMAGE: &str = "[no image]";

#[derive(Debug, Parser)]
#[command(name = "pokedex", version, about = "Browse the Pokemon catalog from the terminal")]
pub struct Cli {
    /// Catalog endpoint (overrides POKEDEX_CATALOG_URL)
    #[arg(long)]
    pub url: Option<String>,

    /// Only show Pokemon whose name contains this text (case-insensitive)
    #[arg(short, long)]
    pub search: Option<String>,

    /// Show the detail view for one Pokemon
    #[arg(long, conflicts_with = "json")]
    pub id: Option<i64>,

    /// Print the batch as JSON
    #[arg(long)]
    pub json: bool,

    /// Catalog request timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Per-thumbnail timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub image_timeout: Option<u64>,

    /// Thumbnail requests in flight at once
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Do not write a session log file
    #[arg(long)]
    pub no_log_file: bool,
}

impl Cli {
    /// Apply command-line overrides on top of `base`
    pub fn service_config(&self, base: ServiceConfig) -> ServiceConfig {
        let mut config = base;
        if let Some(ref url) = self.url {
            config.catalog_url = url.clone();
        }
        if let Some(secs) = self.timeout {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.image_timeout {
            config.image_timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = self.concurrency {
            config.max_concurrent_images = limit.max(1);
        }
        config
    }

    /// Render the published batch the way the flags ask for
    pub fn render(&self, items: &[CatalogItem]) -> Result<String, serde_json::Error> {
        if let Some(id) = self.id {
            return Ok(match find_by_id(items, id) {
                Some(item) => render_detail(item),
                None => format!("No Pokemon with id {}\n", id),
            });
        }

        let visible = filter_by_name(items, self.search.as_deref().unwrap_or(""));

        if self.json {
            let mut out = serde_json::to_string_pretty(&visible)?;
            out.push('\n');
            return Ok(out);
        }

        Ok(render_list(&visible))
    }
}

/// One line per item: id, name, type, image
pub fn render_list(items: &[&CatalogItem]) -> String {
    if items.is_empty() {
        return "No Pokemon found\n".to_string();
    }

    let name_width = items
        .iter()
        .map(|item| item.name.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for item in items {
        let image = item
            .image
            .as_ref()
            .map(|image| image.summary())
            .unwrap_or_else(|| NO_IMAGE.to_string());
        out.push_str(&format!(
            "#{:03}  {:<width$}  {:<10}  {}\n",
            item.id,
            display_name(&item.name),
            item.category,
            image,
            width = name_width
        ));
    }
    out
}

/// Detail view shown for a single Pokemon
pub fn render_detail(item: &CatalogItem) -> String {
    let image = item
        .image
        .as_ref()
        .map(|image| format!("{} ({} bytes)", image.summary(), image.bytes.len()))
        .unwrap_or_else(|| NO_IMAGE.to_string());

    let rows = [
        ("Type", display_name(&item.category)),
        ("Attack", item.attack_stat.to_string()),
        ("Defense", item.defense_stat.to_string()),
        ("Pokedex Id", item.id.to_string()),
        ("Height", item.height_stat.to_string()),
        ("Weight", item.weight_stat.to_string()),
        ("Image", image),
    ];

    let mut out = format!("{}\n", display_name(&item.name));
    for (label, value) in rows {
        out.push_str(&format!("  {:<11} {}\n", label, value));
    }
    out.push('\n');
    out.push_str(&item.description);
    out.push('\n');
    out
}

/// Progress line for an event, if it is worth showing
pub fn describe_event(event: &CatalogEvent) -> Option<String> {
    match event {
        CatalogEvent::CatalogLoaded { count } => Some(format!("Loading {} thumbnails", count)),
        CatalogEvent::Published {
            count,
            missing_images,
        } if *missing_images > 0 => Some(format!(
            "Loaded {} Pokemon, {} without thumbnail",
            count, missing_images
        )),
        CatalogEvent::Published { count, .. } => Some(format!("Loaded {} Pokemon", count)),
        CatalogEvent::ImageResolved { .. } | CatalogEvent::ImageFailed { .. } => None,
    }
}
