#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the crime grid toolchain.
//!
//! Each subcommand loads the incident files named in the configuration,
//! keeps the records whose cell lies inside the map box, and writes PNG
//! heatmaps, Leaflet map pages, or `GeoJSON` into the output directory.
//! Without a subcommand an interactive menu picks one.
//!
//! Uses `indicatif-log-bridge` (via [`crime_grid_cli_utils::init_logger`])
//! so log lines and the loader spinners share the terminal.

mod interactive;
mod pipeline;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use crime_grid_config::Config;
use crime_grid_models::{BoundingBox, NarkotaField};
use crime_grid_render::TileProvider;

use crate::pipeline::{Action, Pipeline};

#[derive(Parser)]
#[command(name = "crime_grid", about = "Grid heatmaps and tile maps of incident records")]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Flags that take precedence over the config file.
#[derive(Args)]
struct Overrides {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for generated files
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Background tiles: `light_carto`, `dark_carto`, or `yandex`
    #[arg(long, global = true)]
    tiles: Option<TileProvider>,

    /// Figure width in pixels
    #[arg(long, global = true)]
    width: Option<u32>,

    /// Map box as `min_lat,min_lon,max_lat,max_lon`
    #[arg(long, global = true)]
    bbox: Option<BoundingBox>,

    /// Plot raw values instead of `ln(v + 1)`
    #[arg(long, global = true)]
    linear: bool,
}

impl Overrides {
    fn apply(&self, config: &mut Config) {
        if let Some(output_dir) = &self.output_dir {
            config.output_dir.clone_from(output_dir);
        }
        if let Some(tiles) = self.tiles {
            config.map.tiles = tiles;
            config.map.custom_tiles = None;
        }
        if let Some(width) = self.width {
            config.map.width = width;
        }
        if let Some(bbox) = self.bbox {
            config.map.bbox = bbox.to_degrees();
        }
        if self.linear {
            config.heatmap.scale = crime_grid_heatmap::Scale::Linear;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Scatter of cell corners inside the box
    Corners,
    /// Incident count heatmap per crime group
    Groups {
        /// Group to plot; repeat for several. Defaults to the configured groups
        #[arg(long = "group")]
        groups: Vec<String>,
    },
    /// Heatmap of a narcotics counter summed per cell
    Narkota {
        #[arg(long, default_value_t = NarkotaField::Sale)]
        field: NarkotaField,
    },
    /// Per-cell incident counts as `GeoJSON`
    Geojson {
        /// Only count this group
        #[arg(long)]
        group: Option<String>,

        /// Output file. Defaults to `cells.geojson` in the output directory
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

impl From<Commands> for Action {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Corners => Self::Corners,
            Commands::Groups { groups } => Self::Groups(groups),
            Commands::Narkota { field } => Self::Narkota(field),
            Commands::Geojson { group, output } => Self::Geojson { group, output },
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crime_grid_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = Config::load(cli.overrides.config.as_deref())?;
    cli.overrides.apply(&mut config);
    config.validate()?;

    let action = match cli.command {
        Some(command) => command.into(),
        None => {
            println!("Crime Grid");
            println!();
            interactive::choose(&config)?
        }
    };

    let written = Pipeline::new(&config, &multi)?.run(&action)?;
    if written.is_empty() {
        log::warn!("Nothing was written");
    }
    for path in written {
        println!("{}", path.display());
    }

    Ok(())
}
