//! Load, filter, aggregate, and render.
//!
//! Every action reads one of the incident files, keeps the records whose
//! cell corner lies strictly inside the configured box, and writes its
//! outputs under `output_dir`. The returned paths are the files written.

use std::collections::BTreeSet;
use std::error::Error;
use std::path::{Path, PathBuf};

use crime_grid_cli_utils::{IndicatifProgress, MultiProgress};
use crime_grid_config::Config;
use crime_grid_heatmap::{GridIndex, Heatmap, count_by_cell, sum_by_cell};
use crime_grid_models::{
    BoundingBox, Cell, Located, NarkotaField, NarkotaRecord, SummaryRecord,
};
use crime_grid_projection::to_mercator;
use crime_grid_records::{RecordReader, Schema};
use crime_grid_render::{
    Figure, MapPage, export::cells_geojson, get_map, render_heatmap, save_png, shorten,
};

/// Longest group name shown as a figure title.
const TITLE_CAP: usize = 50;

const CORNER_RADIUS: f64 = 2.0;
const CORNER_COLOR: &str = "#1f77b4";
const OVERLAY_OPACITY: f64 = 0.8;

/// What to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Map page with every distinct cell corner.
    Corners,
    /// One count heatmap per group. Empty means the configured groups.
    Groups(Vec<String>),
    /// Heatmap of one narcotics counter.
    Narkota(NarkotaField),
    /// `GeoJSON` of per-cell counts, optionally for a single group.
    Geojson {
        group: Option<String>,
        output: Option<PathBuf>,
    },
}

pub struct Pipeline<'a> {
    config: &'a Config,
    bbox: BoundingBox,
    delimiter: u8,
    multi: &'a MultiProgress,
}

impl<'a> Pipeline<'a> {
    /// # Errors
    ///
    /// Returns an error if the box or delimiter in `config` is invalid.
    pub fn new(config: &'a Config, multi: &'a MultiProgress) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            config,
            bbox: config.bbox()?,
            delimiter: config.delimiter()?,
            multi,
        })
    }

    /// # Errors
    ///
    /// Returns the first load, projection, or write failure.
    pub fn run(&self, action: &Action) -> Result<Vec<PathBuf>, Box<dyn Error>> {
        match action {
            Action::Corners => self.corners().map(|path| vec![path]),
            Action::Groups(groups) => self.groups(groups),
            Action::Narkota(field) => self.narkota(*field),
            Action::Geojson { group, output } => self
                .geojson(group.as_deref(), output.as_deref())
                .map(|path| vec![path]),
        }
    }

    /// Reads `path` and keeps records with a cell inside the box.
    fn load<T: Schema + Located>(&self, path: &Path, label: &str) -> Result<Vec<T>, Box<dyn Error>> {
        let progress = IndicatifProgress::records_bar(self.multi, label);
        let reader = RecordReader::<T, _>::open(path, self.delimiter)?.with_progress(progress);

        let mut records = Vec::new();
        let mut dropped = 0_usize;
        for record in reader {
            let record = record?;
            match record.cell() {
                Some(cell) if cell.corner().is_inside(&self.bbox) => records.push(record),
                _ => dropped += 1,
            }
        }

        log::info!(
            "Kept {} {} records inside {} ({dropped} outside or without a cell)",
            records.len(),
            T::NAME,
            self.bbox
        );
        Ok(records)
    }

    fn corners(&self) -> Result<PathBuf, Box<dyn Error>> {
        let records: Vec<SummaryRecord> = self.load(&self.config.data.summary, "Reading summary")?;
        let cells: BTreeSet<&Cell> = records.iter().filter_map(Located::cell).collect();

        let mut points = Vec::with_capacity(cells.len());
        for cell in cells {
            let corner = cell.corner();
            match to_mercator(corner) {
                Ok(_) => points.push(corner),
                Err(e) => log::warn!("Skipping cell corner: {e}"),
            }
        }

        let mut figure = self
            .map()?
            .with_title(format!("{} cell corners", points.len()));
        figure.add_scatter(points, CORNER_RADIUS, CORNER_COLOR);

        let mut page = MapPage::new("Cell corners");
        page.push(figure);

        let path = self.config.output_dir.join("corners.html");
        page.write(&path)?;
        Ok(path)
    }

    fn groups(&self, groups: &[String]) -> Result<Vec<PathBuf>, Box<dyn Error>> {
        let groups = if groups.is_empty() {
            self.config.heatmap.groups.as_slice()
        } else {
            groups
        };

        let records: Vec<SummaryRecord> = self.load(&self.config.data.summary, "Reading summary")?;
        let index = GridIndex::build(records.iter().filter_map(Located::cell));
        let Some(extent) = index.extent() else {
            log::warn!("No cells inside {}", self.bbox);
            return Ok(Vec::new());
        };

        let mut written = Vec::new();
        let mut page = MapPage::new("Incidents by group");

        for (i, group) in groups.iter().enumerate() {
            let counts = count_by_cell(records.iter().filter(|r| &r.group == group));
            let heatmap = Heatmap::from_series(
                counts.iter().map(|(cell, count)| (cell, *count)),
                &index,
                self.config.heatmap.scale,
            );
            if heatmap.max() <= 0.0 {
                log::warn!("No incidents in group '{group}', skipping");
                continue;
            }

            let name = format!("group-{i}.png");
            written.push(self.raster(&heatmap, &name)?);
            page.push(self.overlay(shorten(group, TITLE_CAP), &name, extent)?);
        }

        if !page.figures.is_empty() {
            let path = self.config.output_dir.join("groups.html");
            page.write(&path)?;
            written.push(path);
        }
        Ok(written)
    }

    fn narkota(&self, field: NarkotaField) -> Result<Vec<PathBuf>, Box<dyn Error>> {
        let records: Vec<NarkotaRecord> =
            self.load(&self.config.data.narkota, "Reading narcotics")?;
        let index = GridIndex::build(records.iter().filter_map(Located::cell));
        let Some(extent) = index.extent() else {
            log::warn!("No cells inside {}", self.bbox);
            return Ok(Vec::new());
        };

        let sums = sum_by_cell(&records, |r: &NarkotaRecord| r.value(field).map(f64::from));
        let heatmap = Heatmap::from_series(
            sums.iter().map(|(cell, sum)| (cell, *sum)),
            &index,
            self.config.heatmap.scale,
        );
        if heatmap.max() <= 0.0 {
            log::warn!("Every '{field}' value is zero or missing, skipping");
            return Ok(Vec::new());
        }

        let name = format!("narkota-{field}.png");
        let png = self.raster(&heatmap, &name)?;

        let mut page = MapPage::new(format!("Narcotics: {field}"));
        page.push(self.overlay(field.to_string(), &name, extent)?);
        let path = self.config.output_dir.join(format!("narkota-{field}.html"));
        page.write(&path)?;

        Ok(vec![png, path])
    }

    fn geojson(&self, group: Option<&str>, output: Option<&Path>) -> Result<PathBuf, Box<dyn Error>> {
        let records: Vec<SummaryRecord> = self.load(&self.config.data.summary, "Reading summary")?;
        let counts = count_by_cell(
            records
                .iter()
                .filter(|r| group.is_none_or(|group| r.group == group)),
        );
        let collection = cells_geojson(&counts, self.config.heatmap.colormap);

        let path = output.map_or_else(
            || self.config.output_dir.join("cells.geojson"),
            Path::to_path_buf,
        );
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_string(&collection)?)?;
        log::info!("Wrote {} cells to {}", collection.features.len(), path.display());
        Ok(path)
    }

    fn map(&self) -> Result<Figure, Box<dyn Error>> {
        Ok(get_map(
            &self.bbox,
            self.config.tile_source(),
            self.config.map.width,
        )?)
    }

    fn raster(&self, heatmap: &Heatmap, name: &str) -> Result<PathBuf, Box<dyn Error>> {
        let path = self.config.output_dir.join(name);
        save_png(&render_heatmap(heatmap, &self.config.raster_style()), &path)?;
        Ok(path)
    }

    /// A tile map with the raster `name` stretched over `extent`. `name` is
    /// relative to the page, which lives in the same directory.
    fn overlay(&self, title: String, name: &str, extent: BoundingBox) -> Result<Figure, Box<dyn Error>> {
        let mut figure = self.map()?.with_title(title);
        figure.add_image_overlay(name, extent, OVERLAY_OPACITY);
        Ok(figure)
    }
}
