//! Standalone Leaflet pages for one or more [`Figure`]s.

use std::fmt::Write as _;
use std::path::Path;

use crime_grid_projection::HALF_CIRCUMFERENCE_M;

use crate::{RenderError, figure::Figure};

const LEAFLET_VERSION: &str = "1.9.4";

/// Cuts `text` to at most `cap` characters, appending `...` when cut.
#[must_use]
pub fn shorten(text: &str, cap: usize) -> String {
    match text.char_indices().nth(cap) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_owned(),
    }
}

/// Escapes the characters that are significant in HTML text and attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// A page of figures laid out top to bottom.
#[derive(Debug, Clone, Default)]
pub struct MapPage {
    pub title: String,
    pub figures: Vec<Figure>,
}

impl MapPage {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            figures: Vec::new(),
        }
    }

    pub fn push(&mut self, figure: Figure) {
        self.figures.push(figure);
    }

    /// Renders the full HTML document.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Json`] if the figures cannot be serialized.
    pub fn render(&self) -> Result<String, RenderError> {
        let figures = serde_json::to_string(&self.figures)?.replace("</", "<\\/");
        let title = escape_html(&self.title);

        let mut html = String::new();
        let _ = write!(
            html,
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.js"></script>
<style>
body {{ font-family: sans-serif; margin: 16px; }}
.figure {{ margin-bottom: 24px; }}
.figure h2 {{ font-size: 14px; font-weight: normal; margin: 4px 0; }}
</style>
</head>
<body>
<h1>{title}</h1>
"#
        );

        for (i, figure) in self.figures.iter().enumerate() {
            let _ = writeln!(
                html,
                r#"<div class="figure"><h2>{}</h2><div id="map-{i}" style="width: {}px; height: {}px;"></div></div>"#,
                escape_html(&figure.title),
                figure.width,
                figure.height,
            );
        }

        let _ = write!(
            html,
            r"<script>
const HALF_CIRCUMFERENCE = {HALF_CIRCUMFERENCE_M};
const FIGURES = {figures};
{DRIVER}</script>
</body>
</html>
"
        );

        Ok(html)
    }

    /// Renders and writes the page, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if rendering or writing fails.
    pub fn write(&self, path: &Path) -> Result<(), RenderError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.render()?)?;
        log::info!("Wrote {} figures to {}", self.figures.len(), path.display());
        Ok(())
    }
}

/// Builds a Leaflet map per figure. Tile sets with a shifted origin get a
/// Mercator CRS whose transformation moves the origin to `y_origin_offset`.
const DRIVER: &str = r"
function crsFor(tiles) {
  if (!tiles || tiles.y_origin_offset == null) {
    return L.CRS.EPSG3857;
  }
  const scale = 0.5 / HALF_CIRCUMFERENCE;
  return L.extend({}, L.CRS.EPSG3857, {
    transformation: new L.Transformation(scale, 0.5, -scale, scale * tiles.y_origin_offset),
  });
}

function latLngs(bounds) {
  return [
    [bounds.lower_left.latitude, bounds.lower_left.longitude],
    [bounds.upper_right.latitude, bounds.upper_right.longitude],
  ];
}

FIGURES.forEach(function (figure, i) {
  const wheel = figure.active_scroll === 'wheel_zoom' && figure.tools.indexOf('wheel_zoom') >= 0;
  const map = L.map('map-' + i, {
    crs: crsFor(figure.tiles),
    dragging: figure.tools.indexOf('pan') >= 0,
    scrollWheelZoom: wheel,
    zoomSnap: 0,
  });

  if (figure.tiles) {
    L.tileLayer(figure.tiles.url, { attribution: figure.tiles.attribution }).addTo(map);
  }

  figure.layers.forEach(function (layer) {
    if (layer.type === 'image') {
      L.imageOverlay(layer.url, latLngs(layer.bounds), { opacity: layer.opacity }).addTo(map);
    } else if (layer.type === 'scatter') {
      layer.points.forEach(function (p) {
        L.circleMarker([p.latitude, p.longitude], {
          radius: layer.radius,
          color: layer.color,
          fillOpacity: 0.8,
          weight: 0,
        }).addTo(map);
      });
    } else if (layer.type === 'geojson') {
      L.geoJSON(layer.data, {
        style: function (feature) {
          const color = (feature.properties && feature.properties.color) || '#3388ff';
          return { color: color, fillColor: color, weight: 0, fillOpacity: 0.7 };
        },
      }).addTo(map);
    }
  });

  map.fitBounds(latLngs(figure.bounds));
});
";

#[cfg(test)]
mod tests {
    use crime_grid_models::{MOSCOW_BOX, Point};

    use super::*;
    use crate::{figure::get_map, tiles::TileProvider};

    #[test]
    fn shortens_long_text() {
        assert_eq!(shorten("abcdef", 3), "abc...");
        assert_eq!(shorten("abc", 3), "abc");
        assert_eq!(shorten("", 5), "");
    }

    #[test]
    fn shortens_by_characters() {
        let group = "Глава 21. Преступления против собственности";
        let short = shorten(group, 8);
        assert_eq!(short, "Глава 21...");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<a & 'b'>"), "&lt;a &amp; &#39;b&#39;&gt;");
    }

    #[test]
    fn page_contains_figures_and_offset() {
        let mut figure = get_map(&MOSCOW_BOX, TileProvider::Yandex.source(), 700)
            .unwrap()
            .with_title("Cell corners");
        figure.add_scatter(vec![Point::new(55.7, 37.6)], 2.0, "#ff0000");

        let mut page = MapPage::new("Moscow <test>");
        page.push(figure);
        let html = page.render().unwrap();

        assert!(html.contains("leaflet@1.9.4"));
        assert!(html.contains("Moscow &lt;test&gt;"));
        assert!(html.contains(r#"id="map-0""#));
        assert!(html.contains("20002108.34"));
        assert!(html.contains("\"type\":\"scatter\""));
        assert!(html.contains("Cell corners"));
    }

    #[test]
    fn script_end_tags_are_escaped() {
        let mut figure = get_map(&MOSCOW_BOX, TileProvider::LightCarto.source(), 700).unwrap();
        figure.add_geojson(serde_json::json!({ "name": "</script><b>" }));

        let mut page = MapPage::new("x");
        page.push(figure);
        let html = page.render().unwrap();

        assert_eq!(html.matches("</script>").count(), 2);
        assert!(html.contains(r"<\/script>"));
    }

    #[test]
    fn writes_page() {
        let tmp = std::env::temp_dir().join("crime_grid_render_test_html");
        let _ = std::fs::remove_dir_all(&tmp);

        let path = tmp.join("maps/page.html");
        MapPage::new("empty").write(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("<!DOCTYPE html>"));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
