//! Menu-driven selection of an [`Action`] when no subcommand is given.

use std::error::Error;

use crime_grid_config::Config;
use crime_grid_models::NarkotaField;
use crime_grid_render::shorten;
use dialoguer::{MultiSelect, Select};

use crate::pipeline::Action;

/// Top-level menu entries.
enum Tool {
    Corners,
    Groups,
    Narkota,
    Geojson,
}

impl Tool {
    const ALL: &[Self] = &[Self::Corners, Self::Groups, Self::Narkota, Self::Geojson];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Corners => "Plot cell corners",
            Self::Groups => "Heatmaps by crime group",
            Self::Narkota => "Narcotics heatmap",
            Self::Geojson => "Export cell counts as GeoJSON",
        }
    }
}

/// Prompts for an action using the groups in `config`.
///
/// # Errors
///
/// Returns an error if the terminal prompt fails or is cancelled.
pub fn choose(config: &Config) -> Result<Action, Box<dyn Error>> {
    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();
    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    let groups = &config.heatmap.groups;
    let group_labels: Vec<String> = groups.iter().map(|g| shorten(g, 60)).collect();

    let action = match Tool::ALL[idx] {
        Tool::Corners => Action::Corners,
        Tool::Groups => {
            let defaults = vec![true; groups.len()];
            let selected = MultiSelect::new()
                .with_prompt("Groups (space=toggle, a=all, enter=confirm)")
                .items(&group_labels)
                .defaults(&defaults)
                .interact()?;
            Action::Groups(selected.into_iter().map(|i| groups[i].clone()).collect())
        }
        Tool::Narkota => {
            let fields = NarkotaField::all();
            let labels: Vec<String> = fields.iter().map(ToString::to_string).collect();
            let idx = Select::new()
                .with_prompt("Counter")
                .items(&labels)
                .default(fields.iter().position(|f| *f == NarkotaField::Sale).unwrap_or(0))
                .interact()?;
            Action::Narkota(fields[idx])
        }
        Tool::Geojson => {
            let mut labels = vec!["All groups".to_owned()];
            labels.extend(group_labels);
            let idx = Select::new()
                .with_prompt("Group")
                .items(&labels)
                .default(0)
                .interact()?;
            Action::Geojson {
                group: idx.checked_sub(1).map(|i| groups[i].clone()),
                output: None,
            }
        }
    };

    Ok(action)
}
