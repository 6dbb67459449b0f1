//! Interactive menu for exploring the loaded accidents.
//!
//! Mirrors the map's controls: pick a color-by variable, tick the labels
//! to show per category, and read back the densest cluster and counts.

use std::path::PathBuf;

use bike_map_accident_models::CategoryKey;
use bike_map_analytics_models::DensityStrategyKind;
use bike_map_app::{AppState, AppStatus};
use bike_map_filter::CategoryLabel;
use dialoguer::{Input, MultiSelect, Select};

/// Actions available in the interactive menu.
enum Action {
    ColorBy,
    Filter,
    Strategy,
    Hotspot,
    Summary,
    WriteView,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::ColorBy,
        Self::Filter,
        Self::Strategy,
        Self::Hotspot,
        Self::Summary,
        Self::WriteView,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::ColorBy => "Select variable (color by)",
            Self::Filter => "Filter accidents",
            Self::Strategy => "Density algorithm",
            Self::Hotspot => "Show densest cluster",
            Self::Summary => "Show counts",
            Self::WriteView => "Write map snapshot",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the menu loop until the user quits.
///
/// A disabled state still shows the menu; each query then reports why
/// analysis is unavailable.
///
/// # Errors
///
/// Returns an error if a prompt fails or a snapshot can't be written.
pub fn run(state: &mut AppState) -> Result<(), Box<dyn std::error::Error>> {
    println!("Bike Accident Map");
    if let AppStatus::Disabled { reason } = state.status() {
        println!("Analysis disabled: {reason}");
    }
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::ColorBy => select_color_by(state)?,
            Action::Filter => select_filter(state)?,
            Action::Strategy => select_strategy(state)?,
            Action::Hotspot => match state.densest() {
                Ok(Some(cluster)) => println!(
                    "Densest cluster: {} accidents around ({:.6}, {:.6})",
                    cluster.count, cluster.center.lng, cluster.center.lat
                ),
                Ok(None) => println!("No accidents match the current filter."),
                Err(e) => println!("{e}"),
            },
            Action::Summary => print_summary(state),
            Action::WriteView => write_view(state)?,
            Action::Quit => break,
        }
        println!();
    }

    Ok(())
}

fn select_color_by(state: &mut AppState) -> Result<(), Box<dyn std::error::Error>> {
    let mut labels = vec!["None"];
    labels.extend(CategoryKey::all().iter().map(|k| k.label()));

    let current = state
        .color_by()
        .and_then(|key| CategoryKey::all().iter().position(|k| *k == key))
        .map_or(0, |i| i + 1);

    let idx = Select::new()
        .with_prompt("Color markers by")
        .items(&labels)
        .default(current)
        .interact()?;

    state.set_color_by(idx.checked_sub(1).map(|i| CategoryKey::all()[i]));
    Ok(())
}

/// Prompts once per category. Ticking every label leaves the category
/// unconstrained; ticking none hides every accident.
fn select_filter(state: &mut AppState) -> Result<(), Box<dyn std::error::Error>> {
    for key in CategoryKey::all() {
        let options = CategoryLabel::all_for(*key);
        let names: Vec<&str> = options.iter().map(|l| l.display()).collect();
        let checked: Vec<bool> = options
            .iter()
            .map(|l| {
                state
                    .selection()
                    .selected(*key)
                    .is_none_or(|selected| selected.contains(l))
            })
            .collect();

        let picked = MultiSelect::new()
            .with_prompt(format!("{} (space=toggle, enter=confirm)", key.label()))
            .items(&names)
            .defaults(&checked)
            .interact()?;

        let selection = state.selection_mut();
        if picked.len() == options.len() {
            selection.clear(*key);
        } else {
            selection.set(*key, picked.into_iter().map(|i| options[i]));
        }
    }

    log::info!("Filter: {}", state.selection());
    Ok(())
}

fn select_strategy(state: &mut AppState) -> Result<(), Box<dyn std::error::Error>> {
    let kinds = [
        DensityStrategyKind::Grid,
        DensityStrategyKind::Pairwise,
        DensityStrategyKind::Auto,
    ];
    let labels = [
        "Grid binning",
        "Pairwise radius",
        "Auto (pairwise for small sets)",
    ];
    let current = kinds.iter().position(|k| *k == state.strategy()).unwrap_or(0);

    let idx = Select::new()
        .with_prompt("Densest-cluster algorithm")
        .items(&labels)
        .default(current)
        .interact()?;

    state.set_strategy(kinds[idx]);
    Ok(())
}

fn print_summary(state: &AppState) {
    let key = state.color_by().unwrap_or(CategoryKey::Severity);
    match state.summary(key) {
        Ok(breakdown) => {
            println!("{} ({} accidents)", key.label(), breakdown.total);
            for count in &breakdown.counts {
                println!("  {:<28} {:>8}", count.display, count.count);
            }
        }
        Err(e) => println!("{e}"),
    }
}

fn write_view(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    let view = match state.view() {
        Ok(view) => view,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };

    let path: String = Input::new()
        .with_prompt("Output file")
        .default("map_view.json".to_string())
        .interact_text()?;
    let path = PathBuf::from(path);

    std::fs::write(&path, serde_json::to_string_pretty(&view)?)?;
    println!("Wrote {} markers to {}", view.markers.len(), path.display());
    Ok(())
}
