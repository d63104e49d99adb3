use std::collections::HashSet;
use std::num::NonZeroU32;

use anyhow::{Context, Result};
use narabe_ipc::PlacementInfo;

use crate::core::{Rect, Window};
use crate::layout::TileLayout;
use crate::system::{listed_windows, WindowSystem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every window `narabe list` would show.
    All,
    /// Windows whose title equals one of these exactly.
    Titles(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct DistributeOptions {
    pub rows: NonZeroU32,
    pub ignore_taskbar: bool,
    pub focus_windows: bool,
    pub show_system_windows: bool,
    pub taskbar_height: Option<u32>,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub window: Window,
    pub frame: Rect,
}

impl Placement {
    pub fn to_info(&self) -> PlacementInfo {
        PlacementInfo {
            id: format!("{:#x}", self.window.id),
            title: self.window.title.clone(),
            x: self.frame.x,
            y: self.frame.y,
            width: self.frame.width,
            height: self.frame.height,
        }
    }
}

#[derive(Debug, Default)]
pub struct DistributeReport {
    pub placements: Vec<Placement>,
    pub applied: bool,
}

/// Lays the selected windows out in a grid and moves them there.
///
/// Nothing is moved if the selection cannot be resolved or the layout fails.
/// A failure while moving stops at that window; earlier windows stay where
/// they were put.
pub fn distribute(
    system: &dyn WindowSystem,
    layout: &mut dyn TileLayout,
    selection: &Selection,
    options: &DistributeOptions,
) -> Result<DistributeReport> {
    run(system, layout, selection, options).context("distribution failed")
}

fn run(
    system: &dyn WindowSystem,
    layout: &mut dyn TileLayout,
    selection: &Selection,
    options: &DistributeOptions,
) -> Result<DistributeReport> {
    let windows = select_windows(system, selection, options.show_system_windows)?;
    if windows.is_empty() {
        tracing::info!("No windows selected, nothing to distribute");
        return Ok(DistributeReport::default());
    }

    let screen = system.screen().context("Failed to query screen geometry")?;
    let area = screen.usable(options.ignore_taskbar, options.taskbar_height);
    if area.is_empty() {
        anyhow::bail!(
            "No usable screen area ({}x{} display, {}x{} available)",
            screen.width,
            screen.height,
            area.width,
            area.height
        );
    }
    tracing::debug!("Distributing {} windows over {:?}", windows.len(), area);

    let placements = plan_placements(layout, windows, area, options.rows)?;

    if options.dry_run {
        return Ok(DistributeReport {
            placements,
            applied: false,
        });
    }

    apply(system, &placements, options.focus_windows)?;
    tracing::info!("Distributed {} windows in {} rows", placements.len(), options.rows);

    Ok(DistributeReport {
        placements,
        applied: true,
    })
}

fn select_windows(
    system: &dyn WindowSystem,
    selection: &Selection,
    show_system: bool,
) -> Result<Vec<Window>> {
    match selection {
        Selection::All => listed_windows(system, show_system),
        Selection::Titles(titles) => {
            let snapshot = system.list_windows().context("Failed to list windows")?;
            resolve_titles(&snapshot, titles)
        }
    }
}

fn resolve_titles(snapshot: &[Window], titles: &[String]) -> Result<Vec<Window>> {
    let mut seen = HashSet::new();
    let mut selected = Vec::new();

    for title in titles {
        let mut matched = false;
        for window in snapshot.iter().filter(|w| &w.title == title) {
            matched = true;
            if seen.insert(window.id) {
                selected.push(window.clone());
            }
        }
        if !matched {
            anyhow::bail!("No window titled '{}'", title);
        }
    }

    Ok(selected)
}

fn plan_placements(
    layout: &mut dyn TileLayout,
    windows: Vec<Window>,
    area: Rect,
    rows: NonZeroU32,
) -> Result<Vec<Placement>> {
    let ids = (0..windows.len())
        .map(u32::try_from)
        .collect::<Result<Vec<u32>, _>>()
        .context("Too many windows")?;

    let geometries = layout.tiles(area.width, area.height, rows, &ids)?;

    let mut slots: Vec<Option<Window>> = windows.into_iter().map(Some).collect();
    let mut placements = Vec::with_capacity(slots.len());
    for geometry in geometries {
        let window = slots
            .get_mut(geometry.id as usize)
            .and_then(Option::take)
            .with_context(|| format!("Layout returned unknown window id {}", geometry.id))?;
        let frame = area.offset(Rect::new(
            geometry.x,
            geometry.y,
            geometry.width,
            geometry.height,
        ));
        placements.push(Placement { window, frame });
    }

    if placements.len() != slots.len() {
        anyhow::bail!(
            "Layout placed {} of {} windows",
            placements.len(),
            slots.len()
        );
    }
    Ok(placements)
}

fn apply(system: &dyn WindowSystem, placements: &[Placement], focus: bool) -> Result<()> {
    for Placement { window, frame } in placements {
        tracing::debug!(
            "Placing [{:#x}] {} at ({}, {}) {}x{}",
            window.id,
            window.title,
            frame.x,
            frame.y,
            frame.width,
            frame.height
        );
        system.move_resize(window, *frame)?;
        if focus {
            system.focus(window)?;
        }
    }
    Ok(())
}
