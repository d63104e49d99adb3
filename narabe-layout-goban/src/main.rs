use std::io::{self, BufRead, Write};
use std::num::NonZeroU32;

use anyhow::Result;
use narabe_ipc::layout::{LayoutMessage, LayoutResult, WindowGeometry};
use narabe_layout_goban::{clamp_rows, plan, DEFAULT_ROWS, MAX_ROWS, MIN_ROWS};

struct LayoutState {
    rows: NonZeroU32,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            rows: clamp_rows(DEFAULT_ROWS),
        }
    }
}

fn main() -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut state = LayoutState::default();

    for line in stdin.lock().lines() {
        let line = line?;
        let msg: LayoutMessage = serde_json::from_str(&line)?;
        let result = handle_message(&mut state, msg);
        serde_json::to_writer(&mut stdout, &result)?;
        writeln!(stdout)?;
        stdout.flush()?;
    }

    Ok(())
}

fn handle_message(state: &mut LayoutState, msg: LayoutMessage) -> LayoutResult {
    match msg {
        LayoutMessage::Layout {
            width,
            height,
            windows,
        } => LayoutResult::Layout {
            windows: generate_layout(state, width, height, &windows),
        },
        LayoutMessage::Command { cmd, args } => handle_command(state, &cmd, &args),
    }
}

fn handle_command(state: &mut LayoutState, cmd: &str, args: &[String]) -> LayoutResult {
    match cmd {
        "set-rows" => {
            if let Some(rows) = args.first().and_then(|s| s.parse::<u32>().ok()) {
                if (MIN_ROWS..=MAX_ROWS).contains(&rows) {
                    state.rows = clamp_rows(rows);
                    return LayoutResult::Ok;
                }
            }
            LayoutResult::Error {
                message: format!("invalid rows (must be {}-{})", MIN_ROWS, MAX_ROWS),
            }
        }
        "inc-rows" => {
            let delta = args
                .first()
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(1);
            state.rows = clamp_rows(state.rows.get().saturating_add(delta));
            LayoutResult::Ok
        }
        "dec-rows" => {
            let delta = args
                .first()
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(1);
            state.rows = clamp_rows(state.rows.get().saturating_sub(delta));
            LayoutResult::Ok
        }
        _ => LayoutResult::Error {
            message: format!("unknown command: {}", cmd),
        },
    }
}

fn generate_layout(
    state: &LayoutState,
    width: u32,
    height: u32,
    window_ids: &[u32],
) -> Vec<WindowGeometry> {
    plan(window_ids, state.rows, width, height)
        .into_iter()
        .map(|(&id, cell)| WindowGeometry {
            id,
            x: cell.x as i32,
            y: cell.y as i32,
            width: cell.width,
            height: cell.height,
        })
        .collect()
}
