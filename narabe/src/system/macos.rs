//! macOS backend. Display size comes from Core Graphics; windows are listed
//! and moved through System Events via `osascript`.
//!
//! Window ids pack the owning process id into the high 32 bits and the
//! window's 1-based index within that process into the low 32 bits, as
//! listed. Raising a window renumbers its siblings, so the index sent to
//! System Events goes through [`ZOrder`].

use std::cell::RefCell;
use std::process::Command;

use anyhow::{Context, Result};
use core_graphics::display::CGDisplay;
use objc2_app_kit::NSScreen;
use objc2_foundation::{MainThreadMarker, NSRect};

use super::zorder::ZOrder;
use super::WindowSystem;
use crate::core::{Rect, Screen, Window, WindowId};

const LIST_WINDOWS_SCRIPT: &str = r#"
set out to ""
tell application "System Events"
    repeat with p in (every process whose background only is false)
        set pid to unix id of p
        set pname to name of p
        set i to 0
        repeat with w in (every window of p)
            set i to i + 1
            set wname to ""
            try
                set wname to name of w as text
            end try
            set out to out & pid & tab & i & tab & pname & tab & wname & linefeed
        end repeat
    end repeat
end tell
return out
"#;

const SYSTEM_APPS: &[&str] = &["Dock", "SystemUIServer", "Control Center", "Notification Center"];

#[derive(Default)]
pub struct SystemEvents {
    z_order: RefCell<ZOrder>,
}

impl SystemEvents {
    fn current_index(&self, id: WindowId) -> (u32, u32) {
        let (pid, index) = split_id(id);
        (pid, self.z_order.borrow().current_index(pid, index))
    }
}

impl WindowSystem for SystemEvents {
    fn list_windows(&self) -> Result<Vec<Window>> {
        let output = osascript(LIST_WINDOWS_SCRIPT).context("Failed to list windows")?;
        let windows: Vec<Window> = output.lines().filter_map(parse_window_line).collect();
        self.z_order
            .borrow_mut()
            .reset(windows.iter().map(|w| split_id(w.id)));
        Ok(windows)
    }

    fn screen(&self) -> Result<Screen> {
        let bounds = CGDisplay::main().bounds();
        let (width, height) = (bounds.size.width as u32, bounds.size.height as u32);
        if width == 0 || height == 0 {
            anyhow::bail!("Main display reports an empty frame");
        }
        let mut screen = Screen::new(width, height);
        match visible_frame() {
            Some(visible) => screen.work_area = flip_visible_frame(height, visible),
            None => tracing::debug!("No main NSScreen, using the full display"),
        }
        Ok(screen)
    }

    fn move_resize(&self, window: &Window, frame: Rect) -> Result<()> {
        let (pid, index) = self.current_index(window.id);
        let script = format!(
            r#"tell application "System Events"
    tell window {index} of (first process whose unix id is {pid})
        set position to {{{x}, {y}}}
        set size to {{{w}, {h}}}
    end tell
end tell"#,
            index = index,
            pid = pid,
            x = frame.x,
            y = frame.y,
            w = frame.width,
            h = frame.height,
        );
        osascript(&script).with_context(|| format!("Failed to move window '{}'", window.title))?;
        Ok(())
    }

    fn focus(&self, window: &Window) -> Result<()> {
        let (pid, index) = self.current_index(window.id);
        let script = format!(
            r#"tell application "System Events"
    set p to first process whose unix id is {pid}
    set frontmost of p to true
    perform action "AXRaise" of window {index} of p
end tell"#,
            pid = pid,
            index = index,
        );
        osascript(&script).with_context(|| format!("Failed to focus window '{}'", window.title))?;

        let (pid, listed) = split_id(window.id);
        self.z_order.borrow_mut().raise(pid, listed);
        Ok(())
    }
}

/// The main screen's frame minus the menu bar and Dock, in AppKit's
/// bottom-left-origin coordinates.
fn visible_frame() -> Option<NSRect> {
    let mtm = MainThreadMarker::new()?;
    let screen = NSScreen::mainScreen(mtm)?;
    Some(screen.visibleFrame())
}

/// Converts a bottom-left-origin visible frame to top-left desktop
/// coordinates.
fn flip_visible_frame(display_height: u32, visible: NSRect) -> Rect {
    let top = f64::from(display_height) - (visible.origin.y + visible.size.height);
    Rect::new(
        visible.origin.x.round() as i32,
        top.max(0.0).round() as i32,
        visible.size.width.max(0.0).round() as u32,
        visible.size.height.max(0.0).round() as u32,
    )
}

fn osascript(script: &str) -> Result<String> {
    let output = Command::new("osascript")
        .arg("-e")
        .arg(script)
        .output()
        .context("Failed to run osascript")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("osascript failed: {}", stderr.trim());
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn split_id(id: WindowId) -> (u32, u32) {
    ((id >> 32) as u32, id as u32)
}

fn parse_window_line(line: &str) -> Option<Window> {
    let mut parts = line.splitn(4, '\t');
    let pid: u32 = parts.next()?.trim().parse().ok()?;
    let index: u32 = parts.next()?.trim().parse().ok()?;
    let app_name = parts.next()?.to_string();
    let title = parts.next().unwrap_or_default().to_string();

    Some(Window {
        id: (u64::from(pid) << 32) | u64::from(index),
        system: SYSTEM_APPS.contains(&app_name.as_str()),
        title,
        app_name: Some(app_name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_window_line() {
        let window = parse_window_line("412\t2\tSafari\tStart Page").unwrap();
        assert_eq!(split_id(window.id), (412, 2));
        assert_eq!(window.title, "Start Page");
        assert_eq!(window.app_name.as_deref(), Some("Safari"));
        assert!(!window.system);
    }

    #[test]
    fn test_flip_visible_frame() {
        use objc2_foundation::{NSPoint, NSSize};

        // 25px menu bar on top, 70px Dock at the bottom
        let visible = NSRect::new(NSPoint::new(0.0, 70.0), NSSize::new(1440.0, 805.0));
        assert_eq!(flip_visible_frame(900, visible), Rect::new(0, 25, 1440, 805));

        // Dock on the left
        let visible = NSRect::new(NSPoint::new(64.0, 0.0), NSSize::new(1376.0, 875.0));
        assert_eq!(flip_visible_frame(900, visible), Rect::new(64, 25, 1376, 875));
    }

    #[test]
    fn test_parse_dock_is_system() {
        let window = parse_window_line("97\t1\tDock\t").unwrap();
        assert!(window.system);
        assert_eq!(window.title, "");
    }
}
