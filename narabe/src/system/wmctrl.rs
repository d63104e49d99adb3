//! X11 backend driven through the `wmctrl` command-line tool.
//!
//! Works with any EWMH-compliant window manager.

use std::process::Command;

use anyhow::{Context, Result};

use super::WindowSystem;
use crate::core::{Rect, Screen, Window, WindowId};

const WMCTRL: &str = "wmctrl";
const XRANDR: &str = "xrandr";

pub struct Wmctrl;

impl Wmctrl {
    pub fn connect() -> Result<Self> {
        let wm = run(&["-m"]).context("wmctrl is not available (install wmctrl)")?;
        if let Some(name) = wm.lines().find_map(|l| l.strip_prefix("Name:")) {
            tracing::debug!("Window manager: {}", name.trim());
        }
        Ok(Self)
    }
}

impl WindowSystem for Wmctrl {
    fn list_windows(&self) -> Result<Vec<Window>> {
        let output = run(&["-l", "-x"])?;
        Ok(output.lines().filter_map(parse_window_line).collect())
    }

    fn screen(&self) -> Result<Screen> {
        let monitor = match run_tool(XRANDR, &["--query"]) {
            Ok(output) => primary_monitor(&output),
            Err(e) => {
                tracing::debug!("Using the whole desktop, xrandr unavailable: {:#}", e);
                None
            }
        };
        let output = run(&["-d"])?;
        parse_current_desktop(&output, monitor)
            .context("No current desktop in `wmctrl -d` output")
    }

    fn move_resize(&self, window: &Window, frame: Rect) -> Result<()> {
        let id = format_id(window.id);
        // maximized windows ignore -e
        run(&["-i", "-r", &id, "-b", "remove,maximized_vert,maximized_horz"])
            .with_context(|| format!("Failed to restore window '{}'", window.title))?;

        let geometry = format!("0,{},{},{},{}", frame.x, frame.y, frame.width, frame.height);
        run(&["-i", "-r", &id, "-e", &geometry])
            .with_context(|| format!("Failed to move window '{}'", window.title))?;
        Ok(())
    }

    fn focus(&self, window: &Window) -> Result<()> {
        run(&["-i", "-a", &format_id(window.id)])
            .with_context(|| format!("Failed to focus window '{}'", window.title))?;
        Ok(())
    }
}

fn run(args: &[&str]) -> Result<String> {
    run_tool(WMCTRL, args)
}

fn run_tool(program: &str, args: &[&str]) -> Result<String> {
    tracing::debug!("{} {}", program, args.join(" "));
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("Failed to run {}", program))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("{} {} failed: {}", program, args.join(" "), stderr.trim());
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn format_id(id: WindowId) -> String {
    format!("0x{:08x}", id)
}

/// Splits off `n` whitespace-separated fields and returns the untouched rest.
fn split_fields(line: &str, n: usize) -> Option<(Vec<&str>, &str)> {
    let mut fields = Vec::with_capacity(n);
    let mut rest = line;
    for _ in 0..n {
        rest = rest.trim_start();
        if rest.is_empty() {
            return None;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        fields.push(&rest[..end]);
        rest = &rest[end..];
    }
    Some((fields, rest.trim_start()))
}

/// Parses one line of `wmctrl -l -x`:
/// `<id> <desktop> <instance.class> <host> <title>`.
fn parse_window_line(line: &str) -> Option<Window> {
    let (fields, title) = split_fields(line, 4)?;
    let id = WindowId::from_str_radix(fields[0].trim_start_matches("0x"), 16).ok()?;
    let desktop: i64 = fields[1].parse().ok()?;
    let class = fields[2];

    let mut window = Window::new(id, title);
    window.app_name = class
        .rsplit('.')
        .next()
        .filter(|c| !c.is_empty() && *c != "N/A")
        .map(str::to_string);
    // sticky windows are panels, docks and desktop backgrounds
    window.system = desktop < 0;
    Some(window)
}

fn parse_size(s: &str) -> Option<(u32, u32)> {
    let (w, h) = s.split_once('x')?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

fn parse_origin(s: &str) -> Option<(i32, i32)> {
    let (x, y) = s.split_once(',')?;
    Some((x.parse().ok()?, y.parse().ok()?))
}

/// Parses an xrandr geometry, `1920x1080+1920+0`.
fn parse_geometry(s: &str) -> Option<Rect> {
    let mut parts = s.split('+');
    let (width, height) = parse_size(parts.next()?)?;
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    Some(Rect::new(x, y, width, height))
}

/// Finds the primary output in `xrandr --query`, falling back to the first
/// connected output that is switched on.
///
/// `DP-1 connected primary 1920x1080+0+0 (normal left inverted ...) 527mm x 296mm`
fn primary_monitor(output: &str) -> Option<Rect> {
    let mut first = None;
    for line in output.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.get(1) != Some(&"connected") {
            continue;
        }
        let primary = tokens.get(2) == Some(&"primary");
        let geometry = tokens
            .get(if primary { 3 } else { 2 })
            .and_then(|t| parse_geometry(t));
        match geometry {
            Some(rect) if primary => return Some(rect),
            Some(rect) => {
                first.get_or_insert(rect);
            }
            None => {}
        }
    }
    first
}

/// Parses the current (`*`) desktop from `wmctrl -d`:
/// `0  * DG: 3840x1080  VP: 0,0  WA: 0,27 3840x1053  Workspace 1`.
///
/// `DG` spans every monitor, so the screen is narrowed to `monitor` when one
/// is known and the work area is clipped to it.
fn parse_current_desktop(output: &str, monitor: Option<Rect>) -> Option<Screen> {
    let line = output
        .lines()
        .find(|l| l.split_whitespace().nth(1) == Some("*"))?;
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let dg = tokens.iter().position(|t| *t == "DG:")?;
    let (width, height) = parse_size(tokens.get(dg + 1)?)?;

    let mut screen = match monitor {
        Some(frame) => Screen::at(frame),
        None => Screen::new(width, height),
    };
    let work_area = tokens.iter().position(|t| *t == "WA:").and_then(|wa| {
        let (x, y) = parse_origin(tokens.get(wa + 1)?)?;
        let (w, h) = parse_size(tokens.get(wa + 2)?)?;
        Some(Rect::new(x, y, w, h))
    });
    if let Some(work_area) = work_area {
        screen.work_area = work_area.intersect(screen.full());
    }
    Some(screen)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_window_line() {
        let window =
            parse_window_line("0x03a00003  0 gnome-terminal.Gnome-terminal  host  ~ : vim  main.rs")
                .unwrap();
        assert_eq!(window.id, 0x03a00003);
        assert_eq!(window.title, "~ : vim  main.rs");
        assert_eq!(window.app_name.as_deref(), Some("Gnome-terminal"));
        assert!(!window.system);
    }

    #[test]
    fn test_parse_sticky_window_is_system() {
        let window = parse_window_line("0x01000005 -1 xfce4-panel.Xfce4-panel  host xfce4-panel")
            .unwrap();
        assert!(window.system);
    }

    #[test]
    fn test_parse_untitled_window() {
        let window = parse_window_line("0x01000007  1 N/A  host").unwrap();
        assert_eq!(window.title, "");
        assert_eq!(window.app_name, None);
    }

    #[test]
    fn test_parse_garbage_line() {
        assert!(parse_window_line("").is_none());
        assert!(parse_window_line("not-a-window 0 a b c").is_none());
    }

    #[test]
    fn test_parse_current_desktop() {
        let output = "\
0  - DG: 1920x1080  VP: N/A  WA: 0,0 1920x1080  Web
1  * DG: 2560x1440  VP: 0,0  WA: 0,27 2560x1413  Code
";
        let screen = parse_current_desktop(output, None).unwrap();
        assert_eq!(screen.width, 2560);
        assert_eq!(screen.height, 1440);
        assert_eq!(screen.work_area, Rect::new(0, 27, 2560, 1413));
        assert_eq!(screen.taskbar_height(), 27);
    }

    #[test]
    fn test_parse_desktop_without_work_area() {
        let screen =
            parse_current_desktop("0  * DG: 1280x800  VP: 0,0  WA: N/A  Main", None).unwrap();
        assert_eq!(screen.work_area, Rect::new(0, 0, 1280, 800));
    }

    #[test]
    fn test_parse_no_current_desktop() {
        let output = "0  - DG: 1280x800  VP: 0,0  WA: 0,0 1280x800  A";
        assert!(parse_current_desktop(output, None).is_none());
    }

    const TWO_MONITORS: &str = "\
Screen 0: minimum 320 x 200, current 3840 x 1080, maximum 16384 x 16384
HDMI-1 connected 1920x1080+1920+0 (normal left inverted right x axis y axis) 527mm x 296mm
   1920x1080     60.00*+
DP-1 connected primary 1920x1080+0+0 (normal left inverted right x axis y axis) 597mm x 336mm
   1920x1080     60.00*+  50.00
DP-2 disconnected (normal left inverted right x axis y axis)
";

    #[test]
    fn test_primary_monitor() {
        assert_eq!(primary_monitor(TWO_MONITORS), Some(Rect::new(0, 0, 1920, 1080)));
    }

    #[test]
    fn test_primary_monitor_falls_back_to_first_active_output() {
        let output = "\
Screen 0: minimum 320 x 200, current 1920 x 1080, maximum 16384 x 16384
eDP-1 connected (normal left inverted right x axis y axis)
HDMI-1 connected 1920x1080+0+0 (normal left inverted right x axis y axis) 527mm x 296mm
HDMI-2 connected 1280x1024+1920+0 (normal left inverted right x axis y axis) 376mm x 301mm
";
        assert_eq!(primary_monitor(output), Some(Rect::new(0, 0, 1920, 1080)));
        assert_eq!(primary_monitor("Screen 0: minimum 320 x 200"), None);
    }

    #[test]
    fn test_two_monitor_desktop_uses_primary() {
        let desktop = "0  * DG: 3840x1080  VP: 0,0  WA: 0,27 3840x1053  Workspace 1";
        let screen = parse_current_desktop(desktop, primary_monitor(TWO_MONITORS)).unwrap();
        assert_eq!(screen.full(), Rect::new(0, 0, 1920, 1080));
        assert_eq!(screen.work_area, Rect::new(0, 27, 1920, 1053));
        assert_eq!(screen.taskbar_height(), 27);
    }

    #[test]
    fn test_primary_on_the_right() {
        let desktop = "0  * DG: 3840x1080  VP: 0,0  WA: 0,27 3840x1053  Workspace 1";
        let screen = parse_current_desktop(desktop, Some(Rect::new(1920, 0, 1920, 1080))).unwrap();
        assert_eq!(screen.work_area, Rect::new(1920, 27, 1920, 1053));
        assert_eq!(screen.usable(true, None), Rect::new(1920, 0, 1920, 1080));
    }
}
