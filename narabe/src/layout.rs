use std::io::{BufRead, BufReader, Write};
use std::num::NonZeroU32;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use anyhow::{Context, Result};
use narabe_ipc::layout::{LayoutMessage, LayoutResult, WindowGeometry};

/// Computes tiles for `window_ids` inside a `width` x `height` area.
///
/// Geometries are relative to the area's top-left corner and come back in
/// the order of `window_ids`.
pub trait TileLayout {
    fn tiles(
        &mut self,
        width: u32,
        height: u32,
        rows: NonZeroU32,
        window_ids: &[u32],
    ) -> Result<Vec<WindowGeometry>>;
}

/// The goban grid, computed in-process.
pub struct BuiltinGrid;

impl TileLayout for BuiltinGrid {
    fn tiles(
        &mut self,
        width: u32,
        height: u32,
        rows: NonZeroU32,
        window_ids: &[u32],
    ) -> Result<Vec<WindowGeometry>> {
        narabe_layout_goban::plan(window_ids, rows, width, height)
            .into_iter()
            .map(|(&id, cell)| -> Result<WindowGeometry> {
                Ok(WindowGeometry {
                    id,
                    x: i32::try_from(cell.x).context("Tile x out of range")?,
                    y: i32::try_from(cell.y).context("Tile y out of range")?,
                    width: cell.width,
                    height: cell.height,
                })
            })
            .collect()
    }
}

/// A layout engine running as a child process.
pub struct LayoutEngine {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl LayoutEngine {
    pub fn spawn(name: &str) -> Result<Self> {
        let program = format!("narabe-layout-{}", name);
        Self::start(Command::new(&program), &program)
    }

    fn start(mut command: Command, label: &str) -> Result<Self> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("Failed to spawn layout engine: {}", label))?;

        let stdin = child.stdin.take().context("Failed to get stdin")?;
        let stdout = child.stdout.take().context("Failed to get stdout")?;

        tracing::info!("Layout engine '{}' spawned", label);

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    pub fn request_layout(
        &mut self,
        width: u32,
        height: u32,
        window_ids: &[u32],
    ) -> Result<Vec<WindowGeometry>> {
        let msg = LayoutMessage::Layout {
            width,
            height,
            windows: window_ids.to_vec(),
        };

        match self.send(&msg)? {
            LayoutResult::Layout { windows } => Ok(windows),
            LayoutResult::Error { message } => {
                anyhow::bail!("Layout engine error: {}", message)
            }
            LayoutResult::Ok => {
                anyhow::bail!("Unexpected 'ok' response for layout request")
            }
        }
    }

    pub fn send_command(&mut self, cmd: &str, args: &[String]) -> Result<()> {
        let msg = LayoutMessage::Command {
            cmd: cmd.to_string(),
            args: args.to_vec(),
        };

        match self.send(&msg)? {
            LayoutResult::Ok => Ok(()),
            LayoutResult::Error { message } => {
                anyhow::bail!("Layout engine error: {}", message)
            }
            LayoutResult::Layout { .. } => {
                anyhow::bail!("Unexpected 'layout' response for command")
            }
        }
    }

    fn send(&mut self, msg: &LayoutMessage) -> Result<LayoutResult> {
        serde_json::to_writer(&mut self.stdin, msg)?;
        writeln!(self.stdin)?;
        self.stdin.flush()?;

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            anyhow::bail!("Layout engine closed its output");
        }

        let result: LayoutResult = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse layout response: {}", line.trim()))?;

        Ok(result)
    }
}

impl TileLayout for LayoutEngine {
    fn tiles(
        &mut self,
        width: u32,
        height: u32,
        rows: NonZeroU32,
        window_ids: &[u32],
    ) -> Result<Vec<WindowGeometry>> {
        self.send_command("set-rows", &[rows.to_string()])?;
        let windows = self.request_layout(width, height, window_ids)?;
        if windows.len() != window_ids.len() {
            anyhow::bail!(
                "Layout engine returned {} geometries for {} windows",
                windows.len(),
                window_ids.len()
            );
        }
        Ok(windows)
    }
}

impl Drop for LayoutEngine {
    fn drop(&mut self) {
        // stdin is still open here, so the engine is blocked reading it
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_grid_matches_planner() {
        let rows = NonZeroU32::new(2).unwrap();
        let windows = BuiltinGrid.tiles(1000, 800, rows, &[10, 11, 12, 13, 14]).unwrap();

        let placed: Vec<(u32, i32, i32)> = windows.iter().map(|g| (g.id, g.x, g.y)).collect();
        assert_eq!(
            placed,
            vec![(10, 0, 0), (11, 333, 0), (12, 666, 0), (13, 0, 400), (14, 333, 400)]
        );
        assert!(windows.iter().all(|g| g.width == 333 && g.height == 400));
    }

    #[test]
    fn test_missing_engine_fails_to_spawn() {
        let err = LayoutEngine::spawn("does-not-exist-anywhere").err().unwrap();
        assert!(err.to_string().contains("narabe-layout-does-not-exist-anywhere"));
    }
    /// Runs `script` under `sh` as a layout engine. Every line the engine
    /// receives is appended to the returned log file.
    #[cfg(unix)]
    fn scripted_engine(name: &str, script: &str) -> (LayoutEngine, std::path::PathBuf) {
        let log = std::env::temp_dir().join(format!(
            "narabe-layout-{}-{}.log",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&log);

        let mut command = Command::new("sh");
        command.arg("-c").arg(script).env("LOG", &log);
        let engine = LayoutEngine::start(command, name).unwrap();
        (engine, log)
    }

    #[cfg(unix)]
    const TWO_COLUMNS: &str = r#"
while read -r line; do
    printf '%s\n' "$line" >> "$LOG"
    case "$line" in
        *'"type":"command"'*) echo '{"type":"ok"}' ;;
        *) echo '{"type":"layout","windows":[{"id":0,"x":0,"y":0,"width":500,"height":800},{"id":1,"x":500,"y":0,"width":500,"height":800}]}' ;;
    esac
done
"#;

    #[cfg(unix)]
    #[test]
    fn test_engine_receives_rows_before_layout() {
        let (mut engine, log) = scripted_engine("two-columns", TWO_COLUMNS);
        let rows = NonZeroU32::new(3).unwrap();
        let windows = engine.tiles(1000, 800, rows, &[0, 1]).unwrap();
        drop(engine);

        assert_eq!(windows.len(), 2);
        assert_eq!((windows[1].id, windows[1].x, windows[1].width), (1, 500, 500));

        let received: Vec<LayoutMessage> = std::fs::read_to_string(&log)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        let _ = std::fs::remove_file(&log);
        assert_eq!(
            received,
            vec![
                LayoutMessage::Command {
                    cmd: "set-rows".to_string(),
                    args: vec!["3".to_string()],
                },
                LayoutMessage::Layout {
                    width: 1000,
                    height: 800,
                    windows: vec![0, 1],
                },
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_rows_are_resent_for_each_layout() {
        let (mut engine, log) = scripted_engine("resend", TWO_COLUMNS);
        engine.tiles(1000, 800, NonZeroU32::new(2).unwrap(), &[0, 1]).unwrap();
        engine.tiles(1000, 800, NonZeroU32::new(5).unwrap(), &[0, 1]).unwrap();
        drop(engine);

        let lines = std::fs::read_to_string(&log).unwrap();
        let _ = std::fs::remove_file(&log);
        let rows: Vec<LayoutMessage> = lines
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .filter(|m| matches!(m, LayoutMessage::Command { .. }))
            .collect();
        assert_eq!(
            rows,
            vec![
                LayoutMessage::Command {
                    cmd: "set-rows".to_string(),
                    args: vec!["2".to_string()],
                },
                LayoutMessage::Command {
                    cmd: "set-rows".to_string(),
                    args: vec!["5".to_string()],
                },
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_closing_output_is_an_error() {
        let (mut engine, log) = scripted_engine("eof", "read -r line");
        let err = engine
            .tiles(1000, 800, NonZeroU32::new(2).unwrap(), &[0, 1])
            .unwrap_err();
        let _ = std::fs::remove_file(&log);
        assert_eq!(err.to_string(), "Layout engine closed its output");
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_short_geometry_list_is_an_error() {
        let script = r#"
read -r line
echo '{"type":"ok"}'
read -r line
echo '{"type":"layout","windows":[{"id":0,"x":0,"y":0,"width":1000,"height":800}]}'
cat > /dev/null
"#;
        let (mut engine, log) = scripted_engine("short", script);
        let err = engine
            .tiles(1000, 800, NonZeroU32::new(1).unwrap(), &[0, 1])
            .unwrap_err();
        let _ = std::fs::remove_file(&log);
        assert_eq!(
            err.to_string(),
            "Layout engine returned 1 geometries for 2 windows"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_error_response() {
        let script = r#"
read -r line
echo '{"type":"error","message":"rows must be between 1 and 50"}'
cat > /dev/null
"#;
        let (mut engine, log) = scripted_engine("error", script);
        let err = engine
            .tiles(1000, 800, NonZeroU32::new(1).unwrap(), &[0])
            .unwrap_err();
        let _ = std::fs::remove_file(&log);
        assert_eq!(
            err.to_string(),
            "Layout engine error: rows must be between 1 and 50"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_engine_ok_for_layout_is_an_error() {
        let script = r#"
while read -r line; do
    echo '{"type":"ok"}'
done
"#;
        let (mut engine, log) = scripted_engine("always-ok", script);
        let err = engine.request_layout(1000, 800, &[0]).unwrap_err();
        let _ = std::fs::remove_file(&log);
        assert_eq!(
            err.to_string(),
            "Unexpected 'ok' response for layout request"
        );
    }
}
