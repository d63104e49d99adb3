mod config;
mod core;
mod distribute;
mod layout;
mod system;

use std::process::ExitCode;

use anyhow::Result;
use argh::FromArgs;
use narabe_layout_goban::clamp_rows;
use tracing_subscriber::EnvFilter;

use crate::config::{validate_rows, Config};
use crate::distribute::{distribute, DistributeOptions, DistributeReport, Selection};
use crate::layout::{BuiltinGrid, LayoutEngine, TileLayout};

#[derive(FromArgs)]
/// Arrange open windows into a grid on the primary screen.
struct Args {
    #[argh(subcommand)]
    command: SubCommand,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum SubCommand {
    List(ListArgs),
    Screen(ScreenArgs),
    Distribute(DistributeArgs),
}

#[derive(FromArgs)]
/// List open windows, sorted by title.
#[argh(subcommand, name = "list")]
struct ListArgs {
    /// include panels, docks and untitled windows
    #[argh(switch)]
    all: bool,

    /// print JSON instead of one title per line
    #[argh(switch)]
    json: bool,
}

#[derive(FromArgs)]
/// Show the primary display's size and work area.
#[argh(subcommand, name = "screen")]
struct ScreenArgs {
    /// print JSON
    #[argh(switch)]
    json: bool,
}

#[derive(FromArgs)]
/// Arrange the windows with the given titles into a grid.
#[argh(subcommand, name = "distribute")]
struct DistributeArgs {
    /// number of rows (1-50)
    #[argh(option, short = 'r')]
    rows: Option<u32>,

    /// use the whole display, including the taskbar
    #[argh(switch)]
    ignore_taskbar: bool,

    /// do not raise windows after placing them
    #[argh(switch)]
    no_focus: bool,

    /// external layout engine (runs narabe-layout-<engine>)
    #[argh(option)]
    engine: Option<String>,

    /// print the layout without moving anything
    #[argh(switch)]
    dry_run: bool,

    /// print placements as JSON
    #[argh(switch)]
    json: bool,

    /// distribute every listed window
    #[argh(switch)]
    all: bool,

    /// exact window titles, in placement order
    #[argh(positional)]
    titles: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Args = argh::from_env();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("{:?}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::load()?;

    match args.command {
        SubCommand::List(list) => cmd_list(&config, list),
        SubCommand::Screen(screen) => cmd_screen(screen),
        SubCommand::Distribute(dist) => cmd_distribute(&config, dist),
    }
}

fn cmd_list(config: &Config, args: ListArgs) -> Result<()> {
    let system = system::connect()?;
    let windows = system::listed_windows(system.as_ref(), args.all || config.show_system_windows)?;

    if args.json {
        let infos: Vec<_> = windows.iter().map(|w| w.to_info()).collect();
        println!("{}", serde_json::to_string_pretty(&infos)?);
    } else {
        for window in &windows {
            println!("{}", window.title);
        }
    }
    Ok(())
}

fn cmd_screen(args: ScreenArgs) -> Result<()> {
    let system = system::connect()?;
    let screen = system.screen()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&screen.to_info())?);
    } else {
        let area = screen.work_area;
        println!(
            "display:   {}x{} at ({}, {})",
            screen.width, screen.height, screen.x, screen.y
        );
        println!(
            "work area: {}x{} at ({}, {})",
            area.width, area.height, area.x, area.y
        );
        println!("taskbar:   {}", screen.taskbar_height());
    }
    Ok(())
}

fn cmd_distribute(config: &Config, args: DistributeArgs) -> Result<()> {
    let selection = match (args.all, args.titles.is_empty()) {
        (true, false) => anyhow::bail!("--all cannot be combined with window titles"),
        (true, true) => Selection::All,
        (false, _) => Selection::Titles(args.titles),
    };

    let rows = validate_rows(args.rows.unwrap_or(config.rows))?;
    let options = DistributeOptions {
        rows: clamp_rows(rows),
        ignore_taskbar: args.ignore_taskbar || config.ignore_taskbar,
        focus_windows: config.focus_windows && !args.no_focus,
        show_system_windows: config.show_system_windows,
        taskbar_height: config.taskbar_height,
        dry_run: args.dry_run,
    };

    let mut layout: Box<dyn TileLayout> = match args.engine.as_ref().or(config.engine.as_ref()) {
        Some(name) => Box::new(LayoutEngine::spawn(name)?),
        None => Box::new(BuiltinGrid),
    };

    let system = system::connect()?;
    let report = distribute(system.as_ref(), layout.as_mut(), &selection, &options)?;
    print_report(&report, args.json)
}

fn print_report(report: &DistributeReport, json: bool) -> Result<()> {
    if json {
        let infos: Vec<_> = report.placements.iter().map(|p| p.to_info()).collect();
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    let verb = if report.applied { "placed" } else { "planned" };
    for placement in &report.placements {
        let frame = placement.frame;
        println!(
            "{} {}x{} at ({}, {}): {}",
            verb, frame.width, frame.height, frame.x, frame.y, placement.window.title
        );
    }
    Ok(())
}
