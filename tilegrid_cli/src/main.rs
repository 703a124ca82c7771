use anyhow::Context;
use std::io::{self, Write};

use tilegrid_core::{
    Direction, FileBackend, LayoutStore, Surface, default_size_classes, grid_height, grid_width,
    map_to_pixels,
};

// Pixel geometry used for the `rects` view: 16:9 poster cells.
const CELL_W: f32 = 160.0;
const CELL_H: f32 = 90.0;
const GAP: f32 = 8.0;

fn print_help() {
    println!(
        r#"TileGrid CLI

            Commands:
            mount <surface> <n-items> [cols] [seed]
            show
            rects
            move <id> <col> <row>
            rtl on|off
            regen [seed]
            help
            quit

            Examples:
            cargo run -p tilegrid_cli -- layouts
            tg> mount home 11 4 42
            tg> move t3 2 0
            tg> rtl on
        "#
    );
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let layouts_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "layouts".to_string());

    println!("TileGrid {} (layouts in '{layouts_dir}')", tilegrid_core::version());
    println!("Type 'help' for commands. 'quit' to exit.");

    let mut surface: Option<Surface<FileBackend>> = None;
    let mut dir = Direction::Ltr;

    loop {
        print!("tg> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            // EOF (Ctrl+D)
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        let result = match cmd.as_str() {
            "help" => {
                print_help();
                Ok(())
            }
            "quit" | "exit" => break,
            "mount" => cmd_mount(&parts, &layouts_dir, &mut surface),
            "show" => with_surface(&surface, |s| {
                print_grid(s, dir);
                Ok(())
            }),
            "rects" => with_surface(&surface, |s| {
                print_rects(s, dir);
                Ok(())
            }),
            "move" => cmd_move(&parts, &mut surface),
            "rtl" => {
                match parts.get(1).copied() {
                    Some("on") => dir = Direction::Rtl,
                    Some("off") => dir = Direction::Ltr,
                    _ => println!("usage: rtl on|off"),
                }
                Ok(())
            }
            "regen" => {
                let seed = parts.get(1).and_then(|s| s.parse::<u64>().ok());
                match surface.as_mut() {
                    Some(s) => s.regenerate(seed),
                    None => {
                        println!("no surface mounted; use 'mount' first");
                        Ok(())
                    }
                }
            }
            _ => {
                println!("unknown command '{cmd}'; type 'help'");
                Ok(())
            }
        };

        if let Err(e) = result {
            println!("error: {e:#}");
        }
    }

    Ok(())
}

fn cmd_mount(
    parts: &[&str],
    layouts_dir: &str,
    surface: &mut Option<Surface<FileBackend>>,
) -> anyhow::Result<()> {
    let (Some(id), Some(n)) = (parts.get(1), parts.get(2)) else {
        println!("usage: mount <surface> <n-items> [cols] [seed]");
        return Ok(());
    };
    let n: usize = n.parse().context("n-items must be a number")?;
    let cols: u32 = match parts.get(3) {
        Some(c) => c.parse().context("cols must be a number")?,
        None => 4,
    };
    let seed = match parts.get(4) {
        Some(s) => Some(s.parse::<u64>().context("seed must be a number")?),
        None => None,
    };

    let ids: Vec<String> = (1..=n).map(|i| format!("t{i}")).collect();
    let store = LayoutStore::new(FileBackend::new(layouts_dir));
    let mounted = Surface::mount(store, *id, &ids, cols, default_size_classes(), seed)?;

    println!(
        "mounted '{}': {} tiles on {} columns, {} rows",
        mounted.surface_id,
        mounted.model.items.len(),
        mounted.model.total_cols,
        mounted.model.total_rows()
    );
    *surface = Some(mounted);
    Ok(())
}

fn cmd_move(parts: &[&str], surface: &mut Option<Surface<FileBackend>>) -> anyhow::Result<()> {
    let Some(s) = surface.as_mut() else {
        println!("no surface mounted; use 'mount' first");
        return Ok(());
    };
    let (Some(id), Some(col), Some(row)) = (parts.get(1), parts.get(2), parts.get(3)) else {
        println!("usage: move <id> <col> <row>");
        return Ok(());
    };
    let col: i32 = col.parse().context("col must be a number")?;
    let row: i32 = row.parse().context("row must be a number")?;

    if s.drag(id, col, row)? {
        println!("moved {id}");
    } else {
        // rejected or zero-delta: the tile snaps back, nothing is written
        println!("(move rejected)");
    }
    Ok(())
}

fn with_surface(
    surface: &Option<Surface<FileBackend>>,
    f: impl FnOnce(&Surface<FileBackend>) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    match surface {
        Some(s) => f(s),
        None => {
            println!("no surface mounted; use 'mount' first");
            Ok(())
        }
    }
}

/// Cell-by-cell view of the arrangement, one 4-char label per cell.
fn print_grid(surface: &Surface<FileBackend>, dir: Direction) {
    let model = &surface.model;
    let rows = model.total_rows();
    println!(
        "surface '{}': {} cols x {} rows ({:?})",
        surface.surface_id, model.total_cols, rows, dir
    );

    for row in 0..rows {
        let mut line = String::new();
        for screen_col in 0..model.total_cols {
            // the grid itself is direction-agnostic; only the view flips
            let col = match dir {
                Direction::Ltr => screen_col,
                Direction::Rtl => model.total_cols - 1 - screen_col,
            };
            let label = model
                .items
                .iter()
                .find(|it| it.covers(col, row))
                .map(|it| format!("{:<4}", truncate(&it.id, 4)))
                .unwrap_or_else(|| ".   ".to_string());
            line.push_str(&label);
            line.push(' ');
        }
        println!("  {line}");
    }
}

/// Pixel boxes as the renderer would see them.
fn print_rects(surface: &Surface<FileBackend>, dir: Direction) {
    let model = &surface.model;
    println!(
        "viewport {} x {} px ({:?})",
        grid_width(model.total_cols, CELL_W, GAP),
        grid_height(model.total_rows(), CELL_H, GAP),
        dir
    );
    for it in &model.items {
        let r = map_to_pixels(it, model.total_cols, CELL_W, CELL_H, GAP, dir);
        println!(
            "  {:<6} ({},{}) {}x{}  ->  left={:>6.0} top={:>6.0} w={:>5.0} h={:>5.0}",
            it.id,
            it.origin.col,
            it.origin.row,
            it.span.col_span,
            it.span.row_span,
            r.left,
            r.top,
            r.width,
            r.height
        );
    }
}

fn truncate(s: &str, max: usize) -> &str {
    &s[..s.len().min(max)]
}
