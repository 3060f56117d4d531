//! CLI tool for vgrid - loads delimited text, optionally replays a script of
//! interactions, and outputs the resulting grid as JSON
//!
//! Usage:
//!   vgrid_cli <input.csv>                          # Output JSON to stdout
//!   vgrid_cli <input.csv> -o out.json              # Output JSON to file
//!   vgrid_cli <input.tsv> --config cfg.json --script ops.json --size 800x600
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`
//! (e.g. `RUST_LOG=vgrid=debug`).

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::cell::RefCell;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use vgrid::csv::Delimiter;
use vgrid::features::{Button, KeyEvent, Modifiers, Overlays, PointerEvent};
use vgrid::grid::PaintedCell;
use vgrid::layout::RenderedLayout;
use vgrid::{ColumnSource, Grid, GridConfig, GridEvent, GridState, Placement, Point, Result};

const USAGE: &str = "Usage: vgrid_cli <input.csv|input.tsv> [--config cfg.json] \
[--script ops.json] [--size WxH] [-o output.json]";

/// One scripted interaction.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
enum Op {
    Resize {
        width: f32,
        height: f32,
    },
    Scroll {
        #[serde(default)]
        columns: isize,
        #[serde(default)]
        rows: isize,
    },
    PointerDown(PointerOp),
    PointerMove(PointerOp),
    PointerDrag(PointerOp),
    PointerUp(PointerOp),
    DoubleClick(PointerOp),
    ContextMenu(PointerOp),
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Tick {
        now: f64,
    },
    MoveColumns {
        from: usize,
        count: usize,
        to: usize,
    },
    /// Schema indexes.
    HideColumns {
        indexes: Vec<usize>,
    },
    /// Schema indexes, inserted before an active index or appended.
    ShowColumns {
        indexes: Vec<usize>,
        before: Option<usize>,
    },
    FixColumns {
        count: usize,
    },
    FixRows {
        count: usize,
    },
}

#[derive(Debug, Deserialize)]
struct PointerOp {
    x: f32,
    y: f32,
    #[serde(default)]
    button: Button,
    #[serde(default)]
    modifiers: Modifiers,
    /// Host clock for this event
    at: Option<f64>,
}

impl PointerOp {
    fn event(&self) -> PointerEvent {
        PointerEvent::new(Point::new(self.x, self.y), self.button, self.modifiers)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output<'a> {
    state: GridState,
    layout: &'a RenderedLayout,
    overlays: &'a Overlays,
    events: Vec<GridEvent>,
    cells: Vec<PaintedCell>,
}

fn apply(grid: &mut Grid, op: Op) -> Result<()> {
    tracing::debug!(target: "vgrid::cli", ?op, "replay");
    match op {
        Op::Resize { width, height } => grid.set_viewport_size(width, height),
        Op::Scroll { columns, rows } => grid.scroll_by(columns, rows),
        Op::PointerDown(p) => {
            clock(grid, &p);
            grid.pointer_down(p.event())
        }
        Op::PointerMove(p) => {
            clock(grid, &p);
            grid.pointer_move(p.event())
        }
        Op::PointerDrag(p) => {
            clock(grid, &p);
            grid.pointer_drag(p.event())
        }
        Op::PointerUp(p) => {
            clock(grid, &p);
            grid.pointer_up(p.event())
        }
        Op::DoubleClick(p) => {
            clock(grid, &p);
            grid.double_click(p.event())
        }
        Op::ContextMenu(p) => {
            clock(grid, &p);
            grid.context_menu(p.event())
        }
        Op::Key { key, modifiers } => grid.key_down(&KeyEvent::new(key, modifiers)),
        Op::Tick { now } => grid.tick(now),
        Op::MoveColumns { from, count, to } => grid.move_columns(from, count, to).map(|_| ()),
        Op::HideColumns { indexes } => grid.hide_columns(ColumnSource::All, &indexes),
        Op::ShowColumns { indexes, before } => {
            let placement = before.map_or(Placement::End, Placement::Before);
            grid.show_columns(ColumnSource::All, &indexes, placement, false)
        }
        Op::FixColumns { count } => grid.set_fixed_column_count(count),
        Op::FixRows { count } => grid.set_fixed_row_count(count),
    }
}

fn clock(grid: &mut Grid, op: &PointerOp) {
    if let Some(at) = op.at {
        grid.set_clock(at);
    }
}

fn read_or_exit(path: &str) -> Vec<u8> {
    match fs::read(path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let mut config_path = None;
    let mut script_path = None;
    let mut size = None;
    let mut output_path = None;
    let mut rest = args[2..].iter();
    while let Some(flag) = rest.next() {
        let Some(value) = rest.next() else {
            eprintln!("Missing value for {}\n{}", flag, USAGE);
            std::process::exit(1);
        };
        match flag.as_str() {
            "--config" => config_path = Some(value.clone()),
            "--script" => script_path = Some(value.clone()),
            "--size" => {
                let parsed = value
                    .split_once('x')
                    .and_then(|(w, h)| Some((w.parse::<f32>().ok()?, h.parse::<f32>().ok()?)));
                if parsed.is_none() {
                    eprintln!("Bad --size {}, expected WxH", value);
                    std::process::exit(1);
                }
                size = parsed;
            }
            "-o" => output_path = Some(value.clone()),
            other => {
                eprintln!("Unknown option {}\n{}", other, USAGE);
                std::process::exit(1);
            }
        }
    }

    let config = match config_path {
        Some(path) => {
            let text = String::from_utf8_lossy(&read_or_exit(&path)).into_owned();
            match GridConfig::from_json(&text) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error parsing config {}: {}", path, e);
                    std::process::exit(1);
                }
            }
        }
        None => GridConfig::default(),
    };

    // Load the table
    let data = read_or_exit(input_path);
    let mut grid = match Grid::from_delimited(&data, Delimiter::from_path(input_path), config) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error loading {}: {}", input_path, e);
            std::process::exit(1);
        }
    };

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    grid.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    if let Some((width, height)) = size {
        grid.set_viewport_size(width, height).unwrap();
    }

    // Replay the script; a failing op is reported and the rest still run
    if let Some(path) = script_path {
        let ops: Vec<Op> = match serde_json::from_slice(&read_or_exit(&path)) {
            Ok(ops) => ops,
            Err(e) => {
                eprintln!("Error parsing script {}: {}", path, e);
                std::process::exit(1);
            }
        };
        for (i, op) in ops.into_iter().enumerate() {
            if let Err(e) = apply(&mut grid, op) {
                eprintln!("Op {} failed: {}", i, e);
            }
        }
    }

    let cells = grid.painted_cells();
    let output = Output {
        state: grid.state(),
        layout: grid.layout(),
        overlays: grid.overlays(),
        events: events.take(),
        cells,
    };

    // Serialize to JSON
    let json = match serde_json::to_string_pretty(&output) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &json) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Written: {}", path);
        }
        None => {
            io::stdout().write_all(json.as_bytes()).unwrap();
            println!();
        }
    }
}
