use std::path::PathBuf;

use blind_cutlist::render;
use blind_cutlist::types::{OptimizationResult, OptimizeRequest, PanelRequest, Rect};
use blind_cutlist::{OptimizationPriority, Optimizer};
use clap::Parser;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "blind_cutlist",
    about = "Cut sheet optimizer for blind fabric rolls"
)]
struct Cli {
    /// Stock roll width in mm [default: 3000]
    #[arg(long)]
    stock_width: Option<u32>,

    /// Stock roll length in mm [default: 10000]
    #[arg(long)]
    stock_length: Option<u32>,

    /// Blade kerf in mm [default: 0]
    #[arg(long)]
    kerf: Option<u32>,

    /// Packing heuristic
    #[arg(long, value_parser = parse_priority)]
    priority: Option<OptimizationPriority>,

    /// Panels as WxL:qty[:label] (e.g. 1200x1800:2:Lounge 900x1500:1)
    #[arg(long = "panels", num_args = 1..)]
    panels: Vec<String>,

    /// JSON file with {"config": {...}, "panels": [...]}; flags override its config
    #[arg(long)]
    input: Option<PathBuf>,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Show ASCII layout of each sheet
    #[arg(long)]
    layout: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_priority(s: &str) -> Result<OptimizationPriority, String> {
    s.parse()
}

fn parse_dimensions(s: &str) -> Result<Rect, String> {
    let parts: Vec<&str> = s.split(['x', '×']).collect();
    if parts.len() != 2 {
        return Err(format!("invalid dimensions '{}', expected WxL", s));
    }
    let width = parts[0]
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    let length = parts[1]
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid length in '{}'", s))?;
    if width == 0 || length == 0 {
        return Err(format!("dimensions must be non-zero in '{}'", s));
    }
    Ok(Rect::new(width, length))
}

fn parse_panel(s: &str) -> Result<PanelRequest, String> {
    let mut parts = s.splitn(3, ':');
    let (Some(dims), Some(qty)) = (parts.next(), parts.next()) else {
        return Err(format!("invalid panel '{}', expected WxL:qty[:label]", s));
    };
    let rect = parse_dimensions(dims)?;
    let quantity = qty
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    if quantity == 0 {
        return Err(format!("quantity must be non-zero in '{}'", s));
    }
    let panel = PanelRequest::new(rect.width, rect.length, quantity);
    Ok(match parts.next() {
        Some(label) if !label.is_empty() => panel.with_label(label),
        _ => panel,
    })
}

fn load_request(cli: &Cli) -> Result<OptimizeRequest, String> {
    let mut request = match &cli.input {
        Some(path) => {
            let body = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
            serde_json::from_str::<OptimizeRequest>(&body)
                .map_err(|e| format!("invalid input {}: {}", path.display(), e))?
        }
        None => OptimizeRequest::default(),
    };

    if let Some(width) = cli.stock_width {
        request.config.stock_width = width;
    }
    if let Some(length) = cli.stock_length {
        request.config.stock_length = length;
    }
    if let Some(kerf) = cli.kerf {
        request.config.kerf_thickness = kerf;
    }
    if let Some(priority) = cli.priority {
        request.config.optimization_priority = priority;
    }

    for p in &cli.panels {
        request.panels.push(parse_panel(p)?);
    }
    if request.panels.is_empty() {
        return Err("no panels given, use --panels or --input".to_string());
    }
    Ok(request)
}

fn print_report(result: &OptimizationResult, layout: bool) {
    for sheet in &result.sheets {
        println!(
            "Sheet {} ({}x{}, {} mm² waste):",
            sheet.id, sheet.width, sheet.length, sheet.wasted_area
        );
        for cut in result.cuts.iter().filter(|c| c.sheet_number == sheet.id) {
            let rot = if cut.rotated { " [rotated]" } else { "" };
            println!(
                "  #{:<3} {:<8} {} @ ({}, {}) {}{}",
                cut.cut_number, cut.cut, cut.dimensions, cut.x, cut.y, cut.label, rot
            );
        }
        if layout {
            print!(
                "{}",
                render::render_sheet(Rect::new(sheet.width, sheet.length), &sheet.panels)
            );
        }
        println!();
    }

    for d in &result.dropped {
        eprintln!(
            "Warning: panel {} ({}, {}x{}) could not be optimized: larger than stock",
            d.id, d.label, d.width, d.length
        );
    }

    let stats = &result.statistics;
    println!(
        "Summary: {} sheet{} of {}, {}/{} panels placed, {}% efficiency, {}% waste, {} mm cut length",
        stats.used_stock_sheets,
        if stats.used_stock_sheets == 1 { "" } else { "s" },
        stats.stock_dimensions,
        stats.total_cuts,
        stats.total_panels,
        stats.efficiency,
        stats.waste_percentage,
        stats.total_cut_length,
    );
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let request = load_request(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let result = Optimizer::new(request.config)
        .and_then(|optimizer| optimizer.optimize(&request.panels))
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print_report(&result, cli.layout);
    }
}
