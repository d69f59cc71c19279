use clap::Parser;
use cutlist::render;
use cutlist::solver::Solver;
use cutlist::types::{
    BandEdges, Grain, LayoutOptions, PartSpec, Rect, StockSheetSpec,
};

#[derive(Parser)]
#[command(
    name = "cutlist",
    about = "Sheet cutlist optimizer: parts onto stock with kerf, grain and billing"
)]
struct Cli {
    /// Stock sheet as LxW or LxW:qty (e.g. 2750x1830:4; omit qty for unlimited)
    #[arg(long)]
    stock: String,

    /// Parts as LxW:qty or LxW:qty:grain, grain one of length, width, any
    #[arg(long = "cuts", num_args = 1..)]
    cuts: Vec<String>,

    /// Blade kerf width in mm
    #[arg(long, default_value_t = 0)]
    kerf: u32,

    /// Disable 90-degree rotation for grain-free parts
    #[arg(long)]
    no_rotate: bool,

    /// Stop after the first sheet and report overflow as unplaced
    #[arg(long)]
    single_sheet: bool,

    /// Bill every sheet as a full board
    #[arg(long)]
    full_board: bool,

    /// Show ASCII layout of each sheet
    #[arg(long)]
    layout: bool,
}

fn parse_dimensions(s: &str) -> Result<Rect, String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!("invalid dimensions '{}', expected LxW", s));
    }
    let length = parts[0]
        .parse::<u32>()
        .map_err(|_| format!("invalid length in '{}'", s))?;
    let width = parts[1]
        .parse::<u32>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    if length == 0 || width == 0 {
        return Err(format!("dimensions must be non-zero in '{}'", s));
    }
    Ok(Rect::new(length, width))
}

fn parse_stock(s: &str) -> Result<StockSheetSpec, String> {
    let (dims, qty) = match s.split_once(':') {
        Some((dims, qty)) => {
            let qty = qty
                .parse::<u32>()
                .map_err(|_| format!("invalid stock quantity in '{}'", s))?;
            if qty == 0 {
                return Err(format!("stock quantity must be non-zero in '{}'", s));
            }
            (dims, Some(qty))
        }
        None => (s, None),
    };
    Ok(StockSheetSpec {
        id: "stock".to_string(),
        material_id: "board".to_string(),
        rect: parse_dimensions(dims)?,
        qty,
        kerf_mm: None,
        label: None,
    })
}

fn parse_grain(s: &str) -> Result<Grain, String> {
    match s {
        "length" => Ok(Grain::Length),
        "width" => Ok(Grain::Width),
        "any" => Ok(Grain::Any),
        _ => Err(format!(
            "invalid grain '{}', expected: length, width, or any",
            s
        )),
    }
}

fn parse_cut(index: usize, s: &str) -> Result<PartSpec, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(format!("invalid cut '{}', expected LxW:qty[:grain]", s));
    }
    let rect = parse_dimensions(parts[0])?;
    let qty = parts[1]
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    if qty == 0 {
        return Err(format!("quantity must be non-zero in '{}'", s));
    }
    let grain = if parts.len() == 3 {
        parse_grain(parts[2])?
    } else {
        Grain::Any
    };
    Ok(PartSpec {
        id: format!("cut-{}", index + 1),
        rect,
        qty,
        grain,
        band_edges: BandEdges::none(),
        material_id: "board".to_string(),
        label: None,
        laminate: false,
        thickness_mm: None,
    })
}

fn main() {
    let cli = Cli::parse();

    let stock = parse_stock(&cli.stock).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let parts: Vec<PartSpec> = cli
        .cuts
        .iter()
        .enumerate()
        .map(|(i, c)| parse_cut(i, c))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    let mut options = LayoutOptions {
        kerf_mm: cli.kerf,
        allow_rotation: !cli.no_rotate,
        single_sheet_only: cli.single_sheet,
        ..LayoutOptions::default()
    };
    options.billing.global_full_board = cli.full_board;

    let solver = Solver::new(parts, vec![stock], options);
    let result = solver.solve().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    for sheet in &result.sheets {
        println!("Sheet {} ({}):", sheet.sheet_id, sheet.stock);
        for p in &sheet.placements {
            let rot = if p.rotated { " [rotated]" } else { "" };
            println!("  {} @ ({}, {}){}", p.original, p.x, p.y, rot);
        }
        println!(
            "  efficiency {:.1}%, cut length {}mm, billable {:.2}",
            sheet.efficiency * 100.0,
            sheet.cut_length_mm,
            result.billing.get(&sheet.sheet_id).copied().unwrap_or(0.0),
        );
        if cli.layout {
            print!("{}", render::render_sheet(sheet.stock, &sheet.placements));
        }
        println!();
    }

    for part in &result.unplaced {
        println!("Unplaced: {} x{} ({})", part.rect, part.qty, part.id);
    }
    for total in &result.edge_banding {
        println!(
            "Banding {} {}mm: {:.2}m",
            total.material_id,
            total.thickness_mm,
            total.length_mm as f64 / 1000.0,
        );
    }

    let billable: f64 = result.billing.values().sum();
    println!(
        "Summary: {} sheet{} used, {:.1}% waste, {:.2} sheets billable",
        result.sheet_count(),
        if result.sheet_count() == 1 { "" } else { "s" },
        result.total_waste_percent(),
        billable,
    );
}
