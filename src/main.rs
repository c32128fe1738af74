use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use imposition::layout::compute_items_per_sheet;
use imposition::margins::MarginConfig;
use imposition::render;
use imposition::resolver::{DEFAULT_TOP_N, Resolver};
use imposition::store::InMemoryStore;
use imposition::types::{
    MaterialCandidate, PrintableArea, ResolveSpecs, SheetPreset, SheetSizeSpec, TrimSize,
};

#[derive(Parser)]
#[command(
    name = "imposition",
    about = "Print-shop sheet layout calculator and material resolver"
)]
struct Cli {
    /// Product trim size in mm (WxH, e.g. 50x90)
    #[arg(long)]
    trim: String,

    /// Target quantity of finished items
    #[arg(long, default_value_t = 1)]
    qty: u32,

    /// Sheet size: a preset (SRA3, A3, B3, B2) or explicit WxH in mm
    #[arg(long, default_value = "SRA3")]
    sheet: String,

    /// Inventory snapshot as a JSON array of materials; without it only the
    /// sheet layout is computed
    #[arg(long)]
    materials: Option<PathBuf>,

    /// Product constraint documents as a JSON object keyed by product id
    #[arg(long)]
    products: Option<PathBuf>,

    /// Product id whose stored constraints apply
    #[arg(long)]
    product: Option<u32>,

    /// Number of ranked candidates to show
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top: usize,

    /// Show ASCII layout of the sheet
    #[arg(long)]
    layout: bool,
}

fn parse_dimensions(s: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!("invalid dimensions '{}', expected WxH", s));
    }
    let width = parts[0]
        .parse::<f64>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    let height = parts[1]
        .parse::<f64>()
        .map_err(|_| format!("invalid height in '{}'", s))?;
    if width <= 0.0 || height <= 0.0 {
        return Err(format!("dimensions must be positive in '{}'", s));
    }
    Ok((width, height))
}

fn parse_trim(s: &str) -> Result<TrimSize, String> {
    let (width, height) = parse_dimensions(s)?;
    Ok(TrimSize::new(width, height))
}

fn parse_sheet(s: &str) -> Result<SheetSizeSpec, String> {
    if let Some(preset) = SheetPreset::parse(s) {
        return Ok(SheetSizeSpec::Preset(preset));
    }
    let (width, height) = parse_dimensions(s)?;
    Ok(SheetSizeSpec::Explicit { width, height })
}

fn load_materials(path: &PathBuf) -> Result<Vec<MaterialCandidate>, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    serde_json::from_str(&raw).map_err(|e| format!("invalid materials JSON: {}", e))
}

fn load_products(path: &PathBuf) -> Result<HashMap<u32, String>, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let docs: HashMap<String, serde_json::Value> =
        serde_json::from_str(&raw).map_err(|e| format!("invalid products JSON: {}", e))?;
    let mut parsed = HashMap::new();
    for (key, doc) in docs {
        let id = key
            .parse::<u32>()
            .map_err(|_| format!("invalid product id '{}'", key))?;
        parsed.insert(id, doc.to_string());
    }
    Ok(parsed)
}

fn main() {
    let cli = Cli::parse();

    let trim = parse_trim(&cli.trim).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let sheet = parse_sheet(&cli.sheet).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let margins = MarginConfig::default();

    let Some(materials_path) = &cli.materials else {
        run_layout_only(trim, sheet, &margins, cli.layout);
        return;
    };

    let materials = load_materials(materials_path).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let mut store = InMemoryStore::new(materials);
    if let Some(products_path) = &cli.products {
        let products = load_products(products_path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        for (id, doc) in products {
            store.add_product_constraints(id, doc);
        }
    }

    let specs = ResolveSpecs {
        trim,
        quantity: cli.qty,
        sheet: Some(sheet),
        constraints: None,
    };
    let resolver = Resolver::new(&store, Some(&store), margins);
    let outcome = resolver
        .resolve(cli.product, &specs, cli.top)
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    for (i, c) in outcome.candidates.iter().enumerate() {
        let rot = if c.layout.rotated { " rotated" } else { "" };
        println!(
            "{}. {} - {} per sheet ({}x{}{}), {} sheet(s) for {} items, efficiency {:.2}",
            i + 1,
            c.material,
            c.layout.items_per_sheet,
            c.layout.cols,
            c.layout.rows,
            rot,
            c.sheets_needed,
            cli.qty,
            c.efficiency,
        );
    }

    if !outcome.excluded.is_empty() {
        println!("Excluded:");
        for e in &outcome.excluded {
            let reasons: Vec<String> = e.reasons.iter().map(|r| r.to_string()).collect();
            println!("  #{} {}: {}", e.material_id, e.material_name, reasons.join(", "));
        }
    }

    match &outcome.picked {
        Some(picked) => {
            println!(
                "Picked: {} at {:.2} per sheet",
                picked.material, picked.material.price_per_sheet
            );
            if cli.layout {
                print!(
                    "{}",
                    render::render_imposition(picked.printable, trim, &picked.layout, &margins)
                );
            }
        }
        None => println!("No compatible material found"),
    }
}

fn run_layout_only(trim: TrimSize, sheet: SheetSizeSpec, margins: &MarginConfig, show: bool) {
    let printable: PrintableArea = sheet.dimensions();
    let result = compute_items_per_sheet(trim, printable, margins).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if !result.fits {
        println!("{} does not fit on {}", trim, printable);
        return;
    }

    let rot = if result.rotated { " rotated" } else { "" };
    println!(
        "{} on {}: {} per sheet ({} cols x {} rows{})",
        trim, printable, result.items_per_sheet, result.cols, result.rows, rot,
    );
    if show {
        print!("{}", render::render_imposition(printable, trim, &result, margins));
    }
}
