use serde::{Deserialize, Deserializer, Serialize};

/// Finished (cut) dimensions of a printed product, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimSize {
    pub width: f64,
    pub height: f64,
}

impl TrimSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn rotated(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

impl std::fmt::Display for TrimSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Usable imprintable region of a sheet, in millimetres, after the
/// material's inherent non-printable border is excluded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrintableArea {
    pub width: f64,
    pub height: f64,
}

impl PrintableArea {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for PrintableArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Standard press sheet formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SheetPreset {
    #[serde(rename = "SRA3")]
    Sra3,
    #[serde(rename = "A3")]
    A3,
    #[serde(rename = "B3")]
    B3,
    #[serde(rename = "B2")]
    B2,
}

impl SheetPreset {
    pub fn dimensions(&self) -> PrintableArea {
        match self {
            SheetPreset::Sra3 => PrintableArea::new(320.0, 450.0),
            SheetPreset::A3 => PrintableArea::new(297.0, 420.0),
            SheetPreset::B3 => PrintableArea::new(353.0, 500.0),
            SheetPreset::B2 => PrintableArea::new(500.0, 707.0),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SRA3" => Some(SheetPreset::Sra3),
            "A3" => Some(SheetPreset::A3),
            "B3" => Some(SheetPreset::B3),
            "B2" => Some(SheetPreset::B2),
            _ => None,
        }
    }
}

/// Nominal sheet size: either a named preset or explicit dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetSizeSpec {
    Preset(SheetPreset),
    Explicit { width: f64, height: f64 },
}

impl SheetSizeSpec {
    pub fn dimensions(&self) -> PrintableArea {
        match *self {
            SheetSizeSpec::Preset(p) => p.dimensions(),
            SheetSizeSpec::Explicit { width, height } => PrintableArea::new(width, height),
        }
    }
}

/// One stock material row as supplied by the inventory store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialCandidate {
    pub id: u32,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub density: Option<f64>,
    #[serde(default)]
    pub finish: Option<String>,
    pub price_per_sheet: f64,
    #[serde(default)]
    pub printable_width: Option<f64>,
    #[serde(default)]
    pub printable_height: Option<f64>,
    #[serde(default)]
    pub sheet_width: Option<f64>,
    #[serde(default)]
    pub sheet_height: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_u32_from_number")]
    pub quantity_in_stock: u32,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl MaterialCandidate {
    /// Printable dims recorded on the material itself, when both are present.
    pub fn own_printable_area(&self) -> Option<PrintableArea> {
        match (self.printable_width, self.printable_height) {
            (Some(w), Some(h)) => Some(PrintableArea::new(w, h)),
            _ => None,
        }
    }

    /// Raw sheet dims, the last fallback when nothing better is known.
    pub fn raw_sheet_area(&self) -> Option<PrintableArea> {
        match (self.sheet_width, self.sheet_height) {
            (Some(w), Some(h)) => Some(PrintableArea::new(w, h)),
            _ => None,
        }
    }
}

impl std::fmt::Display for MaterialCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {} ({})", self.id, self.name, self.category)
    }
}

fn default_true() -> bool {
    true
}

/// Inclusive density bounds in g/m².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityRange {
    pub min: f64,
    pub max: f64,
}

impl DensityRange {
    pub fn contains(&self, density: f64) -> bool {
        density >= self.min && density <= self.max
    }
}

/// Manual include/exclude lists that trump the declarative filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overrides {
    #[serde(default)]
    pub include_ids: Vec<u32>,
    #[serde(default)]
    pub exclude_ids: Vec<u32>,
}

/// Material filters configured on a product. Empty lists mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductConstraints {
    #[serde(default)]
    pub allowed_categories: Vec<String>,
    #[serde(default)]
    pub density_range: Option<DensityRange>,
    #[serde(default)]
    pub allowed_finishes: Vec<String>,
    #[serde(default)]
    pub overrides: Overrides,
}

/// Why a material was rejected during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    ExcludedByOverride,
    NotInIncludeList,
    CategoryNotAllowed,
    DensityOutOfRange,
    FinishNotAllowed,
    NoPrintableArea,
    DoesNotFit,
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExclusionReason::ExcludedByOverride => "excluded_by_override",
            ExclusionReason::NotInIncludeList => "not_in_include_list",
            ExclusionReason::CategoryNotAllowed => "category_not_allowed",
            ExclusionReason::DensityOutOfRange => "density_out_of_range",
            ExclusionReason::FinishNotAllowed => "finish_not_allowed",
            ExclusionReason::NoPrintableArea => "no_printable_area",
            ExclusionReason::DoesNotFit => "does_not_fit",
        };
        f.write_str(s)
    }
}

/// Audit entry for a rejected material; diagnostics only, never fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionRecord {
    pub material_id: u32,
    pub material_name: String,
    pub reasons: Vec<ExclusionReason>,
}

/// Result of fitting one trim size onto one printable area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub items_per_sheet: u32,
    pub rows: u32,
    pub cols: u32,
    pub rotated: bool,
    pub fits: bool,
}

/// A material that passed every filter, with its layout and cost score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMaterial {
    pub material: MaterialCandidate,
    pub layout: LayoutResult,
    pub printable: PrintableArea,
    pub sheets_needed: u32,
    pub efficiency: f64,
}

/// Inputs for one resolution request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveSpecs {
    pub trim: TrimSize,
    #[serde(default, deserialize_with = "deserialize_u32_from_number")]
    pub quantity: u32,
    #[serde(default)]
    pub sheet: Option<SheetSizeSpec>,
    #[serde(default)]
    pub constraints: Option<ProductConstraints>,
}

/// Full resolution output: top pick, ranked candidates, exclusion trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveOutcome {
    pub picked: Option<RankedMaterial>,
    pub candidates: Vec<RankedMaterial>,
    pub excluded: Vec<ExclusionRecord>,
}

/// Accepts both integer and float JSON numbers for integer fields.
/// Browser clients routinely send 100.0 where 100 is meant.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = f64::deserialize(deserializer)?;
    if v < 0.0 || v.fract() != 0.0 || v > u32::MAX as f64 {
        return Err(serde::de::Error::custom(format!(
            "expected a non-negative integer, got {v}"
        )));
    }
    Ok(v as u32)
}
