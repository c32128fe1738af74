use crate::error::Error;
use crate::margins::MarginConfig;
use crate::types::{LayoutResult, PrintableArea, TrimSize};

/// Item-count loss we accept when swapping to the rotated layout.
const ROTATION_BIAS_MAX_LOSS: u32 = 4;

/// Below this leftover (mm) a layout counts as tight against the sheet edge.
const TIGHT_LEFTOVER_MM: f64 = 15.0;

/// Tolerance for footprint-vs-available comparisons, so an exact fit is not
/// rejected over float noise.
const GEOM_EPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
struct Variant {
    cols: u32,
    rows: u32,
    items: u32,
    leftover_w: f64,
    leftover_h: f64,
}

impl Variant {
    fn zero() -> Self {
        Self {
            cols: 0,
            rows: 0,
            items: 0,
            leftover_w: 0.0,
            leftover_h: 0.0,
        }
    }

    fn min_leftover(&self) -> f64 {
        f64::min(self.leftover_w, self.leftover_h)
    }
}

/// Maximum count of identical items fitting on the printable area, trying
/// both orientations. Non-fitting geometry yields 0 items; only a
/// non-positive trim size is an error.
pub fn compute_items_per_sheet(
    trim: TrimSize,
    printable: PrintableArea,
    margins: &MarginConfig,
) -> Result<LayoutResult, Error> {
    if !trim.is_valid() {
        return Err(Error::InvalidTrim {
            width: trim.width,
            height: trim.height,
        });
    }

    // Gripper exclusion applies to width only.
    let avail_w = printable.width - margins.gripper;
    let avail_h = printable.height;

    let unrotated = evaluate_orientation(trim.width, trim.height, avail_w, avail_h, margins);
    let rotated = evaluate_orientation(trim.height, trim.width, avail_w, avail_h, margins);

    let use_rotated = if unrotated.items > rotated.items {
        // A slightly smaller rotated layout is preferred when the larger one
        // sits tight against the sheet edge; press tolerance eats tight fits.
        let loss = unrotated.items - rotated.items;
        rotated.items > 0
            && loss <= ROTATION_BIAS_MAX_LOSS
            && unrotated.min_leftover() < TIGHT_LEFTOVER_MM
    } else {
        rotated.items > unrotated.items
    };

    let chosen = if use_rotated { rotated } else { unrotated };
    Ok(LayoutResult {
        items_per_sheet: chosen.items,
        rows: chosen.rows,
        cols: chosen.cols,
        rotated: use_rotated,
        fits: chosen.items > 0,
    })
}

/// Grid fit for one orientation: naive floor division, then shrink columns
/// and rows until the footprint with bleed and safety stays inside the
/// available area.
fn evaluate_orientation(
    item_w: f64,
    item_h: f64,
    avail_w: f64,
    avail_h: f64,
    margins: &MarginConfig,
) -> Variant {
    let step_w = item_w + margins.gap;
    let step_h = item_h + margins.gap;

    if step_w > avail_w || step_h > avail_h {
        return Variant::zero();
    }

    let mut cols = (avail_w / step_w).floor() as u32;
    let mut rows = (avail_h / step_h).floor() as u32;

    while cols > 0 && footprint(cols, step_w, margins) > avail_w + GEOM_EPS {
        cols -= 1;
    }
    while rows > 0 && footprint(rows, step_h, margins) > avail_h + GEOM_EPS {
        rows -= 1;
    }

    if cols == 0 || rows == 0 {
        return Variant::zero();
    }

    Variant {
        cols,
        rows,
        items: cols.saturating_mul(rows),
        leftover_w: avail_w - footprint(cols, step_w, margins),
        leftover_h: avail_h - footprint(rows, step_h, margins),
    }
}

/// Outer extent of `n` grid steps: the trailing gap is dropped, bleed sits
/// on both outer edges, safety pads the whole block.
fn footprint(n: u32, step: f64, margins: &MarginConfig) -> f64 {
    n as f64 * step - margins.gap + 2.0 * margins.bleed + margins.safety
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compute(trim: TrimSize, printable: PrintableArea) -> LayoutResult {
        compute_items_per_sheet(trim, printable, &MarginConfig::default()).unwrap()
    }

    /// 50x90 card on an SRA3 sheet. Available width 320 - 5 = 315.
    /// Unrotated: floor(315/52) = 6 cols, floor(450/92) = 4 rows = 24.
    /// Rotated: floor(315/92) = 3 cols, floor(450/52) = 8 rows = 24.
    #[test]
    fn test_business_card_on_sra3() {
        let result = compute(TrimSize::new(50.0, 90.0), PrintableArea::new(320.0, 450.0));
        assert_eq!(result.items_per_sheet, 24);
        assert_eq!(result.cols, 6);
        assert_eq!(result.rows, 4);
        assert!(!result.rotated);
        assert!(result.fits);
    }

    #[test]
    fn test_too_large_in_both_orientations() {
        let result = compute(TrimSize::new(400.0, 500.0), PrintableArea::new(320.0, 450.0));
        assert_eq!(result.items_per_sheet, 0);
        assert!(!result.fits);
    }

    #[test]
    fn test_fits_only_rotated() {
        // 315 wide does not fit across 315 once the gap is added.
        let result = compute(TrimSize::new(315.0, 100.0), PrintableArea::new(320.0, 450.0));
        assert!(result.fits);
        assert!(result.rotated);
    }

    /// The naive grid puts 4 rows of 110mm items in 450mm, but the footprint
    /// 4*112 - 2 + 4 + 1 = 451 overflows, so one row is dropped.
    #[test]
    fn test_safety_footprint_shrinks_rows() {
        let result = compute(TrimSize::new(30.0, 110.0), PrintableArea::new(320.0, 450.0));
        assert!(!result.rotated);
        assert_eq!(result.cols, 9);
        assert_eq!(result.rows, 3);
        assert_eq!(result.items_per_sheet, 27);
    }

    /// Unrotated wins 27 to 24 but sits 11mm from the edge, within the
    /// rotation bias window, so the calmer rotated layout is chosen.
    #[test]
    fn test_tight_layout_prefers_rotated() {
        let result = compute(TrimSize::new(100.0, 45.0), PrintableArea::new(325.0, 450.0));
        assert!(result.rotated);
        assert_eq!(result.items_per_sheet, 24);
        assert_eq!(result.cols, 6);
        assert_eq!(result.rows, 4);
    }

    /// Same count difference as above, but the unrotated layout has ample
    /// leftover in both dimensions, so it keeps its higher count.
    #[test]
    fn test_spacious_layout_keeps_unrotated() {
        let result = compute(TrimSize::new(90.0, 65.0), PrintableArea::new(320.0, 450.0));
        assert!(!result.rotated);
        assert_eq!(result.items_per_sheet, 18);
    }

    /// A zero-item rotated variant must never be preferred, however tight
    /// the unrotated fit is.
    #[test]
    fn test_never_swaps_to_zero_items() {
        let result = compute(TrimSize::new(300.0, 440.0), PrintableArea::new(320.0, 450.0));
        assert!(!result.rotated);
        assert_eq!(result.items_per_sheet, 1);
    }

    #[test]
    fn test_gripper_applies_to_width_only() {
        // 318 needs 320 across the width, which the gripper shrinks to 315,
        // so only the rotated orientation survives.
        let narrow = compute(TrimSize::new(318.0, 100.0), PrintableArea::new(325.0, 450.0));
        assert!(narrow.fits);
        assert!(narrow.rotated);

        // A 440mm extent along the height is unaffected by the gripper.
        let tall = compute(TrimSize::new(100.0, 440.0), PrintableArea::new(320.0, 450.0));
        assert!(tall.fits);
        assert!(!tall.rotated);
    }

    #[test]
    fn test_exact_footprint_fit_is_accepted() {
        // Unrotated footprint is 26*12 - 2 + 4 + 1 = 315, exactly the
        // available width. Strict overflow check must let it through.
        let result = compute(TrimSize::new(10.0, 450.0), PrintableArea::new(320.0, 460.0));
        assert_eq!(result.cols, 26);
        assert_eq!(result.items_per_sheet, 26);
    }

    #[test]
    fn test_deterministic() {
        let trim = TrimSize::new(85.0, 55.0);
        let printable = PrintableArea::new(353.0, 500.0);
        let a = compute(trim, printable);
        let b = compute(trim, printable);
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_trim_is_an_error() {
        let err = compute_items_per_sheet(
            TrimSize::new(0.0, 90.0),
            PrintableArea::new(320.0, 450.0),
            &MarginConfig::default(),
        );
        assert!(matches!(err, Err(Error::InvalidTrim { .. })));

        let err = compute_items_per_sheet(
            TrimSize::new(50.0, -1.0),
            PrintableArea::new(320.0, 450.0),
            &MarginConfig::default(),
        );
        assert!(matches!(err, Err(Error::InvalidTrim { .. })));
    }

    #[test]
    fn test_nonpositive_printable_yields_zero() {
        let result = compute(TrimSize::new(50.0, 90.0), PrintableArea::new(0.0, 450.0));
        assert_eq!(result.items_per_sheet, 0);
        assert!(!result.fits);
    }

    #[test]
    fn test_wider_gripper_costs_capacity() {
        let trim = TrimSize::new(50.0, 90.0);
        let printable = PrintableArea::new(320.0, 450.0);
        let wide = MarginConfig {
            gripper: 50.0,
            ..MarginConfig::default()
        };
        let base = compute_items_per_sheet(trim, printable, &MarginConfig::default()).unwrap();
        let gripped = compute_items_per_sheet(trim, printable, &wide).unwrap();
        assert_eq!(base.items_per_sheet, 24);
        assert!(gripped.items_per_sheet < base.items_per_sheet);
    }
}
