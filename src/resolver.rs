use std::cmp::Ordering;

use crate::error::Error;
use crate::layout::compute_items_per_sheet;
use crate::margins::MarginConfig;
use crate::store::{ConstraintSource, MaterialSource};
use crate::types::{
    ExclusionReason, ExclusionRecord, LayoutResult, MaterialCandidate, PrintableArea,
    ProductConstraints, RankedMaterial, ResolveOutcome, ResolveSpecs,
};

/// Floor for the per-sheet price when scoring, so a zero-priced material
/// ranks very high instead of dividing by zero.
pub const MIN_PRICE_PER_SHEET: f64 = 0.0001;

/// Default number of ranked candidates returned.
pub const DEFAULT_TOP_N: usize = 10;

/// Ranks in-stock materials against a product's trim size and constraints.
pub struct Resolver<'a> {
    materials: &'a dyn MaterialSource,
    constraints: Option<&'a dyn ConstraintSource>,
    margins: MarginConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(
        materials: &'a dyn MaterialSource,
        constraints: Option<&'a dyn ConstraintSource>,
        margins: MarginConfig,
    ) -> Self {
        Self {
            materials,
            constraints,
            margins,
        }
    }

    /// Evaluates every active in-stock material against the specs and
    /// returns the ranked candidates plus a full exclusion trail. Absence of
    /// materials or fit is an empty outcome, not an error.
    pub fn resolve(
        &self,
        product_id: Option<u32>,
        specs: &ResolveSpecs,
        top_n: usize,
    ) -> Result<ResolveOutcome, Error> {
        if !specs.trim.is_valid() {
            return Err(Error::InvalidTrim {
                width: specs.trim.width,
                height: specs.trim.height,
            });
        }

        let constraints = self.effective_constraints(product_id, specs);
        let nominal_sheet = match specs.sheet {
            Some(spec) => {
                let dims = spec.dimensions();
                if dims.width <= 0.0 || dims.height <= 0.0 {
                    return Err(Error::InvalidSheet {
                        width: dims.width,
                        height: dims.height,
                    });
                }
                Some(dims)
            }
            None => None,
        };

        let mut candidates: Vec<RankedMaterial> = Vec::new();
        let mut excluded: Vec<ExclusionRecord> = Vec::new();

        for material in self.materials.active_in_stock() {
            let mut reasons = constraint_failures(&material, constraints.as_ref());

            // Geometry is checked even for filtered-out materials so the
            // exclusion record carries every applicable reason.
            let printable = material
                .own_printable_area()
                .or(nominal_sheet)
                .or_else(|| material.raw_sheet_area());

            let fit = match printable {
                None => {
                    reasons.push(ExclusionReason::NoPrintableArea);
                    None
                }
                Some(area) => {
                    let layout = compute_items_per_sheet(specs.trim, area, &self.margins)?;
                    if !layout.fits {
                        reasons.push(ExclusionReason::DoesNotFit);
                    }
                    Some((layout, area))
                }
            };

            if reasons.is_empty() {
                // fit is always present here: an unresolved printable area
                // would have pushed a reason above.
                if let Some((layout, area)) = fit {
                    candidates.push(rank(material, layout, area, specs.quantity));
                }
            } else {
                excluded.push(ExclusionRecord {
                    material_id: material.id,
                    material_name: material.name.clone(),
                    reasons,
                });
            }
        }

        candidates.sort_by(|a, b| {
            b.efficiency
                .partial_cmp(&a.efficiency)
                .unwrap_or(Ordering::Equal)
                .then(a.sheets_needed.cmp(&b.sheets_needed))
        });
        candidates.truncate(top_n);

        Ok(ResolveOutcome {
            picked: candidates.first().cloned(),
            candidates,
            excluded,
        })
    }

    /// Explicit constraints win; otherwise the product's stored
    /// configuration is consulted. A failed load logs a warning and resolves
    /// unconstrained rather than failing the request.
    fn effective_constraints(
        &self,
        product_id: Option<u32>,
        specs: &ResolveSpecs,
    ) -> Option<ProductConstraints> {
        if specs.constraints.is_some() {
            return specs.constraints.clone();
        }
        let product_id = product_id?;
        let source = self.constraints?;
        match source.constraints_for(product_id) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(
                    product_id,
                    error = %e,
                    "failed to load product constraints, resolving unconstrained"
                );
                None
            }
        }
    }
}

/// All constraint violations for one material, in a fixed order, without
/// short-circuiting.
fn constraint_failures(
    material: &MaterialCandidate,
    constraints: Option<&ProductConstraints>,
) -> Vec<ExclusionReason> {
    let mut reasons = Vec::new();
    let Some(c) = constraints else {
        return reasons;
    };

    if c.overrides.exclude_ids.contains(&material.id) {
        reasons.push(ExclusionReason::ExcludedByOverride);
    }
    if !c.overrides.include_ids.is_empty() && !c.overrides.include_ids.contains(&material.id) {
        reasons.push(ExclusionReason::NotInIncludeList);
    }
    if !c.allowed_categories.is_empty() && !c.allowed_categories.contains(&material.category) {
        reasons.push(ExclusionReason::CategoryNotAllowed);
    }
    if let Some(range) = c.density_range {
        // A material with no recorded density cannot prove membership.
        let in_range = material.density.map(|d| range.contains(d)).unwrap_or(false);
        if !in_range {
            reasons.push(ExclusionReason::DensityOutOfRange);
        }
    }
    if !c.allowed_finishes.is_empty() {
        let allowed = material
            .finish
            .as_ref()
            .map(|f| c.allowed_finishes.contains(f))
            .unwrap_or(false);
        if !allowed {
            reasons.push(ExclusionReason::FinishNotAllowed);
        }
    }

    reasons
}

fn rank(
    material: MaterialCandidate,
    layout: LayoutResult,
    printable: PrintableArea,
    quantity: u32,
) -> RankedMaterial {
    let sheets_needed = quantity.div_ceil(layout.items_per_sheet).max(1);
    let efficiency =
        layout.items_per_sheet as f64 / material.price_per_sheet.max(MIN_PRICE_PER_SHEET);
    RankedMaterial {
        material,
        layout,
        printable,
        sheets_needed,
        efficiency,
    }
}
