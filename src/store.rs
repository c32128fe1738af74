use std::collections::HashMap;

use serde::Deserialize;

use crate::error::Error;
use crate::types::{DensityRange, MaterialCandidate, Overrides, ProductConstraints};

/// Inventory read side. Implementations return a point-in-time snapshot;
/// nothing here guards against concurrent stock changes.
pub trait MaterialSource {
    fn active_in_stock(&self) -> Vec<MaterialCandidate>;
}

/// Product configuration read side.
pub trait ConstraintSource {
    fn constraints_for(&self, product_id: u32) -> Result<Option<ProductConstraints>, Error>;
}

/// Constraint document as persisted by the surrounding application:
/// `materials.allowed_categories`, `materials.density.{min,max}`,
/// `materials.finishes` and `overrides.{include_ids,exclude_ids}`.
#[derive(Debug, Default, Deserialize)]
struct ConstraintsDoc {
    #[serde(default)]
    materials: MaterialsDoc,
    #[serde(default)]
    overrides: Overrides,
}

#[derive(Debug, Default, Deserialize)]
struct MaterialsDoc {
    #[serde(default)]
    allowed_categories: Vec<String>,
    #[serde(default)]
    density: Option<DensityRange>,
    #[serde(default)]
    finishes: Vec<String>,
}

impl From<ConstraintsDoc> for ProductConstraints {
    fn from(doc: ConstraintsDoc) -> Self {
        ProductConstraints {
            allowed_categories: doc.materials.allowed_categories,
            density_range: doc.materials.density,
            allowed_finishes: doc.materials.finishes,
            overrides: doc.overrides,
        }
    }
}

/// Parses a raw constraint document into the resolver's filter set.
pub fn parse_constraints(raw: &str) -> Result<ProductConstraints, serde_json::Error> {
    let doc: ConstraintsDoc = serde_json::from_str(raw)?;
    Ok(doc.into())
}

/// Materials and product configuration held in memory, loaded from the JSON
/// snapshots the surrounding application exports. Product constraint
/// documents are kept raw and parsed on lookup, like the text column they
/// come from.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    materials: Vec<MaterialCandidate>,
    product_constraints: HashMap<u32, String>,
}

impl InMemoryStore {
    pub fn new(materials: Vec<MaterialCandidate>) -> Self {
        Self {
            materials,
            product_constraints: HashMap::new(),
        }
    }

    pub fn add_product_constraints(&mut self, product_id: u32, raw_doc: String) {
        self.product_constraints.insert(product_id, raw_doc);
    }
}

impl MaterialSource for InMemoryStore {
    fn active_in_stock(&self) -> Vec<MaterialCandidate> {
        self.materials
            .iter()
            .filter(|m| m.active && m.quantity_in_stock > 0)
            .cloned()
            .collect()
    }
}

impl ConstraintSource for InMemoryStore {
    fn constraints_for(&self, product_id: u32) -> Result<Option<ProductConstraints>, Error> {
        match self.product_constraints.get(&product_id) {
            None => Ok(None),
            Some(raw) => parse_constraints(raw)
                .map(Some)
                .map_err(|e| Error::ConstraintLoad {
                    product_id,
                    message: e.to_string(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(id: u32, qty: u32, active: bool) -> MaterialCandidate {
        MaterialCandidate {
            id,
            name: format!("m{id}"),
            category: "coated".to_string(),
            density: Some(300.0),
            finish: None,
            price_per_sheet: 1.0,
            printable_width: None,
            printable_height: None,
            sheet_width: None,
            sheet_height: None,
            quantity_in_stock: qty,
            active,
        }
    }

    #[test]
    fn test_snapshot_filters_inactive_and_out_of_stock() {
        let store = InMemoryStore::new(vec![
            material(1, 10, true),
            material(2, 0, true),
            material(3, 10, false),
        ]);
        let snapshot = store.active_in_stock();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, 1);
    }

    #[test]
    fn test_parse_full_constraint_doc() {
        let c = parse_constraints(
            r#"{
                "materials": {
                    "allowed_categories": ["coated", "uncoated"],
                    "density": {"min": 90, "max": 300},
                    "finishes": ["gloss"]
                },
                "overrides": {"include_ids": [5], "exclude_ids": [7]}
            }"#,
        )
        .unwrap();
        assert_eq!(c.allowed_categories, vec!["coated", "uncoated"]);
        assert_eq!(c.density_range, Some(DensityRange { min: 90.0, max: 300.0 }));
        assert_eq!(c.allowed_finishes, vec!["gloss"]);
        assert_eq!(c.overrides.include_ids, vec![5]);
        assert_eq!(c.overrides.exclude_ids, vec![7]);
    }

    #[test]
    fn test_parse_empty_doc_means_no_filters() {
        let c = parse_constraints("{}").unwrap();
        assert!(c.allowed_categories.is_empty());
        assert!(c.density_range.is_none());
        assert!(c.allowed_finishes.is_empty());
        assert!(c.overrides.include_ids.is_empty());
    }

    #[test]
    fn test_malformed_doc_is_a_load_error() {
        let mut store = InMemoryStore::new(vec![]);
        store.add_product_constraints(12, "{not json".to_string());
        let err = store.constraints_for(12);
        assert!(matches!(err, Err(Error::ConstraintLoad { product_id: 12, .. })));
    }

    #[test]
    fn test_unknown_product_has_no_constraints() {
        let store = InMemoryStore::new(vec![]);
        assert!(store.constraints_for(99).unwrap().is_none());
    }
}
