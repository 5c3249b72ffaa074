use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Triangulated icon outline as shipped in the bundled geometry description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconMesh {
    pub positions: Vec<[f32; 3]>,
    pub cells: Vec<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconAsset {
    pub id: String,
    pub mesh: IconMesh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Parse(String),
    Corrupt(String),
    AlreadyInstalled,
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Parse(msg) => write!(f, "icon geometry parse error: {msg}"),
            CatalogError::Corrupt(msg) => write!(f, "icon geometry corrupt: {msg}"),
            CatalogError::AlreadyInstalled => write!(f, "icon catalog already installed"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Read-only table of icon ids and their flattened vertex buffers.
///
/// Each buffer is the concatenation of `positions[i]` for every vertex index
/// `i` of every cell, in cell order, so three cells of three vertices yield
/// 27 floats. The table never changes after construction.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IconCatalog {
    geometry: BTreeMap<String, Vec<f32>>,
    ids: BTreeSet<String>,
    content_hash: String,
}

static GLOBAL: OnceCell<Arc<IconCatalog>> = OnceCell::new();

impl IconCatalog {
    pub fn from_assets(assets: &[IconAsset]) -> Result<Self, CatalogError> {
        let mut geometry: BTreeMap<String, Vec<f32>> = BTreeMap::new();
        for asset in assets {
            if geometry.contains_key(&asset.id) {
                return Err(CatalogError::Corrupt(format!(
                    "duplicate icon id {:?}",
                    asset.id
                )));
            }
            geometry.insert(asset.id.clone(), flatten_mesh(&asset.id, &asset.mesh)?);
        }
        let ids = geometry.keys().cloned().collect();
        Ok(Self {
            geometry,
            ids,
            content_hash: String::new(),
        })
    }

    /// Parse the bundled `[{id, mesh: {positions, cells}}]` document.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let assets: Vec<IconAsset> =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let mut catalog = Self::from_assets(&assets)?;
        catalog.content_hash = blake3::hash(json.as_bytes()).to_hex().to_string();
        Ok(catalog)
    }

    /// Install the process-wide catalog. Only the first call succeeds.
    pub fn install(catalog: IconCatalog) -> Result<Arc<IconCatalog>, CatalogError> {
        let shared = Arc::new(catalog);
        GLOBAL
            .set(shared.clone())
            .map_err(|_| CatalogError::AlreadyInstalled)?;
        info!(
            icons = shared.len(),
            hash = %shared.content_hash,
            "icon catalog installed"
        );
        Ok(shared)
    }

    pub fn global() -> Option<Arc<IconCatalog>> {
        GLOBAL.get().cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn geometry(&self, id: &str) -> Option<&[f32]> {
        self.geometry.get(id).map(Vec::as_slice)
    }

    pub fn ids(&self) -> &BTreeSet<String> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// blake3 hex digest of the source document; empty when built from assets.
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }
}

fn flatten_mesh(id: &str, mesh: &IconMesh) -> Result<Vec<f32>, CatalogError> {
    let vertex_count: usize = mesh.cells.iter().map(Vec::len).sum();
    let mut out: Vec<f32> = Vec::with_capacity(vertex_count * 3);
    for cell in &mesh.cells {
        for &vi in cell {
            let Some(p) = mesh.positions.get(vi as usize) else {
                return Err(CatalogError::Corrupt(format!(
                    "icon {id:?}: vertex index {vi} out of range ({} positions)",
                    mesh.positions.len()
                )));
            };
            out.extend_from_slice(p);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TWO_ICONS: &str = r#"[
        {"id": "pin", "mesh": {
            "positions": [[0, 0, 0], [1, 0, 0], [0, 1, 0], [1, 1, 0]],
            "cells": [[0, 1, 2], [1, 3, 2]]
        }},
        {"id": "star", "mesh": {"positions": [[0.5, 0.5, 0]], "cells": []}}
    ]"#;

    #[test]
    fn expands_cells_against_positions() {
        let catalog = IconCatalog::from_json_str(TWO_ICONS).unwrap();
        assert_eq!(
            catalog.geometry("pin").unwrap(),
            &[
                0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, //
                1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
            ][..]
        );
        assert_eq!(catalog.geometry("star").unwrap().len(), 0);
        assert_eq!(catalog.geometry("missing"), None);
    }

    #[test]
    fn valid_ids_match_geometry_keys() {
        let catalog = IconCatalog::from_json_str(TWO_ICONS).unwrap();
        let ids: Vec<&str> = catalog.ids().iter().map(String::as_str).collect();
        assert_eq!(ids, vec!["pin", "star"]);
        assert!(catalog.contains("pin"));
        assert!(!catalog.contains("unknown-icon"));
        assert_eq!(catalog.content_hash().len(), 64);
    }

    #[test]
    fn rejects_out_of_range_vertex() {
        let json = r#"[{"id": "bad", "mesh": {"positions": [[0,0,0]], "cells": [[0, 3, 0]]}}]"#;
        let err = IconCatalog::from_json_str(json).unwrap_err();
        assert!(matches!(err, CatalogError::Corrupt(_)));
    }

    #[test]
    fn rejects_duplicate_ids_and_bad_json() {
        let json = r#"[
            {"id": "a", "mesh": {"positions": [], "cells": []}},
            {"id": "a", "mesh": {"positions": [], "cells": []}}
        ]"#;
        assert!(matches!(
            IconCatalog::from_json_str(json),
            Err(CatalogError::Corrupt(_))
        ));
        assert!(matches!(
            IconCatalog::from_json_str("{not json"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn installs_once() {
        let first = IconCatalog::install(IconCatalog::from_json_str(TWO_ICONS).unwrap()).unwrap();
        let second = IconCatalog::install(IconCatalog::default());
        assert_eq!(second.unwrap_err(), CatalogError::AlreadyInstalled);
        let global = IconCatalog::global().unwrap();
        assert!(Arc::ptr_eq(&first, &global));
    }
}
