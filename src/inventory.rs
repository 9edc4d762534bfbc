//! Inventory file: the list of monitors a run is about to transfer.
//!
//! A plain CSV with the header `id,name,createdBy`, written right after
//! listing and read back before fetching, so the list can be inspected (or
//! edited) between the two stages.

use std::path::Path;

use monitor_transfer_types::{MonitorSummary, N_A};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TransferError};

/// One row of the inventory file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub id: String,
    pub name: String,
    #[serde(rename = "createdBy")]
    pub created_by: String,
}

impl From<&MonitorSummary> for InventoryRow {
    fn from(summary: &MonitorSummary) -> Self {
        Self {
            id: summary.id_or_na().to_string(),
            name: summary.name_or_na().to_string(),
            created_by: summary.owner_or_na().to_string(),
        }
    }
}

/// Write `monitors` to `path`, replacing any existing file.
pub fn write_inventory(monitors: &[MonitorSummary], path: &Path) -> Result<()> {
    let inventory_err = |source: csv::Error| TransferError::Inventory {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(inventory_err)?;
    if monitors.is_empty() {
        writer
            .write_record(["id", "name", "createdBy"])
            .map_err(inventory_err)?;
    }
    for monitor in monitors {
        writer
            .serialize(InventoryRow::from(monitor))
            .map_err(inventory_err)?;
    }
    writer
        .flush()
        .map_err(|e| TransferError::fs(path, e))?;
    Ok(())
}

/// Read monitor ids back from the inventory, in file order.
///
/// Rows without a usable id are skipped.
pub fn read_inventory_ids(path: &Path) -> Result<Vec<String>> {
    let inventory_err = |source: csv::Error| TransferError::Inventory {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(inventory_err)?;
    let mut ids = Vec::new();
    for row in reader.deserialize::<InventoryRow>() {
        let row = row.map_err(inventory_err)?;
        if row.id.is_empty() || row.id == N_A {
            tracing::warn!(name = %row.name, "Skipping inventory row without a monitor id");
            continue;
        }
        ids.push(row.id);
    }
    Ok(ids)
}
