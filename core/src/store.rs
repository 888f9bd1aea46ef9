//! Record file persistence and the in-memory record store.
//!
//! RULE: Only store.rs touches the record file.
//! Everything else works on slices handed out by RecordStore.

use crate::{
    config::HubConfig,
    error::{HubError, HubResult},
    generator::ClientGenerator,
    record::{ClientRecord, RECORD_COLUMNS},
};
use chrono::NaiveDateTime;
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

pub const EXPORT_PREFIX: &str = "exported_data_";
pub const REJECTED_SUFFIX: &str = ".bad";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    /// Read verbatim from the record file.
    File,
    /// Synthesized from the seed because no usable file existed.
    Generated,
}

/// The full record set. Immutable once loaded; clones share storage.
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Arc<[ClientRecord]>,
    source: RecordSource,
}

impl RecordStore {
    pub fn from_records(records: Vec<ClientRecord>, source: RecordSource) -> Self {
        Self {
            records: records.into(),
            source,
        }
    }

    /// Load the record file named by the config, or generate and persist
    /// a fresh population when the file is missing or malformed. A
    /// malformed file is moved aside with a `.bad` suffix first.
    pub fn load(config: &HubConfig) -> HubResult<Self> {
        let path = &config.data_file;
        if path.exists() {
            match read_records(path) {
                Ok(records) => {
                    log::info!("loaded {} clients from {}", records.len(), path.display());
                    return Ok(Self::from_records(records, RecordSource::File));
                }
                Err(e) => {
                    log::warn!("{e}; regenerating");
                    set_aside(path);
                }
            }
        }

        let records = ClientGenerator::new(config).generate()?;
        if let Err(e) = write_records(path, &records) {
            log::warn!("could not persist generated clients to {}: {e}", path.display());
        }
        Ok(Self::from_records(records, RecordSource::Generated))
    }

    pub fn records(&self) -> &[ClientRecord] {
        &self.records
    }

    pub fn shared(&self) -> Arc<[ClientRecord]> {
        Arc::clone(&self.records)
    }

    pub fn source(&self) -> RecordSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Path an unreadable record file is moved to before regeneration.
pub fn rejected_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(REJECTED_SUFFIX);
    PathBuf::from(name)
}

fn set_aside(path: &Path) {
    let target = rejected_path(path);
    match fs::rename(path, &target) {
        Ok(()) => log::warn!("kept unreadable record file as {}", target.display()),
        Err(e) => log::warn!("could not set aside {}: {e}", path.display()),
    }
}

/// Read a record file. Any deviation from the expected header, an
/// unparsable row, a duplicate/zero id, or income, balance or transaction
/// totals that do not fit in a u64 is a schema error.
pub fn read_records(path: &Path) -> HubResult<Vec<ClientRecord>> {
    let schema_error = |detail: String| HubError::Schema {
        path: path.display().to_string(),
        detail,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| schema_error(e.to_string()))?;

    let headers = reader.headers().map_err(|e| schema_error(e.to_string()))?;
    let found: Vec<&str> = headers.iter().collect();
    if found != RECORD_COLUMNS {
        return Err(schema_error(format!(
            "expected columns {:?}, found {:?}",
            RECORD_COLUMNS, found
        )));
    }

    let mut records = Vec::new();
    let mut seen = HashSet::new();
    // income, balance, transactions
    let mut totals = [0u64; 3];
    for (row, result) in reader.deserialize::<ClientRecord>().enumerate() {
        let record = result.map_err(|e| schema_error(format!("row {}: {e}", row + 1)))?;
        if record.id == 0 {
            return Err(schema_error(format!("row {}: id must be positive", row + 1)));
        }
        if !seen.insert(record.id) {
            return Err(schema_error(format!("row {}: duplicate id {}", row + 1, record.id)));
        }
        for (total, value) in totals
            .iter_mut()
            .zip([record.income, record.balance, record.transactions])
        {
            *total = total.checked_add(value).ok_or_else(|| {
                schema_error(format!("row {}: column totals overflow", row + 1))
            })?;
        }
        records.push(record);
    }
    Ok(records)
}

/// Write records with a header row. The file is written beside its final
/// location and renamed into place, so readers never see a partial file.
pub fn write_records(path: &Path, records: &[ClientRecord]) -> HubResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("csv.tmp");

    let written = (|| -> HubResult<()> {
        let mut writer = csv::Writer::from_path(&tmp_path)?;
        if records.is_empty() {
            writer.write_record(RECORD_COLUMNS)?;
        }
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    })();

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// `exported_data_<YYYYMMDD_HHMMSS>.csv`
pub fn export_file_name(at: NaiveDateTime) -> String {
    format!("{EXPORT_PREFIX}{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Export a subset to a timestamped file in `dir`. Returns the path written.
pub fn export_records(dir: &Path, records: &[ClientRecord], at: NaiveDateTime) -> HubResult<PathBuf> {
    let path = dir.join(export_file_name(at));
    write_records(&path, records).map_err(|e| HubError::Export {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;
    log::info!("exported {} clients to {}", records.len(), path.display());
    Ok(path)
}
