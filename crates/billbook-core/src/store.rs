//! JSON file-backed bill store
//!
//! The store owns one document on disk. Every operation reads the latest
//! document before acting and every mutation writes the whole document back
//! before returning. There is no in-memory cache and no locking: concurrent
//! writers race and the last write wins.
//!
//! Writes go to a temporary file in the same directory which is then renamed
//! over the target, so readers never observe a partially written document.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{Bill, BillWithStatus, BillsDocument, MonthlySummary};
use crate::month::MonthKey;
use crate::summary::{decorate, summarize};

/// Handle to the bills document on disk
#[derive(Debug, Clone)]
pub struct BillStore {
    path: PathBuf,
}

impl BillStore {
    /// Open a store backed by `path`
    ///
    /// Creates missing parent directories. The file itself is created on the
    /// first write; until then the store reads as empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let dir = parent_dir(&path);
        if !dir.exists() {
            fs::create_dir_all(dir)?;
            info!("Created data directory: {}", dir.display());
        }

        Ok(Self { path })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write an empty document if the file does not exist yet
    ///
    /// Returns `true` if a new file was created.
    pub fn init(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        self.save(&BillsDocument::default())?;
        info!("Initialized bills file: {}", self.path.display());
        Ok(true)
    }

    /// The full persisted document
    pub fn document(&self) -> Result<BillsDocument> {
        self.load()
    }

    /// All bills, in insertion order
    pub fn list_bills(&self) -> Result<Vec<Bill>> {
        Ok(self.load()?.bills)
    }

    /// All bills decorated with due date and paid flag for `month`
    pub fn list_bills_with_status(&self, month: &MonthKey) -> Result<Vec<BillWithStatus>> {
        let doc = self.load()?;
        let decorated = doc
            .bills
            .iter()
            .map(|bill| {
                let is_paid = doc.is_paid(month, &bill.id);
                decorate(bill.clone(), month, is_paid)
            })
            .collect();
        Ok(decorated)
    }

    pub fn get_bill(&self, id: &str) -> Result<Option<Bill>> {
        Ok(self.load()?.bills.into_iter().find(|b| b.id == id))
    }

    /// Like [`get_bill`](Self::get_bill), but a missing bill is [`Error::NotFound`]
    pub fn require_bill(&self, id: &str) -> Result<Bill> {
        self.get_bill(id)?
            .ok_or_else(|| Error::NotFound(format!("Bill not found: {}", id)))
    }

    /// Insert a bill, or overwrite the bill with the same id
    pub fn upsert_bill(&self, bill: Bill) -> Result<Bill> {
        let mut doc = self.load()?;

        match doc.bills.iter_mut().find(|b| b.id == bill.id) {
            Some(existing) => {
                *existing = bill.clone();
                info!(id = %bill.id, name = %bill.name, "Updated bill");
            }
            None => {
                doc.bills.push(bill.clone());
                info!(id = %bill.id, name = %bill.name, "Created bill");
            }
        }

        self.save(&doc)?;
        Ok(bill)
    }

    /// Remove a bill and its paid flags in every month
    ///
    /// Returns whether a bill record was removed. Calling it for an unknown
    /// id is a no-op apart from purging any stray paid flags.
    pub fn delete_bill(&self, id: &str) -> Result<bool> {
        let mut doc = self.load()?;

        let before = doc.bills.len();
        doc.bills.retain(|b| b.id != id);
        let removed = doc.bills.len() != before;

        for status in doc.paid_status.values_mut() {
            status.remove(id);
        }
        doc.paid_status.retain(|_, status| !status.is_empty());

        self.save(&doc)?;
        if removed {
            info!(id = %id, "Deleted bill");
        }
        Ok(removed)
    }

    /// Mark or unmark a bill as paid for `month`, returning the resulting flag
    pub fn set_paid_status(&self, month: &MonthKey, id: &str, is_paid: bool) -> Result<bool> {
        let mut doc = self.load()?;
        let key = month.to_string();

        if is_paid {
            doc.paid_status
                .entry(key)
                .or_default()
                .insert(id.to_string(), true);
        } else if let Some(status) = doc.paid_status.get_mut(&key) {
            status.remove(id);
            if status.is_empty() {
                doc.paid_status.remove(&key);
            }
        }

        self.save(&doc)?;
        let result = doc.is_paid(month, id);
        info!(id = %id, month = %month, is_paid = result, "Set paid status");
        Ok(result)
    }

    /// Decorated bills plus totals for `month`
    pub fn get_monthly_summary(&self, month: &MonthKey) -> Result<MonthlySummary> {
        let bills = self.list_bills_with_status(month)?;
        Ok(summarize(*month, bills))
    }

    fn load(&self) -> Result<BillsDocument> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Bills file {} not found, using empty document", self.path.display());
                return Ok(BillsDocument::default());
            }
            Err(e) => return Err(e.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BillsDocument::default());
        }

        let doc: BillsDocument = serde_json::from_slice(&bytes)?;
        debug!(
            bills = doc.bills.len(),
            months = doc.paid_status.len(),
            "Loaded bills document"
        );
        Ok(doc)
    }

    fn save(&self, doc: &BillsDocument) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(parent_dir(&self.path))?;
        serde_json::to_writer_pretty(&mut tmp, doc)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
