//! Catalog - the three index instantiations wired together.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           Catalog                            │
//! │  medications: BTree<MedicationId, MedicationRef>   primary   │
//! │  names:       MultiIndex<String, MedicationRef>    secondary │
//! │  expiries:    MultiIndex<String, MedicationRef>    secondary │
//! │  suppliers:   BTree<SupplierId, SupplierRef>       primary   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each index owns its own nodes; they only share the reference values,
//! which are plain copies. Record storage stays with the caller, which
//! describes each medication through [`MedicationKeys`] and passes the
//! catalog explicitly to whatever needs it.
//!
//! Medication mutations touch several trees. The catalog sequences them and
//! undoes the trees it already changed when a later step fails, so the
//! indexes never disagree about which medications exist.

use tracing::{debug, warn};

use crate::common::{DuplicatePolicy, Result, TreeConfig};
use crate::index::btree::{BTree, InvariantViolation};
use crate::index::MultiIndex;

use super::ids::{MedicationId, MedicationRef, SupplierId, SupplierRef};

/// The keys a medication record is indexed under.
///
/// Implemented by the caller's record type; the catalog reads keys through
/// it and never holds on to the record.
pub trait MedicationKeys {
    /// Unique medication identifier.
    fn med_id(&self) -> MedicationId;

    /// Medication name.
    fn name(&self) -> &str;

    /// Expiry date of every batch, one item per batch, as sortable
    /// `YYYY-MM-DD` strings.
    fn expiry_dates(&self) -> impl Iterator<Item = &str>;
}

/// Primary and secondary indexes over medications and suppliers.
///
/// # Example
/// ```
/// use medindex::catalog::{Catalog, MedicationId, MedicationKeys, MedicationRef};
///
/// struct Med {
///     id: u32,
///     name: String,
///     expiries: Vec<String>,
/// }
///
/// impl MedicationKeys for Med {
///     fn med_id(&self) -> MedicationId {
///         MedicationId::new(self.id)
///     }
///     fn name(&self) -> &str {
///         &self.name
///     }
///     fn expiry_dates(&self) -> impl Iterator<Item = &str> {
///         self.expiries.iter().map(String::as_str)
///     }
/// }
///
/// let records = vec![Med { id: 101, name: "Aspirin".into(), expiries: vec!["2026-01-31".into()] }];
///
/// let mut catalog = Catalog::with_defaults().unwrap();
/// catalog.index_medication(&records[0], MedicationRef::new(0)).unwrap();
///
/// let slot = catalog.medication(MedicationId::new(101)).unwrap();
/// assert_eq!(records[slot.0].name, "Aspirin");
/// assert_eq!(catalog.medications_named("Aspirin"), &[MedicationRef::new(0)]);
/// ```
pub struct Catalog {
    medications: BTree<MedicationId, MedicationRef>,
    names: MultiIndex<String, MedicationRef>,
    expiries: MultiIndex<String, MedicationRef>,
    suppliers: BTree<SupplierId, SupplierRef>,
}

impl Catalog {
    /// Build all four indexes from one configuration.
    ///
    /// Primary indexes always reject duplicate identifiers.
    ///
    /// # Errors
    /// - `Error::InvalidConfiguration` if `config` fails validation
    pub fn new(config: TreeConfig) -> Result<Self> {
        let primary = config.duplicates(DuplicatePolicy::Reject);
        Ok(Self {
            medications: BTree::new(primary)?,
            names: MultiIndex::new(config)?,
            expiries: MultiIndex::new(config)?,
            suppliers: BTree::new(primary)?,
        })
    }

    /// Build a catalog of order-4 indexes.
    ///
    /// # Errors
    /// - `Error::AllocationFailure` if the roots cannot be allocated
    pub fn with_defaults() -> Result<Self> {
        Self::new(TreeConfig::default())
    }

    // ========================================================================
    // Medications
    // ========================================================================

    /// Index a medication under its id, its name, and each batch expiry.
    ///
    /// # Errors
    /// - `Error::DuplicateKey` if the id is already indexed
    /// - `Error::AllocationFailure` if any index cannot grow; every index
    ///   touched so far is rolled back
    pub fn index_medication<M>(&mut self, record: &M, handle: MedicationRef) -> Result<()>
    where
        M: MedicationKeys + ?Sized,
    {
        let id = record.med_id();
        self.medications.insert(id, handle)?;

        if let Err(err) = self.names.insert(record.name().to_string(), handle) {
            warn!(%id, error = %err, "name index failed, rolling back medication");
            self.medications.delete(&id)?;
            return Err(err);
        }

        let mut filed: Vec<&str> = Vec::new();
        for date in record.expiry_dates() {
            if let Err(err) = self.expiries.insert(date.to_string(), handle) {
                warn!(%id, date, error = %err, "expiry index failed, rolling back medication");
                for done in filed {
                    self.expiries.remove(done, &handle)?;
                }
                self.names.remove(record.name(), &handle)?;
                self.medications.delete(&id)?;
                return Err(err);
            }
            filed.push(date);
        }

        debug!(%id, %handle, batches = filed.len(), "indexed medication");
        Ok(())
    }

    /// Drop a medication from every index, returning its reference.
    ///
    /// Secondary entries that are already missing (the record's keys changed
    /// behind the catalog's back) are logged and skipped.
    ///
    /// # Errors
    /// - `Error::NotFound` if the id is not indexed
    pub fn unindex_medication<M>(&mut self, record: &M) -> Result<MedicationRef>
    where
        M: MedicationKeys + ?Sized,
    {
        let id = record.med_id();
        let handle = self.medications.delete(&id)?;

        if let Err(err) = self.names.remove(record.name(), &handle) {
            warn!(%id, name = record.name(), error = %err, "name entry missing");
        }
        for date in record.expiry_dates() {
            if let Err(err) = self.expiries.remove(date, &handle) {
                warn!(%id, date, error = %err, "expiry entry missing");
            }
        }

        debug!(%id, %handle, "unindexed medication");
        Ok(handle)
    }

    /// File one more batch expiry for an indexed medication.
    ///
    /// # Errors
    /// - `Error::NotFound` if the medication is not indexed
    /// - `Error::AllocationFailure` if the expiry index cannot grow
    pub fn index_batch_expiry(&mut self, id: MedicationId, date: &str) -> Result<()> {
        let handle = *self.medications.search(&id)?;
        self.expiries.insert(date.to_string(), handle)?;
        debug!(%id, date, "indexed batch expiry");
        Ok(())
    }

    /// Withdraw one batch expiry of an indexed medication.
    ///
    /// # Errors
    /// - `Error::NotFound` if the medication is not indexed or has no batch
    ///   filed under `date`
    pub fn unindex_batch_expiry(&mut self, id: MedicationId, date: &str) -> Result<()> {
        let handle = *self.medications.search(&id)?;
        self.expiries.remove(date, &handle)?;
        debug!(%id, date, "unindexed batch expiry");
        Ok(())
    }

    /// Reference of the medication with `id`.
    ///
    /// # Errors
    /// - `Error::NotFound` if the id is not indexed
    pub fn medication(&self, id: MedicationId) -> Result<MedicationRef> {
        self.medications.search(&id).copied()
    }

    /// Medications filed under `name`.
    pub fn medications_named(&self, name: &str) -> &[MedicationRef] {
        self.names.get(name)
    }

    /// Medications with a batch expiring on `date`, once per batch.
    pub fn medications_expiring_on(&self, date: &str) -> &[MedicationRef] {
        self.expiries.get(date)
    }

    /// Number of indexed medications.
    pub fn medication_count(&self) -> usize {
        self.medications.len()
    }

    // ========================================================================
    // Suppliers
    // ========================================================================

    /// Index a supplier under its id.
    ///
    /// # Errors
    /// - `Error::DuplicateKey` if the id is already indexed
    /// - `Error::AllocationFailure` if the supplier index cannot grow
    pub fn index_supplier(&mut self, id: SupplierId, handle: SupplierRef) -> Result<()> {
        self.suppliers.insert(id, handle)?;
        debug!(%id, %handle, "indexed supplier");
        Ok(())
    }

    /// Drop a supplier, returning its reference.
    ///
    /// # Errors
    /// - `Error::NotFound` if the id is not indexed
    pub fn unindex_supplier(&mut self, id: SupplierId) -> Result<SupplierRef> {
        let handle = self.suppliers.delete(&id)?;
        debug!(%id, %handle, "unindexed supplier");
        Ok(handle)
    }

    /// Reference of the supplier with `id`.
    ///
    /// # Errors
    /// - `Error::NotFound` if the id is not indexed
    pub fn supplier(&self, id: SupplierId) -> Result<SupplierRef> {
        self.suppliers.search(&id).copied()
    }

    /// Number of indexed suppliers.
    pub fn supplier_count(&self) -> usize {
        self.suppliers.len()
    }

    // ========================================================================
    // Scans
    // ========================================================================

    /// All medications in id order.
    pub fn medications(&self) -> impl Iterator<Item = (MedicationId, MedicationRef)> + '_ {
        self.medications.traverse().map(|(id, handle)| (*id, *handle))
    }

    /// All suppliers in id order.
    pub fn suppliers(&self) -> impl Iterator<Item = (SupplierId, SupplierRef)> + '_ {
        self.suppliers.traverse().map(|(id, handle)| (*id, *handle))
    }

    /// Every filed batch expiry in date order.
    pub fn expiries(&self) -> impl Iterator<Item = (&str, MedicationRef)> + '_ {
        self.expiries
            .traverse()
            .map(|(date, handle)| (date.as_str(), *handle))
    }

    /// Batch expiries strictly before `date`.
    pub fn expiring_before<'a>(
        &'a self,
        date: &'a str,
    ) -> impl Iterator<Item = (&'a str, MedicationRef)> + 'a {
        self.expiries().take_while(move |(d, _)| *d < date)
    }

    /// Batch expiries in `from..=to`.
    pub fn expiring_between<'a>(
        &'a self,
        from: &'a str,
        to: &'a str,
    ) -> impl Iterator<Item = (&'a str, MedicationRef)> + 'a {
        self.expiries()
            .skip_while(move |(d, _)| *d < from)
            .take_while(move |(d, _)| *d <= to)
    }

    // ========================================================================
    // Index access
    // ========================================================================

    /// The medication primary index.
    pub fn medication_index(&self) -> &BTree<MedicationId, MedicationRef> {
        &self.medications
    }

    /// The medication name index.
    pub fn name_index(&self) -> &MultiIndex<String, MedicationRef> {
        &self.names
    }

    /// The batch expiry index.
    pub fn expiry_index(&self) -> &MultiIndex<String, MedicationRef> {
        &self.expiries
    }

    /// The supplier primary index.
    pub fn supplier_index(&self) -> &BTree<SupplierId, SupplierRef> {
        &self.suppliers
    }

    /// Check the structural invariants of all four trees.
    ///
    /// # Errors
    /// Returns the first [`InvariantViolation`] found.
    pub fn check_invariants(&self) -> std::result::Result<(), InvariantViolation> {
        self.medications.check_invariants()?;
        self.names.tree().check_invariants()?;
        self.expiries.tree().check_invariants()?;
        self.suppliers.check_invariants()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;

    struct Med {
        id: u32,
        name: String,
        expiries: Vec<String>,
    }

    impl MedicationKeys for Med {
        fn med_id(&self) -> MedicationId {
            MedicationId::new(self.id)
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn expiry_dates(&self) -> impl Iterator<Item = &str> {
            self.expiries.iter().map(String::as_str)
        }
    }

    fn med(id: u32, name: &str, expiries: &[&str]) -> Med {
        Med {
            id,
            name: name.to_string(),
            expiries: expiries.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn test_index_and_lookup() {
        let mut catalog = Catalog::with_defaults().unwrap();
        let aspirin = med(1, "Aspirin", &["2026-01-31", "2026-06-30"]);
        catalog.index_medication(&aspirin, MedicationRef::new(0)).unwrap();

        assert_eq!(catalog.medication(MedicationId::new(1)), Ok(MedicationRef::new(0)));
        assert_eq!(catalog.medications_named("Aspirin"), &[MedicationRef::new(0)]);
        assert_eq!(catalog.medications_expiring_on("2026-06-30"), &[MedicationRef::new(0)]);
        assert_eq!(catalog.expiry_index().ref_count(), 2);
    }

    #[test]
    fn test_duplicate_medication_id_rejected_without_side_effects() {
        let mut catalog = Catalog::with_defaults().unwrap();
        catalog
            .index_medication(&med(1, "Aspirin", &["2026-01-31"]), MedicationRef::new(0))
            .unwrap();

        let clash = med(1, "Codeine", &["2027-01-31"]);
        assert_eq!(
            catalog.index_medication(&clash, MedicationRef::new(1)),
            Err(Error::DuplicateKey)
        );
        assert!(catalog.medications_named("Codeine").is_empty());
        assert!(catalog.medications_expiring_on("2027-01-31").is_empty());
    }

    #[test]
    fn test_shared_expiry_date_keeps_both_medications() {
        let mut catalog = Catalog::with_defaults().unwrap();
        catalog
            .index_medication(&med(1, "Aspirin", &["2026-01-31"]), MedicationRef::new(0))
            .unwrap();
        catalog
            .index_medication(&med(2, "Ibuprofen", &["2026-01-31"]), MedicationRef::new(1))
            .unwrap();

        assert_eq!(
            catalog.medications_expiring_on("2026-01-31"),
            &[MedicationRef::new(0), MedicationRef::new(1)]
        );
    }

    #[test]
    fn test_unindex_medication_clears_all_trees() {
        let mut catalog = Catalog::with_defaults().unwrap();
        let aspirin = med(1, "Aspirin", &["2026-01-31", "2026-01-31"]);
        catalog.index_medication(&aspirin, MedicationRef::new(4)).unwrap();

        assert_eq!(catalog.unindex_medication(&aspirin), Ok(MedicationRef::new(4)));
        assert_eq!(catalog.medication_count(), 0);
        assert!(catalog.name_index().is_empty());
        assert!(catalog.expiry_index().is_empty());
        assert_eq!(catalog.unindex_medication(&aspirin), Err(Error::NotFound));
    }

    #[test]
    fn test_batch_expiry_requires_medication() {
        let mut catalog = Catalog::with_defaults().unwrap();
        assert_eq!(
            catalog.index_batch_expiry(MedicationId::new(9), "2026-01-01"),
            Err(Error::NotFound)
        );

        catalog
            .index_medication(&med(9, "Codeine", &[]), MedicationRef::new(0))
            .unwrap();
        catalog
            .index_batch_expiry(MedicationId::new(9), "2026-01-01")
            .unwrap();
        assert_eq!(catalog.medications_expiring_on("2026-01-01").len(), 1);

        catalog
            .unindex_batch_expiry(MedicationId::new(9), "2026-01-01")
            .unwrap();
        assert!(catalog.medications_expiring_on("2026-01-01").is_empty());
        assert_eq!(
            catalog.unindex_batch_expiry(MedicationId::new(9), "2026-01-01"),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn test_rollback_when_expiry_index_is_full() {
        // Each expiry tree may hold only its root leaf: three dates fit.
        let config = TreeConfig::default().max_nodes(1);
        let mut catalog = Catalog::new(config).unwrap();
        let record = med(
            1,
            "Aspirin",
            &["2026-01-01", "2026-02-01", "2026-03-01", "2026-04-01"],
        );

        let result = catalog.index_medication(&record, MedicationRef::new(0));

        assert!(matches!(result, Err(Error::AllocationFailure { .. })));
        assert_eq!(catalog.medication_count(), 0);
        assert!(catalog.name_index().is_empty());
        assert!(catalog.expiry_index().is_empty());
        catalog.check_invariants().unwrap();
    }

    #[test]
    fn test_expiry_scans() {
        let mut catalog = Catalog::with_defaults().unwrap();
        let dates = ["2025-12-01", "2026-01-15", "2026-02-01", "2026-03-10"];
        for (i, date) in dates.iter().enumerate() {
            let record = med(i as u32, "Generic", &[date]);
            catalog.index_medication(&record, MedicationRef::new(i)).unwrap();
        }

        let before: Vec<&str> = catalog.expiring_before("2026-02-01").map(|(d, _)| d).collect();
        assert_eq!(before, vec!["2025-12-01", "2026-01-15"]);

        let between: Vec<&str> = catalog
            .expiring_between("2026-01-01", "2026-02-01")
            .map(|(d, _)| d)
            .collect();
        assert_eq!(between, vec!["2026-01-15", "2026-02-01"]);

        assert_eq!(catalog.medications_named("Generic").len(), 4);
    }

    #[test]
    fn test_suppliers() {
        let mut catalog = Catalog::with_defaults().unwrap();
        for id in [30, 10, 20] {
            catalog
                .index_supplier(SupplierId::new(id), SupplierRef::new(id as usize))
                .unwrap();
        }
        assert_eq!(
            catalog.index_supplier(SupplierId::new(10), SupplierRef::new(99)),
            Err(Error::DuplicateKey)
        );

        let ids: Vec<u32> = catalog.suppliers().map(|(id, _)| id.0).collect();
        assert_eq!(ids, vec![10, 20, 30]);

        assert_eq!(catalog.unindex_supplier(SupplierId::new(20)), Ok(SupplierRef::new(20)));
        assert_eq!(catalog.supplier(SupplierId::new(20)), Err(Error::NotFound));
        assert_eq!(catalog.supplier_count(), 2);
    }
}
