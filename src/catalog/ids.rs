//! Keys and record references used by the catalog indexes.
//!
//! Identifiers are the keys of the two primary indexes. References are the
//! values every index stores: opaque slots into record storage owned by the
//! caller. The catalog never dereferences them, so dropping an index entry
//! never touches the record itself.

use std::fmt;

/// Unique identifier of a medication; key of the medication primary index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MedicationId(pub u32);

impl MedicationId {
    /// Create a new MedicationId.
    #[inline]
    pub fn new(id: u32) -> Self {
        MedicationId(id)
    }
}

impl fmt::Display for MedicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Med({})", self.0)
    }
}

/// Unique identifier of a supplier; key of the supplier primary index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SupplierId(pub u32);

impl SupplierId {
    /// Create a new SupplierId.
    #[inline]
    pub fn new(id: u32) -> Self {
        SupplierId(id)
    }
}

impl fmt::Display for SupplierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Supplier({})", self.0)
    }
}

/// Non-owning reference to a medication record held by the caller.
///
/// Medication and supplier references are distinct types, so an index built
/// for one record kind cannot be handed the other.
///
/// # Example
/// ```
/// use medindex::catalog::MedicationRef;
///
/// let slot = MedicationRef::new(3);
/// // The caller resolves it against its own storage: records[slot.0]
/// assert_eq!(slot.0, 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MedicationRef(pub usize);

impl MedicationRef {
    /// Create a new MedicationRef.
    #[inline]
    pub fn new(slot: usize) -> Self {
        MedicationRef(slot)
    }
}

impl fmt::Display for MedicationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MedRef({})", self.0)
    }
}

/// Non-owning reference to a supplier record held by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SupplierRef(pub usize);

impl SupplierRef {
    /// Create a new SupplierRef.
    #[inline]
    pub fn new(slot: usize) -> Self {
        SupplierRef(slot)
    }
}

impl fmt::Display for SupplierRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SupplierRef({})", self.0)
    }
}
