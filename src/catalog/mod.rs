//! Medication and supplier indexes built on the B-tree engine.

mod ids;
mod registry;

pub use ids::{MedicationId, MedicationRef, SupplierId, SupplierRef};
pub use registry::{Catalog, MedicationKeys};
