//! Entity traits: identity and mutation tracking.

/// Something with a stable identity that survives state changes.
///
/// Products and ledger entries are entities: two snapshots of the same
/// product with different stock still describe the same product.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + Send + Sync;

    fn id(&self) -> &Self::Id;
}

/// An entity whose mutations are counted.
///
/// The version starts at 0 for a freshly registered entity and increases by
/// exactly one per committed mutation.
pub trait Versioned: Entity {
    fn version(&self) -> u64;
}
