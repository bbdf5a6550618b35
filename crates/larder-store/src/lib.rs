//! Entity store and relationship integrity engine for the larder catalog.
//!
//! The store owns the canonical records for categories, ingredients, recipes,
//! and recipe ingredient lines. Every relationship is held once, as a forward
//! reference; back-references ("recipes in this category") are derived on
//! read.
//!
//! # Modules
//!
//! - [`state`]: [`CatalogState`], the four entity tables and their
//!   uniqueness/existence rules
//! - [`integrity`]: delete propagation (cascade and nullify) and line edits
//! - [`mutation`]: [`Mutation`], the serializable unit of change
//! - [`journal`]: append-only, CRC-framed [`Journal`] for durability
//! - [`traits`]: the read-only [`CatalogRead`] view
//!
//! # Design Rules
//!
//! 1. Names are unique per entity kind, compared exactly after trimming.
//! 2. A line's owning recipe always exists while the line exists.
//! 3. Category delete nullifies recipe references; recipe delete cascades to
//!    its lines; ingredient delete nullifies line references.
//! 4. [`CatalogState::apply`] checks every precondition before changing
//!    anything. A rejected mutation leaves the state untouched.

pub mod error;
pub mod integrity;
pub mod journal;
pub mod mutation;
pub mod state;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use integrity::{OrphanLines, Propagation};
pub use journal::{Journal, JournalConfig, JournalRecord, SyncMode};
pub use mutation::{Mutation, MutationAction, ReplayReport};
pub use state::CatalogState;
pub use traits::CatalogRead;
