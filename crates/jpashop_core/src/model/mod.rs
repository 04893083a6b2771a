//! Shop domain model mapped onto the relational schema.
//!
//! # Responsibility
//! - Define the entities persisted by the entity manager.
//! - Keep invariants next to the data they constrain.
//!
//! # Invariants
//! - An entity with `id == None` is transient; persisting it assigns the id.
//! - Every entity passes `validate()` before it is written.

pub mod audit;
pub mod delivery;
pub mod item;
pub mod member;
pub mod order;
pub mod validation;
