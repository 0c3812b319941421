//! Domain model for stories and their canvas projection.
//!
//! # Responsibility
//! - Define the story graph (`Story`, `Passage`) shared by every service.
//! - Define the canvas role union carried as out-of-band metadata.
//!
//! # Invariants
//! - Stories are rebuilt from the canvas on every extraction, never cached.

pub mod canvas;
pub mod story;
