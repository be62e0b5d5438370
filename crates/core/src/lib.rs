//! Domain logic for RuneTrack.
//!
//! Everything in this crate is pure computation over already-parsed stat
//! data: no database access and no HTTP. The `db`, `hiscores` and `api`
//! crates build on these types.

pub mod achievements;
pub mod bosses;
pub mod error;
pub mod experience;
pub mod hiscores_csv;
pub mod milestones;
pub mod name_change;
pub mod skills;
pub mod snapshot;
pub mod stats;
pub mod types;
