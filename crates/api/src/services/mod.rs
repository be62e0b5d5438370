//! Request-scoped orchestration between the hiscores, the store and the
//! event bus. Handlers stay thin and call into these.

pub mod milestones;
pub mod name_change;
pub mod players;
