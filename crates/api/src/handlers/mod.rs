pub mod events;
pub mod milestones;
pub mod name_change;
pub mod players;
