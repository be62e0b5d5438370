pub mod name_change;
pub mod player;
pub mod snapshot;
