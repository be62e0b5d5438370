pub mod name_change_repo;
pub mod player_repo;
pub mod snapshot_repo;

pub use name_change_repo::NameChangeRepo;
pub use player_repo::PlayerRepo;
pub use snapshot_repo::SnapshotRepo;
