//! Contract structures and structure-file loading

mod data;
pub mod loader;

pub use data::{ContractStructure, ContractStructureBuilder, NamedStructure};
pub use loader::{group_by_player, load_structures, load_structures_from_reader, StructureRecord};
