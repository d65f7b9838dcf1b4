pub mod collections;
pub mod document;
pub mod store;

pub use collections::InstalledCollections;
pub use document::{agent_file_name, Persona};
pub use store::{load_directory, PersonaSource, PersonaStore};
