//! # Adapters
//!
//! Project storage plus the read views the registry and the rating
//! collector consume.

pub mod directory;
pub mod memory;
pub mod profiles;

pub use directory::RepositoryDirectory;
pub use memory::InMemoryProjectRepository;
pub use profiles::MarketplaceProfileSource;
