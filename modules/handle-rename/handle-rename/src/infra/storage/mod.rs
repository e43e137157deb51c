//! Infrastructure storage layer - database persistence.
//!
//! All SeaORM-specific code lives here:
//! - `entity/` - entity definitions (users, comments, private messages, publications, redirects)
//! - `mapper.rs` - conversions between entity models and SDK contract types
//! - `migrations/` - database schema migrations
//! - `*_sea_repo.rs` - repository trait implementations

pub mod db;
pub mod entity;
pub mod mapper;
pub mod migrations;

mod content_sea_repo;
mod redirects_sea_repo;
mod users_sea_repo;

pub use content_sea_repo::OrmContentRepository;
pub use redirects_sea_repo::OrmRedirectsRepository;
pub use users_sea_repo::OrmUsersRepository;
