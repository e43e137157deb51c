mod content_repo;
mod redirects_repo;
mod users_repo;

pub use content_repo::{ContentField, ContentRecord, ContentRepository, FieldUpdate};
pub use redirects_repo::RedirectsRepository;
pub use users_repo::UsersRepository;
