mod repo;
mod repo_types;

pub use repo::NewUser;
pub use repo_types::User;
