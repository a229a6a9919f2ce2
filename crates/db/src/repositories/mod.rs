//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Category and note methods
//! take the owner's id explicitly; there is no implicit per-request scope.

pub mod account_repo;
pub mod category_repo;
pub mod note_repo;
pub mod session_repo;
pub mod user_repo;

pub use account_repo::AccountRepo;
pub use category_repo::CategoryRepo;
pub use note_repo::NoteRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
