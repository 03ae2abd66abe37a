//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod transformation_repo;
pub mod user_repo;

pub use transformation_repo::TransformationRepo;
pub use user_repo::UserRepo;
