mod models;
mod operations;
mod sweep;

pub use models::FileSystem;
