mod collection;
mod delivery;
mod errors;
mod handle;
mod image;
mod manager;
mod models;
mod source;
mod temp;
mod transfer;
mod urls;

pub use delivery::Delivery;
pub use errors::FileError;
pub use image::{Image, ImageEditor, ImageOp};
pub use models::{Contents, ContentSource, FileCollection, FileHandle, FileManager, TempFactory};
