mod handler;
mod response;
mod validator;

pub use handler::{download_file, stream_file};
