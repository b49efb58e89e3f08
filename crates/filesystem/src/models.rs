/// Helpers for the local filesystem that hosts config files and the temp root
pub struct FileSystem;
