// Buffer related constants
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

// Filesystem default
pub const DEFAULT_FS_ROOT: &str = "./storage";
