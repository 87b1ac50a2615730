// Utility Module
// Binary codec for key/signature files and the file I/O around it

pub mod codec;
pub mod file_ops;

pub use codec::{decode_key, decode_signature, encode_key, encode_signature};
pub use file_ops::{hash_file, read_file, signature_path, write_file};
