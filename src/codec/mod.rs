//! Record codec
//!
//! Converts transactions to and from the textual WAL line format, and
//! blocks to and from their structured JSON form.

mod block;
mod errors;
mod line;

pub use block::{block_file_name, Block, PLACEHOLDER};
pub use errors::{CodecError, CodecResult};
pub use line::{decode_line, decode_pointer, encode_line, encode_pointer};
