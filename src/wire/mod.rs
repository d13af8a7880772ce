//! Fixed-layout wire formats for cluster messages
//!
//! Every message exchanged between processes is a whole number of
//! fixed-stride records. A receiver that learns a message's byte length
//! from a probe can derive the record count without prior agreement.
//!
//! ```text
//! Row   (16 bytes): company_id u32 LE | date i32 LE (days from CE) | sales_total f64 LE
//! Query (12 bytes): kind u8 | pad [u8; 3] | start i32 LE | end i32 LE
//! ```

mod datatype;
mod errors;

pub use datatype::{decode_slice, encode_slice, Datatype, WireRecord};
pub use errors::{WireError, WireResult};
