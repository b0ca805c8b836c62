pub mod codec;
pub mod entry;
pub mod error;
pub mod shape;
pub mod well_known;

mod assembler;
mod decode;
mod iteration;

pub use codec::ArgumentEncoder;
pub use codec::CodecError;
pub use codec::ScaleRegistry;
pub use decode::DecodeKeyError;
pub use entry::StorageEntry;
pub use error::KeyError;
pub use shape::KeyShape;
