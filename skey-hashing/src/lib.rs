pub mod hasher;
pub mod prefix;

pub use hasher::select;
pub use hasher::Hasher;
pub use prefix::base_prefix;
pub use prefix::BASE_PREFIX_LEN;
