pub(crate) mod meta;
pub(crate) mod migrate;
pub(crate) mod ping;
pub(crate) mod shared;
pub(crate) mod stats;
pub(crate) mod sync;
