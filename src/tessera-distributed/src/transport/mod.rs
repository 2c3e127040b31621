//! Block transport: how blocks are encoded for the object store.

mod codec;

pub use codec::BlockCodec;
