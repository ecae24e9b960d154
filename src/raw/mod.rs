mod arena;
mod handle;
mod node;
mod raw_llrb_map;

pub(crate) use handle::Handle;
pub(crate) use raw_llrb_map::RawLlrbMap;
