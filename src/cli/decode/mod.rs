mod decode_impl;
pub mod output;
pub mod progress;

pub use decode_impl::cmd_decode;
