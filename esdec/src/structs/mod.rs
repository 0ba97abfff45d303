//! Data structures shared by the pipeline and the codecs.
//!
//! - **Frames** ([`frame`]): decoded sample blocks and stream format
//! - **Output format** ([`format`]): raw dump descriptor and playback hint

pub mod format;
pub mod frame;
