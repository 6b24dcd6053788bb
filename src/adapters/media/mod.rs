//! Container inspection and remux backends.

pub mod cmd;
#[cfg(feature = "native")]
pub mod native;

pub use cmd::FfmpegCli;
#[cfg(feature = "native")]
pub use native::NativeMedia;
