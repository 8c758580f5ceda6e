//! Media processing adapters.

mod transcode;

pub use transcode::FfmpegTranscoder;
