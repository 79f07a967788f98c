pub mod error;
pub mod timecode;
