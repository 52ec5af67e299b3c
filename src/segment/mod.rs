//! Speech segmentation: turning a frame stream into utterance segments.

pub mod segmenter;
pub mod task;

pub use segmenter::{SegmenterConfig, SpeechSegmenter};
pub use task::{SegmentKind, SegmentTask};
