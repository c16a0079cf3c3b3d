//! # framecount
//!
//! Validates MPEG-1 Layer III ("MP3") documents and counts their audio
//! frames without decoding any samples.
//!
//! The document is consumed as a stream of chunks of any size. A leading
//! ID3v2 tag and a Xing/Info marker frame are skipped, the first frame
//! header must be MPEG-1 Layer III, and counting stops at the first header
//! that no longer looks like audio.
//!
//! ```rust
//! use framecount::scanner::{count_frames, SliceSource};
//!
//! let mut frame = vec![0xFF, 0xFB, 0x90, 0x00];
//! frame.resize(417, 0);
//! let document = frame.repeat(3);
//!
//! let frames = count_frames(SliceSource::new(&document, 100)).unwrap();
//! assert_eq!(frames, 3);
//! ```
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `mp3` | header, ID3v2 and marker frame decoding |
//! | `scanner` | streaming state machine and chunk sources |
//! | `server` | `POST /file-upload` HTTP service |
//! | `analyzer` / `report` | batch counting of files on disk |

pub mod analyzer;
pub mod config;
pub mod error;
pub mod logging;
pub mod mp3;
pub mod report;
pub mod scanner;
pub mod server;

pub use error::{AppError, FormatError, ScanError};
pub use scanner::{count_frames, scan, ChunkSource, ScanSummary};
