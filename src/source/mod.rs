//! Candidate sources
//!
//! Where sensors look for new work.
//!
//! # Overview
//!
//! - `DirectorySource` - files in a local directory, optionally recursive
//! - `ChannelSource` - messages in a chat channel
//!
//! Both implement `CandidateSource`: a whole-source failure is returned as
//! an error, a failure on one item is logged and the item dropped.

mod channel;
mod directory;
mod types;

pub use channel::{ChannelSource, DEFAULT_API_BASE_URL, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};
pub use directory::{DirectorySource, DEFAULT_MAX_DEPTH, DEFAULT_MAX_ENTRIES};
pub use types::{Candidate, CandidateSource, ChannelMessage, FileEntry, SourceKind};
