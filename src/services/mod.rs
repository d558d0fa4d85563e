pub mod conclusion_service;
pub mod matching_service;
pub mod verdict;

pub use conclusion_service::ConclusionService;
pub use matching_service::{MatchingService, NO_MATCH_SENTINEL};
pub use verdict::{parse_verdict, Verdict};
