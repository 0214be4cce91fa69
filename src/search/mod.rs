pub mod candidates;
pub mod selector;
pub mod similarity;

pub use candidates::{CandidateSearcher, SearchCandidate};
pub use selector::{CandidateSelector, ConsoleSelector, SelectionError, TopRanked};
pub use similarity::similarity;
