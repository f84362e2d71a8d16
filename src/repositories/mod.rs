pub mod matches;

pub use matches::{MatchRepository, MatchStore};
