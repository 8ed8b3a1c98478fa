pub mod combine;
pub mod error_handling;
pub mod higher_order;
pub mod stateful;
pub mod stateless;
pub mod timed;

pub use combine::{combine_latest, with_latest_from, zip};
pub use error_handling::{catch_error, retry};
pub use higher_order::{concat_map, merge_map, switch_map};
pub use stateful::{scan, take_while};
pub use stateless::{pairwise, start_with, tap};
pub use timed::{delay, sample};
