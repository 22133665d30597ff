pub mod format;
pub mod loaders;
pub mod raw;
pub mod report;

pub use format::{format_matching, parse_matching, parse_matchings, read_matchings, write_matchings};
pub use loaders::{load_config, load_ground_truth, load_hierarchy, parse_hierarchy};
pub use raw::{negative_name, RawResultStore};
pub use report::RunReport;
