pub mod merge;
pub mod space_ops;

pub use merge::{add_entry, is_normalized, normalize, remove_entry, replace_list, SortKeyed};
pub use space_ops::*;
