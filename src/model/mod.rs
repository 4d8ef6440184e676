pub mod common;
pub mod document;
pub mod permission;
pub mod space;
pub mod statement;

pub use common::*;
pub use document::*;
pub use permission::*;
pub use space::*;
pub use statement::*;
