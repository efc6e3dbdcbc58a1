pub mod format;
pub mod storage;
pub mod table;

pub use format::*;
pub use storage::*;
pub use table::*;
