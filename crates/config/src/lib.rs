mod config;
mod sass;

pub mod path;

pub use self::config::*;
pub use self::path::RelPath;
pub use self::sass::*;

type Status = status::Status;
type Result<T, E = Status> = std::result::Result<T, E>;
