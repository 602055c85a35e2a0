mod assembler;
pub mod calendar;
mod error;
mod reader;

pub use assembler::{assemble, GridFrame};
pub use calendar::{Calendar, CalendarError, TimeEncoding};
pub use error::GridError;
pub use reader::{GridReader, NetcdfReader, RawGrid};
