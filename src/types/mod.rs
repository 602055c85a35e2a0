mod location;
mod scenario;
mod variable;

pub use location::*;
pub use scenario::*;
pub use variable::*;
