mod check;
mod notify;
mod observation;
mod outcome;
mod soa;
mod zone;

pub use check::*;
pub use notify::*;
pub use observation::*;
pub use outcome::*;
pub use soa::*;
pub use zone::*;
