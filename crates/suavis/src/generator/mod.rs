mod atomic;
mod interface;
mod lock;
mod mutex;
mod policy;
mod state;
mod status;

pub use atomic::*;
pub use interface::*;
pub use lock::*;
pub(crate) use mutex::*;
pub use policy::*;
pub(crate) use state::*;
pub use status::*;
