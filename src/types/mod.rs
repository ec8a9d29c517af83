pub mod errors;
pub mod options;
pub mod state;

pub use errors::*;
pub use options::*;
pub use state::*;
