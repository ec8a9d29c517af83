pub mod atomic;
pub mod meta;
pub mod paths;
