pub mod tests;
pub mod utils;

#[macro_use]
extern crate log;
#[macro_use]
extern crate lazy_static;
