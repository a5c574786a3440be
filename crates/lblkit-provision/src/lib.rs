pub mod artifacts;
pub mod compiler;
pub mod environment;
pub mod process;
pub mod rundir;
pub mod setup;
pub mod tape3;

mod common;
