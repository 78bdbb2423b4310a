//! boardbot keeps an in-memory mirror of one GitHub project board and
//! moves issue cards between the Developing and Testing columns when
//! assignment changes, gated by QA/Dev team membership.

pub mod config;
pub mod errors;
pub mod github;
pub mod mirror;
pub mod policy;
pub mod server;
pub mod teams;
