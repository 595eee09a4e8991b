//! Wire models for the EMS API

mod auth;
mod department;
mod employee;
mod location;
mod page;
mod project;
mod task;

pub use auth::*;
pub use department::*;
pub use employee::*;
pub use location::*;
pub use page::*;
pub use project::*;
pub use task::*;
