//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, CommandRunner, etc.)
//! but are themselves concrete structs, not traits.

mod deploy;
mod fixup;
mod scaffold;
mod site;

pub use deploy::{stream_child, OutputStream};
pub use fixup::FixupService;
pub use scaffold::{ScaffoldService, Template};
pub use site::SiteService;
