// Operations
mod operations;
pub use operations::*;

mod error;
pub use error::*;

pub mod datetime;

// Authorization
mod policy;
pub use policy::*;

// Models
mod members;
pub use members::*;

mod payments;
pub use payments::*;

mod events;
pub use events::*;

mod projects;
pub use projects::*;

mod responses;
pub use responses::*;

mod announcements;
pub use announcements::*;

mod summary;
pub use summary::*;
