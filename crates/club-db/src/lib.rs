
pub mod connection;
pub use connection::Connection;

pub mod results;
pub mod schema;

pub mod members;
pub mod payments;
pub mod events;
pub mod participants;
pub mod projects;
pub mod responses;
pub mod announcements;
