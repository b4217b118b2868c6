mod error;
pub use error::*;

pub mod password;

mod credentials;
pub use credentials::*;

mod login;
pub use login::*;

mod guard;
pub use guard::*;
