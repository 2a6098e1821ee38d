pub mod reminder;
pub mod user;

pub use reminder::*;
pub use user::*;
