mod functions;
mod types;

pub use functions::split_display_name;
pub use types::{AccountLink, Gender, NewUser, TokenSet, User};
