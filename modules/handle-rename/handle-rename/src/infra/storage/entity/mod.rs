pub mod comment;
pub mod private_message;
pub mod publication;
pub mod redirect;
pub mod user;
