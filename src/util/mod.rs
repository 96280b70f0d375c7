pub mod email;
pub mod error;
pub mod identifier;
pub mod logger;
pub mod pdf;
pub mod slug;
