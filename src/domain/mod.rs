pub mod email_address;
pub mod entities;
