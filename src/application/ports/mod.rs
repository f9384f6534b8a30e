pub mod email_verifier;
