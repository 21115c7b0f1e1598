/// Text shaping and letter-spaced run layout.
pub mod layout;
