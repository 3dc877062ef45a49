pub mod collect;
pub mod inspect;
pub mod parse;
pub mod requests;
pub mod status;
pub mod submit;
