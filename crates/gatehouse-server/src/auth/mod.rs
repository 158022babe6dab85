//! OAuth front door: approval cookie, consent dialog, upstream login and the
//! grants handed to relying parties.

pub mod approval;
pub mod clients;
pub mod dialog;
pub mod flow;
pub mod grants;
pub mod request;
pub mod signing;
pub mod upstream;
