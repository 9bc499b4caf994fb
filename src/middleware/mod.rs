//! Request middleware shared by the auth routes.

pub mod cache;
