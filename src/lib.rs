// Library for tests to access modules

pub mod config;
pub mod error;
pub mod models;
pub mod poller;
pub mod routes;
pub mod source;
