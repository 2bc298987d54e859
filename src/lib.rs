// Library for tests and the tail binary to access modules

pub mod aggregator;
pub mod client;
pub mod config;
pub mod docker_repo;
pub mod error;
pub mod host_repo;
pub mod models;
pub mod probe_repo;
pub mod routes;
pub mod source;
pub mod version;
pub mod worker;
