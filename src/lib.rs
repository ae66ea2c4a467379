pub mod config;
pub mod discovery;
pub mod mqtt;
pub mod mqtt_service;
pub mod presence;
pub mod print_job;
