pub mod client;
pub mod connection;
pub mod contract;
pub mod network;
