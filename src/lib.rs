pub mod checkpoint;
pub mod config;
pub mod envelope;
pub mod error;
pub mod fabric;
pub mod gateway;
pub mod identity;
pub mod proposal;
pub mod signer;
pub mod transaction;
