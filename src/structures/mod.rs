pub mod alias;
pub mod connection;
pub mod environment;
