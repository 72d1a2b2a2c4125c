pub mod data;
pub mod server;
pub mod subsidy;
