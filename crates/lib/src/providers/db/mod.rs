pub mod mysql;
pub mod session;
