pub mod clients;
pub mod handlers;
pub mod multipart;
pub mod protocol;
pub mod routes;
pub mod state;
