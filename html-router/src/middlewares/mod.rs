pub mod compression;
pub mod response_middleware;
pub mod session_middleware;
