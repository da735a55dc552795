pub mod articles;
pub mod auth;
pub mod comments;
pub mod error;
pub mod likes;
pub mod middleware;
pub mod routes;
pub mod service;
pub mod state;
pub mod users;
