mod error;
mod file_store;
mod paths;
mod routes;
