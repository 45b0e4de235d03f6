mod dotenv;
mod helpers;
mod http;
mod store;
