//! Test modules for the product service client

mod http_client;
