//! Test modules for the history & cache store

mod selected_product;
