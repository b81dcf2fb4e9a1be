pub mod cache;
pub mod datastore;
