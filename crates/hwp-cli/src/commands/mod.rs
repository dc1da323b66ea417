pub mod bounds;
pub mod cleanup;
pub mod migrate;
