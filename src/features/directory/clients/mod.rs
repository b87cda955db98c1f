mod pg_directory;

#[cfg(test)]
pub mod memory;

pub use pg_directory::PgDirectory;
