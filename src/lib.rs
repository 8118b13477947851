pub mod api;
pub mod config;
pub mod error;
pub mod lesson;
pub mod quiz;
pub mod stats;
pub mod student;
pub mod task;
pub mod teacher;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_util;

/// Schema migrations embedded from `./migrations`, applied at boot.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
