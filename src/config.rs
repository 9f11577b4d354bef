//! Environment-driven configuration. Every field can be set by flag or by
//! its environment variable via clap's `env` feature.

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum Mode {
    FilmWork,
    Person,
    Genre,
    All,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "movies-etl", author, version, about = "Replicates a movie catalogue from Postgres into Elasticsearch")]
pub struct Config {
    #[arg(long, env = "POSTGRES_HOST")]
    pub postgres_host: String,

    #[arg(long, env = "POSTGRES_PORT", default_value_t = 5432)]
    pub postgres_port: u16,

    #[arg(long, env = "POSTGRES_DB")]
    pub postgres_db: String,

    #[arg(long, env = "POSTGRES_USER")]
    pub postgres_user: String,

    #[arg(long, env = "POSTGRES_PASSWORD")]
    pub postgres_password: String,

    #[arg(long, env = "ELASTICSEARCH_HOST")]
    pub elasticsearch_host: String,

    #[arg(long, env = "ELASTICSEARCH_PORT", default_value_t = 9200)]
    pub elasticsearch_port: u16,

    #[arg(long, env = "ETL_MODE", value_enum, default_value = "all")]
    pub etl_mode: Mode,

    #[arg(long, env = "ETL_FILE_STATE", default_value = "./etl_state.json")]
    pub etl_file_state: String,

    #[arg(long, env = "BATCH_LIMIT", default_value_t = 100)]
    pub batch_limit: i64,

    #[arg(long, env = "ETL_SYNC_DELAY", default_value_t = 1)]
    pub etl_sync_delay_secs: u64,

    #[arg(long, env = "ETL_DEFAULT_DATE", default_value = "1700-01-01T00:00:00Z")]
    pub etl_default_date: String,

    #[arg(long, env = "ETL_BULK_CHUNK_SIZE", default_value_t = 500)]
    pub etl_bulk_chunk_size: usize,

    #[arg(long, env = "ETL_BACKOFF_START_MS", default_value_t = 1000)]
    pub etl_backoff_start_ms: u64,

    #[arg(long, env = "ETL_BACKOFF_FACTOR", default_value_t = 2)]
    pub etl_backoff_factor: u32,

    #[arg(long, env = "ETL_BACKOFF_CAP_SECS", default_value_t = 60)]
    pub etl_backoff_cap_secs: u64,
}

impl Config {
    pub fn backoff(&self) -> etl_common::BackoffConfig {
        etl_common::BackoffConfig::new(
            std::time::Duration::from_millis(self.etl_backoff_start_ms),
            self.etl_backoff_factor,
            std::time::Duration::from_secs(self.etl_backoff_cap_secs),
        )
    }

    pub fn sync_delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.etl_sync_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_required_fields_from_explicit_flags() {
        let config = Config::parse_from([
            "movies-etl",
            "--postgres-host",
            "db",
            "--postgres-db",
            "content",
            "--postgres-user",
            "etl",
            "--postgres-password",
            "secret",
            "--elasticsearch-host",
            "es",
        ]);

        assert_eq!(config.postgres_host, "db");
        assert_eq!(config.postgres_port, 5432);
        assert_eq!(config.batch_limit, 100);
        assert_eq!(config.etl_mode, Mode::All);
    }
}
