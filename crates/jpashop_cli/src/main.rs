//! Command-line entry point.
//!
//! # Responsibility
//! - Open the `hello` persistence unit, register one book, release everything.
//! - Map any failure to a non-zero exit code.

use jpashop_core::{
    default_log_dir, default_log_level, init_logging, CatalogService, EntityManagerFactory,
    PersistenceConfig, PersistenceError, DEFAULT_UNIT_NAME,
};
use log::{error, info};
use std::process::ExitCode;

const BOOK_NAME: &str = "JPA";
const BOOK_AUTHOR: &str = "김영한";

fn main() -> ExitCode {
    let level = std::env::var(jpashop_core::logging::LOG_LEVEL_ENV)
        .unwrap_or_else(|_| default_log_level().to_string());
    let log_dir = default_log_dir();
    if let Err(err) = init_logging(&level, &log_dir.to_string_lossy()) {
        eprintln!("logging disabled: {err}");
    }

    match run() {
        Ok(book_id) => {
            info!("event=cli_run module=cli status=ok book_id={book_id}");
            println!("persisted book id={book_id}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("{}", failure_line(&err));
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<i64, PersistenceError> {
    let config = PersistenceConfig::resolve()?;
    let factory = EntityManagerFactory::from_config(&config, DEFAULT_UNIT_NAME)?;
    let outcome = CatalogService::new(&factory).register_book(BOOK_NAME, BOOK_AUTHOR);
    factory.close();
    outcome
}

fn failure_line(err: &PersistenceError) -> String {
    format!("failed: {err}")
}

#[cfg(test)]
mod tests {
    use super::failure_line;
    use jpashop_core::PersistenceError;

    #[test]
    fn failure_line_does_not_assume_a_transaction() {
        let line = failure_line(&PersistenceError::UnknownUnit("hello".to_string()));
        assert_eq!(line, "failed: no persistence unit named `hello`");
    }
}
