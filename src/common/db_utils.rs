// src/common/db_utils.rs

use sqlx::postgres::PgDatabaseError;

use crate::common::error::AppError;

// SQLSTATEs que viram erros de domínio; o resto segue como erro interno.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const NOT_NULL_VIOLATION: &str = "23502";

/// Classifica um erro do Postgres pela família da constraint violada.
///
/// O texto carregado no erro é o `DETAIL` do Postgres quando disponível
/// (ex: `Key (slug)=(acme) already exists.`), senão o nome da constraint.
pub(crate) fn translate_db_error(e: sqlx::Error) -> AppError {
    let classified = match &e {
        sqlx::Error::Database(db_err) => {
            let detail = db_err
                .try_downcast_ref::<PgDatabaseError>()
                .and_then(|pg| pg.detail())
                .map(str::to_owned)
                .or_else(|| db_err.constraint().map(str::to_owned))
                .unwrap_or_else(|| db_err.message().to_owned());

            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => Some(AppError::UniqueViolation(detail)),
                Some(FOREIGN_KEY_VIOLATION) => Some(AppError::ForeignKeyViolation(detail)),
                Some(NOT_NULL_VIOLATION) => Some(AppError::NotNullViolation(detail)),
                _ => None,
            }
        }
        _ => None,
    };

    classified.unwrap_or(AppError::DatabaseError(e))
}

/// `true` quando o erro é uma violação de unicidade na constraint informada.
pub(crate) fn is_unique_violation_on(e: &sqlx::Error, constraint: &str) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation() && db_err.constraint() == Some(constraint))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_stay_internal() {
        assert!(matches!(
            translate_db_error(sqlx::Error::RowNotFound),
            AppError::DatabaseError(sqlx::Error::RowNotFound)
        ));
        assert!(!is_unique_violation_on(&sqlx::Error::PoolTimedOut, "users_email_key"));
    }
}
