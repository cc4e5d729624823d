use sea_orm::DbErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Property code already in use: {0}")]
    DuplicateCode(String),

    #[error("Record not found: {0}")]
    Missing(String),

    #[error("Corrupt {table} row {id}: {reason}")]
    Corrupt {
        table: &'static str,
        id: String,
        reason: String,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn corrupt(table: &'static str, id: impl ToString, reason: impl ToString) -> Self {
        Self::Corrupt {
            table,
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let error = StoreError::DuplicateCode("NA001".to_string());
        assert_eq!(format!("{}", error), "Property code already in use: NA001");

        let error = StoreError::corrupt("properties", "abc", "bad status");
        assert_eq!(format!("{}", error), "Corrupt properties row abc: bad status");
    }
}
