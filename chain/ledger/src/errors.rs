//! Ledger error types

use thiserror::Error;

/// Balance ledger errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Insufficient balance for {denom}: required {required}, available {available}")]
    InsufficientBalance {
        denom: String,
        required: String,
        available: String,
    },

    #[error("Insufficient locked balance for {denom}: required {required}, locked {locked}")]
    InsufficientLocked {
        denom: String,
        required: String,
        locked: String,
    },

    #[error("Amount must not be negative: {amount}")]
    InvalidAmount { amount: String },

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,

    #[error("Invalid token pair: {0}")]
    InvalidPair(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_balance_display() {
        let err = LedgerError::InsufficientBalance {
            denom: "okb".to_string(),
            required: "1.5".to_string(),
            available: "1.0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance for okb: required 1.5, available 1.0"
        );
    }

    #[test]
    fn test_insufficient_locked_display() {
        let err = LedgerError::InsufficientLocked {
            denom: "xxb".to_string(),
            required: "3".to_string(),
            locked: "2".to_string(),
        };
        assert!(err.to_string().contains("xxb"));
        assert!(err.to_string().contains("locked 2"));
    }
}
