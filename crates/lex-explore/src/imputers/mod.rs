//! Imputation module for handling missing values.
//!
//! Only median imputation of numeric columns is used by the cleaner.

mod statistical;

pub use statistical::StatisticalImputer;
