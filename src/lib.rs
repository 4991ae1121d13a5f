//! Spendwise - income and expense tracking against monthly budgets
//!
//! Every user owns categories, transactions and one budget entry per
//! (expense category, month). Each budget entry tracks how much of it is
//! `consumed`; an expense that would push `consumed` past the budget is
//! refused, and edits and deletions of expenses move the consumption with
//! them.
//!
//! # Architecture
//!
//! - `config`: path resolution and user settings
//! - `error`: the crate error type
//! - `models`: core data types (users, categories, transactions, budgets)
//! - `storage`: JSON collections with atomic writes and the writer lock
//! - `services`: business rules, one service per entity
//! - `reports`: read-only aggregations
//! - `audit`: JSONL audit log of every mutation
//! - `api`: JSON response envelope
//! - `cli`, `display`: the `spendwise` command line
//!
//! # Example
//!
//! ```rust,ignore
//! use spendwise::config::SpendwisePaths;
//! use spendwise::services::TransactionService;
//! use spendwise::storage::Storage;
//!
//! let storage = Storage::new(SpendwisePaths::new()?)?;
//! storage.load_all()?;
//! let recent = TransactionService::new(&storage).list_transactions(user_id)?;
//! ```

pub mod api;
pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{SpendwiseError, SpendwiseResult};
