//! Who is running a command
//!
//! Data commands act on behalf of one user, named with `--user` and confirmed
//! by password. The password comes from `SPENDWISE_PASSWORD` when set,
//! otherwise from an interactive prompt.

use serde::Serialize;
use zeroize::Zeroizing;

use crate::api::ApiResponse;
use crate::error::{SpendwiseError, SpendwiseResult};
use crate::models::User;
use crate::services::UserService;
use crate::storage::Storage;

pub const PASSWORD_ENV: &str = "SPENDWISE_PASSWORD";
pub const NEW_PASSWORD_ENV: &str = "SPENDWISE_NEW_PASSWORD";

/// Options shared by every command
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub username: Option<String>,
    pub json: bool,
}

impl Session {
    pub fn new(username: Option<String>, json: bool) -> Self {
        Self { username, json }
    }

    /// Authenticate the `--user` given on the command line
    pub fn login(&self, storage: &Storage) -> SpendwiseResult<User> {
        let username = self.username.as_deref().ok_or_else(|| {
            SpendwiseError::Validation("This command needs --user <name>".into())
        })?;
        let password = read_secret(PASSWORD_ENV, &format!("Password for {}: ", username))?;
        UserService::new(storage).authenticate(username, &password)
    }

    /// Print `value` as a JSON envelope or as the given text
    pub fn emit<T: Serialize>(&self, value: T, text: impl FnOnce(&T) -> String) -> SpendwiseResult<()> {
        if self.json {
            println!("{}", ApiResponse::ok(value).to_json()?);
        } else {
            print!("{}", text(&value));
        }
        Ok(())
    }
}

/// Read a secret from an environment variable or the terminal
pub fn read_secret(env_var: &str, prompt: &str) -> SpendwiseResult<Zeroizing<String>> {
    if let Ok(value) = std::env::var(env_var) {
        return Ok(Zeroizing::new(value));
    }
    prompt_secret(prompt)
}

/// Prompt for a new password twice
pub fn read_new_secret(env_var: &str) -> SpendwiseResult<Zeroizing<String>> {
    if let Ok(value) = std::env::var(env_var) {
        return Ok(Zeroizing::new(value));
    }
    let first = prompt_secret("New password: ")?;
    let second = prompt_secret("Confirm password: ")?;
    if *first != *second {
        return Err(SpendwiseError::Validation("Passwords do not match".into()));
    }
    Ok(first)
}

fn prompt_secret(prompt: &str) -> SpendwiseResult<Zeroizing<String>> {
    rpassword::prompt_password(prompt)
        .map(Zeroizing::new)
        .map_err(|e| SpendwiseError::Io(format!("Failed to read password: {}", e)))
}
