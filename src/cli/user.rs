//! User CLI commands

use clap::Subcommand;

use super::session::{read_new_secret, read_secret, Session, NEW_PASSWORD_ENV, PASSWORD_ENV};
use crate::config::Settings;
use crate::error::SpendwiseResult;
use crate::models::UserType;
use crate::services::UserService;
use crate::storage::Storage;

/// User subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a new user
    Register {
        /// Username (case-insensitive, stored as typed)
        username: String,
        /// Account type; defaults to the configured default_user_type
        #[arg(short = 't', long = "type")]
        user_type: Option<UserType>,
    },

    /// Check a username and password
    Verify {
        username: String,
    },

    /// Change a password
    Passwd {
        username: String,
    },
}

/// Handle a user command
pub fn handle_user_command(
    storage: &Storage,
    settings: &Settings,
    session: &Session,
    cmd: UserCommands,
) -> SpendwiseResult<()> {
    let service = UserService::new(storage);

    match cmd {
        UserCommands::Register {
            username,
            user_type,
        } => {
            let password = read_new_secret(PASSWORD_ENV)?;
            let user_type = user_type.unwrap_or(settings.default_user_type);
            let user = service.register(&username, &password, user_type)?;
            session.emit(user.profile(), |p| {
                format!("Registered {} ({}), ID: {}\n", p.username, p.user_type, p.id)
            })?;
        }

        UserCommands::Verify { username } => {
            let password = read_secret(PASSWORD_ENV, &format!("Password for {}: ", username))?;
            let user = service.authenticate(&username, &password)?;
            session.emit(user.profile(), |p| format!("Credentials OK for {}\n", p.username))?;
        }

        UserCommands::Passwd { username } => {
            let current = read_secret(PASSWORD_ENV, "Current password: ")?;
            let user = service.authenticate(&username, &current)?;
            let new_password = read_new_secret(NEW_PASSWORD_ENV)?;
            service.change_password(user.id, &current, &new_password)?;
            session.emit(user.profile(), |p| format!("Password changed for {}\n", p.username))?;
        }
    }

    Ok(())
}
