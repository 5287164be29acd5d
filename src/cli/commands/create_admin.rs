use std::io::{self, BufRead, Write};

use crate::config::Config;
use crate::services::{AuthError, AuthService, Registration, SeaOrmAuthService};

#[derive(Debug, Default)]
pub struct AdminArgs {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

fn value_or_prompt(value: Option<String>, label: &str) -> anyhow::Result<String> {
    match value {
        Some(v) => Ok(v),
        None => prompt(label),
    }
}

pub async fn cmd_create_admin(config: &Config, args: AdminArgs) -> anyhow::Result<()> {
    let store = crate::db::Store::new(&config.general.database_path).await?;
    let auth = SeaOrmAuthService::new(store, config.security.clone());

    let registration = Registration {
        name: value_or_prompt(args.name, "Name")?,
        email: value_or_prompt(args.email, "Email")?,
        username: value_or_prompt(args.username, "Username")?,
        password: value_or_prompt(args.password, "Password")?,
        confirm_password: value_or_prompt(args.confirm_password, "Confirm password")?,
    };

    match auth.register_admin(registration).await {
        Ok(principal) => {
            println!(
                "✓ Created administrator '{}' (ID: {})",
                principal.username, principal.user_id
            );
            Ok(())
        }
        Err(
            e @ (AuthError::PasswordMismatch
            | AuthError::DuplicateUsername
            | AuthError::DuplicateEmail
            | AuthError::Validation(_)),
        ) => {
            println!("✗ {e}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
