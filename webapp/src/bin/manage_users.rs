//! Account administration for the web app.
//!
//! ```text
//! manage_users create <username> <password>
//! manage_users reset-password <username> <password>
//! manage_users deactivate <username>
//! ```

use anyhow::{bail, Result};
use shared::repo::UserRepository;
use shared::{get_db_connection, Config};
use std::sync::Arc;
use webapp::password::hash_password;

const USAGE: &str = "usage: manage_users <create|reset-password> <username> <password>\n       manage_users deactivate <username>";

#[tokio::main]
async fn main() -> Result<()> {
    shared::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let config = Config::from_env()?;
    let db = Arc::new(get_db_connection(&config.database_url).await?);
    let users = UserRepository::new(db);

    match args.as_slice() {
        ["create", username, password] => {
            check_password(password)?;
            let user = users.create(username, hash_password(password)).await?;
            println!("Created user {} (id {})", user.username, user.id);
        }
        ["reset-password", username, password] => {
            check_password(password)?;
            let user = users.set_password(username, hash_password(password)).await?;
            println!("Password reset for {}", user.username);
        }
        ["deactivate", username] => {
            let user = users.deactivate(username).await?;
            println!("Deactivated {}", user.username);
        }
        _ => bail!("{}", USAGE),
    }

    Ok(())
}

fn check_password(password: &str) -> Result<()> {
    if password.len() < 8 {
        bail!("password must be at least 8 characters");
    }
    Ok(())
}
