//! Provision an admin account from the command line.
//!
//! ```text
//! create-admin --username root --email root@campus.edu --password '...'
//! ```

use clap::Parser;

use campus_api::config::AppConfig;
use campus_api::services::auth_service;
use campus_shared::clients::db::create_pool;
use campus_shared::middleware::init_tracing;
use campus_shared::types::auth::Role;

#[derive(Debug, Parser)]
#[command(name = "create-admin", about = "Create an admin account for the campus CMS")]
struct Args {
    #[arg(long)]
    username: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    password: String,

    /// ADMIN or SUPERADMIN
    #[arg(long, default_value = "SUPERADMIN")]
    role: Role,
}

fn main() -> anyhow::Result<()> {
    init_tracing("create-admin");
    let args = Args::parse();

    let config = AppConfig::load()?;
    let pool = create_pool(&config.database_url, 1)?;
    let mut conn = pool.get()?;

    let admin = auth_service::create_admin_user(
        &mut conn,
        &args.username,
        &args.email,
        &args.password,
        args.role,
    )
    .map_err(|e| anyhow::anyhow!("could not create admin: {e}"))?;

    println!("created {} {} ({})", admin.role, admin.username, admin.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_defaults_to_superadmin() {
        let args = Args::try_parse_from([
            "create-admin",
            "--username",
            "root",
            "--email",
            "root@campus.edu",
            "--password",
            "change-me-now",
        ])
        .unwrap();
        assert_eq!(args.role, Role::SuperAdmin);
    }

    #[test]
    fn role_is_case_insensitive() {
        let args = Args::try_parse_from([
            "create-admin", "--username", "e", "--email", "e@campus.edu", "--password", "pw", "--role", "admin",
        ])
        .unwrap();
        assert_eq!(args.role, Role::Admin);
    }

    #[test]
    fn password_is_required() {
        assert!(Args::try_parse_from(["create-admin", "--username", "a", "--email", "a@b.c"]).is_err());
    }
}
