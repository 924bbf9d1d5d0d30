use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use server_api::{auth, ApiContext, TokenConfig};
use shared::{
    domain::{ActiveStatus, Role},
    protocol::RegisterRequest,
    validation::{validate_full_name, validate_password, validate_whatsapp},
};
use storage::{NewUser, Storage};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/storefront.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Adds a platform administrator. Admins own no store.
    CreateAdmin {
        full_name: String,
        whatsapp: String,
        password: String,
        #[arg(long, default_value = "")]
        email: String,
    },
    /// Registers a seller and opens their store, as the signup form does.
    CreateSeller {
        full_name: String,
        whatsapp: String,
        password: String,
        store_name: String,
    },
    ListStores,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::CreateAdmin {
            full_name,
            whatsapp,
            password,
            email,
        } => {
            validate_full_name(&full_name)?;
            validate_whatsapp(&whatsapp)?;
            validate_password(&password)?;
            if storage.user_by_whatsapp(&whatsapp).await?.is_some() {
                bail!("{whatsapp} is already registered");
            }
            let user_id = storage
                .create_user(NewUser {
                    full_name: &full_name,
                    email: &email,
                    whatsapp: &whatsapp,
                    password_hash: &auth::hash_password(&password),
                    store_name: "admin",
                    role: Role::Admin,
                    status: ActiveStatus::Active,
                })
                .await?;
            info!(%user_id, "created admin");
            println!("created admin user_id={user_id}");
        }
        Command::CreateSeller {
            full_name,
            whatsapp,
            password,
            store_name,
        } => {
            // The session minted by registration is discarded.
            let tokens = TokenConfig {
                issuer: "storefront-tools".into(),
                secret: uuid::Uuid::new_v4().to_string(),
                ttl_seconds: 60,
            };
            let ctx = ApiContext::new(storage.clone(), tokens);
            let session = auth::register(
                &ctx,
                RegisterRequest {
                    full_name,
                    whatsapp,
                    password,
                    store_name,
                },
            )
            .await
            .map_err(|err| anyhow!("{err}"))?;
            println!(
                "created seller user_id={} store={}",
                session.identity.user_id, session.identity.store_name
            );
        }
        Command::ListStores => {
            for store in storage.list_stores().await? {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    store.store_id,
                    store.slug,
                    store.name,
                    store.owner_name,
                    store.status.as_str()
                );
            }
        }
    }

    Ok(())
}
