use clap::{Parser, Subcommand};
use oauth_identity::{
    config::IdentityConfig,
    db,
    models::{AuthInfo, AuthPayload, User},
    repositories::SqliteUserRepository,
    services::{IdentityResolver, Resolution, UserService},
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "oauth-identity-cli")]
#[command(about = "CLI tool for inspecting and resolving OAuth users", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Find or create the user for a provider identity
    Resolve {
        /// Provider name
        #[arg(short, long, default_value = "google_oauth2")]
        provider: String,

        /// Provider-assigned subject identifier
        #[arg(short, long)]
        uid: String,

        /// Profile email
        #[arg(short, long)]
        email: Option<String>,

        /// Profile display name
        #[arg(short, long)]
        name: Option<String>,

        /// Profile image URL
        #[arg(short, long)]
        image: Option<String>,
    },

    /// List all users
    List {
        /// Maximum number of users to display
        #[arg(short, long, default_value_t = 100)]
        limit: i64,

        /// Offset for pagination
        #[arg(short = 'o', long, default_value_t = 0)]
        offset: i64,
    },

    /// Show a user by id
    Show {
        #[arg(long)]
        id: i64,
    },

    /// Look up a user by provider identity
    Find {
        #[arg(short, long, default_value = "google_oauth2")]
        provider: String,

        #[arg(short, long)]
        uid: String,
    },
}

fn print_user(user: &User) {
    println!("  ID: {}", user.id);
    println!("  Provider: {}", user.provider);
    println!("  UID: {}", user.uid);
    println!("  Email: {}", user.email);
    println!("  Name: {}", user.full_name.as_deref().unwrap_or("N/A"));
    println!("  Avatar: {}", user.avatar_url.as_deref().unwrap_or("N/A"));
    println!("  Verified: {}", user.email_verified);
    println!("  Created: {}", user.created_at.as_deref().unwrap_or("N/A"));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

    // Connect to database
    let pool = db::create_pool(&database_url).await?;

    // Run migrations
    db::run_migrations(&pool).await?;

    // Initialize services
    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let user_service = UserService::new(user_repository.clone());
    let resolver = IdentityResolver::new(user_repository, IdentityConfig::from_env());

    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Resolve {
                provider,
                uid,
                email,
                name,
                image,
            } => {
                let payload = AuthPayload::new(provider, uid, AuthInfo { email, name, image });

                match resolver.resolve(&payload).await {
                    Ok(Resolution::Created(user)) => {
                        println!("✅ User created successfully!");
                        print_user(&user);
                    }
                    Ok(Resolution::Existing(user)) => {
                        println!("ℹ️  User already exists");
                        print_user(&user);
                    }
                    Ok(Resolution::Rejected { errors, .. }) => {
                        eprintln!("❌ User save failed:");
                        for message in errors.full_messages() {
                            eprintln!("  - {}", message);
                        }
                        std::process::exit(1);
                    }
                    Err(err) => {
                        eprintln!("❌ Failed to resolve user: {}", err);
                        std::process::exit(1);
                    }
                }
            }

            UserCommands::List { limit, offset } => {
                match user_service.list_users(Some(limit), Some(offset)).await {
                    Ok(users) => {
                        if users.is_empty() {
                            println!("No users found.");
                        } else {
                            println!(
                                "{:<5} {:<15} {:<24} {:<36} {:<10}",
                                "ID", "Provider", "UID", "Email", "Verified"
                            );
                            println!("{}", "-".repeat(94));
                            for user in users {
                                println!(
                                    "{:<5} {:<15} {:<24} {:<36} {:<10}",
                                    user.id,
                                    user.provider,
                                    user.uid,
                                    user.email,
                                    if user.email_verified { "Yes" } else { "No" },
                                );
                            }
                        }
                    }
                    Err(err) => {
                        eprintln!("❌ Failed to list users: {}", err);
                        std::process::exit(1);
                    }
                }
            }

            UserCommands::Show { id } => match user_service.find_user_by_id(id).await {
                Ok(Some(user)) => print_user(&user),
                Ok(None) => {
                    eprintln!("❌ User {} not found", id);
                    std::process::exit(1);
                }
                Err(err) => {
                    eprintln!("❌ Failed to find user: {}", err);
                    std::process::exit(1);
                }
            },

            UserCommands::Find { provider, uid } => {
                match user_service.find_user_by_identity(&provider, &uid).await {
                    Ok(Some(user)) => print_user(&user),
                    Ok(None) => {
                        eprintln!("❌ No user for {} / {}", provider, uid);
                        std::process::exit(1);
                    }
                    Err(err) => {
                        eprintln!("❌ Failed to find user: {}", err);
                        std::process::exit(1);
                    }
                }
            }
        },
    }

    Ok(())
}
