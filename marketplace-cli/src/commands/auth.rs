//! Account commands: register, login, logout and status.

use clap::{Args, Subcommand};
use marketplace_core::{Authenticator, Role};

use super::{prompt_secret, runtime, Context};

#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand)]
enum AuthSubcommand {
    /// Create an account
    Register {
        /// Email address
        email: String,

        /// Account role (customer or seller)
        #[arg(long, short, default_value = "customer")]
        role: Role,
    },
    /// Sign in and remember the session
    Login {
        /// Email address
        email: String,
    },
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Status,
}

impl AuthCommand {
    pub fn run(&self, context: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let auth = Authenticator::new(context.remote.clone(), context.session.clone());

        match &self.command {
            AuthSubcommand::Register { email, role } => {
                let password = prompt_secret("Password: ")?;
                let account = runtime()?.block_on(auth.register(email, &password, *role))?;
                println!("Registered {} as {}.", account.email, account.role);
                println!("Run 'market auth login {}' to sign in.", account.email);
                Ok(())
            }
            AuthSubcommand::Login { email } => {
                let password = prompt_secret("Password: ")?;
                let session = runtime()?.block_on(auth.login(email, &password))?;
                println!("Logged in as {}", session);
                Ok(())
            }
            AuthSubcommand::Logout => {
                if context.session.get().is_none() {
                    println!("Already logged out.");
                    return Ok(());
                }
                auth.logout()?;
                println!("Logged out.");
                Ok(())
            }
            AuthSubcommand::Status => {
                match context.session.get() {
                    Some(session) => {
                        println!("Logged in as {}", session);
                        println!("  token: {}", session.masked_token());
                    }
                    None => println!("Not logged in. Run 'market auth login' to sign in."),
                }
                Ok(())
            }
        }
    }
}
