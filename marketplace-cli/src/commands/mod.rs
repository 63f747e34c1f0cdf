mod auth;
mod cart;
mod catalog;
mod config_cmd;
mod item;
mod shop;

pub use auth::AuthCommand;
pub use cart::CartCommand;
pub use catalog::ItemsCommand;
pub use config_cmd::ConfigCommand;
pub use item::ItemCommand;
pub use shop::ShopCommand;

use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;

use clap::ValueEnum;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use marketplace_core::{
    AccessGuard, Capability, Confirm, Decision, HttpRemoteClient, RemoteClient, RemoteError,
    SessionStore,
};

use crate::config::Config;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Shared collaborators every view is built from.
pub struct Context {
    pub session: Arc<SessionStore>,
    pub remote: Arc<dyn RemoteClient>,
}

impl Context {
    pub fn from_config(config: &Config) -> Result<Self, RemoteError> {
        let remote =
            HttpRemoteClient::with_timeout(config.api_url.value.clone(), config.request_timeout())?;
        Ok(Self {
            session: Arc::new(SessionStore::new(config.session_path.value.clone())),
            remote: Arc::new(remote),
        })
    }

    /// Asks the access guard whether a view requiring `capability` may run.
    pub fn authorize(&self, capability: Capability) -> Result<(), AccessDenied> {
        match AccessGuard::check(&self.session, capability) {
            Decision::Allow => Ok(()),
            Decision::RedirectToLogin => Err(AccessDenied::LoginRequired),
            Decision::RedirectToHome => Err(AccessDenied::WrongRole(capability)),
        }
    }
}

/// A view refused to render.
#[derive(Debug, PartialEq)]
pub enum AccessDenied {
    LoginRequired,
    WrongRole(Capability),
}

impl std::fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessDenied::LoginRequired => {
                write!(f, "Please log in first. Run 'market auth login'.")
            }
            AccessDenied::WrongRole(Capability::RequiresCustomer) => {
                write!(f, "This view requires a customer account")
            }
            AccessDenied::WrongRole(Capability::RequiresSeller) => {
                write!(f, "This view requires a seller account")
            }
            AccessDenied::WrongRole(Capability::Public) => {
                write!(f, "This view is not available")
            }
        }
    }
}

impl std::error::Error for AccessDenied {}

pub fn runtime() -> io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
}

/// Confirms on the terminal with a `[y/N]` prompt, or not at all with `--yes`.
pub struct PromptConfirm {
    pub assume_yes: bool,
}

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input) {
            Ok(_) => is_yes(&input),
            Err(_) => false,
        }
    }
}

fn is_yes(input: &str) -> bool {
    let answer = input.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Reads one line from stdin after printing `label`.
fn prompt_line(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(&['\r', '\n'][..]).to_string())
}

/// Reads a password without echoing it. Piped input is read as a plain line.
pub fn prompt_secret(label: &str) -> io::Result<String> {
    if !io::stdin().is_terminal() {
        return prompt_line(label);
    }
    print!("{}", label);
    io::stdout().flush()?;

    terminal::enable_raw_mode()?;
    let result = read_hidden();
    terminal::disable_raw_mode()?;
    println!();
    result
}

fn read_hidden() -> io::Result<String> {
    let mut secret = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            match apply_key(&mut secret, key) {
                SecretKey::Pending => {}
                SecretKey::Done => return Ok(secret),
                SecretKey::Cancelled => {
                    return Err(io::Error::new(io::ErrorKind::Interrupted, "Cancelled"))
                }
            }
        }
    }
}

#[derive(Debug, PartialEq)]
enum SecretKey {
    Pending,
    Done,
    Cancelled,
}

fn apply_key(secret: &mut String, key: KeyEvent) -> SecretKey {
    if key.kind == KeyEventKind::Release {
        return SecretKey::Pending;
    }
    match key.code {
        KeyCode::Enter => SecretKey::Done,
        KeyCode::Esc => SecretKey::Cancelled,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            SecretKey::Cancelled
        }
        KeyCode::Backspace => {
            secret.pop();
            SecretKey::Pending
        }
        KeyCode::Char(c) => {
            secret.push(c);
            SecretKey::Pending
        }
        _ => SecretKey::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketplace_core::{Role, Session};
    use tempfile::TempDir;

    fn context(temp_dir: &TempDir) -> Context {
        let config = Config::load(Some(temp_dir.path().join("missing.yaml"))).unwrap();
        let mut context = Context::from_config(&config).unwrap();
        context.session = Arc::new(SessionStore::new(temp_dir.path().join("session.json")));
        context
    }

    #[test]
    fn test_authorize_signed_out() {
        let temp_dir = TempDir::new().unwrap();
        let context = context(&temp_dir);

        let denied = context.authorize(Capability::Public).unwrap_err();
        assert_eq!(denied, AccessDenied::LoginRequired);
        assert!(denied.to_string().starts_with("Please log in first"));
    }

    #[test]
    fn test_authorize_wrong_role() {
        let temp_dir = TempDir::new().unwrap();
        let context = context(&temp_dir);
        context
            .session
            .set(&Session::new("t0k3n", "buyer@example.com", Role::Customer))
            .unwrap();

        assert!(context.authorize(Capability::RequiresCustomer).is_ok());
        assert!(context.authorize(Capability::Public).is_ok());
        let denied = context.authorize(Capability::RequiresSeller).unwrap_err();
        assert_eq!(denied.to_string(), "This view requires a seller account");
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("nope"));
    }

    #[test]
    fn test_secret_keys() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
        let mut secret = String::new();

        for c in "pass".chars() {
            assert_eq!(apply_key(&mut secret, press(KeyCode::Char(c))), SecretKey::Pending);
        }
        apply_key(&mut secret, press(KeyCode::Backspace));
        apply_key(&mut secret, press(KeyCode::Char('t')));
        assert_eq!(apply_key(&mut secret, press(KeyCode::Enter)), SecretKey::Done);
        assert_eq!(secret, "past");

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(apply_key(&mut secret, ctrl_c), SecretKey::Cancelled);
        assert_eq!(secret, "past");
    }

    #[test]
    fn test_assume_yes_skips_prompt() {
        assert!(PromptConfirm { assume_yes: true }.confirm("Delete?"));
    }
}
