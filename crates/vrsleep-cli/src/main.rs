use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use vrsleep_core::api::types::MessageType;
use vrsleep_core::store::SettingsPatch;
use vrsleep_core::{CoreConfig, CoreEvent, LoginOutcome, VrSleepCore};

#[derive(Parser)]
#[command(name = "vrsleep")]
#[command(about = "VRChat sleep-mode auto-invite companion")]
struct Cli {
    /// Override the data directory (session, whitelist, settings)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to VRChat (prompts for the password and any second factor)
    Login {
        /// VRChat username; prompted for when omitted
        #[arg(long, short)]
        username: Option<String>,
    },

    /// Clear the stored session
    Logout,

    /// Show the current authentication and sleep-mode state
    Status,

    /// Enter sleep mode and keep responding to invite requests until Ctrl-C
    Watch,

    /// Manage the auto-invite whitelist
    Whitelist {
        #[command(subcommand)]
        action: WhitelistAction,
    },

    /// Read or update settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Inspect or update VRChat message slots
    Messages {
        #[command(subcommand)]
        action: MessagesAction,
    },

    /// List friends with their status
    Friends,
}

#[derive(Subcommand)]
enum WhitelistAction {
    /// Print the whitelist, one entry per line
    Get,
    /// Replace the whole whitelist
    Set { entries: Vec<String> },
    /// Append one entry
    Add { entry: String },
    /// Remove one entry (exact match)
    Remove { entry: String },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the merged settings as JSON
    Get,
    /// Apply a partial update given as a JSON object
    Set { json: String },
}

#[derive(Subcommand)]
enum MessagesAction {
    /// Fetch one slot
    Get {
        r#type: MessageType,
        slot: u8,
    },
    /// Fetch all 12 slots for a type
    GetAll { r#type: MessageType },
    /// Update one slot
    Set {
        r#type: MessageType,
        slot: u8,
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    vrsleep_core::logging::init_tracing();

    let cli = Cli::parse();
    let mut config = CoreConfig::from_env();
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    let core = VrSleepCore::new(config).context("failed to initialize core")?;

    match cli.command {
        Commands::Login { username } => login(&core, username).await,
        Commands::Logout => {
            core.logout();
            println!("Logged out.");
            Ok(())
        }
        Commands::Status => {
            let auth = core.auth_status();
            let sleep = core.sleep_status();
            if auth.authenticated {
                let name = auth
                    .user
                    .map(|user| user.display_name)
                    .filter(|name| !name.is_empty())
                    .or(auth.user_id)
                    .unwrap_or_default();
                println!("Logged in as {name}");
            } else {
                println!("Not logged in.");
            }
            println!(
                "Sleep mode: {}",
                if sleep.sleep_mode { "on" } else { "off" }
            );
            Ok(())
        }
        Commands::Watch => watch(&core).await,
        Commands::Whitelist { action } => {
            whitelist(&core, action);
            Ok(())
        }
        Commands::Settings { action } => settings(&core, action).await,
        Commands::Messages { action } => messages(&core, action).await,
        Commands::Friends => {
            let friends = core.friends().await?;
            for friend in friends {
                let description = if friend.status_description.is_empty() {
                    String::new()
                } else {
                    format!(" — {}", friend.status_description)
                };
                println!("{} [{}]{}", friend.display_name, friend.status, description);
            }
            Ok(())
        }
    }
}

async fn login(core: &VrSleepCore, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => prompt("Username: ")?,
    };
    let password = rpassword::prompt_password("Password: ")?;

    match core.login(&username, &password).await? {
        LoginOutcome::Ok { user } => {
            println!("Logged in as {}", user.display_name);
            Ok(())
        }
        LoginOutcome::TwoFactorRequired { methods } => {
            println!("Two-factor authentication required ({}).", methods.join(", "));
            let kind = if methods.len() == 1 {
                methods[0].clone()
            } else {
                prompt("Method: ")?
            };
            let code = prompt("Code: ")?;
            let user = core.verify_two_factor(&kind, &code).await?;
            if user.id.is_empty() {
                bail!("verification did not produce a signed-in user");
            }
            println!("Logged in as {}", user.display_name);
            Ok(())
        }
    }
}

/// Run the engine until Ctrl-C, echoing the activity log.
async fn watch(core: &VrSleepCore) -> Result<()> {
    if !core.auth_status().authenticated {
        bail!("not logged in; run `vrsleep login` first");
    }

    let mut events = core.subscribe();
    core.sleep_start().await;
    println!("Sleep mode on. Press Ctrl-C to stop.");

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(CoreEvent::Log { message, .. }) => println!("{message}"),
                    Ok(CoreEvent::SettingsChanged(_)) => {}
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    // Restores the pre-sleep status when it is still safe to do so.
    core.sleep_stop().await;
    println!("Sleep mode off.");
    Ok(())
}

fn whitelist(core: &VrSleepCore, action: WhitelistAction) {
    match action {
        WhitelistAction::Get => {
            for entry in core.whitelist() {
                println!("{entry}");
            }
        }
        WhitelistAction::Set { entries } => {
            let saved = core.set_whitelist(entries);
            println!("Whitelist now has {} entries.", saved.len());
        }
        WhitelistAction::Add { entry } => {
            let mut list = core.whitelist();
            if !list.contains(&entry) {
                list.push(entry);
            }
            let saved = core.set_whitelist(list);
            println!("Whitelist now has {} entries.", saved.len());
        }
        WhitelistAction::Remove { entry } => {
            let mut list = core.whitelist();
            list.retain(|existing| existing != &entry);
            let saved = core.set_whitelist(list);
            println!("Whitelist now has {} entries.", saved.len());
        }
    }
}

async fn settings(core: &VrSleepCore, action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Get => {
            let settings = core.settings();
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Set { json } => {
            let patch: SettingsPatch =
                serde_json::from_str(&json).context("invalid settings JSON")?;
            let next = core.update_settings(patch).await;
            println!("{}", serde_json::to_string_pretty(&next)?);
        }
    }
    Ok(())
}

async fn messages(core: &VrSleepCore, action: MessagesAction) -> Result<()> {
    match action {
        MessagesAction::Get { r#type, slot } => {
            let data = core.message_slot(r#type, slot).await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        MessagesAction::GetAll { r#type } => {
            let slots = core.all_message_slots(r#type).await?;
            println!("{}", serde_json::to_string_pretty(&slots)?);
        }
        MessagesAction::Set {
            r#type,
            slot,
            message,
        } => {
            let update = core.apply_message_slot(r#type, slot, &message).await?;
            println!("{}", serde_json::to_string_pretty(&update)?);
        }
    }
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
