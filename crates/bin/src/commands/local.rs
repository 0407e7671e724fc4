//! Local state commands - fallback key, profile and theme.

use uuid::Uuid;

use scholarai::{
    config::Provider,
    local_store::{LocalCredential, LocalStore},
    types::{Stream, UserProfile},
};

use crate::cli::{KeyAction, KeyArgs, ProfileAction, ProfileArgs, ThemeArgs};

/// Run the key command
pub async fn key(args: &KeyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = LocalStore::in_dir(args.data.dir());
    match &args.action {
        KeyAction::Set { provider, key } => {
            let provider: Provider = (*provider).into();
            let key = key.trim();
            if key.is_empty() {
                return Err("API key must not be empty".into());
            }
            store
                .set_credential(LocalCredential::new(provider, key))
                .await?;
            println!("Stored {provider} API key in {}", store.path().display());
        }
        KeyAction::Clear => {
            store.clear_credential().await?;
            println!("Removed stored API key");
        }
        KeyAction::Show => match store.credential().await? {
            Some(credential) => println!("{} API key stored", credential.provider),
            None => println!("No API key stored"),
        },
    }
    Ok(())
}

fn parse_stream(name: &str) -> Result<Stream, String> {
    match name.trim().to_ascii_lowercase().as_str() {
        "science" => Ok(Stream::Science),
        "commerce" => Ok(Stream::Commerce),
        "arts" => Ok(Stream::Arts),
        "general" => Ok(Stream::General),
        other => Err(format!(
            "Unknown stream '{other}'. Expected Science, Commerce, Arts or General"
        )),
    }
}

/// Run the profile command
pub async fn profile(args: &ProfileArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = LocalStore::in_dir(args.data.dir());
    match &args.action {
        ProfileAction::Set {
            name,
            email,
            grade,
            stream,
            exams,
        } => {
            let stream = stream.as_deref().map(parse_stream).transpose()?;
            let state = store
                .update(|state| {
                    let id = state
                        .profile
                        .as_ref()
                        .map(|p| p.id.clone())
                        .unwrap_or_else(|| Uuid::new_v4().to_string());
                    state.profile = Some(UserProfile {
                        id,
                        name: name.clone(),
                        email: email.clone(),
                        grade: grade.clone(),
                        stream,
                        competitive_exams: exams.clone(),
                    });
                })
                .await?;
            if let Some(profile) = state.profile {
                println!("Saved profile: {}", profile.user_context());
            }
        }
        ProfileAction::Show => match store.load().await?.profile {
            Some(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
            None => println!("No profile stored"),
        },
        ProfileAction::Clear => {
            store.update(|state| state.profile = None).await?;
            println!("Removed profile");
        }
    }
    Ok(())
}

/// Run the theme command
pub async fn theme(args: &ThemeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = LocalStore::in_dir(args.data.dir());
    let state = match (args.theme, args.toggle) {
        (Some(theme), _) => store.update(|state| state.theme = theme.into()).await?,
        (None, true) => {
            store
                .update(|state| state.theme = state.theme.toggle())
                .await?
        }
        (None, false) => store.load().await?,
    };
    println!("{}", state.theme);
    Ok(())
}
