use clap::Args;
use validator::ValidationErrors;

use barista::{
    context::AppContext,
    domain::session::{
        SessionError,
        models::{Credentials, ProfileSource, Registration},
    },
};

#[derive(Debug, Args)]
pub(crate) struct LoginArgs {
    /// Account email address
    #[arg(long)]
    email: String,

    /// Account password
    #[arg(long, env = "BARISTA_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Debug, Args)]
pub(crate) struct RegisterArgs {
    /// Username, at least 3 characters
    #[arg(long)]
    username: String,

    /// Email address
    #[arg(long)]
    email: String,

    /// Password, at least 6 characters
    #[arg(long, env = "BARISTA_PASSWORD", hide_env_values = true)]
    password: String,

    /// First name
    #[arg(long, default_value = "")]
    first_name: String,

    /// Last name
    #[arg(long, default_value = "")]
    last_name: String,
}

#[derive(Debug, Args)]
pub(crate) struct ProfileArgs {
    /// Fetch the profile from the server instead of the local copy
    #[arg(long)]
    sync: bool,
}

pub(crate) async fn login(context: &AppContext, args: LoginArgs) -> Result<(), String> {
    let user = context
        .session
        .login(Credentials::new(args.email, args.password))
        .await
        .map_err(|error| describe("login failed", &error))?;

    println!("Welcome back, {}!", user.display_name());
    println!("loyalty_points: {}", user.loyalty_points);

    Ok(())
}

pub(crate) async fn register(context: &AppContext, args: RegisterArgs) -> Result<(), String> {
    let user = context
        .session
        .register(Registration {
            username: args.username,
            email: args.email,
            password: args.password,
            first_name: args.first_name,
            last_name: args.last_name,
        })
        .await
        .map_err(|error| describe("registration failed", &error))?;

    println!("Welcome, {}!", user.display_name());

    Ok(())
}

pub(crate) fn logout(context: &AppContext) -> Result<(), String> {
    context
        .session
        .logout()
        .map_err(|error| format!("logout failed: {error}"))?;

    println!("logged out");

    Ok(())
}

pub(crate) async fn profile(context: &AppContext, args: &ProfileArgs) -> Result<(), String> {
    let user = if args.sync {
        context.session.sync_profile().await
    } else {
        context.session.get_profile().await
    }
    .map_err(|error| describe("could not load profile", &error))?;

    println!("username: {}", user.username);
    println!("email: {}", user.email);
    if !user.first_name.is_empty() || !user.last_name.is_empty() {
        println!("name: {} {}", user.first_name, user.last_name);
    }
    println!("loyalty_points: {}", user.loyalty_points);

    if context.session.profile_source() == Some(ProfileSource::Cached) {
        println!("(from local storage)");
    }

    if let Ok(Some(next)) = context.ledger.next_reward() {
        println!(
            "next_reward: {} in {} points",
            next.reward.name, next.points_needed
        );
    }

    Ok(())
}

/// Validation failures list every field message.
fn describe(action: &str, error: &SessionError) -> String {
    match error {
        SessionError::Validation(errors) => format!("{action}: {}", field_messages(errors)),
        other => format!("{action}: {other}"),
    }
}

pub(crate) fn field_messages(errors: &ValidationErrors) -> String {
    let messages: Vec<String> = errors
        .field_errors()
        .into_values()
        .flatten()
        .map(|error| {
            error
                .message
                .as_ref()
                .map_or_else(|| error.code.to_string(), ToString::to_string)
        })
        .collect();

    messages.join(" ")
}
