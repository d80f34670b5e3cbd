use clap::Args;

use barista::context::AppContext;

use crate::cli::output;

#[derive(Debug, Args)]
pub(crate) struct RedeemArgs {
    /// Reward id or name
    reward: String,
}

pub(crate) fn list(context: &AppContext) -> Result<(), String> {
    let rewards = context
        .ledger
        .rewards()
        .map_err(|error| format!("could not load rewards: {error}"))?;

    println!("{}", output::rewards_table(&rewards));

    if let Ok(Some(next)) = context.ledger.next_reward() {
        println!(
            "{} more points until {}",
            next.points_needed, next.reward.name
        );
    }

    Ok(())
}

pub(crate) async fn redeem(context: &AppContext, args: &RedeemArgs) -> Result<(), String> {
    let outcome = context
        .ledger
        .redeem(&args.reward)
        .await
        .map_err(|error| format!("redemption failed: {error}"))?;

    println!("{}", outcome.message());
    println!("remaining_points: {}", outcome.remaining_points);

    Ok(())
}
