use std::{fs, path::PathBuf};

use clap::Args;

use barista::{backup::Dataset, context::AppContext};

#[derive(Debug, Args)]
pub(crate) struct ExportArgs {
    /// Dataset to export
    #[arg(value_enum)]
    dataset: Dataset,

    /// Destination file
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Debug, Args)]
pub(crate) struct ImportArgs {
    /// Dataset to replace
    #[arg(value_enum)]
    dataset: Dataset,

    /// CSV file to read
    #[arg(short, long)]
    input: PathBuf,
}

pub(crate) fn export(context: &AppContext, args: &ExportArgs) -> Result<(), String> {
    let text = context
        .backup
        .export(args.dataset)
        .map_err(|error| format!("export failed: {error}"))?;

    fs::write(&args.output, text)
        .map_err(|error| format!("could not write {}: {error}", args.output.display()))?;

    println!("{} exported to {}", args.dataset, args.output.display());

    Ok(())
}

pub(crate) async fn import(context: &AppContext, args: &ImportArgs) -> Result<(), String> {
    let text = fs::read_to_string(&args.input)
        .map_err(|error| format!("could not read {}: {error}", args.input.display()))?;

    let count = context
        .backup
        .import(args.dataset, &text)
        .await
        .map_err(|error| format!("import failed: {error}"))?;

    println!("{count} {} records imported", args.dataset);

    Ok(())
}
