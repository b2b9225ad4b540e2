mod cli;

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;
use wavcutter_core::{plan_notes, run_with_progress, Config, ProgressEvent};

use crate::cli::build_cli;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = build_cli().get_matches();

    let input_path = matches
        .get_one::<PathBuf>("file_path")
        .expect("required argument");
    if !input_path.is_file() {
        return Err(anyhow!(
            "input file does not exist: {}",
            input_path.display()
        ));
    }

    let keep_existing = matches.get_flag("keep-existing");
    let dry_run = matches.get_flag("dry-run");

    let config = Config::builder(input_path)
        .clean_previous(!keep_existing)
        .build()
        .with_context(|| {
            format!(
                "failed to create configuration for '{}'",
                input_path.display()
            )
        })?;

    info!(
        "writing notes to '{}' with prefix '{}'",
        config.output_dir().display(),
        config.prefix()
    );

    if dry_run {
        let plan = plan_notes(&config)
            .with_context(|| format!("failed to plan notes for '{}'", input_path.display()))?;

        if plan.is_empty() {
            println!("Dry run: no notes would be exported.");
        } else {
            println!("Dry run: would export {} note(s):", plan.len());
            for path in plan {
                println!("  {}", path.display());
            }
        }

        return Ok(());
    }

    let progress = ProgressBar::new(0);
    progress.set_draw_target(ProgressDrawTarget::stderr());

    let bar_style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());

    let progress_handle = progress.clone();
    let result = run_with_progress(config, move |event| match event {
        ProgressEvent::Start { total_windows } => {
            progress_handle.set_style(bar_style.clone());
            progress_handle.set_length(total_windows);
        }
        ProgressEvent::Window { index, exported } => {
            progress_handle.set_position(index + 1);
            if exported {
                progress_handle.set_message("exported");
            } else {
                progress_handle.set_message("silent");
            }
        }
        ProgressEvent::Finish => {
            progress_handle.set_message("Completed");
        }
    })
    .with_context(|| format!("failed to cut '{}'", input_path.display()));

    progress.finish_and_clear();

    let metrics = result?;
    println!(
        "Encountered {} note window(s); exported {} file(s).",
        metrics.windows_encountered, metrics.notes_exported
    );

    Ok(())
}
