use clap::{Parser, Subcommand};
use crossbeam_channel::unbounded;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io;
use std::path::PathBuf;

use bnry::batch::{self, BatchEvent, CancelToken};
use bnry::classify::Classification;
use bnry::document::IplFile;
use bnry::rebuild::{copy_to_backup, rebuild_from_text, write_atomic};
use bnry::text::{car_to_line, instance_to_line};

#[derive(Parser)]
#[command(name = "bnry", about = "Binary IPL placement file toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show header fields, record counts and layout classification
    Info {
        input: PathBuf,
    },
    /// Export the record arrays as editable text
    Export {
        input: PathBuf,
        /// Where to write instance lines (stdout if omitted)
        #[arg(long)]
        instances: Option<PathBuf>,
        /// Where to write vehicle lines (stdout if omitted)
        #[arg(long)]
        cars: Option<PathBuf>,
    },
    /// Build a compact binary file from edited text
    Build {
        /// Instance lines, one record per line (section empty if omitted)
        #[arg(long)]
        instances: Option<PathBuf>,
        /// Vehicle lines, one record per line (section empty if omitted)
        #[arg(long)]
        cars: Option<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Rewrite one file in canonical compact form (backup + atomic replace)
    Rewrite {
        input: PathBuf,
    },
    /// Rewrite many files, skipping any whose layout is not fully understood
    Batch {
        #[arg(required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { input } => {
            let bytes = fs::read(&input)?;
            let file = IplFile::decode(&bytes)?;

            println!("── Binary IPL ───────────────────────────────────────────");
            println!("  Path           {}", input.display());
            println!("  Size           {} B", bytes.len());
            println!("  Instances      {} @ {}", file.header.instance_count(), file.header.instance_offset());
            println!("  Car spawns     {} @ {}", file.header.car_count(), file.header.car_offset());
            println!("  Layout         {}", match file.classification() {
                Classification::Compact  => "compact (rewritable)",
                Classification::Extended => "extended (read-only)",
            });
            println!("  Nonzero header fields:");
            for (index, value) in file.header.fields.iter().enumerate() {
                if *value != 0 {
                    println!("    [{index:>2}] {value}");
                }
            }
        }

        // ── Export ───────────────────────────────────────────────────────────
        Commands::Export { input, instances, cars } => {
            let bytes = fs::read(&input)?;
            let file = IplFile::decode(&bytes)?;

            let inst_lines: Vec<String> = file.instances.iter().map(instance_to_line).collect();
            let car_lines: Vec<String> = file.cars.iter().map(car_to_line).collect();

            write_section("instances", &inst_lines, instances.as_deref())?;
            write_section("cars", &car_lines, cars.as_deref())?;
        }

        // ── Build ────────────────────────────────────────────────────────────
        Commands::Build { instances, cars, output } => {
            let inst_text = read_section(instances.as_deref())?;
            let car_text = read_section(cars.as_deref())?;

            let bytes = rebuild_from_text(inst_text.lines(), car_text.lines())?;
            write_atomic(&output, &bytes)?;
            println!("Built: {} ({} B)", output.display(), bytes.len());
        }

        // ── Rewrite ──────────────────────────────────────────────────────────
        Commands::Rewrite { input } => {
            let original = fs::read(&input)?;
            let rebuilt = bnry::rebuild_preserving_original(&original)?;
            copy_to_backup(&input)?;
            write_atomic(&input, &rebuilt)?;
            println!("Rewrote: {} ({} B in, {} B out)", input.display(), original.len(), rebuilt.len());
        }

        // ── Batch ────────────────────────────────────────────────────────────
        Commands::Batch { input } => {
            let (tx, rx) = unbounded();
            let cancel = CancelToken::new();
            let handle = batch::spawn(input, tx, cancel);

            let pb = ProgressBar::hidden();
            for event in rx {
                match event {
                    BatchEvent::Started { total } => {
                        pb.set_length(total as u64);
                        pb.set_style(
                            ProgressStyle::default_bar()
                                .template("[{bar:40.cyan/blue}] {pos}/{len}")?
                                .progress_chars("#>-"),
                        );
                        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
                    }
                    BatchEvent::Succeeded { name } => {
                        pb.println(format!("  rewrote  {name}"));
                    }
                    BatchEvent::Skipped { name, reason } => {
                        pb.println(format!("  skipped  {name}: {reason}"));
                    }
                    BatchEvent::Errored { name, reason } => {
                        pb.println(format!("  ERROR    {name}: {reason}"));
                    }
                    BatchEvent::Progress { processed, .. } => {
                        pb.set_position(processed as u64);
                    }
                    BatchEvent::Finished(summary) => {
                        pb.finish_and_clear();
                        println!(
                            "{} rewritten, {} skipped, {} errored of {}{}",
                            summary.succeeded,
                            summary.skipped,
                            summary.errored,
                            summary.total,
                            if summary.cancelled { " (cancelled)" } else { "" },
                        );
                    }
                }
            }
            handle.join().ok();
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn write_section(title: &str, lines: &[String], path: Option<&std::path::Path>) -> io::Result<()> {
    match path {
        Some(p) => {
            let mut body = lines.join("\n");
            if !body.is_empty() {
                body.push('\n');
            }
            fs::write(p, body)?;
            println!("Wrote {} {} line(s) to {}", lines.len(), title, p.display());
        }
        None => {
            println!("── {title} ──");
            for line in lines {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn read_section(path: Option<&std::path::Path>) -> io::Result<String> {
    match path {
        Some(p) => fs::read_to_string(p),
        None => Ok(String::new()),
    }
}
