use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result, bail};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use super::command::SyncScanArgs;
use dtscore::process::scan::{ScanEvent, Scanner};
use dtscore::utils::errors::ScanError;

pub fn cmd_sync_scan(args: &SyncScanArgs, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!("Scanning DTS stream: {}", args.input.display());

    let file = File::open(&args.input)
        .with_context(|| format!("cannot open {}", args.input.display()))?;
    let mut scanner = Scanner::with_resync_window(BufReader::new(file), args.resync_window);

    let pb = match multi {
        Some(multi) => {
            let pb = multi.add(ProgressBar::new_spinner());
            pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            pb.set_message("Scanning frames...");
            Some(pb)
        }
        None => None,
    };

    let mut lost = None;
    let mut frames = 0u64;

    for event in &mut scanner {
        match event? {
            ScanEvent::Frame { offset, header, .. } => {
                frames += 1;
                if !header.is_nominal_size() {
                    report(
                        &pb,
                        format!("fsize={:#x} at {offset:#x}", header.frame_bytes()),
                    );
                }
            }
            ScanEvent::Desync { offset } => {
                report(&pb, format!("desync at {offset:#x}"));
            }
            ScanEvent::Resync {
                offset, skipped, ..
            } => {
                report(&pb, format!("resync at {offset:#x} (+{skipped:#x})"));
            }
            ScanEvent::LostSync {
                offset, trailing, ..
            } => {
                report(&pb, "lost sync".to_string());
                lost = Some((offset, trailing));
            }
        }

        if frames.is_multiple_of(100) {
            if let Some(ref pb) = pb {
                pb.set_message(format!("Scanning frames...       {frames}"));
                pb.tick();
            }
        }
    }

    if let Some(ref pb) = pb {
        pb.finish_and_clear();
    }

    println!("{} frames", scanner.frames());

    if let Some((offset, trailing)) = lost {
        bail!(ScanError::LostSync { offset, trailing });
    }

    Ok(())
}

fn report(pb: &Option<ProgressBar>, line: String) {
    match pb {
        Some(pb) => pb.suspend(|| println!("{line}")),
        None => println!("{line}"),
    }
}
