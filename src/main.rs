use anyhow::Result;
use clap::Parser as ClapParser;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

use cli::chunk_split::cmd_chunk_split;
use cli::command::{Cli, Commands, LogFormat};
use cli::info::cmd_info;
use cli::scan::cmd_sync_scan;
use cli::split::cmd_split;
use cli::unpack::cmd_unpack14;

mod cli;
mod input;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let base_level = cli.loglevel.to_level_filter();

    let multi = MultiProgress::new();

    let mut env_builder = env_logger::Builder::from_default_env();
    env_builder.filter_level(base_level);
    match cli.log_format {
        LogFormat::Plain => {
            env_builder.format_timestamp_secs();
        }
        LogFormat::Json => {
            env_builder.format(|buf, record| {
                use std::io::Write;
                writeln!(
                    buf,
                    "{{\"ts\":{},\"lvl\":\"{}\",\"msg\":\"{}\"}}",
                    buf.timestamp(),
                    record.level(),
                    record.args()
                )
            });
        }
    }

    let pb = if cli.progress {
        let logger = env_builder.build();
        LogWrapper::new(multi.clone(), logger).try_init()?;
        Some(&multi)
    } else {
        env_builder.try_init()?;
        None
    };

    match cli.command {
        Commands::Info(ref args) => cmd_info(args)?,
        Commands::SyncScan(ref args) => cmd_sync_scan(args, pb)?,
        Commands::Unpack14(ref args) => cmd_unpack14(args, &cli)?,
        Commands::Split(ref args) => cmd_split(args, &cli)?,
        Commands::ChunkSplit(ref args) => cmd_chunk_split(args)?,
    }

    Ok(())
}
