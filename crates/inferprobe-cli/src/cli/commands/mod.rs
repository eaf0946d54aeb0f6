use super::args::*;

pub(crate) mod run;
pub(crate) mod validate;

use crate::exit_codes::EXIT_SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => run::run(args).await,
        Command::Validate(args) => validate::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(EXIT_SUCCESS)
        }
    }
}

/// Config file (if any) as the base layer.
pub(crate) fn base_config(
    path: Option<&std::path::Path>,
) -> inferprobe_core::ProbeResult<inferprobe_core::ProbeConfig> {
    match path {
        Some(p) => inferprobe_core::ProbeConfig::from_file(p),
        None => Ok(inferprobe_core::ProbeConfig::default()),
    }
}
