use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use cradle_console::{init_tracing, parse_now, render_config, render_patch, render_view};
use cradle_record::ProfileType;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Command::new("cradle-console")
        .version(cradle_sync::VERSION)
        .about("Profile views, edit payloads and sync configuration")
        .arg_required_else_help(true)
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("view")
                .about("Render the profile view of an exported record")
                .arg(
                    Arg::new("record")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Path to the record JSON"),
                )
                .arg(
                    Arg::new("profile-type")
                        .long("profile-type")
                        .value_parser(value_parser!(ProfileType))
                        .help("parent or surrogate; defaults to the record's role"),
                )
                .arg(
                    Arg::new("now")
                        .long("now")
                        .help("Clock for age calculation (RFC 3339)"),
                ),
        )
        .subcommand(
            Command::new("patch")
                .about("Show the partial update an edit would send")
                .arg(
                    Arg::new("record")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Path to the record JSON"),
                )
                .arg(
                    Arg::new("field")
                        .long("field")
                        .required(true)
                        .help("Field name, e.g. form2Data.fertility"),
                )
                .arg(
                    Arg::new("value")
                        .long("value")
                        .required(true)
                        .help("New value as JSON; bare text is taken as a string"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Print the effective sync configuration")
                .arg(
                    Arg::new("file")
                        .long("file")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML config file"),
                ),
        );

    let matches = cli.get_matches();
    init_tracing(matches.get_flag("json-logs"))?;

    match matches.subcommand() {
        Some(("view", args)) => {
            let text = read_record(args).await?;
            let profile_type = args.get_one::<ProfileType>("profile-type").copied();
            let now = parse_now(args.get_one::<String>("now").map(String::as_str))?;
            println!("{}", render_view(&text, profile_type, now)?);
        }
        Some(("patch", args)) => {
            let text = read_record(args).await?;
            let field = args
                .get_one::<String>("field")
                .context("--field is required")?;
            let value = args
                .get_one::<String>("value")
                .context("--value is required")?;
            println!("{}", render_patch(&text, field, value)?);
        }
        Some(("config", args)) => {
            let file = args.get_one::<PathBuf>("file");
            print!("{}", render_config(file.map(PathBuf::as_path))?);
        }
        _ => {}
    }

    Ok(())
}

async fn read_record(args: &clap::ArgMatches) -> Result<String> {
    let path = args
        .get_one::<PathBuf>("record")
        .context("record path is required")?;
    tracing::debug!(path = %path.display(), "reading record");
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))
}
