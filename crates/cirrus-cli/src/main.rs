use atty::Stream;
use cirrus_core::{
    CommandContext, CommandGroup, CommandInfo, ExecutionOutcome, GlobalOptions,
    MetadataListRequest, MetadataSaveRequest, ToolsEnsureRequest,
};
use cirrus_domain::api::MetadataFilter;
use clap::Parser;
use color_eyre::Result;
use serde_json::{json, Value};

mod cli;
mod style;

use cli::{CirrusCli, CommandGroupCli, FilterArgs, MetadataCommand, ToolsCommand};
use style::Style;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = CirrusCli::parse();
    init_tracing(cli.trace, cli.verbose);

    let global = GlobalOptions {
        quiet: cli.quiet,
        verbose: cli.verbose,
        trace: cli.trace,
        json: cli.json,
    };

    let info = command_info(&cli.command);
    let outcome = match CommandContext::new(&global) {
        Ok(ctx) => dispatch(&ctx, &cli.command)?,
        Err(err) => environment_outcome(&err),
    };
    let code = emit_output(&cli, info, &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn init_tracing(trace: bool, verbose: u8) {
    let level = if trace {
        "trace"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = format!("cirrus_core={level},cirrus_store={level},cirrus={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn command_info(command: &CommandGroupCli) -> CommandInfo {
    match command {
        CommandGroupCli::Metadata(sub) => CommandInfo::new(
            CommandGroup::Metadata,
            match sub {
                MetadataCommand::Refresh => "refresh",
                MetadataCommand::List(_) => "list",
                MetadataCommand::Search(_) => "search",
                MetadataCommand::Save(_) => "save",
            },
        ),
        CommandGroupCli::Tools(ToolsCommand::Ensure(_)) => {
            CommandInfo::new(CommandGroup::Tools, "ensure")
        }
    }
}

fn filter_from(args: &FilterArgs) -> MetadataFilter {
    MetadataFilter {
        region: args.region.clone().unwrap_or_default(),
        series: args.series.clone(),
        arches: args.arches.clone(),
        stream: args.stream.clone().unwrap_or_default(),
        ..MetadataFilter::default()
    }
}

fn dispatch(ctx: &CommandContext, command: &CommandGroupCli) -> Result<ExecutionOutcome> {
    let outcome = match command {
        CommandGroupCli::Metadata(MetadataCommand::Refresh) => cirrus_core::metadata_refresh(ctx),
        CommandGroupCli::Metadata(MetadataCommand::List(args)) => {
            let request = MetadataListRequest {
                filter: filter_from(args),
            };
            cirrus_core::metadata_list(ctx, &request)
        }
        CommandGroupCli::Metadata(MetadataCommand::Search(args)) => {
            let request = MetadataListRequest {
                filter: filter_from(args),
            };
            cirrus_core::metadata_search(ctx, &request)
        }
        CommandGroupCli::Metadata(MetadataCommand::Save(args)) => {
            let request = MetadataSaveRequest {
                path: args.path.clone(),
            };
            cirrus_core::metadata_save(ctx, &request)
        }
        CommandGroupCli::Tools(ToolsCommand::Ensure(args)) => {
            let request = ToolsEnsureRequest {
                series: args.series.clone(),
                arch: args.arch.clone(),
            };
            cirrus_core::tools_ensure(ctx, &request)
        }
    };
    outcome.map_err(|err| color_eyre::eyre::eyre!("{err:?}"))
}

fn environment_outcome(err: &anyhow::Error) -> ExecutionOutcome {
    ExecutionOutcome::user_error(
        "cannot load the environment",
        json!({
            "code": cirrus_core::diagnostics::commands::GENERIC,
            "reason": "environment",
            "error": format!("{err:#}"),
            "hint": "Point CIRRUS_ENVIRONMENT at a valid environment manifest.",
        }),
    )
}

fn emit_output(cli: &CirrusCli, info: CommandInfo, outcome: &ExecutionOutcome) -> Result<i32> {
    let code = outcome.status.exit_code();
    let style = Style::new(cli.no_color, atty::is(Stream::Stdout));

    if cli.json {
        let payload = cirrus_core::to_json_response(info, outcome);
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if !cli.quiet {
        let message = cirrus_core::format_status_message(info, &outcome.message);
        println!("{}", style.status(&outcome.status, &message));
        if let Some(hint) = hint_from_details(&outcome.details) {
            println!("{}", style.info(&format!("Hint: {hint}")));
        }
        for line in render_details(&style, info, &outcome.details) {
            println!("{line}");
        }
    }

    Ok(code)
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}

fn render_details(style: &Style, info: CommandInfo, details: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    for message in details
        .get("unavailable")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
    {
        lines.push(style.info(&format!("skipped: {message}")));
    }
    for failure in details
        .get("failures")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
    {
        lines.push(format!("  {failure}"));
    }
    match (info.group, info.name) {
        (CommandGroup::Metadata, "list") => {
            for group in details
                .get("groups")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
            {
                let source = group.get("source").and_then(Value::as_str).unwrap_or("-");
                lines.push(style.heading(source));
                let records = group.get("records").and_then(Value::as_array);
                lines.extend(record_table(records.map(Vec::as_slice).unwrap_or_default()));
            }
        }
        (CommandGroup::Metadata, "search") => {
            let records = details.get("records").and_then(Value::as_array);
            lines.extend(record_table(records.map(Vec::as_slice).unwrap_or_default()));
        }
        _ => {}
    }
    lines
}

fn record_table(records: &[Value]) -> Vec<String> {
    const COLUMNS: [&str; 5] = ["artifact_id", "region", "series", "arch", "stream"];
    let rows: Vec<Vec<&str>> = records
        .iter()
        .map(|record| {
            COLUMNS
                .iter()
                .map(|column| record.get(*column).and_then(Value::as_str).unwrap_or("-"))
                .collect()
        })
        .collect();
    let mut widths = COLUMNS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }
    rows.iter()
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect();
            format!("  {}", cells.join("  ").trim_end())
        })
        .collect()
}
