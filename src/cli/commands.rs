//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::{address, MenuService};
use crate::application::ApplicationError;
use crate::cli::args::{ButtonArgs, Cli, Commands, ConfigCommands, PayloadArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{Button, DomainError, Menu};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| InfraError::io("current directory", e))?,
    };
    let settings = Settings::load(Some(&project_dir))?;
    let menu_file = cli
        .file
        .clone()
        .unwrap_or_else(|| settings.menu_file.clone());
    debug!("menu_file: {}", menu_file.display());

    let container = ServiceContainer::new(settings);
    let ctx = Context {
        service: &container.menu_service,
        settings: &container.settings,
        path: &menu_file,
    };

    match &cli.command {
        Some(Commands::Init { force }) => _init(&ctx, *force),
        Some(Commands::Show) => _show(&ctx),
        Some(Commands::Json { compact }) => _json(&ctx, *compact),
        Some(Commands::Check) => _check(&ctx),
        Some(Commands::Len { top }) => _len(&ctx, *top),
        Some(Commands::Get { top, sub }) => _get(&ctx, *top, *sub),
        Some(Commands::AddTop { button }) => _add_top(&ctx, button),
        Some(Commands::AddSub { top, button }) => _add_sub(&ctx, *top, button),
        Some(Commands::Set { top, sub, payload }) => _set(&ctx, *top, *sub, payload),
        Some(Commands::MoveTop { old, new }) => _move_top(&ctx, *old, *new),
        Some(Commands::MoveSub { top, old, new }) => _move_sub(&ctx, *top, *old, *new),
        Some(Commands::Config { command }) => _config(&ctx, &project_dir, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e).into()),
    }
}

/// Everything a command needs besides its own arguments.
struct Context<'a> {
    service: &'a MenuService,
    settings: &'a Settings,
    path: &'a Path,
}

impl Context<'_> {
    fn load(&self) -> CliResult<Menu> {
        Ok(self.service.load(self.path)?)
    }
}

fn reject_stray_flags(args: &PayloadArgs) -> CliResult<()> {
    let stray = args.stray_flags();
    if stray.is_empty() {
        return Ok(());
    }
    Err(CliError::InvalidArgs(format!(
        "{} not used by type {}",
        stray.iter().map(|f| format!("--{}", f)).join(", "),
        args.kind()
    )))
}

fn build_button(args: &ButtonArgs) -> CliResult<Button> {
    reject_stray_flags(&args.payload)?;
    Ok(Button::from_value(&args.to_entry())?)
}

#[instrument(skip(ctx))]
fn _init(ctx: &Context, force: bool) -> CliResult<()> {
    ctx.service.init(ctx.path, force, ctx.settings.pretty)?;
    output::success(&format!("created {}", ctx.path.display()));
    Ok(())
}

#[instrument(skip(ctx))]
fn _show(ctx: &Context) -> CliResult<()> {
    let menu = ctx.load()?;
    output::info(&menu.to_tree(&ctx.path.display().to_string()));
    Ok(())
}

#[instrument(skip(ctx))]
fn _json(ctx: &Context, compact: bool) -> CliResult<()> {
    let menu = ctx.load()?;
    if compact {
        output::info(&menu.to_json());
    } else {
        output::info(&menu.to_json_pretty()?);
    }
    Ok(())
}

#[instrument(skip(ctx))]
fn _check(ctx: &Context) -> CliResult<()> {
    let menu = ctx.load()?;
    let violations = ctx.service.check(&menu);
    if violations.is_empty() {
        let sub_counts = menu
            .buttons()
            .iter()
            .map(|b| b.sub_buttons().len())
            .join("/");
        output::success(&format!(
            "{}: {} top-level buttons, sub buttons {}",
            ctx.path.display(),
            menu.len(),
            sub_counts
        ));
        return Ok(());
    }
    output::header(&ctx.path.display());
    for violation in &violations {
        output::failure(violation);
    }
    Err(CliError::Violations(violations.len()))
}

#[instrument(skip(ctx))]
fn _len(ctx: &Context, top: Option<usize>) -> CliResult<()> {
    let menu = ctx.load()?;
    let len = match top {
        None => menu.len(),
        Some(top) => menu.sub_len(top)?,
    };
    output::info(&len);
    Ok(())
}

#[instrument(skip(ctx))]
fn _get(ctx: &Context, top: usize, sub: Option<usize>) -> CliResult<()> {
    let menu = ctx.load()?;
    let value = menu
        .get(top, sub)
        .ok_or_else(|| ApplicationError::NodeNotFound(address(top, sub)))?;
    let text = serde_json::to_string_pretty(&value).map_err(DomainError::from)?;
    output::info(&text);
    Ok(())
}

#[instrument(skip(ctx))]
fn _add_top(ctx: &Context, args: &ButtonArgs) -> CliResult<()> {
    let button = build_button(args)?;
    let menu = ctx
        .service
        .edit(ctx.path, ctx.settings.pretty, |svc, menu| {
            svc.add_top(menu, button)
        })?;
    output::success(&format!("added '{}' at {}", args.name, menu.len() - 1));
    Ok(())
}

#[instrument(skip(ctx))]
fn _add_sub(ctx: &Context, top: usize, args: &ButtonArgs) -> CliResult<()> {
    let button = build_button(args)?;
    let menu = ctx
        .service
        .edit(ctx.path, ctx.settings.pretty, |svc, menu| {
            svc.add_sub(menu, top, button)
        })?;
    let sub = menu.sub_len(top)? - 1;
    output::success(&format!("added '{}' at {}", args.name, address(top, Some(sub))));
    Ok(())
}

#[instrument(skip(ctx))]
fn _set(ctx: &Context, top: usize, sub: Option<usize>, payload: &PayloadArgs) -> CliResult<()> {
    reject_stray_flags(payload)?;
    let kind = payload.kind();
    let fields = payload.to_payload();
    ctx.service
        .edit(ctx.path, ctx.settings.pretty, |svc, menu| {
            svc.set_variant(menu, top, sub, kind.as_str(), &fields)
        })?;
    output::success(&format!("{} is now {}", address(top, sub), kind));
    Ok(())
}

#[instrument(skip(ctx))]
fn _move_top(ctx: &Context, old: usize, new: usize) -> CliResult<()> {
    ctx.service
        .edit(ctx.path, ctx.settings.pretty, |_, menu| {
            Ok(menu.move_top_level(old, new)?)
        })?;
    output::success(&format!("moved {} -> {}", old, new));
    Ok(())
}

#[instrument(skip(ctx))]
fn _move_sub(ctx: &Context, top: usize, old: usize, new: usize) -> CliResult<()> {
    ctx.service
        .edit(ctx.path, ctx.settings.pretty, |_, menu| {
            Ok(menu.move_within_container(top, old, new)?)
        })?;
    output::success(&format!(
        "moved {} -> {}",
        address(top, Some(old)),
        address(top, Some(new))
    ));
    Ok(())
}

#[instrument(skip(ctx))]
fn _config(ctx: &Context, project_dir: &Path, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&ctx.settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let global = global_config_path()
                .map(|p| describe_config(&p))
                .unwrap_or_else(|| "<no config directory>".to_string());
            output::detail(&format!("global: {}", global));
            output::detail(&format!(
                "local:  {}",
                describe_config(&local_config_path(project_dir))
            ));
        }
    }
    Ok(())
}

fn describe_config(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}
