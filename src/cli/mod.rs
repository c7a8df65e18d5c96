//! CLI Module for termsnip
//! Every command opens a local session (router + frontend store joined by an
//! in-process channel), issues its request through the frontend and waits
//! for the host's snapshots before printing.

pub mod commands;
pub mod tree;

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use termsnip::LocalSession;
use termsnip::client::UuidGenerator;
use termsnip::config::Settings;
use termsnip::host::{
    CommandPrompt, CommandRouter, DeclinePrompt, EditorPrompt, PrintTerminal, ShellOutput,
    ShellSession, TerminalDispatcher, serve,
};
use termsnip::models::StorageManager;

pub type Session = LocalSession<StorageManager, UuidGenerator>;

/// Executes CLI commands based on the provided arguments
pub fn execute_cli(args: &[String]) -> Result<()> {
    let mut args = args.to_vec();
    let mut settings = Settings::load()?;
    if let Some(dir) = take_option(&mut args, "--data-dir")? {
        settings.data_dir = Some(PathBuf::from(dir));
    }

    if args.is_empty() {
        print_help();
        return Ok(());
    }

    let command = args.remove(0);
    match command.as_str() {
        "host" => {
            let terminal = ShellSession::new(settings.shell_program(), settings.auto_run)
                .with_output(ShellOutput::Stderr);
            let router = build_router(&settings, Box::new(terminal), Box::new(DeclinePrompt))?;
            serve::serve_stdio(router)
        }
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        _ => {
            let print_only = take_flag(&mut args, "--print");
            let terminal: Box<dyn TerminalDispatcher> = if print_only {
                Box::new(PrintTerminal)
            } else {
                Box::new(ShellSession::new(settings.shell_program(), settings.auto_run))
            };
            let prompt = Box::new(EditorPrompt::new(settings.editor.clone()));
            let router = build_router(&settings, terminal, prompt)?;
            let mut session = LocalSession::open(router, UuidGenerator)
                .context("Failed to open snippet store")?;

            run_command(&mut session, &settings, &command, args)
        }
    }
}

fn run_command(
    session: &mut Session,
    settings: &Settings,
    command: &str,
    mut args: Vec<String>,
) -> Result<()> {
    match command {
        "list" | "ls" => commands::list(session, args.first().map(String::as_str)),
        "groups" => {
            tree::list_groups(&session.ui().collection());
            Ok(())
        }
        "add" => commands::add_snippet(session, args),
        "group" => {
            if args.is_empty() {
                missing("group <add|rename|rm> ...");
                return Ok(());
            }
            let action = args.remove(0);
            match action.as_str() {
                "add" => commands::add_group(session, &args),
                "rename" => commands::rename_group(session, &args),
                "rm" | "delete" => commands::delete_group(session, &args),
                other => {
                    println!("{}  Unknown group action: {}", "┃".bright_magenta(), other);
                    Ok(())
                }
            }
        }
        "edit" => commands::edit_snippet(session, args),
        "rm" | "delete" => commands::delete_snippet(session, &args),
        "run" => commands::run_snippet(session, &args),
        "move" | "mv" => commands::move_snippet(session, &args),
        "move-group" => commands::move_group(session, &args),
        "search" | "find" => commands::search(session, &args),
        "export" => commands::export(session, &args),
        "import" => commands::import(session, settings, &args),
        other => {
            println!("{}  Unknown command: {}", "┃".bright_magenta(), other);
            print_help();
            Ok(())
        }
    }
}

fn build_router(
    settings: &Settings,
    terminal: Box<dyn TerminalDispatcher>,
    prompt: Box<dyn CommandPrompt>,
) -> Result<CommandRouter<StorageManager>> {
    let storage = settings.storage()?;
    tracing::debug!("Using data directory {}", storage.data_directory().display());
    Ok(CommandRouter::new(storage, terminal, prompt)
        .with_separator(settings.command_separator.clone())
        .with_group_delete_policy(settings.group_delete_policy))
}

/// Removes `flag` from `args`, reporting whether it was present
pub fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    let before = args.len();
    args.retain(|arg| arg != flag);
    args.len() != before
}

/// Removes `flag <VALUE>` from `args` and returns the value
pub fn take_option(args: &mut Vec<String>, flag: &str) -> Result<Option<String>> {
    let Some(index) = args.iter().position(|arg| arg == flag) else {
        return Ok(None);
    };
    if index + 1 >= args.len() {
        anyhow::bail!("{} needs a value", flag);
    }
    let value = args.remove(index + 1);
    args.remove(index);
    Ok(Some(value))
}

/// Removes every `flag <VALUE>` occurrence, keeping their order
pub fn take_all_options(args: &mut Vec<String>, flag: &str) -> Result<Vec<String>> {
    let mut values = Vec::new();
    while let Some(value) = take_option(args, flag)? {
        values.push(value);
    }
    Ok(values)
}

pub fn missing(usage: &str) {
    println!("{}  Error: Missing arguments", "┃".bright_magenta());
    println!("{}  Usage: termsnip {}", "┃".bright_magenta(), usage);
}

/// Prints the help message with available commands
fn print_help() {
    println!(
        "{}  {}",
        "┃".bright_magenta(),
        "TERMSNIP - TERMINAL SNIPPETS".bold()
    );

    println!("{}  {}", "┃".bright_magenta(), "USAGE:".bright_yellow());
    println!(
        "{}  termsnip [--data-dir DIR] [COMMAND] [ARGS]",
        "┃".bright_magenta()
    );
    println!("{}  {}", "┃".bright_magenta(), "COMMANDS:".bright_yellow());

    let rows = [
        ("list, ls [GROUP]", "Show snippets and groups in tree format"),
        ("groups", "List all groups with their IDs"),
        ("add <NAME> <CMD>...", "Save a snippet (--group G, --edit)"),
        ("group add <NAME>", "Create an empty group"),
        ("group rename <G> <NAME>", "Rename a group"),
        ("group rm <G>", "Delete a group"),
        ("edit <S>", "Change a snippet (--name, --cmd, --group G, --ungroup)"),
        ("rm <S>", "Delete a snippet"),
        ("run <S>", "Run a snippet in the shell session (--print)"),
        ("move <S> <TARGET>", "Move a snippet to another's position"),
        ("move-group <G> <TARGET>", "Move a group to another's position"),
        ("search, find <QUERY>", "Search snippet names and commands"),
        ("export <FILE>", "Write all snippets and groups to a JSON file"),
        ("import <FILE>", "Merge snippets and groups from a JSON file"),
        ("host", "Serve the JSON message protocol over stdin/stdout"),
        ("help", "Display this help message"),
    ];
    for (usage, description) in rows {
        println!(
            "{}  {:<27} {}",
            "┃".bright_magenta(),
            usage.bright_white(),
            description
        );
    }

    println!("{}  {}", "┃".bright_magenta(), "TIP:".bright_green());
    println!(
        "{}  Snippets and groups can be named by ID or by (partial) name",
        "┃".bright_magenta()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn options_are_removed_from_args() {
        let mut list = args(&["deploy", "--group", "ops", "make deploy", "--edit"]);
        assert!(take_flag(&mut list, "--edit"));
        assert_eq!(take_option(&mut list, "--group").unwrap(), Some("ops".to_string()));
        assert_eq!(list, args(&["deploy", "make deploy"]));
        assert!(!take_flag(&mut list, "--edit"));
    }

    #[test]
    fn repeated_options_keep_order_and_dangling_is_error() {
        let mut list = args(&["x", "--cmd", "a", "--cmd", "b"]);
        assert_eq!(take_all_options(&mut list, "--cmd").unwrap(), args(&["a", "b"]));
        assert_eq!(list, args(&["x"]));

        let mut dangling = args(&["x", "--group"]);
        assert!(take_option(&mut dangling, "--group").is_err());
    }
}
