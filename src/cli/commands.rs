use super::{Session, missing, take_all_options, take_flag, take_option, tree};
use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use termsnip::config::Settings;
use termsnip::models::{self, Collection, Container, Snippet};
use termsnip::reorder::{DragSource, DropTarget};
use termsnip::search::{self, MatchField};

fn success(message: &str) {
    println!("{}  {} {}", "┃".bright_magenta(), "✔".bright_green(), message);
}

fn failure(message: &str) {
    println!("{}  {} {}", "┃".bright_magenta(), "✘".bright_red(), message);
}

fn lookup_snippet(collection: &Collection, query: &str) -> Option<(Container, Snippet)> {
    match search::find_snippet(collection, query) {
        Some((container, snippet)) => Some((container, snippet.clone())),
        None => {
            println!(
                "{}  No snippet found with name: {}",
                "┃".bright_magenta(),
                query
            );
            None
        }
    }
}

fn lookup_group_id(collection: &Collection, query: &str) -> Option<String> {
    match search::find_group(collection, query) {
        Some(group) => Some(group.id.clone()),
        None => {
            println!("{}  No group found with name: {}", "┃".bright_magenta(), query);
            tree::list_groups(collection);
            None
        }
    }
}

pub fn list(session: &Session, group: Option<&str>) -> Result<()> {
    let collection = session.ui().collection();
    match group {
        Some(query) => {
            if let Some(group_id) = lookup_group_id(&collection, query) {
                tree::display_tree(&collection, Some(&group_id));
            }
        }
        None => tree::display_tree(&collection, None),
    }
    Ok(())
}

pub fn add_snippet(session: &mut Session, mut args: Vec<String>) -> Result<()> {
    let is_edit = take_flag(&mut args, "--edit");
    let group = take_option(&mut args, "--group")?;
    if args.len() < 2 {
        missing("add <NAME> <CMD>... [--group G] [--edit]");
        return Ok(());
    }

    let name = args.remove(0);
    let group_id = match group {
        Some(query) => match lookup_group_id(&session.ui().collection(), &query) {
            Some(id) => Some(id),
            None => return Ok(()),
        },
        None => None,
    };

    let id = session
        .ui_mut()
        .add_snippet(&name, args, is_edit, group_id.as_deref())?;
    session.settle();

    if session.ui().collection().find_snippet(&id).is_some() {
        success(&format!("Saved snippet {}", name.trim().bold()));
    } else {
        failure("Snippet was not saved; run with TERMSNIP_LOG=warn for details");
    }
    Ok(())
}

pub fn add_group(session: &mut Session, args: &[String]) -> Result<()> {
    let Some(name) = args.first() else {
        missing("group add <NAME>");
        return Ok(());
    };

    let id = session.ui_mut().add_group(name)?;
    session.settle();

    if session.ui().collection().group(&id).is_some() {
        success(&format!("Created group {}", name.trim().bold()));
    } else {
        failure("Group was not created");
    }
    Ok(())
}

pub fn rename_group(session: &mut Session, args: &[String]) -> Result<()> {
    if args.len() < 2 {
        missing("group rename <GROUP> <NAME>");
        return Ok(());
    }

    let collection = session.ui().collection();
    let Some(group_id) = lookup_group_id(&collection, &args[0]) else {
        return Ok(());
    };
    let Some(mut group) = collection.group(&group_id).cloned() else {
        return Ok(());
    };
    let name = args[1].trim().to_string();
    group.group_name = name.clone();

    session.ui_mut().update_group(group)?;
    session.settle();

    match session.ui().collection().group(&group_id) {
        Some(stored) if stored.group_name == name => {
            success(&format!("Renamed group to {}", name.bold()))
        }
        _ => failure("Group was not renamed"),
    }
    Ok(())
}

pub fn delete_group(session: &mut Session, args: &[String]) -> Result<()> {
    let Some(query) = args.first() else {
        missing("group rm <GROUP>");
        return Ok(());
    };

    let Some(group_id) = lookup_group_id(&session.ui().collection(), query) else {
        return Ok(());
    };
    session.ui_mut().delete_group(&group_id)?;
    session.settle();

    if session.ui().collection().group(&group_id).is_none() {
        success("Deleted group");
    } else {
        failure("Group was not deleted");
    }
    Ok(())
}

pub fn edit_snippet(session: &mut Session, mut args: Vec<String>) -> Result<()> {
    let name = take_option(&mut args, "--name")?;
    let commands = take_all_options(&mut args, "--cmd")?;
    let group = take_option(&mut args, "--group")?;
    let ungroup = take_flag(&mut args, "--ungroup");
    let confirm = take_flag(&mut args, "--edit");
    let no_confirm = take_flag(&mut args, "--no-edit");

    let Some(query) = args.first() else {
        missing("edit <SNIPPET> [--name N] [--cmd C]... [--group G | --ungroup] [--edit | --no-edit]");
        return Ok(());
    };

    let collection = session.ui().collection();
    let Some((container, current)) = lookup_snippet(&collection, query) else {
        return Ok(());
    };

    let target = if ungroup {
        None
    } else if let Some(query) = group {
        match lookup_group_id(&collection, &query) {
            Some(id) => Some(id),
            None => return Ok(()),
        }
    } else {
        container.group_id().map(String::from)
    };

    let updated = Snippet::new(
        current.id.clone(),
        name.as_deref().unwrap_or(&current.name),
        if commands.is_empty() {
            current.command.clone()
        } else {
            commands
        },
        (current.is_edit || confirm) && !no_confirm,
    );

    session
        .ui_mut()
        .update_snippet(updated.clone(), target.as_deref())?;
    session.settle();

    match session.ui().collection().find_snippet(&updated.id) {
        Some((_, stored)) if *stored == updated => {
            success(&format!("Updated snippet {}", updated.name.bold()))
        }
        _ => failure("Snippet was not updated"),
    }
    Ok(())
}

pub fn delete_snippet(session: &mut Session, args: &[String]) -> Result<()> {
    let Some(query) = args.first() else {
        missing("rm <SNIPPET>");
        return Ok(());
    };

    let Some((_, snippet)) = lookup_snippet(&session.ui().collection(), query) else {
        return Ok(());
    };
    session.ui_mut().delete_snippet(&snippet.id)?;
    session.settle();

    if session.ui().collection().find_snippet(&snippet.id).is_none() {
        success(&format!("Deleted snippet {}", snippet.name.bold()));
    } else {
        failure("Snippet was not deleted");
    }
    Ok(())
}

pub fn run_snippet(session: &mut Session, args: &[String]) -> Result<()> {
    let Some(query) = args.first() else {
        missing("run <SNIPPET> [--print]");
        return Ok(());
    };

    let Some((_, snippet)) = lookup_snippet(&session.ui().collection(), query) else {
        return Ok(());
    };
    session.ui_mut().run_snippet(&snippet)?;
    session.settle();
    Ok(())
}

pub fn move_snippet(session: &mut Session, args: &[String]) -> Result<()> {
    if args.len() < 2 {
        missing("move <SNIPPET> <TARGET_SNIPPET>");
        return Ok(());
    }

    let collection = session.ui().collection();
    let Some((from_container, from)) = lookup_snippet(&collection, &args[0]) else {
        return Ok(());
    };
    let Some((to_container, to)) = lookup_snippet(&collection, &args[1]) else {
        return Ok(());
    };

    let moved = session.ui_mut().reorder(
        &DragSource::Snippet {
            id: from.id,
            container: from_container,
        },
        &DropTarget::Snippet {
            id: to.id,
            container: to_container,
        },
    )?;
    session.settle();

    if moved {
        success(&format!("Moved {}", from.name.bold()));
    } else {
        failure("Nothing moved; snippets can only be reordered within their own list (use `edit --group`)");
    }
    Ok(())
}

pub fn move_group(session: &mut Session, args: &[String]) -> Result<()> {
    if args.len() < 2 {
        missing("move-group <GROUP> <TARGET_GROUP>");
        return Ok(());
    }

    let collection = session.ui().collection();
    let Some(from) = lookup_group_id(&collection, &args[0]) else {
        return Ok(());
    };
    let Some(to) = lookup_group_id(&collection, &args[1]) else {
        return Ok(());
    };

    let moved = session
        .ui_mut()
        .reorder(&DragSource::Group { id: from }, &DropTarget::Group { id: to })?;
    session.settle();

    if moved {
        success("Moved group");
    } else {
        failure("Nothing moved");
    }
    Ok(())
}

/// Searches for snippets matching a query string
pub fn search(session: &Session, args: &[String]) -> Result<()> {
    let Some(query) = args.first() else {
        missing("search <QUERY>");
        return Ok(());
    };

    let collection = session.ui().collection();
    let results = search::search_snippets(&collection, query);

    println!(
        "{}  {} '{}'",
        "┃".bright_magenta(),
        "SEARCH RESULTS FOR".bold(),
        query.bright_white()
    );

    if results.is_empty() {
        println!(
            "{}  No snippets found matching query: {}",
            "┃".bright_magenta(),
            query
        );
        return Ok(());
    }

    println!("{}", "─".repeat(60).bright_magenta());
    for (idx, result) in results.iter().enumerate() {
        let location = match &result.container {
            Container::Ungrouped => "(ungrouped)".to_string(),
            Container::Group(id) => collection
                .group(id)
                .map(|g| g.group_name.clone())
                .unwrap_or_else(|| id.clone()),
        };
        let field = match result.field {
            MatchField::Name => "name",
            MatchField::Command => "command",
        };

        println!(
            "{}  {}. {} (match in: {})",
            "┃".bright_magenta(),
            (idx + 1).to_string().bright_yellow(),
            result.snippet.name.bright_white().bold(),
            field.bright_green()
        );
        println!("{}     {}: {}", "┃".bright_magenta(), "Group".bright_blue(), location);
        if let Some(step) = result.match_context {
            println!("{}     {}: {}", "┃".bright_magenta(), "Command".bright_cyan(), step);
        }
        println!(
            "{}     {}: {}",
            "┃".bright_magenta(),
            "ID".bright_black(),
            result.snippet.id
        );
    }
    Ok(())
}

pub fn export(session: &Session, args: &[String]) -> Result<()> {
    let Some(path) = args.first() else {
        missing("export <FILE>");
        return Ok(());
    };

    let collection = session.ui().collection();
    models::export_collection(&collection, Path::new(path))?;
    success(&format!(
        "Exported {} snippets in {} groups to {}",
        collection.total_snippets(),
        collection.groups.len(),
        path
    ));
    Ok(())
}

pub fn import(session: &mut Session, settings: &Settings, args: &[String]) -> Result<()> {
    let Some(path) = args.first() else {
        missing("import <FILE>");
        return Ok(());
    };

    let bundle = models::import_bundle(Path::new(path))?;
    let backup = settings.storage()?.backup()?;
    tracing::info!("Backed up current documents to {}", backup.display());

    let (merged, stats) = models::merge_bundle(&session.ui().collection(), bundle);
    session.ui_mut().update_order(merged.snippets, merged.groups)?;
    session.settle();

    success(&format!(
        "Imported {} snippets and {} groups ({} skipped as duplicates)",
        stats.snippets_added, stats.groups_added, stats.skipped
    ));
    Ok(())
}
