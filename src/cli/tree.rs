use colored::Colorize;
use termsnip::models::{Collection, DEFAULT_COMMAND_SEPARATOR, Snippet};
use unicode_width::UnicodeWidthStr;

/// Pads by display width so names in CJK scripts line up too
fn pad(name: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(name);
    format!("{}{}", name, " ".repeat(width.saturating_sub(used)))
}

fn name_width<'a>(snippets: impl Iterator<Item = &'a Snippet>) -> usize {
    snippets
        .map(|s| UnicodeWidthStr::width(s.name.as_str()))
        .max()
        .unwrap_or(0)
}

fn print_snippet(snippet: &Snippet, guide: &str, is_last: bool, width: usize) {
    print!("{}  {}", "┃".bright_magenta(), guide);
    if is_last {
        print!("└── ");
    } else {
        print!("├── ");
    }

    let marker = if snippet.is_edit {
        "✎ ".yellow()
    } else {
        "".normal()
    };
    println!(
        "{}{}  {}",
        marker,
        pad(&snippet.name, width).bright_white(),
        snippet
            .resolve(DEFAULT_COMMAND_SEPARATOR)
            .bright_black()
            .italic()
    );
}

/// Displays the collection in a tree-like structure: ungrouped snippets
/// first, then each group with its snippets.
pub fn display_tree(collection: &Collection, group_id: Option<&str>) {
    if collection.is_empty() {
        println!(
            "{}  No snippets yet. Add one with: termsnip add <NAME> <CMD>",
            "┃".bright_magenta()
        );
        return;
    }

    let width = name_width(collection.all_snippets().map(|(_, s)| s));

    let groups: Vec<_> = match group_id {
        Some(id) => collection.groups.iter().filter(|g| g.id == id).collect(),
        None => {
            let count = collection.snippets.len();
            for (idx, snippet) in collection.snippets.iter().enumerate() {
                let is_last = idx == count - 1 && collection.groups.is_empty();
                print_snippet(snippet, "", is_last, width);
            }
            collection.groups.iter().collect()
        }
    };

    let group_count = groups.len();
    for (idx, group) in groups.into_iter().enumerate() {
        let is_last_group = idx == group_count - 1;
        print!("{}  ", "┃".bright_magenta());
        if group_id.is_none() {
            print!("{}", if is_last_group { "└── " } else { "├── " });
        }
        println!(
            "{} {} {}",
            "󰠮".bright_blue(),
            group.group_name.bold(),
            format!("({})", group.snippets.len()).bright_black()
        );

        let guide = match (group_id.is_some(), is_last_group) {
            (true, _) => "",
            (false, true) => "    ",
            (false, false) => "┃   ",
        };
        if group.snippets.is_empty() {
            println!("{}  {}└── {}", "┃".bright_magenta(), guide, "(empty)".bright_black());
            continue;
        }

        let count = group.snippets.len();
        for (i, snippet) in group.snippets.iter().enumerate() {
            print_snippet(snippet, guide, i == count - 1, width);
        }
    }
}

pub fn list_groups(collection: &Collection) {
    if collection.groups.is_empty() {
        println!("{}  No groups found.", "┃".bright_magenta());
        return;
    }

    println!("{}  {}", "┃".bright_magenta(), "GROUPS".bold());
    for (idx, group) in collection.groups.iter().enumerate() {
        println!(
            "{}  {}. {} {}{}",
            "┃".bright_magenta(),
            (idx + 1).to_string().bright_yellow(),
            group.group_name.bright_white().bold(),
            format!("({} snippets)", group.snippets.len()).bright_black(),
            format!(" [{}]", group.id).bright_black().italic()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_uses_display_width() {
        assert_eq!(pad("ls", 4), "ls  ");
        // two wide characters take four columns
        assert_eq!(pad("一覧", 6), "一覧  ");
        assert_eq!(pad("toolong", 3), "toolong");
    }
}
