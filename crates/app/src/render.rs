//! Plain-text rendering of the workspace tree.

use std::fmt::Write;

use parcel_application::WorkspaceStore;
use parcel_application::ports::WorkspaceStateRepository;
use parcel_domain::DirectoryTree;

/// Renders every open collection the way the tree view shows it: only
/// expanded directories list their children.
///
/// Markers: `*` selected collection, `>` active file, `+`/`-` collapsed or
/// expanded directory.
pub fn render_workspace<W: WorkspaceStateRepository>(store: &WorkspaceStore<W>) -> String {
    if store.collections().is_empty() {
        return "No collections open. Use `parcel open [PATH]`.\n".to_string();
    }

    let mut out = String::new();
    for collection in store.collections() {
        let selected = store.selected_collection_id() == Some(collection.id.as_str());
        let _ = writeln!(
            out,
            "{} {} [{}] {}",
            if selected { '*' } else { ' ' },
            collection.name,
            collection.id,
            collection.path.display()
        );
        if store.is_expanded(&collection.path) {
            for child in collection.tree().children() {
                render_node(store, child, 1, &mut out);
            }
        }
    }
    out
}

fn render_node<W: WorkspaceStateRepository>(
    store: &WorkspaceStore<W>,
    node: &DirectoryTree,
    depth: usize,
    out: &mut String,
) {
    let indent = "  ".repeat(depth);
    if node.is_directory() {
        let expanded = store.is_expanded(node.path());
        let _ = writeln!(
            out,
            "{indent}{} {}/",
            if expanded { '-' } else { '+' },
            node.entry.name
        );
        if expanded {
            for child in node.children() {
                render_node(store, child, depth + 1, out);
            }
        }
    } else {
        let active = store.active_file() == Some(node.path());
        let _ = writeln!(
            out,
            "{indent}{} {}",
            if active { '>' } else { ' ' },
            node.entry.name
        );
    }
}
