//! CLI probe for catalog files.
//!
//! # Responsibility
//! - Open (or create) a catalog file and print its tree and memo count.
//! - Keep output deterministic for quick local sanity checks.

use memocat_core::{Catalog, NodeId, TreeModel};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: memocat <catalog-file>");
        return ExitCode::FAILURE;
    };

    match run(Path::new(&path)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = std::env::temp_dir().join("memocat").join("logs");
    if let Some(log_dir) = log_dir.to_str() {
        if let Err(err) = memocat_core::init_logging(memocat_core::default_log_level(), log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let catalog = if path.exists() {
        Catalog::open(path)?
    } else {
        Catalog::create(path)?
    };

    println!(
        "catalog: {} (core {})",
        catalog.file_name().unwrap_or_else(|| "<memory>".to_string()),
        memocat_core::core_version()
    );

    let tree = catalog.load_tree()?;
    if tree.is_empty() {
        println!("(empty catalog)");
    }
    for root in tree.roots() {
        print_subtree(&tree, *root, 0);
    }
    println!("folders: {}, memos: {}", tree.folder_count(), catalog.count_memos()?);
    Ok(())
}

fn print_subtree(tree: &TreeModel, id: NodeId, depth: usize) {
    if let Some(payload) = tree.payload(id) {
        let marker = if payload.is_folder() { "/" } else { "" };
        println!("{}{}{marker}", "  ".repeat(depth), payload.title());
        for child in tree.children(id) {
            print_subtree(tree, *child, depth + 1);
        }
    }
}
