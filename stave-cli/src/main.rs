use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use stave_core::persistence::{exchange, load_pack, Pack};
use stave_core::vcs::{Revision, RevisionId, RevisionTree};
use stave_core::{VcsError, VcsResult};

const USAGE: &str = "usage: stave [--verbose] <command> <pack.db> [args]

commands:
  log <pack.db>                 print the revision tree
  stashes <pack.db>             list stashes
  verify <pack.db>              check that the history is a valid tree
  export <pack.db> <revision>   print a revision subtree as JSON";

fn init_logging(verbose: bool) {
    use simplelog::*;

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let log_path = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stave")
        .join("stave.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path).or_else(|_| File::create("/tmp/stave.log")) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("stave: cannot create log file: {}", e);
            return;
        }
    };

    if WriteLogger::init(log_level, Config::default(), log_file).is_err() {
        eprintln!("stave: logger already initialized");
        return;
    }

    log::info!("stave starting (log level: {:?})", log_level);
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    let positional: Vec<&str> = args
        .iter()
        .filter(|a| !a.starts_with('-'))
        .map(String::as_str)
        .collect();

    init_logging(verbose);

    let result = match positional.as_slice() {
        ["log", path] => load(path).map(|pack| print_log(&pack)),
        ["stashes", path] => load(path).map(|pack| print_stashes(&pack)),
        ["verify", path] => load(path).map(|pack| print_verified(&pack)),
        ["export", path, revision] => load(path).and_then(|pack| export(&pack, revision)),
        _ => {
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("stave: {}", e);
            if e.is_fatal() {
                eprintln!("stave: the history cannot be repaired automatically");
            }
            ExitCode::FAILURE
        }
    }
}

fn load(path: &str) -> VcsResult<Pack> {
    load_pack(Path::new(path))
}

fn short(id: &RevisionId) -> &str {
    let s = id.as_str();
    s.get(..8).unwrap_or(s)
}

fn summary(revision: &Revision) -> String {
    let author = if revision.author.is_empty() {
        String::new()
    } else {
        format!(" <{}>", revision.author)
    };
    format!(
        "{} {}{} ({} item(s), {})",
        short(&revision.id),
        revision.message,
        author,
        revision.items.len(),
        revision.timestamp / 1000
    )
}

fn print_log(pack: &Pack) {
    for (depth, revision) in pack.tree.iter() {
        let marker = if revision.id == pack.head { "*" } else { " " };
        println!("{} {}{}", marker, "  ".repeat(depth), summary(revision));
        for item in &revision.items {
            println!(
                "  {}  {} {} {}",
                "  ".repeat(depth),
                item.status.as_str(),
                item.snapshot.vcs_type,
                item.snapshot.name
            );
        }
    }
}

fn print_stashes(pack: &Pack) {
    if pack.stashes.is_empty() && !pack.stashes.has_quick_stash() {
        println!("no stashes");
        return;
    }
    for stash in pack.stashes.iter() {
        println!("  {}", summary(stash));
    }
    if let Some(quick) = pack.stashes.quick_stash() {
        println!("q {}", summary(quick));
    }
}

fn print_verified(pack: &Pack) {
    let depth = pack.tree.iter().map(|(d, _)| d).max().unwrap_or(0);
    println!(
        "ok: {} revision(s), depth {}, head {}, {} stash(es)",
        pack.tree.len(),
        depth,
        short(&pack.head),
        pack.stashes.len()
    );
}

/// Exact id, or a prefix matching exactly one revision.
fn resolve(tree: &RevisionTree, query: &str) -> VcsResult<RevisionId> {
    let exact = RevisionId::from(query);
    if tree.contains(&exact) {
        return Ok(exact);
    }
    let matches: Vec<&Revision> = tree
        .iter()
        .map(|(_, r)| r)
        .filter(|r| r.id.as_str().starts_with(query))
        .collect();
    match matches.as_slice() {
        [only] => Ok(only.id.clone()),
        [] => Err(VcsError::NotFound(format!("revision {}", query))),
        _ => Err(VcsError::NotFound(format!("revision {} is ambiguous", query))),
    }
}

fn export(pack: &Pack, query: &str) -> VcsResult<()> {
    let id = resolve(&pack.tree, query)?;
    let subtree = pack
        .tree
        .subtree(&id)
        .ok_or_else(|| VcsError::NotFound(format!("revision {}", id)))?;
    println!("{}", exchange::encode_subtree(&subtree)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stave_core::vcs::StashesRepository;

    fn tree() -> RevisionTree {
        let mut root = Revision::new("root", "", Vec::new());
        root.id = RevisionId::from("0000aaaa-root");
        let mut tree = RevisionTree::new(root);
        for id in ["1234abcd-one", "1234ffff-two"] {
            let mut r = Revision::new(id, "", Vec::new());
            r.id = RevisionId::from(id);
            tree.append(&"0000aaaa-root".into(), r).unwrap();
        }
        tree
    }

    #[test]
    fn test_resolve_prefixes() {
        let tree = tree();
        assert_eq!(resolve(&tree, "1234abcd-one").unwrap().as_str(), "1234abcd-one");
        assert_eq!(resolve(&tree, "0000").unwrap().as_str(), "0000aaaa-root");
        assert!(matches!(resolve(&tree, "1234"), Err(VcsError::NotFound(_))));
        assert!(matches!(resolve(&tree, "9"), Err(VcsError::NotFound(_))));
    }

    #[test]
    fn test_export_reads_saved_pack() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.stave");
        let pack = Pack {
            tree: tree(),
            head: "1234abcd-one".into(),
            stashes: StashesRepository::new(),
        };
        stave_core::persistence::save_pack(&path, &pack, &Default::default()).unwrap();

        let loaded = load(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.tree.len(), 3);
        assert!(export(&loaded, "1234ff").is_ok());
        assert!(export(&loaded, "nope").is_err());
    }

    #[test]
    fn test_short_ids() {
        assert_eq!(short(&RevisionId::from("abc")), "abc");
        assert_eq!(short(&RevisionId::from("0123456789")), "01234567");
    }
}
