use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use colored::{Color, Colorize};
use serde::Serialize;

use loam_crypto::ContentHasher;
use loam_index::{stage_paths, status, walk_files, Index, StagedEntry, SystemStat};
use loam_store::{LooseObjectStore, ObjectStore};
use loam_types::{ObjectId, ObjectKind, RepoConfig, RepoLayout, REPO_DIR};

use crate::cli::*;

/// Where a command runs and how it reports.
struct Ctx {
    cwd: PathBuf,
    format: OutputFormat,
}

impl Ctx {
    fn json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// The repository containing the working directory.
    fn repo(&self) -> anyhow::Result<RepoLayout> {
        let layout = RepoLayout::discover(&self.cwd).ok_or_else(|| {
            anyhow!(
                "not a loam repository (or any parent up to /): {}",
                REPO_DIR
            )
        })?;
        tracing::debug!(root = %layout.root().display(), "repository found");
        Ok(layout)
    }
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let ctx = Ctx {
        cwd: std::env::current_dir().context("cannot read current directory")?,
        format: cli.format,
    };
    run_in(&ctx, cli.command)
}

fn run_in(ctx: &Ctx, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Init(args) => cmd_init(ctx, args),
        Command::HashObject(args) => cmd_hash_object(ctx, args),
        Command::CatFile(args) => cmd_cat_file(ctx, args),
        Command::Add(args) => cmd_add(ctx, args),
        Command::LsFiles(args) => cmd_ls_files(ctx, args),
        Command::Status(_) => cmd_status(ctx),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Create the repository under `worktree`, returning its canonical layout and
/// whether it already existed.
fn init_repo(worktree: &Path) -> anyhow::Result<(RepoLayout, bool)> {
    let layout = RepoLayout::for_worktree(worktree);
    let existed = layout.root().is_dir();

    fs::create_dir_all(layout.objects_dir())
        .with_context(|| format!("cannot create {}", layout.objects_dir().display()))?;
    let worktree = fs::canonicalize(worktree)
        .with_context(|| format!("cannot resolve {}", worktree.display()))?;
    let layout = RepoLayout::for_worktree(&worktree);

    if !layout.config_path().exists() {
        let config = RepoConfig::default().to_toml()?;
        fs::write(layout.config_path(), config)
            .with_context(|| format!("cannot write {}", layout.config_path().display()))?;
    }
    Ok((layout, existed))
}

fn cmd_init(ctx: &Ctx, args: InitArgs) -> anyhow::Result<()> {
    let worktree = ctx.resolve(&args.path.unwrap_or_else(|| PathBuf::from(".")));
    let (layout, existed) = init_repo(&worktree)?;

    let verb = if existed { "Reinitialized existing" } else { "Initialized empty" };
    if ctx.json() {
        print_json(&serde_json::json!({
            "root": layout.root().display().to_string(),
            "reinitialized": existed,
        }))
    } else {
        println!(
            "{} {verb} loam repository in {}",
            "✓".green().bold(),
            layout.root().display().to_string().bold()
        );
        Ok(())
    }
}

fn cmd_hash_object(ctx: &Ctx, args: HashObjectArgs) -> anyhow::Result<()> {
    let kind: ObjectKind = args.kind.parse()?;
    let path = ctx.resolve(&args.file);
    let payload = fs::read(&path).with_context(|| format!("cannot read {}", path.display()))?;

    let (id, stored) = if args.write {
        let store = LooseObjectStore::open(&ctx.repo()?)?;
        let (id, stored) = store.write_object(kind, &payload)?;
        (id, Some(stored))
    } else {
        (ContentHasher::hash(kind, &payload), None)
    };

    if ctx.json() {
        print_json(&serde_json::json!({
            "id": id,
            "kind": kind,
            "size": payload.len(),
            "path": stored.map(|p| p.display().to_string()),
        }))
    } else {
        println!("{id}");
        Ok(())
    }
}

#[derive(Serialize)]
struct ObjectReport {
    id: ObjectId,
    kind: ObjectKind,
    size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

fn cmd_cat_file(ctx: &Ctx, args: CatFileArgs) -> anyhow::Result<()> {
    let store = LooseObjectStore::open(&ctx.repo()?)?;
    let (id, object) = store
        .get_by_prefix(&args.object)
        .with_context(|| format!("cannot read object {}", args.object))?;

    if ctx.json() {
        let content = args
            .print
            .then(|| String::from_utf8_lossy(&object.payload).into_owned());
        return print_json(&ObjectReport {
            id,
            kind: object.kind,
            size: object.size(),
            content,
        });
    }

    if args.show_type {
        println!("{}", object.kind);
    } else if args.show_size {
        println!("{}", object.size());
    } else {
        let mut out = std::io::stdout().lock();
        out.write_all(&object.payload)?;
        out.flush()?;
    }
    Ok(())
}

/// Canonical worktree and the canonical forms of `paths`.
fn canonical_paths(
    ctx: &Ctx,
    layout: &RepoLayout,
    paths: &[PathBuf],
) -> anyhow::Result<(PathBuf, Vec<PathBuf>)> {
    let worktree = fs::canonicalize(layout.worktree())
        .with_context(|| format!("cannot resolve {}", layout.worktree().display()))?;
    let paths = paths
        .iter()
        .map(|p| {
            let full = ctx.resolve(p);
            fs::canonicalize(&full)
                .with_context(|| format!("pathspec '{}' did not match any files", p.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok((worktree, paths))
}

fn cmd_add(ctx: &Ctx, args: AddArgs) -> anyhow::Result<()> {
    let layout = ctx.repo()?;
    let (worktree, paths) = canonical_paths(ctx, &layout, &args.paths)?;
    let store = LooseObjectStore::open(&layout)?;
    let mut index = Index::open(&layout).context("cannot load index")?;

    let staged = stage_paths(&store, &mut index, &SystemStat, &worktree, &paths)?;
    index.save().context("cannot write index")?;

    if ctx.json() {
        return print_json(&staged);
    }
    for entry in &staged {
        println!("  {} {}", "staged:".green(), entry.path);
    }
    Ok(())
}

fn cmd_ls_files(ctx: &Ctx, args: LsFilesArgs) -> anyhow::Result<()> {
    let index = Index::open(&ctx.repo()?).context("cannot load index")?;
    let entries: Vec<&StagedEntry> = index.iter().collect();

    if ctx.json() {
        return print_json(&entries);
    }
    for entry in entries {
        if args.stage {
            println!(
                "{:06o} {} {}\t{}",
                entry.mode,
                entry.object_id.to_string().yellow(),
                entry.flags,
                entry.path
            );
        } else {
            println!("{}", entry.path);
        }
    }
    Ok(())
}

fn cmd_status(ctx: &Ctx) -> anyhow::Result<()> {
    let layout = ctx.repo()?;
    let index = Index::open(&layout).context("cannot load index")?;
    let (worktree, _) = canonical_paths(ctx, &layout, &[])?;
    let files = walk_files(&worktree, REPO_DIR)?;
    let report = status(&index, &SystemStat, &worktree, &files)?;

    if ctx.json() {
        return print_json(&report);
    }
    if report.total_entries() == 0 {
        println!("Nothing staged. Working directory is empty.");
        return Ok(());
    }

    let sections = [
        ("Staged", &report.unchanged, "staged:", Color::Green),
        ("Changes not staged", &report.modified, "modified:", Color::Yellow),
        ("Deleted", &report.deleted, "deleted:", Color::Red),
        ("Untracked files", &report.untracked, "", Color::BrightBlack),
    ];
    for (title, paths, label, color) in sections {
        if paths.is_empty() {
            continue;
        }
        println!("{}:", title.bold());
        for path in paths {
            let line = if label.is_empty() {
                path.clone()
            } else {
                format!("{label:<10} {path}")
            };
            println!("  {}", line.color(color));
        }
    }
    if report.is_clean() {
        println!("\nWorking directory matches the index.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_store::StoreError;

    fn ctx(dir: &Path) -> Ctx {
        Ctx {
            cwd: dir.to_path_buf(),
            format: OutputFormat::Text,
        }
    }

    fn init(dir: &Path) -> RepoLayout {
        cmd_init(&ctx(dir), InitArgs { path: None }).unwrap();
        RepoLayout::for_worktree(dir)
    }

    #[test]
    fn init_creates_layout_and_config() {
        let dir = tempfile::tempdir().unwrap();
        let layout = init(dir.path());
        assert!(layout.objects_dir().is_dir());
        let config = RepoConfig::load(&layout.config_path()).unwrap();
        assert_eq!(config, RepoConfig::default());

        // Reinitializing keeps an edited config.
        fs::write(layout.config_path(), "[store]\ncompression = \"zstd\"\nlevel = 3\n").unwrap();
        init(dir.path());
        let config = RepoConfig::load(&layout.config_path()).unwrap();
        assert_eq!(config.store.level, 3);
    }

    #[test]
    fn init_reports_a_normalized_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let (layout, existed) = init_repo(&dir.path().join("sub/../.")).unwrap();
        assert!(!existed);
        let worktree = fs::canonicalize(dir.path()).unwrap();
        assert_eq!(layout.root(), worktree.join(REPO_DIR));
        assert!(layout
            .root()
            .components()
            .all(|c| matches!(c, std::path::Component::RootDir | std::path::Component::Normal(_))));

        let (_, existed) = init_repo(&worktree).unwrap();
        assert!(existed);
    }

    #[test]
    fn add_refuses_the_repository_directory() {
        let dir = tempfile::tempdir().unwrap();
        let layout = init(dir.path());
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        let add = |path: &str| {
            cmd_add(
                &ctx(dir.path()),
                AddArgs {
                    paths: vec![PathBuf::from(path)],
                },
            )
        };

        add("a.txt").unwrap();
        assert!(add(REPO_DIR).is_err());
        assert!(add(".loam/config.toml").is_err());

        let index = Index::open(&layout).unwrap();
        let paths: Vec<&str> = index.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["a.txt"]);
    }

    #[test]
    fn commands_outside_repo_fail() {
        let dir = tempfile::tempdir().unwrap();
        let err = cmd_ls_files(&ctx(dir.path()), LsFilesArgs { stage: false }).unwrap_err();
        assert!(err.to_string().contains("not a loam repository"));
    }

    #[test]
    fn hash_object_write_stores_blob() {
        let dir = tempfile::tempdir().unwrap();
        let layout = init(dir.path());
        fs::write(dir.path().join("hello.txt"), b"Hello World").unwrap();

        cmd_hash_object(
            &ctx(dir.path()),
            HashObjectArgs {
                write: true,
                kind: "blob".into(),
                file: PathBuf::from("hello.txt"),
            },
        )
        .unwrap();

        let store = LooseObjectStore::open(&layout).unwrap();
        let (id, obj) = store.get_by_prefix("5e1c30").unwrap();
        assert_eq!(id.to_hex(), "5e1c309dae7f45e0f39b1bf3ac3cd9db12e7d689");
        assert_eq!(obj.payload, b"Hello World");
    }

    #[test]
    fn hash_object_rejects_unknown_kind() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f"), b"x").unwrap();
        let err = cmd_hash_object(
            &ctx(dir.path()),
            HashObjectArgs {
                write: false,
                kind: "tag".into(),
                file: PathBuf::from("f"),
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("tag"));
    }

    #[test]
    fn add_stages_files_and_writes_index() {
        let dir = tempfile::tempdir().unwrap();
        let layout = init(dir.path());
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("b.txt"), b"b").unwrap();
        fs::write(dir.path().join("docs/a.md"), b"a").unwrap();

        cmd_add(
            &ctx(dir.path()),
            AddArgs {
                paths: vec![PathBuf::from("b.txt"), PathBuf::from("docs")],
            },
        )
        .unwrap();

        let index = Index::open(&layout).unwrap();
        let paths: Vec<&str> = index.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["b.txt", "docs/a.md"]);

        let store = LooseObjectStore::open(&layout).unwrap();
        for entry in index.iter() {
            assert!(store.contains(&entry.object_id).unwrap());
        }
    }

    #[test]
    fn add_from_subdirectory_uses_worktree_paths() {
        let dir = tempfile::tempdir().unwrap();
        let layout = init(dir.path());
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("x.txt"), b"x").unwrap();

        cmd_add(&ctx(&sub), AddArgs { paths: vec![PathBuf::from("x.txt")] }).unwrap();
        assert!(Index::open(&layout).unwrap().get("sub/x.txt").is_some());
    }

    #[test]
    fn add_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        init(dir.path());
        let err = cmd_add(&ctx(dir.path()), AddArgs { paths: vec![PathBuf::from("nope")] })
            .unwrap_err();
        assert!(err.to_string().contains("did not match"));
    }

    #[test]
    fn cat_file_rejects_short_prefix() {
        let dir = tempfile::tempdir().unwrap();
        init(dir.path());
        let err = cmd_cat_file(
            &ctx(dir.path()),
            CatFileArgs {
                show_type: true,
                show_size: false,
                print: false,
                object: "a".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::InvalidPrefix { .. })
        ));
    }

    #[test]
    fn status_runs_on_fresh_repo() {
        let dir = tempfile::tempdir().unwrap();
        init(dir.path());
        fs::write(dir.path().join("new.txt"), b"new").unwrap();
        cmd_status(&ctx(dir.path())).unwrap();
    }
}
