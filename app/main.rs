use std::{
    io::{stdin, stdout, BufRead, Write},
    path::PathBuf,
};

use clap::{Parser, Subcommand};
use lib::{
    archive::ArchiveSink, content_store::ContentStore, CommitId, Config, Error, Outcome,
    Repository,
};

#[derive(Parser, Debug)]
#[clap(about = "a minimal single-timeline version control shell")]
struct Arguments {
    #[arg(long, default_value = ".", help = "directory holding the working files")]
    root: PathBuf,
    #[arg(long, default_value = ".vcs", help = "archive directory, relative to the root")]
    archive_dir: String,
    #[arg(long, help = "keep the archive directory on exit")]
    keep_archive: bool,
}

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[clap(about = "start tracking a file and stage it")]
    Add { file: String },
    #[clap(about = "stage new content for a tracked file")]
    Edit {
        file: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        content: Vec<String>,
    },
    #[clap(about = "commit every edited staged file")]
    Commit {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        message: Vec<String>,
    },
    #[clap(about = "show every commit")]
    Log,
    #[clap(about = "restore the files of a commit")]
    Checkout { id: CommitId },
    #[clap(about = "show the staged files")]
    Status,
    #[clap(about = "show the working files")]
    Files,
    #[clap(about = "check a commit's archive against its snapshots")]
    Verify { id: CommitId },
    #[clap(about = "leave the shell")]
    Exit,
}

type Input = std::io::Lines<std::io::StdinLock<'static>>;

fn prompt(input: &mut Input, text: &str) -> Result<Option<String>, Error> {
    print!("{}", text);
    stdout().flush()?;
    Ok(input.next().transpose()?)
}

fn confirm(input: &mut Input, text: &str) -> Result<bool, Error> {
    Ok(prompt(input, text)?
        .map(|answer| answer.trim().eq_ignore_ascii_case("y"))
        .unwrap_or(false))
}

fn add<S: ContentStore, A: ArchiveSink>(
    repo: &mut Repository<S, A>,
    input: &mut Input,
    file: &str,
) -> Result<Outcome, Error> {
    match repo.add(file) {
        Err(Error::NotOnDisk(_)) => {}
        other => return other,
    }
    if !confirm(input, "File does not exist on disk. Create new? (y/n): ")? {
        return Err(Error::NotOnDisk(file.to_string()));
    }
    let created = repo.create(file)?;
    println!("{}", created);
    if confirm(input, "Do you want to edit now? (y/n): ")? {
        return edit(repo, input, file, None);
    }
    Ok(created)
}

fn edit<S: ContentStore, A: ArchiveSink>(
    repo: &mut Repository<S, A>,
    input: &mut Input,
    file: &str,
    content: Option<&str>,
) -> Result<Outcome, Error> {
    if repo.working_file(file).is_none() {
        return Err(Error::FileNotFound(file.to_string()));
    }
    let content = match content {
        Some(content) => content.to_string(),
        None => {
            let text = format!("Enter new content for {}: ", file);
            prompt(input, &text)?.unwrap_or_default()
        }
    };
    repo.edit(file, content)
}

/// The text following the first `words` words of `line`, exactly as typed
/// apart from the single separator after the last skipped word.
fn rest_after(line: &str, words: usize) -> &str {
    let mut rest = line;
    for _ in 0..words {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = &rest[end..];
    }
    rest.strip_prefix(char::is_whitespace).unwrap_or(rest)
}

fn run(args: Arguments) -> Result<(), Error> {
    let config = Config::default()
        .with_working_root(args.root)
        .with_archive_dir(args.archive_dir)
        .with_keep_archive(args.keep_archive);
    log::info!("starting with {:?}", config);
    let mut repo = Repository::open(&config)?;
    let mut input: Input = stdin().lines();

    println!(
        "Mini VCS running. Commands: add <file>, edit <file>, commit <msg>, log, \
         checkout <id>, status, files, verify <id>, exit"
    );
    while let Some(line) = prompt(&mut input, ">> ")? {
        if line.trim().is_empty() {
            continue;
        }
        let words = line.split_whitespace();
        let cmd = match Line::try_parse_from(words) {
            Ok(line) => line.cmd,
            Err(err) => {
                let _ = err.print();
                continue;
            }
        };
        use Command::*;
        let result = match cmd {
            Add { file } => add(&mut repo, &mut input, &file),
            Edit { file, content } => {
                let content = (!content.is_empty()).then(|| rest_after(&line, 2));
                edit(&mut repo, &mut input, &file, content)
            }
            Commit { .. } => repo.commit(rest_after(&line, 1)),
            Checkout { id } => repo.checkout(id),
            Log => {
                print!("{}", repo.render_log());
                continue;
            }
            Status => {
                for file in repo.staged_files() {
                    println!("{}", file);
                }
                continue;
            }
            Files => {
                println!("Current Working Files:");
                for file in repo.working_files() {
                    println!("{}", file);
                }
                continue;
            }
            Verify { id } => {
                match repo.verify(id) {
                    Ok(report) => println!("{}", report),
                    Err(err) => println!("{}", err),
                }
                continue;
            }
            Exit => break,
        };
        match result {
            Ok(outcome) => println!("{}", outcome),
            Err(err) => println!("{}", err),
        }
    }
    repo.close()
}

fn main() {
    env_logger::init();
    if let Err(err) = run(Arguments::parse()) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

#[test]
fn test_rest_after_keeps_inner_spacing() {
    assert_eq!(rest_after("edit a.txt a  b", 2), "a  b");
    assert_eq!(rest_after("commit fix   the  bug ", 1), "fix   the  bug ");
    assert_eq!(rest_after("  commit  two", 1), " two");
    assert_eq!(rest_after("edit a.txt", 2), "");
}

#[test]
fn test_lines_parse() {
    let line = Line::try_parse_from("edit a.txt a  b".split_whitespace()).unwrap();
    assert!(matches!(line.cmd, Command::Edit { ref file, .. } if file == "a.txt"));
    let line = Line::try_parse_from("checkout 2".split_whitespace()).unwrap();
    assert!(matches!(line.cmd, Command::Checkout { id } if id == CommitId::from(2)));
    assert!(Line::try_parse_from("commit".split_whitespace()).is_err());
}
