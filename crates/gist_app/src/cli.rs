use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use gist_core::RunFlags;

/// gist-upload - upload local files as GitHub gists
///
/// Requires a token in the GITHUB_API_TOKEN environment variable.
#[derive(Debug, Parser)]
#[command(name = "gist-upload", author, version, about, long_about = None)]
pub struct Args {
    /// Upload files
    #[arg(long)]
    pub upload: bool,
    /// Print files that would have been uploaded
    #[arg(long = "dryrun")]
    pub dry_run: bool,
    /// Override the max upload size (50KB unless --max-size-kb is set)
    #[arg(long)]
    pub allow_large_files: bool,
    /// Create public gists instead of secret ones
    #[arg(long)]
    pub public: bool,
    /// Description attached to every created gist
    #[arg(long, value_name = "TEXT")]
    pub description: Option<String>,
    /// Max upload size in KB
    #[arg(long, value_name = "KB")]
    pub max_size_kb: Option<u64>,
    /// Also write the log to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
    /// Log debug output
    #[arg(short, long)]
    pub verbose: bool,
    /// Files to upload
    pub files: Vec<String>,
}

impl Args {
    pub fn run_flags(&self) -> RunFlags {
        RunFlags {
            upload: self.upload,
            dry_run: self.dry_run,
            allow_large_files: self.allow_large_files,
            public: self.public,
            max_size_kb: self.max_size_kb,
            description: self.description.clone(),
            paths: self.files.clone(),
        }
    }
}

const BOOL_FLAGS: &[&str] = &["upload", "dryrun", "allow-large-files", "public", "verbose"];
const VALUE_FLAGS: &[&str] = &["description", "max-size-kb", "log-file"];

#[derive(Debug, PartialEq, Eq)]
enum Rewrite {
    Keep,
    Replace(String),
    Drop,
}

/// Rewrite Go-style flags into the form clap expects.
///
/// Single-dash long flags (`-upload`, `-max-size-kb=10`) gain a second dash.
/// Boolean flags also accept an explicit value (`-upload=true`,
/// `--public=false`); a false value removes the flag. Everything after `--`
/// is left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut seen_separator = false;
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .filter_map(|(index, arg)| {
            if index == 0 || seen_separator {
                return Some(arg);
            }
            if arg == "--" {
                seen_separator = true;
                return Some(arg);
            }
            let rewrite = arg.to_str().map(rewrite_flag).unwrap_or(Rewrite::Keep);
            match rewrite {
                Rewrite::Keep => Some(arg),
                Rewrite::Replace(flag) => Some(OsString::from(flag)),
                Rewrite::Drop => None,
            }
        })
        .collect()
}

fn rewrite_flag(arg: &str) -> Rewrite {
    let body = match arg.strip_prefix("--") {
        Some(rest) => rest,
        None => match arg.strip_prefix('-') {
            Some(rest) => rest,
            None => return Rewrite::Keep,
        },
    };
    if body.starts_with('-') {
        return Rewrite::Keep;
    }
    let (name, value) = match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    };

    if BOOL_FLAGS.contains(&name) {
        return match value.map(parse_go_bool) {
            None | Some(Some(true)) => Rewrite::Replace(format!("--{name}")),
            Some(Some(false)) => Rewrite::Drop,
            // Let clap report the bad value.
            Some(None) => Rewrite::Keep,
        };
    }
    if VALUE_FLAGS.contains(&name) {
        return Rewrite::Replace(format!("--{body}"));
    }
    Rewrite::Keep
}

/// The spellings Go's `strconv.ParseBool` accepts.
fn parse_go_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(normalize_args(args.iter().copied()))
    }

    #[test]
    fn accepts_single_dash_long_flags() {
        let args = parse(&["gist-upload", "-upload", "-allow-large-files", "a.txt", "b.txt"]);
        assert!(args.upload);
        assert!(!args.dry_run);
        assert!(args.allow_large_files);
        assert_eq!(args.files, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn accepts_double_dash_and_values() {
        let args = parse(&[
            "gist-upload",
            "--dryrun",
            "-max-size-kb=10",
            "--description",
            "notes",
            "-v",
            "a.txt",
        ]);
        assert!(args.dry_run);
        assert!(args.verbose);
        assert_eq!(args.max_size_kb, Some(10));
        assert_eq!(args.description.as_deref(), Some("notes"));
    }

    #[test]
    fn leaves_paths_after_separator_alone() {
        let normalized = normalize_args(["gist-upload", "-upload", "--", "-upload"]);
        assert_eq!(normalized, vec!["gist-upload", "--upload", "--", "-upload"]);
    }

    #[test]
    fn unknown_words_are_untouched() {
        assert_eq!(rewrite_flag("-uploads"), Rewrite::Keep);
        assert_eq!(rewrite_flag("upload"), Rewrite::Keep);
        assert_eq!(rewrite_flag("---upload"), Rewrite::Keep);
        assert_eq!(
            rewrite_flag("-log-file=out.log"),
            Rewrite::Replace("--log-file=out.log".to_string())
        );
    }

    #[test]
    fn bool_flags_accept_explicit_values() {
        let args = parse(&["gist-upload", "-upload=true", "-public=false", "a.txt"]);
        assert!(args.upload);
        assert!(!args.public);

        let args = parse(&["gist-upload", "--dryrun=1", "-allow-large-files=T", "a.txt"]);
        assert!(args.dry_run);
        assert!(args.allow_large_files);

        let normalized = normalize_args(["gist-upload", "-upload=false", "-dryrun", "a.txt"]);
        assert_eq!(normalized, vec!["gist-upload", "--dryrun", "a.txt"]);
    }

    #[test]
    fn bad_bool_value_is_rejected_by_clap() {
        let result = Args::try_parse_from(normalize_args(["gist-upload", "-upload=maybe"]));
        assert!(result.is_err());
    }

    #[test]
    fn flags_after_paths_are_still_flags() {
        // Unlike Go's flag package, parsing does not stop at the first path.
        let args = parse(&["gist-upload", "-upload", "a.txt", "-dryrun"]);
        assert!(args.upload && args.dry_run);
        assert_eq!(args.files, vec!["a.txt"]);
    }

    #[test]
    fn run_flags_mirror_args() {
        let args = parse(&["gist-upload", "--upload", "--public", "a.txt"]);
        let flags = args.run_flags();
        assert!(flags.upload && flags.public);
        assert_eq!(flags.paths, vec!["a.txt".to_string()]);
    }
}
