use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::classify::DEFAULT_MODEL;
use crate::report::DEFAULT_REVIEW_THRESHOLD;

/// Environment variable consulted when no `--api-key` is given.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// 属性グループ自動分類ツール（信頼度付き）
#[derive(Parser, Debug)]
#[command(name = "bunrui", version, about = "属性グループ自動分類ツール（信頼度付き）")]
pub struct Cli {
    /// API key (falls back to .env, then OPENAI_API_KEY, then an interactive prompt)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Input CSV path (interactive picker when omitted)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output CSV file name, placed in the dated run directory
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Labels per classification request
    #[arg(long, default_value_t = 50)]
    pub batch_size: usize,

    /// Classify without confidence scores
    #[arg(long)]
    pub no_confidence: bool,

    /// Threshold below which records join the manual-review set
    #[arg(long, default_value_t = DEFAULT_REVIEW_THRESHOLD)]
    pub confidence_threshold: f32,

    /// Chat model identifier
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,
}

/// Resolve the API credential: flag → .env / environment → interactive
/// prompt. Returns `None` when every source comes up empty.
pub fn resolve_api_key(flag: Option<String>) -> Option<String> {
    if let Some(key) = flag.filter(|k| !k.trim().is_empty()) {
        return Some(key);
    }
    dotenv::dotenv().ok();
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            return Some(key);
        }
    }
    prompt_api_key()
}

fn prompt_api_key() -> Option<String> {
    print!("OpenAI API Keyを入力してください: ");
    io::stdout().flush().ok()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line).ok()?;
    let key = line.trim().to_string();
    (!key.is_empty()).then_some(key)
}

/// CSV files directly under `dir`, sorted by name.
pub fn csv_files_in(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    files.sort();
    Ok(files)
}

/// Interactive input picker over the working directory, used when no
/// `--input` is given. Returns `None` when the user gives up. Kept out of
/// the core pipeline so classification stays deterministic and testable.
pub fn select_input_file() -> Option<PathBuf> {
    println!("分類前のCSVファイルを選択してください:");
    println!("ファイル名を入力するか、Enterキーを押して現在のディレクトリのCSVファイルを一覧表示:");

    let mut line = String::new();
    io::stdin().read_line(&mut line).ok()?;
    let typed = line.trim();
    if !typed.is_empty() {
        let path = PathBuf::from(typed);
        if path.exists() {
            return Some(path);
        }
        println!("ファイルが見つかりません: {typed}");
        return None;
    }

    let files = csv_files_in(Path::new(".")).ok()?;
    if files.is_empty() {
        println!("現在のディレクトリにCSVファイルが見つかりません。");
        return None;
    }

    println!("利用可能なCSVファイル:");
    for (index, file) in files.iter().enumerate() {
        println!("{}. {}", index + 1, file.display());
    }

    loop {
        print!("ファイル番号を選択してください: ");
        io::stdout().flush().ok()?;
        let mut choice = String::new();
        if io::stdin().read_line(&mut choice).ok()? == 0 {
            return None;
        }
        match choice.trim().parse::<usize>() {
            Ok(n) if (1..=files.len()).contains(&n) => return Some(files[n - 1].clone()),
            Ok(_) => println!("無効な番号です。"),
            Err(_) => println!("数字を入力してください。"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_documented_surface() {
        let cli = Cli::parse_from(["bunrui"]);
        assert_eq!(cli.batch_size, 50);
        assert_eq!(cli.confidence_threshold, 0.7);
        assert_eq!(cli.model, "gpt-4o-mini");
        assert!(!cli.no_confidence);
        assert!(cli.api_key.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "bunrui",
            "--api-key",
            "sk-test",
            "--input",
            "in.csv",
            "--batch-size",
            "10",
            "--no-confidence",
            "--confidence-threshold",
            "0.5",
        ]);
        assert_eq!(cli.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cli.input.as_deref(), Some(Path::new("in.csv")));
        assert_eq!(cli.batch_size, 10);
        assert!(cli.no_confidence);
        assert_eq!(cli.confidence_threshold, 0.5);
    }

    #[test]
    fn explicit_flag_wins_over_environment() {
        let key = resolve_api_key(Some("sk-flag".to_string()));
        assert_eq!(key.as_deref(), Some("sk-flag"));
    }

    #[test]
    fn csv_listing_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.csv"), "x").unwrap();
        std::fs::write(dir.path().join("a.csv"), "x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let files = csv_files_in(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }
}
