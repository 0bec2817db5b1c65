use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bunrui::classify::{ChatApiClient, ScoringMode};
use bunrui::cli::{self, Cli};
use bunrui::report::category_counts;
use bunrui::run::{execute, RunConfig, RunOutcome};
use bunrui::taxonomy::CategoryTaxonomy;

const DEFAULT_LOG_FILTER: &str = "bunrui=info";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();

    if cli.batch_size == 0 {
        eprintln!("バッチサイズは1以上を指定してください。");
        return ExitCode::FAILURE;
    }

    let Some(api_key) = cli::resolve_api_key(cli.api_key.clone()) else {
        eprintln!("API Keyが必要です。");
        eprintln!("以下のいずれかの方法でAPI Keyを設定してください:");
        eprintln!("1. --api-key オプションで指定");
        eprintln!("2. .envファイルに OPENAI_API_KEY=your_key を設定");
        eprintln!("3. 対話的に入力");
        return ExitCode::FAILURE;
    };

    let Some(input) = cli.input.clone().or_else(cli::select_input_file) else {
        return ExitCode::FAILURE;
    };

    let mode = if cli.no_confidence {
        ScoringMode::CategoryOnly
    } else {
        ScoringMode::WithConfidence
    };
    let taxonomy = CategoryTaxonomy::japanese_hr();
    let classifier = ChatApiClient::hosted(&api_key, &cli.model, taxonomy.clone(), mode);

    // An explicit --output is taken as a file name inside the dated run
    // directory, mirroring where the default name lands.
    let output_name = cli
        .output
        .as_deref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned());

    let config = RunConfig {
        input,
        output_name,
        batch_size: cli.batch_size,
        mode,
        review_threshold: cli.confidence_threshold,
        taxonomy,
        output_root: PathBuf::from("."),
    };

    println!("分類を開始します...");
    match execute(&classifier, &config) {
        Ok(outcome) => {
            print_summary(&outcome, cli.confidence_threshold);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("エラー: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_summary(outcome: &RunOutcome, threshold: f32) {
    println!("分類が完了しました！");
    println!("分類結果を保存しました: {}", outcome.output_file.display());

    println!("\n分類結果サマリー:");
    for (category, count) in category_counts(&outcome.classified) {
        println!("  {category}: {count}件");
    }

    let Some(analysis) = &outcome.analysis else {
        return;
    };

    println!("\n信頼度分析:");
    println!("  平均信頼度: {:.3}", analysis.stats.mean);
    println!("  中央値: {:.3}", analysis.stats.median);
    println!("  最小値: {:.3}", analysis.stats.min);
    println!("  最大値: {:.3}", analysis.stats.max);

    println!("\n信頼度区間別統計:");
    for bin in &analysis.bins {
        println!("  {}: {}件 ({:.1}%)", bin.label, bin.count, bin.percentage);
    }

    if let Some(review_file) = &outcome.review_file {
        println!(
            "\n低信頼度項目（< {threshold}）を保存しました: {}",
            review_file.display()
        );
        println!("検証推奨項目: {}件", outcome.review.len());

        println!("\n信頼度が最も低い項目（上位5件）:");
        for &index in outcome.review.iter().take(5) {
            let record = &outcome.classified[index];
            println!(
                "  - {} (分類: {}, 信頼度: {:.3})",
                record.label,
                record.category,
                record.confidence.unwrap_or(0.0)
            );
        }
    }

    if let Some(report_file) = &outcome.report_file {
        println!(
            "\nマークダウンレポートを生成しました: {}",
            report_file.display()
        );
    }
}
