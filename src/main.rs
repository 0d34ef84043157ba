mod config;
mod error;
mod inventory;
mod lexicon;
mod prepare;
mod repair;
mod report;
mod segments;
mod speakers;
mod stats;
mod table;
mod transcript;
mod types;
mod validate;
mod wav_inspect;

use anyhow::{bail, Context, Result};
use config::Config;
use env_logger::Env;

fn main() -> Result<()> {
    // コマンドライン引数をパース
    let args: Vec<String> = std::env::args().collect();

    let verbose = args.iter().any(|a| a == "--verbose");

    // ロガーを初期化（--verbose で debug レベル）
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    // 設定ファイル生成モード
    if args.len() > 1 && args[1] == "--generate-config" {
        let config_path = if args.len() > 2 {
            &args[2]
        } else {
            "config.toml"
        };
        Config::write_default(config_path)?;
        println!("設定ファイルを生成しました: {}", config_path);
        return Ok(());
    }

    // 設定ファイルのパス（--config で指定、既定は config.toml）
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
        .unwrap_or("config.toml");

    // 最初のフラグでない位置引数がコーパスのパス
    let mut corpus_path: Option<&str> = None;
    let mut skip_next = false;
    for arg in &args[1..] {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--config" {
            skip_next = true;
            continue;
        }
        if !arg.starts_with("--") {
            corpus_path = Some(arg);
            break;
        }
    }
    let Some(corpus_path) = corpus_path else {
        bail!(
            "使い方: corpus-validate <コーパスのパス> [--verbose] [--config <path>] [--generate-config [path]]"
        );
    };

    let config = Config::load_or_default(config_path)?;

    log::info!("コーパス {} を検証します", corpus_path);

    let summary = validate::validate(std::path::Path::new(corpus_path), &config)
        .with_context(|| format!("コーパス {} は検証に失敗しました", corpus_path))?;

    // サマリをJSON形式で出力
    println!("{}", serde_json::to_string_pretty(&summary)?);

    log::info!(
        "検証完了: 発話 {} 件、警告 {} 件",
        summary.utterances,
        summary.warnings
    );

    Ok(())
}
