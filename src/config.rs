use crate::prepare::CorpusKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub audio: AudioRequirements,
    #[serde(default)]
    pub stats: StatsConfig,
    #[serde(default)]
    pub tables: TableConfig,
    #[serde(default)]
    pub prepare: PrepareConfig,
}

/// 受理される音声フォーマットの要件
///
/// # デフォルト値
///
/// - `sample_rate`: 16000 Hz (16kHz)
/// - `channels`: 1 (モノラル)
/// - `sample_width_bytes`: 2 (16bit PCM)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioRequirements {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_channels")]
    pub channels: u16,
    #[serde(default = "default_sample_width_bytes")]
    pub sample_width_bytes: u16,
}

/// 統計エンジンの閾値設定
///
/// # デフォルト値
///
/// - `oov_warn_ratio`: 0.1 (OOV がタイプまたはトークンの1割を
///   超えると情報フラグ)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatsConfig {
    #[serde(default = "default_oov_warn_ratio")]
    pub oov_warn_ratio: f64,
}

/// テーブルファイルの扱いに関する設定
///
/// # デフォルト値
///
/// - `sort_on_validate`: true (segments / utt2spk / text を検証前に
///   バイト順でその場ソートする)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TableConfig {
    #[serde(default = "default_sort_on_validate")]
    pub sort_on_validate: bool,
}

/// 準備器（preparator）の選択
///
/// 元コーパスの形式を設定で選ぶ。検証のみの場合は未指定でよい。
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PrepareConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus: Option<CorpusKind>,
}

// Default functions
fn default_sample_rate() -> u32 {
    16000
}

fn default_channels() -> u16 {
    1
}

fn default_sample_width_bytes() -> u16 {
    2 // 16bit == 2バイト
}

fn default_oov_warn_ratio() -> f64 {
    0.1
}

fn default_sort_on_validate() -> bool {
    true
}

impl Default for AudioRequirements {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            sample_width_bytes: default_sample_width_bytes(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            oov_warn_ratio: default_oov_warn_ratio(),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            sort_on_validate: default_sort_on_validate(),
        }
    }
}

impl Config {
    /// 設定ファイルから読み込み
    ///
    /// TOML形式の設定ファイルをパースしてConfig構造体を生成する。
    ///
    /// # Errors
    ///
    /// ファイルの読み込みまたはパースに失敗した場合にエラーを返す。
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use corpus_validate::config::Config;
    /// let config = Config::from_file("config.toml").unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("設定ファイルの読み込みに失敗: {:?}", path.as_ref()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| "設定ファイルのパースに失敗")?;
        Ok(config)
    }

    /// デフォルト設定をファイルに書き出し
    ///
    /// 既存のファイルは上書きされる。
    pub fn write_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Config::default();
        let content =
            toml::to_string_pretty(&config).with_context(|| "設定のシリアライズに失敗")?;
        fs::write(path.as_ref(), content)
            .with_context(|| format!("設定ファイルの書き込みに失敗: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// 設定ファイルがあれば読み込み、なければデフォルトを使用
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            log::warn!(
                "設定ファイルが見つかりません。デフォルト設定を使用します: {:?}",
                path.as_ref()
            );
            Ok(Config::default())
        }
    }
}
