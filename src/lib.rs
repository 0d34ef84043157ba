//! corpus-validate - 音声コーパスの正規化フォーマット検証器
//!
//! このクレートは、正規化ディスクフォーマットに変換された音声コーパス
//! （フラットテキストテーブル5種 + wav フォルダ）が音響/言語モデル
//! 学習に渡せる状態かを多段パスで検査するシステムを提供します。
//!
//! # 主な機能
//!
//! - **テーブル読み取り**: segments / utt2spk / text / 音素目録 /
//!   lexicon を行単位の構文検査つきで型付きレコードに変換
//! - **音声検査**: wav ヘッダからフォーマットパラメータと長さを抽出し、
//!   モノラル・16bit PCM・16kHz・非圧縮・非空を強制
//! - **構造検証**: テーブル内の一意性・接頭辞則・タイムスタンプ整合性と
//!   テーブル間の参照整合性を検査（欠陥は fail-fast でなく全件収集）
//! - **自動修復**: 欠けた silences.txt / extra_questions.txt / `<UNK>`
//!   エントリを追記のみ・冪等に合成
//! - **統計**: OOV 比率・ホモフォングループ・未使用音素の報告
//!
//! # アーキテクチャ
//!
//! ```text
//! [validate] → [wav_inspect] → [segments] → [speakers] → [transcript]
//!                   │               └──────── [table] ────────┘
//!                   ↓
//!             [inventory] → [lexicon] → [stats]
//!                   │            │
//!                   └─ [repair] ─┘        すべてのパス → [report]
//! ```
//!
//! # 使用例
//!
//! ```no_run
//! use corpus_validate::config::Config;
//! use corpus_validate::validate::validate;
//!
//! let config = Config::load_or_default("config.toml").unwrap();
//! let summary = validate(std::path::Path::new("./my_corpus"), &config).unwrap();
//! println!("発話数: {}", summary.utterances);
//! ```

pub mod config;
pub mod error;
pub mod inventory;
pub mod lexicon;
pub mod prepare;
pub mod repair;
pub mod report;
pub mod segments;
pub mod speakers;
pub mod stats;
pub mod table;
pub mod transcript;
pub mod types;
pub mod validate;
pub mod wav_inspect;
