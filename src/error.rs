use thiserror::Error;

/// コーパス検証の致命的エラー
///
/// 警告（タイミング衝突・未使用音素など）はエラーではなく
/// `ValidationLog` 経由で記録される。ここに到達した時点で
/// コーパスは受理されない。
#[derive(Debug, Error)]
pub enum ValidationError {
    /// ファイル構造そのものの異常
    ///
    /// 列数の不一致、禁止文字、読めない音声ヘッダ、
    /// 非対応の音声エンコーディングなど。
    #[error("フォーマットエラー: {0}")]
    Format(String),

    /// テーブル間の参照整合性の異常
    ///
    /// ID重複、テーブル間の発話ID集合の不一致、
    /// 音素目録外の音素、タイムスタンプの範囲違反など。
    #[error("整合性エラー: {0}")]
    Integrity(String),
}

impl ValidationError {
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }

    /// I/O 失敗をフォーマットエラーとして包む
    pub fn io(context: impl AsRef<str>, source: std::io::Error) -> Self {
        Self::Format(format!("{}: {}", context.as_ref(), source))
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;
