use crate::error::{Result, ValidationError};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// 永続化される検証ログ
///
/// 各行を `logs/data_validation.log` に追記しつつ `log` マクロにも
/// 転送する。警告の件数を数え、判定には影響させない（警告が
/// いくつあっても致命的エラーが無ければコーパスは受理される）。
pub struct ValidationLog {
    writer: BufWriter<fs::File>,
    path: PathBuf,
    warnings: usize,
}

impl ValidationLog {
    /// ログファイルを追記モードで開く
    pub fn open(path: &Path) -> Result<Self> {
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                ValidationError::io(format!("ログファイル {} を開けません", path.display()), e)
            })?;
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
            warnings: 0,
        })
    }

    fn write(&mut self, level: &str, msg: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        // ログへの書き込み失敗で検証自体は止めない
        let _ = writeln!(self.writer, "{} [{}] {}", timestamp, level, msg);
    }

    pub fn debug(&mut self, msg: impl AsRef<str>) {
        let msg = msg.as_ref();
        log::debug!("{}", msg);
        self.write("DEBUG", msg);
    }

    pub fn info(&mut self, msg: impl AsRef<str>) {
        let msg = msg.as_ref();
        log::info!("{}", msg);
        self.write("INFO", msg);
    }

    /// 警告を記録する（判定は変えない）
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        let msg = msg.as_ref();
        log::warn!("{}", msg);
        self.write("WARNING", msg);
        self.warnings += 1;
    }

    pub fn error(&mut self, msg: impl AsRef<str>) {
        let msg = msg.as_ref();
        log::error!("{}", msg);
        self.write("ERROR", msg);
    }

    /// これまでに記録された警告の件数
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

impl Drop for ValidationLog {
    fn drop(&mut self) {
        self.flush();
    }
}
