//! 自動修復とテーブル整列のプリミティブ
//!
//! 自動修復は追記のみで、存在チェックで保護される（破壊的上書きは
//! しない）。唯一の上書きはテーブルの決定的ソートで、これは同一入力
//! に対して冪等。書き込み失敗は握りつぶさずフォーマットエラーとして
//! 伝播する。

use crate::error::{Result, ValidationError};
use std::fs;
use std::io::Write;
use std::path::Path;

/// テーブル内容をバイト順で整列した文字列を返す純粋関数
///
/// ロケールやプロセス環境に依存しない（`str` の既定順序は
/// バイト列の辞書順）。行は並べ替えるだけで削除しない。空行も
/// バイト順で先頭に並び、読み取り側の列数検査で拒否される。
/// 空でない入力は必ず改行で終端される。
pub fn sorted_table(content: &str) -> String {
    let mut lines: Vec<&str> = content.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    if lines.is_empty() {
        return String::new();
    }
    lines.sort_unstable();
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// テーブルファイルをバイト順でその場ソートする
pub fn sort_table_file(path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)
        .map_err(|e| ValidationError::io(format!("{} の読み込みに失敗", path.display()), e))?;
    let sorted = sorted_table(&content);
    if sorted != content {
        fs::write(path, sorted)
            .map_err(|e| ValidationError::io(format!("{} の書き込みに失敗", path.display()), e))?;
    }
    Ok(())
}

/// ファイル末尾に行を追記する（自動修復用）
pub fn append_lines(path: &Path, lines: &[&str]) -> Result<()> {
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| {
            ValidationError::io(format!("自動修復: {} を開けません", path.display()), e)
        })?;
    for line in lines {
        writeln!(file, "{}", line).map_err(|e| {
            ValidationError::io(format!("自動修復: {} への追記に失敗", path.display()), e)
        })?;
    }
    Ok(())
}

/// 指定の行を持つファイルを新規作成する（自動修復用）
pub fn create_with_lines(path: &Path, lines: &[&str]) -> Result<()> {
    let mut content = String::new();
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    fs::write(path, content).map_err(|e| {
        ValidationError::io(format!("自動修復: {} の作成に失敗", path.display()), e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sorted_table_byte_order() {
        // バイト順: 大文字 < 小文字、数字 < 英字
        let sorted = sorted_table("b x\nB y\n1 z\na w\n");
        assert_eq!(sorted, "1 z\nB y\na w\nb x\n");
    }

    #[test]
    fn test_sorted_table_idempotent() {
        let once = sorted_table("c 1\na 2\nb 3\n");
        assert_eq!(sorted_table(&once), once);
    }

    #[test]
    fn test_sorted_table_empty() {
        assert_eq!(sorted_table(""), "");
    }

    #[test]
    fn test_sorted_table_keeps_blank_lines() {
        // 空行は削除せずバイト順で先頭に並べる
        let sorted = sorted_table("b x\n\na w\n");
        assert_eq!(sorted, "\na w\nb x\n");
        assert_eq!(sorted_table(&sorted), sorted);
    }

    #[test]
    fn test_sort_table_file_in_place() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("segments");
        fs::write(&path, "utt2 b.wav\nutt1 a.wav\n").unwrap();

        sort_table_file(&path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "utt1 a.wav\nutt2 b.wav\n"
        );

        // 2回目は内容が変わらない
        sort_table_file(&path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "utt1 a.wav\nutt2 b.wav\n"
        );
    }

    #[test]
    fn test_append_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("silences.txt");
        fs::write(&path, "SIL\n").unwrap();

        append_lines(&path, &["SPN"]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "SIL\nSPN\n");
    }

    #[test]
    fn test_create_with_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("silences.txt");
        create_with_lines(&path, &["SIL", "SPN"]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "SIL\nSPN\n");

        let empty = dir.path().join("extra_questions.txt");
        create_with_lines(&empty, &[]).unwrap();
        assert_eq!(fs::read_to_string(&empty).unwrap(), "");
    }

    #[test]
    fn test_append_to_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = append_lines(&dir.path().join("none.txt"), &["SIL"]).unwrap_err();
        assert!(matches!(err, crate::error::ValidationError::Format(_)));
    }
}
