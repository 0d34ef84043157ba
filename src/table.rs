//! フラットテキストテーブルの読み取り
//!
//! 正規化テーブル（segments / utt2spk / text / phones.txt /
//! silences.txt / extra_questions.txt / lexicon.txt）を型付きレコード列
//! に変換する。行単位の構文不変条件（復帰文字なし・連続スペースなし・
//! 列数）はここで強制し、下流の検証器は読み取り成功を前提にする。

use crate::error::{Result, ValidationError};
use crate::types::{LexiconEntry, Phone, Segment, SpeakerEntry, Transcription};
use std::fs;
use std::path::Path;

/// ファイル全体を行のリストとして読み込む
///
/// 末尾の改行による空要素は除外する。UTF-8 以外や I/O 失敗は
/// フォーマットエラーになる。
fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .map_err(|e| ValidationError::io(format!("{} の読み込みに失敗", path.display()), e))?;
    let mut lines: Vec<&str> = content.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    Ok(lines.into_iter().map(String::from).collect())
}

/// 1行を空白区切りの列に分解する
///
/// 復帰文字（非Unix改行）と連続スペースは拒否する。
fn parse_line(line: &str, path: &Path) -> Result<Vec<String>> {
    if line.contains('\r') {
        return Err(ValidationError::format(format!(
            "{} に非Unix形式の改行が含まれています",
            path.display()
        )));
    }
    if line.contains("  ") {
        return Err(ValidationError::format(format!(
            "{} に2個連続したスペースを含む行があります",
            path.display()
        )));
    }
    Ok(line.split(' ').map(String::from).collect())
}

/// segments テーブルを読み込む
///
/// 各行は2列（`utt_id wav`）または4列（`utt_id wav start stop`）。
/// 2列形式はタイムスタンプ無し（ファイル全体が1発話）を意味する。
pub fn read_segments(path: &Path) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    for line in read_lines(path)? {
        let cols = parse_line(&line, path)?;
        if cols.len() != 2 && cols.len() != 4 {
            return Err(ValidationError::format(format!(
                "segments は2列または4列の行のみを含む必要があります ({})",
                path.display()
            )));
        }
        let (start, stop) = if cols.len() == 4 {
            (
                Some(parse_seconds(&cols[2], path)?),
                Some(parse_seconds(&cols[3], path)?),
            )
        } else {
            (None, None)
        };
        segments.push(Segment {
            utt_id: cols[0].clone(),
            wav: cols[1].clone(),
            start,
            stop,
        });
    }
    Ok(segments)
}

fn parse_seconds(text: &str, path: &Path) -> Result<f64> {
    text.parse::<f64>().map_err(|_| {
        ValidationError::format(format!(
            "{} のタイムスタンプ '{}' を数値として解釈できません",
            path.display(),
            text
        ))
    })
}

/// utt2spk テーブルを読み込む（厳密に2列）
pub fn read_utt2spk(path: &Path) -> Result<Vec<SpeakerEntry>> {
    let mut entries = Vec::new();
    for line in read_lines(path)? {
        let cols = parse_line(&line, path)?;
        if cols.len() != 2 {
            return Err(ValidationError::format(format!(
                "utt2spk は2列の行のみを含む必要があります ({})",
                path.display()
            )));
        }
        entries.push(SpeakerEntry {
            utt_id: cols[0].clone(),
            speaker_id: cols[1].clone(),
        });
    }
    Ok(entries)
}

/// text テーブルを読み込む（2列以上: `utt_id word...`）
///
/// 長さ0のトークン（行末スペース等）はここでは許容し、
/// 下流で警告として報告される。
pub fn read_text(path: &Path) -> Result<Vec<Transcription>> {
    let mut transcriptions = Vec::new();
    for line in read_lines(path)? {
        let cols = parse_line(&line, path)?;
        if cols.len() < 2 {
            return Err(ValidationError::format(format!(
                "text は2列以上の行のみを含む必要があります ({})",
                path.display()
            )));
        }
        transcriptions.push(Transcription {
            utt_id: cols[0].clone(),
            words: cols[1..].to_vec(),
        });
    }
    Ok(transcriptions)
}

/// phones.txt を読み込む（厳密に2列: `symbol ipa`）
pub fn read_phones(path: &Path) -> Result<Vec<Phone>> {
    let mut phones = Vec::new();
    for line in read_lines(path)? {
        let cols = parse_line(&line, path)?;
        if cols.len() != 2 {
            return Err(ValidationError::format(format!(
                "phones.txt は2列の行のみを含む必要があります ({})",
                path.display()
            )));
        }
        phones.push(Phone {
            symbol: cols[0].clone(),
            ipa: cols[1].clone(),
        });
    }
    Ok(phones)
}

/// silences.txt を読み込む（厳密に1列）
pub fn read_silences(path: &Path) -> Result<Vec<String>> {
    let mut silences = Vec::new();
    for line in read_lines(path)? {
        let cols = parse_line(&line, path)?;
        if cols.len() != 1 {
            return Err(ValidationError::format(format!(
                "silences.txt は1列の行のみを含む必要があります ({})",
                path.display()
            )));
        }
        silences.push(cols[0].clone());
    }
    Ok(silences)
}

/// extra_questions.txt を読み込む（2列以上、1行が1等価グループ）
pub fn read_variants(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut variants = Vec::new();
    for line in read_lines(path)? {
        let cols = parse_line(&line, path)?;
        if cols.len() < 2 {
            return Err(ValidationError::format(format!(
                "extra_questions.txt は2列以上の行のみを含む必要があります ({})",
                path.display()
            )));
        }
        variants.push(cols);
    }
    Ok(variants)
}

/// lexicon.txt を読み込む（2列以上: `word phone...`）
pub fn read_lexicon(path: &Path) -> Result<Vec<LexiconEntry>> {
    let mut entries = Vec::new();
    for line in read_lines(path)? {
        let cols = parse_line(&line, path)?;
        if cols.len() < 2 {
            return Err(ValidationError::format(format!(
                "lexicon.txt は2列以上の行のみを含む必要があります ({})",
                path.display()
            )));
        }
        entries.push(LexiconEntry {
            word: cols[0].clone(),
            pronunciation: cols[1..].to_vec(),
        });
    }
    Ok(entries)
}
