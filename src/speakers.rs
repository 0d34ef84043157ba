use crate::error::{Result, ValidationError};
use crate::report::ValidationLog;
use crate::types::{duplicated, SpeakerEntry};
use std::collections::BTreeSet;

/// utt2spk テーブルの構造検証
///
/// - 発話ID集合が segments と一致すること（行順は問わない）
/// - 全話者IDが同一長であること
/// - 各発話IDが対応する話者IDを接頭辞に持つこと（接頭辞則）
pub fn check_speakers(
    entries: &[SpeakerEntry],
    segment_utt_ids: &[String],
    log: &mut ValidationLog,
) -> Result<()> {
    let utt_ids: Vec<String> = entries.iter().map(|e| e.utt_id.clone()).collect();
    require_same_utt_ids("utt2spk", &utt_ids, segment_utt_ids, log)?;

    let Some(first) = entries.first() else {
        return Ok(());
    };

    // 話者IDは固定長でなければならない
    let len = first.speaker_id.len();
    let wrong_length: Vec<&str> = entries
        .iter()
        .filter(|e| e.speaker_id.len() != len)
        .map(|e| e.speaker_id.as_str())
        .collect();
    if !wrong_length.is_empty() {
        return Err(ValidationError::integrity(format!(
            "全話者IDは同じ長さでなければなりません。長さ {} と異なる話者ID: {:?}",
            len, wrong_length
        )));
    }

    // 接頭辞則: utt_id[..len] == speaker_id
    let violations: Vec<&str> = entries
        .iter()
        .filter(|e| e.utt_id.get(..len) != Some(e.speaker_id.as_str()))
        .map(|e| e.utt_id.as_str())
        .collect();
    if !violations.is_empty() {
        return Err(ValidationError::integrity(format!(
            "各発話IDは対応する話者IDを接頭辞に持つ必要があります。違反している発話: {:?}",
            violations
        )));
    }

    Ok(())
}

/// テーブルの発話ID集合が segments の発話ID集合と一致することを要求する
///
/// 行順は問わない（整列を無効にした設定では両テーブルの順序が
/// 異なりうる）。まずテーブル内の重複を調べ（あれば列挙して致命的）、
/// 次に集合として比較し、差があれば両方向の差集合をログに記録して
/// から致命的エラーにする。
pub(crate) fn require_same_utt_ids(
    table: &str,
    ids: &[String],
    segment_ids: &[String],
    log: &mut ValidationLog,
) -> Result<()> {
    if ids == segment_ids {
        return Ok(());
    }

    let dup = duplicated(ids);
    if !dup.is_empty() {
        return Err(ValidationError::integrity(format!(
            "{} 内で次の発話IDが複数回使用されています: {:?}",
            table, dup
        )));
    }

    let in_table: BTreeSet<&String> = ids.iter().collect();
    let in_segments: BTreeSet<&String> = segment_ids.iter().collect();
    let only_table: Vec<&&String> = in_table.difference(&in_segments).collect();
    let only_segments: Vec<&&String> = in_segments.difference(&in_table).collect();
    if only_table.is_empty() && only_segments.is_empty() {
        // 集合としては一致（順序のみ異なる）
        return Ok(());
    }
    log.error(format!(
        "{} にあって segments に無い発話: {:?}",
        table, only_table
    ));
    log.error(format!(
        "segments にあって {} に無い発話: {:?}",
        table, only_segments
    ));
    Err(ValidationError::integrity(format!(
        "segments と {} の発話IDが一致しません。詳細はログ {} を参照",
        table,
        log.path().display()
    )))
}
