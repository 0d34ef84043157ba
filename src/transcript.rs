use crate::error::Result;
use crate::report::ValidationLog;
use crate::speakers::require_same_utt_ids;
use crate::types::Transcription;

/// text テーブルの構造検証
///
/// 発話ID列の segments との一致を検査する（重複・差集合の方針は
/// utt2spk と同じ）。語彙カバレッジ（OOV）の検査は統計エンジンに
/// 委ねる。長さ0のトークンは警告として報告する。
pub fn check_transcriptions(
    transcriptions: &[Transcription],
    segment_utt_ids: &[String],
    log: &mut ValidationLog,
) -> Result<()> {
    let utt_ids: Vec<String> = transcriptions.iter().map(|t| t.utt_id.clone()).collect();
    require_same_utt_ids("text", &utt_ids, segment_utt_ids, log)?;

    let with_empty_tokens: Vec<&str> = transcriptions
        .iter()
        .filter(|t| t.words.iter().any(|w| w.is_empty()))
        .map(|t| t.utt_id.as_str())
        .collect();
    if !with_empty_tokens.is_empty() {
        log.warn(format!(
            "text 内の次の発話に長さ0のトークンが含まれています: {:?}",
            with_empty_tokens
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use tempfile::TempDir;

    fn test_log(dir: &TempDir) -> ValidationLog {
        ValidationLog::open(&dir.path().join("v.log")).unwrap()
    }

    fn trans(utt: &str, words: &[&str]) -> Transcription {
        Transcription {
            utt_id: utt.to_string(),
            words: words.iter().map(|w| w.to_string()).collect(),
        }
    }

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_valid_transcriptions() {
        let dir = TempDir::new().unwrap();
        let mut log = test_log(&dir);
        let transcriptions = vec![trans("spk1-a", &["hello"]), trans("spk1-b", &["hi", "there"])];
        check_transcriptions(&transcriptions, &ids(&["spk1-a", "spk1-b"]), &mut log).unwrap();
        assert_eq!(log.warnings(), 0);
    }

    #[test]
    fn test_id_mismatch_fatal() {
        let dir = TempDir::new().unwrap();
        let mut log = test_log(&dir);
        let transcriptions = vec![trans("spk1-a", &["hello"])];
        let err = check_transcriptions(&transcriptions, &ids(&["spk1-a", "spk1-b"]), &mut log)
            .unwrap_err();
        assert!(matches!(err, ValidationError::Integrity(_)));
    }

    #[test]
    fn test_duplicate_ids_fatal() {
        let dir = TempDir::new().unwrap();
        let mut log = test_log(&dir);
        let transcriptions = vec![trans("spk1-a", &["x"]), trans("spk1-a", &["y"])];
        let err = check_transcriptions(&transcriptions, &ids(&["spk1-a"]), &mut log).unwrap_err();
        assert!(err.to_string().contains("spk1-a"));
    }

    #[test]
    fn test_empty_token_warning() {
        let dir = TempDir::new().unwrap();
        let mut log = test_log(&dir);
        let transcriptions = vec![trans("spk1-a", &["hello", ""])];
        check_transcriptions(&transcriptions, &ids(&["spk1-a"]), &mut log).unwrap();
        assert_eq!(log.warnings(), 1);
    }
}
