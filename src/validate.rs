//! 検証オーケストレータ
//!
//! 各パスを依存順に実行する:
//! wavs → segments → utt2spk → text → 音素目録 → lexicon → 統計。
//! 最初の致命的エラーで中断し、メッセージをログに残して失敗を
//! 返す。警告は蓄積されるだけで判定を変えない。

use crate::config::Config;
use crate::error::{Result, ValidationError};
use crate::report::ValidationLog;
use crate::types::ValidationSummary;
use crate::{inventory, lexicon, repair, segments, speakers, stats, table, transcript, wav_inspect};
use std::collections::BTreeSet;
use std::path::Path;

/// コーパスディレクトリを検証する
///
/// 成功時はサマリを返す（警告があっても成功）。致命的エラーは
/// `logs/data_validation.log` に記録してから返す。
pub fn validate(corpus_dir: &Path, config: &Config) -> Result<ValidationSummary> {
    let data_dir = corpus_dir.join("data");
    if !data_dir.is_dir() {
        return Err(ValidationError::format(format!(
            "コーパスフォルダ {} には data サブフォルダが必要です",
            corpus_dir.display()
        )));
    }
    let log_dir = corpus_dir.join("logs");
    if !log_dir.is_dir() {
        return Err(ValidationError::format(format!(
            "コーパスフォルダ {} には logs サブフォルダが必要です",
            corpus_dir.display()
        )));
    }

    let mut log = ValidationLog::open(&log_dir.join("data_validation.log"))?;
    let result = run_passes(&data_dir, config, &mut log);
    match &result {
        Ok(_) => log.info("コーパスは利用可能です!!!"),
        Err(e) => log.error(e.to_string()),
    }
    log.flush();
    result
}

fn run_passes(data_dir: &Path, config: &Config, log: &mut ValidationLog) -> Result<ValidationSummary> {
    log.debug("wavs フォルダを検査");
    let wavs = wav_inspect::inspect_wav_dir(&data_dir.join("wavs"), &config.audio)?;
    log.debug("wavs フォルダは OK");

    log.debug("segments ファイルを検査");
    let segments = read_sorted(data_dir, "segments", config, table::read_segments)?;
    segments::check_segments(&segments, &wavs, log)?;
    let utt_ids: Vec<String> = segments.iter().map(|s| s.utt_id.clone()).collect();
    log.debug("segments ファイルは OK");

    log.debug("utt2spk ファイルを検査");
    let speaker_entries = read_sorted(data_dir, "utt2spk", config, table::read_utt2spk)?;
    speakers::check_speakers(&speaker_entries, &utt_ids, log)?;
    log.debug("utt2spk ファイルは OK");

    log.debug("text ファイルを検査");
    let transcriptions = read_sorted(data_dir, "text", config, table::read_text)?;
    transcript::check_transcriptions(&transcriptions, &utt_ids, log)?;
    log.debug("text ファイルは OK。OOV は後で検査");

    log.debug("音素目録ファイル（phones.txt / silences.txt / extra_questions.txt）を検査");
    let inventory = inventory::check_inventory(data_dir, log)?;
    log.debug("音素目録ファイルは OK");

    log.debug("lexicon.txt ファイルを検査");
    let lexicon_entries = lexicon::check_lexicon(&data_dir.join("lexicon.txt"), &inventory, log)?;
    log.debug("lexicon.txt ファイルは OK");

    let oov = stats::oov_report(
        &transcriptions,
        &lexicon_entries,
        config.stats.oov_warn_ratio,
        log,
    );
    let homophone_groups = stats::homophone_report(&transcriptions, &lexicon_entries, log);
    let unused_phones = lexicon::unused_phones(&lexicon_entries, &inventory);

    let speakers: BTreeSet<&str> = speaker_entries
        .iter()
        .map(|e| e.speaker_id.as_str())
        .collect();
    Ok(ValidationSummary {
        wav_files: wavs.len(),
        utterances: segments.len(),
        speakers: speakers.len(),
        phones: inventory.phones.len(),
        silences: inventory.silences.len(),
        lexicon_words: lexicon_entries.len(),
        warnings: log.warnings(),
        oov,
        homophone_groups,
        unused_phones,
    })
}

/// テーブルを決定的ソートしてから読み込む
fn read_sorted<T>(
    data_dir: &Path,
    name: &str,
    config: &Config,
    reader: impl Fn(&Path) -> Result<Vec<T>>,
) -> Result<Vec<T>> {
    let path = data_dir.join(name);
    if config.tables.sort_on_validate && path.exists() {
        repair::sort_table_file(&path)?;
    }
    reader(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// 最小の正しいコーパスをディスク上に組み立てる
    fn build_corpus(dir: &Path) {
        let data = dir.join("data");
        fs::create_dir_all(data.join("wavs")).unwrap();
        fs::create_dir_all(dir.join("logs")).unwrap();

        write_wav(&data.join("wavs").join("rec1.wav"), 32000);
        write_wav(&data.join("wavs").join("rec2.wav"), 16000);

        fs::write(
            data.join("segments"),
            "spk1-u1 rec1.wav 0.0 1.0\nspk1-u2 rec1.wav 1.0 2.0\nspk2-u1 rec2.wav\n",
        )
        .unwrap();
        fs::write(
            data.join("utt2spk"),
            "spk1-u1 spk1\nspk1-u2 spk1\nspk2-u1 spk2\n",
        )
        .unwrap();
        fs::write(
            data.join("text"),
            "spk1-u1 hello world\nspk1-u2 hello\nspk2-u1 world\n",
        )
        .unwrap();
        fs::write(data.join("phones.txt"), "AA ɑ\nHH h\nOW o\n").unwrap();
        fs::write(data.join("silences.txt"), "SIL\nSPN\n").unwrap();
        fs::write(data.join("extra_questions.txt"), "").unwrap();
        fs::write(
            data.join("lexicon.txt"),
            "hello HH AA\nworld OW AA\n<UNK> SPN\n",
        )
        .unwrap();
    }

    fn write_wav(path: &Path, frames: usize) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            writer.write_sample((i % 100) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_valid_corpus_accepted() {
        let dir = TempDir::new().unwrap();
        build_corpus(dir.path());

        let summary = validate(dir.path(), &Config::default()).unwrap();
        assert_eq!(summary.wav_files, 2);
        assert_eq!(summary.utterances, 3);
        assert_eq!(summary.speakers, 2);
        assert_eq!(summary.lexicon_words, 3);
        assert_eq!(summary.oov.oov_types, 0);
        assert_eq!(summary.homophone_groups, 0);
    }

    #[test]
    fn test_missing_data_dir() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("logs")).unwrap();
        let err = validate(dir.path(), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("data"));
    }

    #[test]
    fn test_fatal_error_is_logged() {
        let dir = TempDir::new().unwrap();
        build_corpus(dir.path());
        // 目録に無い音素を使う発音 → 致命的で、音素名がログに残る
        fs::write(
            dir.path().join("data").join("lexicon.txt"),
            "hello HH ZZ\n<UNK> SPN\n",
        )
        .unwrap();

        let err = validate(dir.path(), &Config::default()).unwrap_err();
        assert!(matches!(err, ValidationError::Integrity(_)));
        assert!(err.to_string().contains("ZZ"));
        let log = fs::read_to_string(dir.path().join("logs").join("data_validation.log")).unwrap();
        assert!(log.contains("ZZ"));
    }

    #[test]
    fn test_missing_silences_repaired_and_accepted() {
        let dir = TempDir::new().unwrap();
        build_corpus(dir.path());
        fs::remove_file(dir.path().join("data").join("silences.txt")).unwrap();

        let summary = validate(dir.path(), &Config::default()).unwrap();
        assert!(summary.warnings >= 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("data").join("silences.txt")).unwrap(),
            "SIL\nSPN\n"
        );
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let dir = TempDir::new().unwrap();
        build_corpus(dir.path());
        let data = dir.path().join("data");
        fs::remove_file(data.join("silences.txt")).unwrap();
        fs::remove_file(data.join("extra_questions.txt")).unwrap();
        fs::write(data.join("lexicon.txt"), "hello HH AA\nworld OW AA\n").unwrap();

        validate(dir.path(), &Config::default()).unwrap();
        let silences = fs::read_to_string(data.join("silences.txt")).unwrap();
        let variants = fs::read_to_string(data.join("extra_questions.txt")).unwrap();
        let lexicon = fs::read_to_string(data.join("lexicon.txt")).unwrap();

        validate(dir.path(), &Config::default()).unwrap();
        assert_eq!(fs::read_to_string(data.join("silences.txt")).unwrap(), silences);
        assert_eq!(
            fs::read_to_string(data.join("extra_questions.txt")).unwrap(),
            variants
        );
        assert_eq!(fs::read_to_string(data.join("lexicon.txt")).unwrap(), lexicon);
    }

    #[test]
    fn test_tables_sorted_in_place() {
        let dir = TempDir::new().unwrap();
        build_corpus(dir.path());
        let data = dir.path().join("data");
        // 逆順で書いても検証後はバイト順に整列される
        fs::write(
            data.join("segments"),
            "spk2-u1 rec2.wav\nspk1-u2 rec1.wav 1.0 2.0\nspk1-u1 rec1.wav 0.0 1.0\n",
        )
        .unwrap();
        fs::write(
            data.join("utt2spk"),
            "spk2-u1 spk2\nspk1-u2 spk1\nspk1-u1 spk1\n",
        )
        .unwrap();
        fs::write(
            data.join("text"),
            "spk2-u1 world\nspk1-u2 hello\nspk1-u1 hello world\n",
        )
        .unwrap();

        validate(dir.path(), &Config::default()).unwrap();
        assert_eq!(
            fs::read_to_string(data.join("segments")).unwrap(),
            "spk1-u1 rec1.wav 0.0 1.0\nspk1-u2 rec1.wav 1.0 2.0\nspk2-u1 rec2.wav\n"
        );
    }

    #[test]
    fn test_blank_line_in_segments_rejected() {
        let dir = TempDir::new().unwrap();
        build_corpus(dir.path());
        // 途中に空行 → ソートでは消えず、列数検査で拒否される
        fs::write(
            dir.path().join("data").join("segments"),
            "spk1-u1 rec1.wav 0.0 1.0\n\nspk1-u2 rec1.wav 1.0 2.0\nspk2-u1 rec2.wav\n",
        )
        .unwrap();

        let err = validate(dir.path(), &Config::default()).unwrap_err();
        assert!(matches!(err, ValidationError::Format(_)));
        let content =
            fs::read_to_string(dir.path().join("data").join("segments")).unwrap();
        assert!(content.starts_with('\n'));
        assert!(content.contains("spk1-u1"));
    }

    #[test]
    fn test_permuted_utt2spk_accepted_without_sorting() {
        let dir = TempDir::new().unwrap();
        build_corpus(dir.path());
        // 整列を無効にすると行順は segments と異なりうるが、
        // ID集合が同じなら受理される
        fs::write(
            dir.path().join("data").join("utt2spk"),
            "spk2-u1 spk2\nspk1-u1 spk1\nspk1-u2 spk1\n",
        )
        .unwrap();
        let mut config = Config::default();
        config.tables.sort_on_validate = false;

        let summary = validate(dir.path(), &config).unwrap();
        assert_eq!(summary.speakers, 2);
        assert_eq!(
            fs::read_to_string(dir.path().join("data").join("utt2spk")).unwrap(),
            "spk2-u1 spk2\nspk1-u1 spk1\nspk1-u2 spk1\n"
        );
    }

    #[test]
    fn test_same_start_warning_keeps_verdict() {
        let dir = TempDir::new().unwrap();
        build_corpus(dir.path());
        fs::write(
            dir.path().join("data").join("segments"),
            "spk1-u1 rec1.wav 0.0 1.0\nspk1-u2 rec1.wav 0.0 2.0\nspk2-u1 rec2.wav\n",
        )
        .unwrap();

        let summary = validate(dir.path(), &Config::default()).unwrap();
        assert!(summary.warnings >= 1);
        let log = fs::read_to_string(dir.path().join("logs").join("data_validation.log")).unwrap();
        assert!(log.contains("spk1-u1"));
        assert!(log.contains("spk1-u2"));
    }

    #[test]
    fn test_unk_as_sil_rejected() {
        let dir = TempDir::new().unwrap();
        build_corpus(dir.path());
        fs::write(
            dir.path().join("data").join("lexicon.txt"),
            "hello HH AA\nworld OW AA\n<UNK> SIL\n",
        )
        .unwrap();

        let err = validate(dir.path(), &Config::default()).unwrap_err();
        assert!(matches!(err, ValidationError::Integrity(_)));
    }

    #[test]
    fn test_oov_ratio_computed() {
        let dir = TempDir::new().unwrap();
        build_corpus(dir.path());
        // 語彙 {a, b} / 使用語 {a, b, c} → タイプ比 1/3
        let data = dir.path().join("data");
        fs::write(data.join("text"), "spk1-u1 a b\nspk1-u2 c\nspk2-u1 c\n").unwrap();
        fs::write(data.join("lexicon.txt"), "a HH\nb OW\n<UNK> SPN\n").unwrap();

        let summary = validate(dir.path(), &Config::default()).unwrap();
        assert!((summary.oov.type_ratio - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.oov.oov_tokens, 2);
        assert_eq!(summary.oov.used_tokens, 4);
    }

    #[test]
    fn test_utt_id_mismatch_rejected() {
        let dir = TempDir::new().unwrap();
        build_corpus(dir.path());
        fs::write(
            dir.path().join("data").join("utt2spk"),
            "spk1-u1 spk1\nspk1-u2 spk1\nspk2-u9 spk2\n",
        )
        .unwrap();

        let err = validate(dir.path(), &Config::default()).unwrap_err();
        assert!(matches!(err, ValidationError::Integrity(_)));
    }
}
