//! 準備器（preparator）の境界契約
//!
//! コーパス固有の生レイアウトを正規化テーブルに変換する準備器は、
//! `CorpusPreparator` を実装する（1コーパス形式につき1実装、継承では
//! なく設定の `CorpusKind` で選択する）。個別コーパスの変換ロジックは
//! このクレートの範囲外で、ここでは契約と正規化レイアウトへの
//! 書き出しのみを提供する。

use crate::types::{LexiconEntry, Phone, Segment, SpeakerEntry, Transcription};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// 対応するコーパス配布形式
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CorpusKind {
    Buckeye,
    Librispeech,
    Cid,
}

/// コーパス準備器が提供しなければならない能力
pub trait CorpusPreparator {
    fn corpus_kind(&self) -> CorpusKind;

    /// 取り込む音声ファイル（コピー元のパス）を列挙する
    fn list_audio_files(&self) -> Result<Vec<PathBuf>>;

    fn make_segments(&self) -> Result<Vec<Segment>>;

    fn make_speakers(&self) -> Result<Vec<SpeakerEntry>>;

    fn make_transcription(&self) -> Result<Vec<Transcription>>;

    fn make_phones(&self) -> Result<Vec<Phone>>;

    fn make_lexicon(&self) -> Result<Vec<LexiconEntry>>;
}

/// 準備器の出力を正規化ディスクレイアウトに書き出す
///
/// 検証器が消費するのと同じ文法でテーブル5種と wavs フォルダ、
/// logs フォルダを作る。silences.txt と extra_questions.txt は
/// 書かない（無ければ検証器の自動修復が合成する）。
pub fn write_corpus(preparator: &dyn CorpusPreparator, corpus_dir: &Path) -> Result<()> {
    let data_dir = corpus_dir.join("data");
    let wav_dir = data_dir.join("wavs");
    fs::create_dir_all(&wav_dir)
        .with_context(|| format!("{} の作成に失敗", wav_dir.display()))?;
    fs::create_dir_all(corpus_dir.join("logs"))
        .with_context(|| format!("{} の logs 作成に失敗", corpus_dir.display()))?;

    log::info!(
        "{:?} コーパスを {} に書き出します",
        preparator.corpus_kind(),
        corpus_dir.display()
    );

    for source in preparator.list_audio_files()? {
        let name = source
            .file_name()
            .with_context(|| format!("音声ファイル名を取得できません: {}", source.display()))?;
        fs::copy(&source, wav_dir.join(name))
            .with_context(|| format!("{} のコピーに失敗", source.display()))?;
    }

    let segments = preparator.make_segments()?;
    write_table(
        &data_dir.join("segments"),
        segments.iter().map(format_segment),
    )?;

    let speakers = preparator.make_speakers()?;
    write_table(
        &data_dir.join("utt2spk"),
        speakers
            .iter()
            .map(|e| format!("{} {}", e.utt_id, e.speaker_id)),
    )?;

    let transcriptions = preparator.make_transcription()?;
    write_table(
        &data_dir.join("text"),
        transcriptions
            .iter()
            .map(|t| format!("{} {}", t.utt_id, t.words.join(" "))),
    )?;

    let phones = preparator.make_phones()?;
    write_table(
        &data_dir.join("phones.txt"),
        phones.iter().map(|p| format!("{} {}", p.symbol, p.ipa)),
    )?;

    let lexicon = preparator.make_lexicon()?;
    write_table(
        &data_dir.join("lexicon.txt"),
        lexicon
            .iter()
            .map(|e| format!("{} {}", e.word, e.pronunciation.join(" "))),
    )?;

    Ok(())
}

fn format_segment(segment: &Segment) -> String {
    match (segment.start, segment.stop) {
        (Some(start), Some(stop)) => {
            format!("{} {} {} {}", segment.utt_id, segment.wav, start, stop)
        }
        _ => format!("{} {}", segment.utt_id, segment.wav),
    }
}

fn write_table(path: &Path, lines: impl Iterator<Item = String>) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("{} の作成に失敗", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{}", line)
            .with_context(|| format!("{} への書き込みに失敗", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("{} のフラッシュに失敗", path.display()))?;
    Ok(())
}
