use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// 任意沈黙を示す予約シンボル
pub const SIL: &str = "SIL";

/// 発声ノイズ（OOVマーカー）を示す予約シンボル
pub const SPN: &str = "SPN";

/// 語彙外の語をマップする予約語
pub const UNK: &str = "<UNK>";

/// segments テーブルの1行
///
/// タイムスタンプが無い場合はファイル全体が1発話とみなされる。
///
/// # Examples
///
/// ```
/// # use corpus_validate::types::Segment;
/// let seg = Segment {
///     utt_id: "spk1-utt001".to_string(),
///     wav: "rec1.wav".to_string(),
///     start: Some(0.0),
///     stop: Some(1.5),
/// };
/// assert_eq!(seg.wav, "rec1.wav");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    /// コーパス全体で一意な発話ID
    pub utt_id: String,

    /// 発話を含む wav ファイル名
    pub wav: String,

    /// 開始時刻（秒）。None ならファイル先頭
    pub start: Option<f64>,

    /// 終了時刻（秒）。None ならファイル末尾
    pub stop: Option<f64>,
}

/// utt2spk テーブルの1行
///
/// 話者IDは固定長文字列で、対応する発話IDの接頭辞でなければならない。
#[derive(Clone, Debug, PartialEq)]
pub struct SpeakerEntry {
    pub utt_id: String,
    pub speaker_id: String,
}

/// text テーブルの1行（発話IDと単語列）
#[derive(Clone, Debug, PartialEq)]
pub struct Transcription {
    pub utt_id: String,
    pub words: Vec<String>,
}

/// wav ファイルのフォーマットパラメータ
///
/// 受理されるコーパスでは モノラル・16bit PCM・16kHz・非圧縮・非空
/// でなければならない。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WavParams {
    /// チャンネル数（1: モノラル）
    pub channels: u16,

    /// サンプル幅（バイト単位。16bit == 2バイト）
    pub sample_width_bytes: u16,

    /// サンプリングレート (Hz)
    pub sample_rate: u32,

    /// フレーム数（チャンネルあたりのサンプル数）
    pub frames: u32,

    /// 非圧縮 PCM かどうか
    pub pcm: bool,
}

impl WavParams {
    /// ファイル長（秒）
    pub fn duration(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }
}

/// phones.txt の1行（シンボルとIPA表記の対）
#[derive(Clone, Debug, PartialEq)]
pub struct Phone {
    pub symbol: String,
    pub ipa: String,
}

/// lexicon.txt の1行
///
/// 発音は音素目録（phones ∪ silences）内のシンボル列。
/// 1語につきエントリは1つのみ（異発音は非対応）。
#[derive(Clone, Debug, PartialEq)]
pub struct LexiconEntry {
    pub word: String,
    pub pronunciation: Vec<String>,
}

/// OOV（語彙外）統計
///
/// タイプ比・トークン比のいずれかが閾値を超えると
/// 情報フラグが立つ（コーパスは拒否されない）。
#[derive(Clone, Debug, Serialize)]
pub struct OovReport {
    /// text で使用された語タイプ数
    pub used_types: usize,

    /// text で使用された語トークン数
    pub used_tokens: usize,

    /// 語彙に無い語タイプ数
    pub oov_types: usize,

    /// 語彙に無い語トークン数
    pub oov_tokens: usize,

    /// oov_types / used_types
    pub type_ratio: f64,

    /// oov_tokens / used_tokens
    pub token_ratio: f64,
}

/// 検証成功時に標準出力へ JSON で出力されるサマリ
///
/// # JSON出力例
///
/// ```json
/// {
///   "wav_files": 2,
///   "utterances": 10,
///   "speakers": 3,
///   "phones": 39,
///   "silences": 2,
///   "lexicon_words": 120,
///   "warnings": 1,
///   "oov": { "used_types": 50, "used_tokens": 200,
///            "oov_types": 2, "oov_tokens": 3,
///            "type_ratio": 0.04, "token_ratio": 0.015 },
///   "homophone_groups": 0,
///   "unused_phones": ["ZH"]
/// }
/// ```
#[derive(Clone, Debug, Serialize)]
pub struct ValidationSummary {
    pub wav_files: usize,
    pub utterances: usize,
    pub speakers: usize,
    pub phones: usize,
    pub silences: usize,
    pub lexicon_words: usize,
    pub warnings: usize,
    pub oov: OovReport,
    pub homophone_groups: usize,
    pub unused_phones: Vec<String>,
}

/// 複数回出現する要素を最初の出現順で返す
///
/// エラーメッセージの再現性のため、順序は入力順を保存する。
pub fn duplicated<T: Eq + Hash + Clone>(items: &[T]) -> Vec<T> {
    let mut counts: HashMap<&T, usize> = HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    let mut seen: Vec<T> = Vec::new();
    for item in items {
        if counts[item] > 1 && !seen.contains(item) {
            seen.push(item.clone());
        }
    }
    seen
}
