use crate::error::{Result, ValidationError};
use crate::report::ValidationLog;
use crate::types::{duplicated, Segment, WavParams};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// segments テーブルの構造検証
///
/// - 発話IDの一意性（違反は致命的）
/// - 参照先 wav の存在（違反は致命的、全件列挙）
/// - タイムスタンプの順序・範囲（違反は致命的、全件列挙）
/// - 同一開始/終了時刻の衝突と時間的オーバーラップ（警告のみ）
///
/// 全 wav がちょうど1発話から参照されタイムスタンプが無い場合
/// （ファイル全体コーパス）はタイミング検査を省略する。
pub fn check_segments(
    segments: &[Segment],
    wavs: &BTreeMap<String, WavParams>,
    log: &mut ValidationLog,
) -> Result<()> {
    let utt_ids: Vec<String> = segments.iter().map(|s| s.utt_id.clone()).collect();
    let dup = duplicated(&utt_ids);
    if !dup.is_empty() {
        return Err(ValidationError::integrity(format!(
            "segments 内で次の発話IDが複数回使用されています: {:?}",
            dup
        )));
    }

    let referenced: BTreeSet<&str> = segments.iter().map(|s| s.wav.as_str()).collect();
    let missing: Vec<&&str> = referenced
        .iter()
        .filter(|w| !wavs.contains_key(**w))
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::integrity(format!(
            "segments から参照されている次の wav ファイルが wavs フォルダにありません: {:?}",
            missing
        )));
    }

    // ファイル全体コーパスの早道: 各 wav が1発話から参照され
    // タイムスタンプが1つも無ければ、これ以上調べることはない
    let no_timestamps = segments.iter().all(|s| s.start.is_none() && s.stop.is_none());
    if referenced.len() == segments.len() && no_timestamps {
        return Ok(());
    }

    check_timestamps(segments, wavs, log)
}

/// wav ファイル毎にタイムスタンプの整合性を調べる
fn check_timestamps(
    segments: &[Segment],
    wavs: &BTreeMap<String, WavParams>,
    log: &mut ValidationLog,
) -> Result<()> {
    let log_path = log.path().to_path_buf();
    let mut errors: Vec<String> = Vec::new();
    let mut warned = false;

    // 処理に時間がかかることがあるため進捗を報告する
    let n = wavs.len();
    let mut next_display = 0.1;
    log.debug("タイムスタンプ整合性を 0% の wav について確認");

    for (i, (wav, params)) in wavs.iter().enumerate() {
        let duration = params.duration();
        // 省略されたタイムスタンプはファイル境界で補う
        let utts: Vec<(&str, f64, f64)> = segments
            .iter()
            .filter(|s| &s.wav == wav)
            .map(|s| {
                (
                    s.utt_id.as_str(),
                    s.start.unwrap_or(0.0),
                    s.stop.unwrap_or(duration),
                )
            })
            .collect();

        for &(utt_id, start, stop) in &utts {
            if stop < start {
                errors.push(format!(
                    "発話 {} の終了時刻が開始時刻より前です",
                    utt_id
                ));
            }
            if !(0.0..=duration).contains(&start) {
                errors.push(format!(
                    "発話 {} の開始時刻がファイル長と整合しません",
                    utt_id
                ));
            }
            if !(0.0..=duration).contains(&stop) {
                errors.push(format!(
                    "発話 {} の終了時刻がファイル長と整合しません",
                    utt_id
                ));
            }
        }

        warned |= warn_boundary_collisions(wav, &utts, log);
        warned |= warn_overlaps(wav, &utts, log);

        let prop = (i + 1) as f64 / n as f64;
        if prop >= next_display {
            log.debug(format!(
                "タイムスタンプ整合性を {}% の wav について確認",
                (next_display * 100.0).round() as u32
            ));
            next_display += 0.1;
        }
    }

    if warned {
        log.info(format!(
            "一部の発話が時間的に衝突しています。詳細はログ {} を参照",
            log_path.display()
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Integrity(errors.join("\n")))
    }
}

/// 同一の開始/終了時刻を共有する発話を警告する
fn warn_boundary_collisions(
    wav: &str,
    utts: &[(&str, f64, f64)],
    log: &mut ValidationLog,
) -> bool {
    let same_start = grouped_by_time(utts.iter().map(|&(utt, start, _)| (utt, start)));
    let same_stop = grouped_by_time(utts.iter().map(|&(utt, _, stop)| (utt, stop)));
    let mut warned = false;
    if !same_start.is_empty() {
        log.warn(format!(
            "wav ファイル {} 内で次の発話は同じ時刻に開始します: {}",
            wav,
            format_collisions(&same_start)
        ));
        warned = true;
    }
    if !same_stop.is_empty() {
        log.warn(format!(
            "wav ファイル {} 内で次の発話は同じ時刻に終了します: {}",
            wav,
            format_collisions(&same_stop)
        ));
        warned = true;
    }
    warned
}

/// 同一時刻（ビットパターン一致）を共有する発話IDをまとめる
fn grouped_by_time<'a>(pairs: impl Iterator<Item = (&'a str, f64)>) -> Vec<(f64, Vec<&'a str>)> {
    let mut groups: HashMap<u64, (f64, Vec<&str>)> = HashMap::new();
    for (utt, time) in pairs {
        let entry = groups.entry(time.to_bits()).or_insert((time, Vec::new()));
        entry.1.push(utt);
    }
    let mut collisions: Vec<(f64, Vec<&str>)> = groups
        .into_values()
        .filter(|(_, utts)| utts.len() > 1)
        .collect();
    collisions.sort_by(|a, b| a.0.total_cmp(&b.0));
    collisions
}

fn format_collisions(collisions: &[(f64, Vec<&str>)]) -> String {
    collisions
        .iter()
        .map(|(time, utts)| format!("{}s: {:?}", time, utts))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 境界インデックス隣接法によるオーバーラップ検出
///
/// ファイル内の相異なる開始/終了時刻を昇順に並べたとき、各発話の
/// (start, stop) は隣接する1スロットをちょうど占めなければならない。
/// そうでない発話は他の発話と重なっている（警告のみ）。
///
/// 同一の (start, stop) 対を共有する発話同士は同じスロットに畳まれ、
/// ここでは重複としては報告されない（同時刻衝突の警告で捕捉される）。
fn warn_overlaps(wav: &str, utts: &[(&str, f64, f64)], log: &mut ValidationLog) -> bool {
    let mut timestamps: Vec<f64> = utts
        .iter()
        .flat_map(|&(_, start, stop)| [start, stop])
        .collect();
    timestamps.sort_by(|a, b| a.total_cmp(b));
    timestamps.dedup();

    let index = |t: f64| timestamps.iter().position(|&x| x == t).unwrap_or(0);
    let overlapped: Vec<&str> = utts
        .iter()
        .filter(|&&(_, start, stop)| index(stop) != index(start) + 1)
        .map(|&(utt, _, _)| utt)
        .collect();

    if overlapped.is_empty() {
        false
    } else {
        log.warn(format!(
            "wav ファイル {} 内の次の発話は時間的に重なっています: {:?}",
            wav, overlapped
        ));
        true
    }
}
