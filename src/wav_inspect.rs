use crate::config::AudioRequirements;
use crate::error::{Result, ValidationError};
use crate::types::WavParams;
use std::collections::BTreeMap;
use std::path::Path;

/// wavs ディレクトリの検査
///
/// 全ファイルのヘッダを読み、フォーマットパラメータと長さを抽出する。
/// 欠陥（拡張子違い・空ファイル・レート/チャンネル/ビット幅違反・
/// 圧縮形式）は fail-fast ではなく全件収集してからまとめて報告する。
pub fn inspect_wav_dir(
    wav_dir: &Path,
    requirements: &AudioRequirements,
) -> Result<BTreeMap<String, WavParams>> {
    let entries = std::fs::read_dir(wav_dir)
        .map_err(|e| ValidationError::io(format!("{} を列挙できません", wav_dir.display()), e))?;

    let mut names: Vec<String> = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| ValidationError::io(format!("{} を列挙できません", wav_dir.display()), e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort_unstable();

    let wrong_extensions: Vec<&String> =
        names.iter().filter(|n| !n.ends_with(".wav")).collect();
    if !wrong_extensions.is_empty() {
        return Err(ValidationError::format(format!(
            "wavs フォルダ内の次のファイルは拡張子が .wav ではありません: {:?}",
            wrong_extensions
        )));
    }

    let mut params = BTreeMap::new();
    let mut unreadable = Vec::new();
    for name in &names {
        match read_params(&wav_dir.join(name)) {
            Ok(p) => {
                params.insert(name.clone(), p);
            }
            Err(msg) => unreadable.push(format!("{} ({})", name, msg)),
        }
    }
    if !unreadable.is_empty() {
        return Err(ValidationError::format(format!(
            "次のファイルのヘッダを読み取れません（破損または圧縮形式）: {:?}",
            unreadable
        )));
    }

    let mut problems = Vec::new();

    let empty: Vec<&String> = offenders(&params, |p| p.frames == 0);
    if !empty.is_empty() {
        problems.push(format!("次のファイルは空です: {:?}", empty));
    }
    let weird_rate: Vec<&String> =
        offenders(&params, |p| p.sample_rate != requirements.sample_rate);
    if !weird_rate.is_empty() {
        problems.push(format!(
            "対応しているのは {} Hz のファイルのみです。次のファイルは別のレートです: {:?}",
            requirements.sample_rate, weird_rate
        ));
    }
    let non_mono: Vec<&String> = offenders(&params, |p| p.channels != requirements.channels);
    if !non_mono.is_empty() {
        problems.push(format!(
            "対応しているのは {} チャンネルのファイルのみです。次のファイルは違反しています: {:?}",
            requirements.channels, non_mono
        ));
    }
    let wrong_width: Vec<&String> = offenders(&params, |p| {
        p.sample_width_bytes != requirements.sample_width_bytes
    });
    if !wrong_width.is_empty() {
        problems.push(format!(
            "対応しているのは {} バイト幅（{} bit）のファイルのみです。次のファイルは違反しています: {:?}",
            requirements.sample_width_bytes,
            requirements.sample_width_bytes * 8,
            wrong_width
        ));
    }
    let compressed: Vec<&String> = offenders(&params, |p| !p.pcm);
    if !compressed.is_empty() {
        problems.push(format!("次のファイルは圧縮されています: {:?}", compressed));
    }

    if !problems.is_empty() {
        return Err(ValidationError::Format(problems.join("\n")));
    }

    Ok(params)
}

fn offenders<'a>(
    params: &'a BTreeMap<String, WavParams>,
    predicate: impl Fn(&WavParams) -> bool,
) -> Vec<&'a String> {
    params
        .iter()
        .filter(|(_, p)| predicate(p))
        .map(|(name, _)| name)
        .collect()
}

/// 1ファイルのヘッダからフォーマットパラメータを取り出す
fn read_params(path: &Path) -> std::result::Result<WavParams, String> {
    let reader = hound::WavReader::open(path).map_err(|e| e.to_string())?;
    let spec = reader.spec();
    Ok(WavParams {
        channels: spec.channels,
        sample_width_bytes: spec.bits_per_sample / 8,
        sample_rate: spec.sample_rate,
        frames: reader.duration(),
        pcm: spec.sample_format == hound::SampleFormat::Int,
    })
}
