//! コーパス統計エンジン
//!
//! OOV 比率とホモフォン（同音異義語）グループを計算する。ここで
//! 出るのは警告と情報フラグのみで、判定を変えることはない。

use crate::report::ValidationLog;
use crate::types::{LexiconEntry, OovReport, Transcription};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// OOV（語彙外）統計を計算する
///
/// text で使われた語のうち lexicon に無いものをタイプ・トークン
/// 両方で数える。いずれかの比率が `warn_ratio` を超えた場合は
/// 情報フラグを出す（コーパスは拒否しない）。
pub fn oov_report(
    transcriptions: &[Transcription],
    lexicon: &[LexiconEntry],
    warn_ratio: f64,
    log: &mut ValidationLog,
) -> OovReport {
    let used_counts = token_counts(transcriptions);
    let used_tokens: usize = used_counts.values().sum();
    let lexicon_words: BTreeSet<&str> = lexicon.iter().map(|e| e.word.as_str()).collect();

    let used_in_lexicon = used_counts
        .keys()
        .filter(|w| lexicon_words.contains(*w))
        .count();
    log.warn(format!(
        "語彙 {} 語のうち {} 語が転記で使用されています",
        lexicon_words.len(),
        used_in_lexicon
    ));

    let oov_counts: BTreeMap<&str, usize> = used_counts
        .iter()
        .filter(|(w, _)| !lexicon_words.contains(*w))
        .map(|(w, c)| (*w, *c))
        .collect();
    let oov_tokens: usize = oov_counts.values().sum();

    log.warn(format!(
        "全 {} 語タイプのうち {} タイプが OOV です",
        used_counts.len(),
        oov_counts.len()
    ));
    log.warn(format!(
        "全 {} 語トークンのうち {} トークンが OOV です",
        used_tokens,
        oov_tokens
    ));
    log.debug(format!("OOV 語タイプと出現回数: {:?}", oov_counts));

    let type_ratio = ratio(oov_counts.len(), used_counts.len());
    let token_ratio = ratio(oov_tokens, used_tokens);
    log.debug(format!("OOV 語タイプの比率: {}", type_ratio));
    log.debug(format!("OOV 語トークンの比率: {}", token_ratio));

    if type_ratio > warn_ratio {
        log.info(format!(
            "使用されている語タイプの {} 割超が語彙外です!",
            (warn_ratio * 10.0).round() as u32
        ));
    }
    if token_ratio > warn_ratio {
        log.info(format!(
            "使用されている語トークンの {} 割超が語彙外です!",
            (warn_ratio * 10.0).round() as u32
        ));
    }

    OovReport {
        used_types: used_counts.len(),
        used_tokens,
        oov_types: oov_counts.len(),
        oov_tokens,
        type_ratio,
        token_ratio,
    }
}

/// ホモフォングループを報告する
///
/// 発音列が完全一致する語をグループ化し、転記に実際に出現する語を
/// 2語以上含むグループだけをメンバーとトークン数つきで警告する。
/// 返り値は報告したグループ数。
pub fn homophone_report(
    transcriptions: &[Transcription],
    lexicon: &[LexiconEntry],
    log: &mut ValidationLog,
) -> usize {
    let mut by_pronunciation: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for entry in lexicon {
        by_pronunciation
            .entry(entry.pronunciation.join(" "))
            .or_default()
            .push(entry.word.as_str());
    }
    let homophonic: Vec<(&String, &Vec<&str>)> = by_pronunciation
        .iter()
        .filter(|(_, words)| words.len() > 1)
        .collect();
    if homophonic.is_empty() {
        return 0;
    }

    log.info("発音辞書にホモフォンがあります");
    log.warn(format!(
        "複数の語に対応する音素列が {} 個あります",
        homophonic.len()
    ));

    // 転記に出現する語のみに絞ったグループ
    let used_counts = token_counts(transcriptions);
    let mut groups = 0;
    let mut member_types = 0;
    let mut member_tokens = 0;
    for (pronunciation, words) in &homophonic {
        let attested: Vec<&str> = words
            .iter()
            .filter(|w| used_counts.contains_key(**w))
            .copied()
            .collect();
        if attested.len() <= 1 {
            continue;
        }
        groups += 1;
        member_types += attested.len();
        member_tokens += attested
            .iter()
            .map(|w| used_counts[w])
            .sum::<usize>();
        let detail = attested
            .iter()
            .map(|w| format!("{}: {}", w, used_counts[w]))
            .collect::<Vec<_>>()
            .join(", ");
        log.warn(format!(
            "ホモフォングループ [{}] の転記中の出現: {}",
            pronunciation, detail
        ));
    }
    if groups > 0 {
        log.warn(format!(
            "転記に出現するホモフォンは {} グループ、{} 語タイプ、{} トークンです",
            groups, member_types, member_tokens
        ));
    }
    groups
}

/// 転記全体の語トークン数を数える
fn token_counts(transcriptions: &[Transcription]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for t in transcriptions {
        for word in &t.words {
            *counts.entry(word.as_str()).or_insert(0) += 1;
        }
    }
    counts
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
