use crate::error::{Result, ValidationError};
use crate::inventory::Inventory;
use crate::repair;
use crate::report::ValidationLog;
use crate::table;
use crate::types::{duplicated, LexiconEntry, SPN, UNK};
use std::collections::BTreeSet;
use std::path::Path;

/// lexicon.txt の検証と自動修復
///
/// - 単語エントリの重複（異発音）は致命的
/// - `<UNK>` が無ければ `<UNK> SPN` を追記（警告）。あれば発音が
///   ちょうど `[SPN]` であることを要求する
/// - 発音に使われる全音素は目録内でなければならない（違反は
///   致命的、該当音素を全件列挙）
/// - どの発音にも使われない目録内音素は警告
pub fn check_lexicon(
    path: &Path,
    inventory: &Inventory,
    log: &mut ValidationLog,
) -> Result<Vec<LexiconEntry>> {
    let mut entries = table::read_lexicon(path)?;

    let words: Vec<String> = entries.iter().map(|e| e.word.clone()).collect();
    let dup = duplicated(&words);
    if !dup.is_empty() {
        return Err(ValidationError::integrity(format!(
            "異発音は現在サポートされていません。lexicon.txt 内で次の語に複数の発音があります: {:?}",
            dup
        )));
    }

    match entries.iter().find(|e| e.word == UNK) {
        None => {
            log.warn(format!("lexicon に {} 語がありません。追記します", UNK));
            let line = format!("{} {}", UNK, SPN);
            repair::append_lines(path, &[line.as_str()])?;
            entries.push(LexiconEntry {
                word: UNK.to_string(),
                pronunciation: vec![SPN.to_string()],
            });
        }
        Some(unk) => {
            if unk.pronunciation != [SPN] {
                return Err(ValidationError::integrity(format!(
                    "{} 語は OOV 項目のマッピング用に予約されており、発音は常に {}（発声ノイズ）でなければなりません",
                    UNK, SPN
                )));
            }
        }
    }

    let symbols = inventory.symbols();
    let used_phones: BTreeSet<&str> = entries
        .iter()
        .flat_map(|e| e.pronunciation.iter().map(|p| p.as_str()))
        .collect();

    let out_of_inventory: Vec<&&str> = used_phones
        .iter()
        .filter(|p| !symbols.contains(**p))
        .collect();
    if !out_of_inventory.is_empty() {
        return Err(ValidationError::integrity(format!(
            "発音辞書が目録外の音素を使用しています: {:?}",
            out_of_inventory
        )));
    }

    let unused: Vec<&&str> = symbols.iter().filter(|s| !used_phones.contains(**s)).collect();
    if !unused.is_empty() {
        log.warn(format!(
            "次の音素はどの発音にも使われていません: {:?}",
            unused
        ));
    }

    Ok(entries)
}

/// どの発音にも使われていない目録内音素（サマリ用）
pub fn unused_phones(entries: &[LexiconEntry], inventory: &Inventory) -> Vec<String> {
    let used: BTreeSet<&str> = entries
        .iter()
        .flat_map(|e| e.pronunciation.iter().map(|p| p.as_str()))
        .collect();
    inventory
        .symbols()
        .into_iter()
        .filter(|s| !used.contains(s))
        .map(String::from)
        .collect()
}
