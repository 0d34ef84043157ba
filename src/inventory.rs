use crate::error::{Result, ValidationError};
use crate::repair;
use crate::report::ValidationLog;
use crate::table;
use crate::types::{duplicated, Phone, SIL, SPN};
use std::collections::BTreeSet;
use std::path::Path;

/// 音素目録: phones ∪ silences
///
/// lexicon.txt の発音が使ってよいシンボルの閉集合。
#[derive(Clone, Debug)]
pub struct Inventory {
    pub phones: Vec<Phone>,
    pub silences: Vec<String>,
    pub variants: Vec<Vec<String>>,
}

impl Inventory {
    /// 目録内の全シンボル（phones ∪ silences）
    pub fn symbols(&self) -> BTreeSet<&str> {
        self.phones
            .iter()
            .map(|p| p.symbol.as_str())
            .chain(self.silences.iter().map(|s| s.as_str()))
            .collect()
    }
}

/// 音素目録ファイル群の検証と自動修復
///
/// - `phones.txt`: 予約シンボル（SIL/SPN）の使用、シンボル・IPA の
///   重複を拒否する
/// - `silences.txt`: 無ければ SIL と SPN のみの既定ファイルを作成。
///   あれば重複を拒否し、SIL/SPN の欠落は追記で補う（警告）。
///   phones との共有シンボルは拒否する
/// - `extra_questions.txt`: 無ければ空ファイルを作成。あれば未知
///   シンボルと全グループ横断の重複を拒否する
///
/// 自動修復はすべて追記のみで冪等（2回目の実行では何も書かない）。
pub fn check_inventory(data_dir: &Path, log: &mut ValidationLog) -> Result<Inventory> {
    let phones = check_phones(&data_dir.join("phones.txt"))?;
    let silences = check_silences(&data_dir.join("silences.txt"), &phones, log)?;
    let variants = check_variants(&data_dir.join("extra_questions.txt"), &phones, &silences, log)?;
    Ok(Inventory {
        phones,
        silences,
        variants,
    })
}

fn check_phones(path: &Path) -> Result<Vec<Phone>> {
    let phones = table::read_phones(path)?;

    for reserved in [SIL, SPN] {
        if phones.iter().any(|p| p.symbol == reserved) {
            return Err(ValidationError::integrity(format!(
                "シンボル {} は予約されているため phones.txt では使用できません",
                reserved
            )));
        }
    }

    let symbols: Vec<String> = phones.iter().map(|p| p.symbol.clone()).collect();
    let dup = duplicated(&symbols);
    if !dup.is_empty() {
        return Err(ValidationError::integrity(format!(
            "phones.txt 内で次の音素シンボルが複数回使用されています: {:?}",
            dup
        )));
    }

    let ipas: Vec<String> = phones.iter().map(|p| p.ipa.clone()).collect();
    let dup = duplicated(&ipas);
    if !dup.is_empty() {
        return Err(ValidationError::integrity(format!(
            "phones.txt 内で次の IPA 表記が複数回使用されています: {:?}",
            dup
        )));
    }

    Ok(phones)
}

fn check_silences(path: &Path, phones: &[Phone], log: &mut ValidationLog) -> Result<Vec<String>> {
    if !path.exists() {
        log.warn("silences.txt がありません。SIL と SPN を持つ既定ファイルを作成します");
        repair::create_with_lines(path, &[SIL, SPN])?;
        return Ok(vec![SIL.to_string(), SPN.to_string()]);
    }

    let mut silences = table::read_silences(path)?;
    let dup = duplicated(&silences);
    if !dup.is_empty() {
        return Err(ValidationError::integrity(format!(
            "silences.txt 内で次のシンボルが複数回使用されています: {:?}",
            dup
        )));
    }

    for required in [SIL, SPN] {
        if !silences.iter().any(|s| s == required) {
            log.warn(format!(
                "silences.txt に {} がありません。追記します",
                required
            ));
            repair::append_lines(path, &[required])?;
            silences.push(required.to_string());
        }
    }

    let shared: Vec<&str> = silences
        .iter()
        .filter(|s| phones.iter().any(|p| &p.symbol == *s))
        .map(|s| s.as_str())
        .collect();
    if !shared.is_empty() {
        return Err(ValidationError::integrity(format!(
            "次のシンボルが phones.txt と silences.txt の両方で使用されています: {:?}",
            shared
        )));
    }

    Ok(silences)
}

fn check_variants(
    path: &Path,
    phones: &[Phone],
    silences: &[String],
    log: &mut ValidationLog,
) -> Result<Vec<Vec<String>>> {
    if !path.exists() {
        log.warn("extra_questions.txt がありません。空ファイルを作成します");
        repair::create_with_lines(path, &[])?;
        return Ok(Vec::new());
    }

    let variants = table::read_variants(path)?;
    let all_symbols: Vec<String> = variants.iter().flatten().cloned().collect();

    let unknown: Vec<&str> = all_symbols
        .iter()
        .filter(|s| {
            !phones.iter().any(|p| &&p.symbol == s) && !silences.iter().any(|sil| &sil == s)
        })
        .map(|s| s.as_str())
        .collect();
    if !unknown.is_empty() {
        return Err(ValidationError::integrity(format!(
            "extra_questions.txt に phones.txt にも silences.txt にも無いシンボルがあります: {:?}",
            unknown
        )));
    }

    let dup = duplicated(&all_symbols);
    if !dup.is_empty() {
        return Err(ValidationError::integrity(format!(
            "extra_questions.txt 内で次のシンボルが複数回使用されています: {:?}",
            dup
        )));
    }

    Ok(variants)
}
