//! C5 — Pruner: select templates whose corner count falls in a tolerance
//! band around the stroke's estimated corner count.

use crate::template::TemplateBank;

/// Which bank is being pruned — only the command bank falls back to
/// selecting everything when the band admits nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankKind {
    Lexicon,
    Command,
}

/// Select template indices whose `corners` value is in `band` or `-1`
/// (1-letter words always survive pruning). If the selection is empty and
/// `kind` is [`BankKind::Command`], fall back to selecting every template.
pub fn prune(bank: &TemplateBank, band: &[i64], kind: BankKind) -> Vec<usize> {
    let selected: Vec<usize> = bank
        .corners
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c == -1 || band.contains(&c))
        .map(|(i, _)| i)
        .collect();

    if selected.is_empty() && kind == BankKind::Command {
        (0..bank.len()).collect()
    } else {
        selected
    }
}
