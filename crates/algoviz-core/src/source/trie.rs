//! Trie insert, search and delete.

use super::{Outcome, Recorder, StepProgram};
use crate::catalog::Algorithm;
use crate::error::{Error, Result};
use crate::model::{TrieModel, TRIE_ROOT};
use crate::step::{ElementId, Highlight, Mutation, NodeId, Step, StepKind};

pub const MAX_WORD_LEN: usize = 20;

/// Words are non-empty lowercase ASCII.
pub fn validate_word(word: &str) -> Result<()> {
    if word.is_empty() || word.len() > MAX_WORD_LEN {
        return Err(Error::invalid(format!(
            "word must have 1 to {} letters, got {}",
            MAX_WORD_LEN,
            word.len()
        )));
    }
    if let Some(bad) = word.chars().find(|c| !c.is_ascii_lowercase()) {
        return Err(Error::invalid(format!("'{}' is not a lowercase letter", bad)));
    }
    Ok(())
}

fn start(rec: &mut Recorder<TrieModel>, lines: &[u32]) -> Result<()> {
    rec.emit(
        lines,
        Step::new(StepKind::Examine, Highlight::Current)
            .on(ElementId::Node(TRIE_ROOT))
            .says("Start at the root"),
    )
}

pub fn insert(trie: &TrieModel, word: &str) -> Result<StepProgram> {
    validate_word(word)?;
    let mut rec = Recorder::new(Algorithm::TrieInsert, trie.clone());
    start(&mut rec, &[2])?;

    let mut node = TRIE_ROOT;
    for ch in word.chars() {
        node = match rec.model().child(node, ch) {
            Some(next) => {
                rec.emit(
                    &[4, 6],
                    Step::new(StepKind::Examine, Highlight::Examining)
                        .on(ElementId::Node(next))
                        .compares(1)
                        .says(format!("'{}' is already there", ch)),
                )?;
                next
            }
            None => {
                let id = rec.model().next_id();
                rec.emit(
                    &[4, 5],
                    Step::new(StepKind::Mutate, Highlight::Inserting)
                        .on(ElementId::Node(id))
                        .mutate(Mutation::AddTrieChild { parent: node, id, ch })
                        .compares(1)
                        .operations(1)
                        .says(format!("Create a node for '{}'", ch)),
                )?;
                id
            }
        };
    }
    rec.emit(
        &[7],
        Step::new(StepKind::Mutate, Highlight::Found)
            .on(ElementId::Node(node))
            .mutate(Mutation::SetTerminal {
                id: node,
                terminal: true,
            })
            .says(format!("Mark the end of \"{}\"", word)),
    )?;
    Ok(rec.finish(Outcome::Done))
}

pub fn search(trie: &TrieModel, word: &str) -> Result<StepProgram> {
    validate_word(word)?;
    let mut rec = Recorder::new(Algorithm::TrieSearch, trie.clone());
    start(&mut rec, &[9])?;

    let mut node = TRIE_ROOT;
    for ch in word.chars() {
        let Some(next) = rec.model().child(node, ch) else {
            rec.emit(
                &[11],
                Step::new(StepKind::Conclude, Highlight::None)
                    .on(ElementId::Node(node))
                    .compares(1)
                    .says(format!("No '{}' here: \"{}\" is not stored", ch, word)),
            )?;
            return Ok(rec.finish(Outcome::Found { found: false }));
        };
        rec.emit(
            &[12],
            Step::new(StepKind::Examine, Highlight::Examining)
                .on(ElementId::Node(next))
                .compares(1)
                .says(format!("Follow '{}'", ch)),
        )?;
        node = next;
    }

    let found = rec.model().is_terminal(node);
    let step = if found {
        Step::new(StepKind::Found, Highlight::Found).says(format!("Found \"{}\"", word))
    } else {
        Step::new(StepKind::Conclude, Highlight::None)
            .says(format!("\"{}\" is only a prefix", word))
    };
    rec.emit(&[13], step.on(ElementId::Node(node)))?;
    Ok(rec.finish(Outcome::Found { found }))
}

/// Delete `word`, pruning nodes that no longer lead anywhere.
pub fn delete(trie: &TrieModel, word: &str) -> Result<StepProgram> {
    validate_word(word)?;
    if !trie.contains(word) {
        return Err(Error::invalid(format!("\"{}\" is not in the trie", word)));
    }
    let mut rec = Recorder::new(Algorithm::TrieDelete, trie.clone());

    // (parent, ch, child) for every character of the word
    let mut path: Vec<(NodeId, char, NodeId)> = Vec::with_capacity(word.len());
    let mut node = TRIE_ROOT;
    for ch in word.chars() {
        let next = rec
            .model()
            .child(node, ch)
            .ok_or_else(|| Error::inconsistent(format!("lost '{}' while deleting", ch)))?;
        rec.emit(
            &[16],
            Step::new(StepKind::Examine, Highlight::Examining)
                .on(ElementId::Node(next))
                .says(format!("Descend to '{}'", ch)),
        )?;
        path.push((node, ch, next));
        node = next;
    }

    rec.emit(
        &[15],
        Step::new(StepKind::Mutate, Highlight::Deleting)
            .on(ElementId::Node(node))
            .mutate(Mutation::SetTerminal {
                id: node,
                terminal: false,
            })
            .says(format!("Unmark the end of \"{}\"", word)),
    )?;

    for &(parent, ch, child) in path.iter().rev() {
        if rec.model().child_count(child) > 0 || rec.model().is_terminal(child) {
            break;
        }
        rec.emit(
            &[17, 18],
            Step::new(StepKind::Mutate, Highlight::Deleting)
                .on(ElementId::Node(child))
                .mutate(Mutation::RemoveTrieChild { parent, ch })
                .operations(1)
                .says(format!("Prune '{}'", ch)),
        )?;
    }
    Ok(rec.finish(Outcome::Done))
}
