//! Propositional Horn-clause knowledge bases exposed as and-or graphs.
//!
//! Symbols are "or" nodes: any one clause concluding them is enough. Each of
//! their edges leads to a clause node, whose own edges lead to the clause's
//! antecedents, all of which must hold.
//!
//! ```text
//! # comments and blank lines are ignored
//! P <- Q & R
//! P <- S
//! Q <- U
//! U
//! R
//! ```
//!
//! Lines without `<-` are known truths.

use std::hash::Hash;
use std::hash::Hasher;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::space::Edge;
use crate::space::Node;

pub type SymbolId = usize;
pub type ClauseId = usize;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KnowledgeBaseParseError {
    #[error("Invalid symbol '{symbol}' on line {line}")]
    InvalidSymbol { symbol: String, line: usize },
    #[error("Clause without antecedents on line {line}")]
    EmptyBody { line: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Clause {
    head: SymbolId,
    body: Vec<SymbolId>,
}

#[derive(Clone, Debug, Default)]
pub struct KnowledgeBase {
    names: Vec<String>,
    ids: FxHashMap<String, SymbolId>,
    is_truth: Vec<bool>,
    clauses: Vec<Clause>,
    /// Clauses concluding each symbol, in insertion order.
    by_head: Vec<Vec<ClauseId>>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_owned());
        self.ids.insert(name.to_owned(), id);
        self.is_truth.push(false);
        self.by_head.push(vec![]);
        id
    }

    pub fn add_truth(&mut self, name: &str) {
        let id = self.intern(name);
        self.is_truth[id] = true;
    }

    /// Adds `head <- body[0] & body[1] & ...`.
    pub fn add_clause(&mut self, head: &str, body: &[&str]) {
        let head = self.intern(head);
        let body = body.iter().map(|name| self.intern(name)).collect();
        let id = self.clauses.len();
        self.clauses.push(Clause { head, body });
        self.by_head[head].push(id);
    }

    /// Forgets a known truth, keeping its clauses.
    pub fn retract_truth(&mut self, name: &str) {
        if let Some(&id) = self.ids.get(name) {
            self.is_truth[id] = false;
        }
    }

    /// The "or" node of a symbol.
    #[must_use]
    pub fn symbol(&self, name: &str) -> Option<KnowledgeNode<'_>> {
        let &id = self.ids.get(name)?;
        Some(KnowledgeNode {
            kb: self,
            kind: NodeKind::Symbol(id),
        })
    }

    pub fn num_symbols(&self) -> usize {
        self.names.len()
    }
    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }
}

fn is_valid_symbol(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

impl TryFrom<&str> for KnowledgeBase {
    type Error = KnowledgeBaseParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut kb = Self::new();
        for (i, line) in s.lines().enumerate() {
            let line_number = i + 1;
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let check = |symbol: &str| {
                if is_valid_symbol(symbol) {
                    Ok(())
                } else {
                    Err(KnowledgeBaseParseError::InvalidSymbol {
                        symbol: symbol.to_owned(),
                        line: line_number,
                    })
                }
            };

            match line.split_once("<-") {
                None => {
                    check(line)?;
                    kb.add_truth(line);
                }
                Some((head, body)) => {
                    let head = head.trim();
                    check(head)?;
                    if body.trim().is_empty() {
                        return Err(KnowledgeBaseParseError::EmptyBody { line: line_number });
                    }
                    let body: Vec<&str> = body.split('&').map(str::trim).collect();
                    for symbol in &body {
                        check(symbol)?;
                    }
                    kb.add_clause(head, &body);
                }
            }
        }
        Ok(kb)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum NodeKind {
    Symbol(SymbolId),
    Clause(ClauseId),
}

/// A symbol or a clause of a knowledge base.
#[derive(Clone, Copy)]
pub struct KnowledgeNode<'kb> {
    kb: &'kb KnowledgeBase,
    kind: NodeKind,
}

impl KnowledgeNode<'_> {
    pub fn is_symbol(&self) -> bool {
        matches!(self.kind, NodeKind::Symbol(_))
    }

    /// Whether this is a symbol known to hold.
    pub fn is_truth(&self) -> bool {
        match self.kind {
            NodeKind::Symbol(id) => self.kb.is_truth[id],
            NodeKind::Clause(_) => false,
        }
    }
}

impl std::fmt::Display for KnowledgeNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.kind {
            NodeKind::Symbol(id) => write!(f, "{}", self.kb.names[id]),
            NodeKind::Clause(id) => {
                let clause = &self.kb.clauses[id];
                write!(f, "{} <-", self.kb.names[clause.head])?;
                for (i, &symbol) in clause.body.iter().enumerate() {
                    let separator = if i == 0 { " " } else { " & " };
                    write!(f, "{separator}{}", self.kb.names[symbol])?;
                }
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for KnowledgeNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.kind {
            NodeKind::Symbol(_) => write!(f, "{self}"),
            NodeKind::Clause(_) => write!(f, "({self})"),
        }
    }
}

impl PartialEq for KnowledgeNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.kb, other.kb) && self.kind == other.kind
    }
}
impl Eq for KnowledgeNode<'_> {}
impl Hash for KnowledgeNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}

impl<'kb> Node for KnowledgeNode<'kb> {
    type Edge = KnowledgeEdge<'kb>;

    fn edges(&self) -> Vec<KnowledgeEdge<'kb>> {
        let kb = self.kb;
        let from = self.kind;
        match self.kind {
            NodeKind::Symbol(id) => kb.by_head[id]
                .iter()
                .map(|&clause| KnowledgeEdge {
                    kb,
                    from,
                    to: NodeKind::Clause(clause),
                })
                .collect(),
            NodeKind::Clause(id) => kb.clauses[id]
                .body
                .iter()
                .map(|&symbol| KnowledgeEdge {
                    kb,
                    from,
                    to: NodeKind::Symbol(symbol),
                })
                .collect(),
        }
    }
}

/// Either "symbol is concluded by clause" or "clause needs symbol".
#[derive(Clone, Copy)]
pub struct KnowledgeEdge<'kb> {
    kb: &'kb KnowledgeBase,
    from: NodeKind,
    to: NodeKind,
}

impl KnowledgeEdge<'_> {
    /// Whether the edge leads to a clause, all of whose antecedents must hold.
    pub fn is_conjunction(&self) -> bool {
        matches!(self.to, NodeKind::Clause(_))
    }
}

impl std::fmt::Debug for KnowledgeEdge<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}->{:?}", self.from(), self.to())
    }
}

impl PartialEq for KnowledgeEdge<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.kb, other.kb) && (self.from, self.to) == (other.from, other.to)
    }
}
impl Eq for KnowledgeEdge<'_> {}
impl Hash for KnowledgeEdge<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.from, self.to).hash(state);
    }
}

impl<'kb> Edge for KnowledgeEdge<'kb> {
    type Node = KnowledgeNode<'kb>;

    fn from(&self) -> KnowledgeNode<'kb> {
        KnowledgeNode {
            kb: self.kb,
            kind: self.from,
        }
    }
    fn to(&self) -> KnowledgeNode<'kb> {
        KnowledgeNode {
            kb: self.kb,
            kind: self.to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;

    #[test]
    fn parses_clauses_and_truths() {
        let kb = KnowledgeBase::try_from(indoc! {"
            # P holds either way
            P <- Q & R
            P <- S

            U
        "})
        .unwrap();
        assert_eq!(kb.num_symbols(), 5);
        assert_eq!(kb.num_clauses(), 2);
        assert!(kb.symbol("U").unwrap().is_truth());
        assert!(!kb.symbol("P").unwrap().is_truth());
        assert!(kb.symbol("T").is_none());
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(
            KnowledgeBase::try_from("P <- Q & 1x").err(),
            Some(KnowledgeBaseParseError::InvalidSymbol {
                symbol: "1x".to_owned(),
                line: 1
            })
        );
        assert_eq!(
            KnowledgeBase::try_from("\nP <-").err(),
            Some(KnowledgeBaseParseError::EmptyBody { line: 2 })
        );
        assert_eq!(
            KnowledgeBase::try_from("P <- Q &").err(),
            Some(KnowledgeBaseParseError::InvalidSymbol {
                symbol: String::new(),
                line: 1
            })
        );
    }

    #[test]
    fn symbols_lead_to_clauses_and_clauses_to_antecedents() {
        let mut kb = KnowledgeBase::new();
        kb.add_clause("P", &["Q", "R"]);
        kb.add_clause("P", &["S"]);

        let p = kb.symbol("P").unwrap();
        let clauses = p.edges();
        assert_eq!(clauses.len(), 2);
        assert!(clauses.iter().all(KnowledgeEdge::is_conjunction));
        assert_eq!(clauses[0].to().to_string(), "P <- Q & R");
        assert_eq!(clauses[1].to().to_string(), "P <- S");

        let antecedents: Vec<_> = clauses[0].to().edges().iter().map(|e| e.to()).collect();
        assert_eq!(antecedents, vec![kb.symbol("Q").unwrap(), kb.symbol("R").unwrap()]);
        assert!(!clauses[0].to().edges()[0].is_conjunction());
        assert!(kb.symbol("Q").unwrap().edges().is_empty());
    }

    #[test]
    fn truths_can_be_retracted() {
        let mut kb = KnowledgeBase::new();
        kb.add_truth("A");
        kb.retract_truth("A");
        kb.retract_truth("Z");
        assert!(!kb.symbol("A").unwrap().is_truth());
    }
}
