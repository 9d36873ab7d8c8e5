//! Per-parse name table.

use std::collections::HashMap;

use crate::location::Span;

#[derive(Debug, Clone)]
pub struct Symbol {
    name: String,
    ref_span: Span,
    def_span: Option<Span>,
    is_input: bool,
    is_output: bool,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location of the first reference.
    pub fn ref_span(&self) -> Span {
        self.ref_span
    }

    /// Location of the definition, if any.
    pub fn def_span(&self) -> Option<Span> {
        self.def_span
    }
}

/// Maps names to dense ids in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
        self.index.clear();
    }

    /// Returns the id of `name`, registering it on first sight.
    pub fn find_or_create(&mut self, name: &str, span: Span) -> usize {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.symbols.len();
        self.symbols.push(Symbol {
            name: name.to_string(),
            ref_span: span,
            def_span: None,
            is_input: false,
            is_output: false,
        });
        self.index.insert(name.to_string(), id);
        id
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn symbol(&self, id: usize) -> &Symbol {
        &self.symbols[id]
    }

    pub fn name(&self, id: usize) -> &str {
        &self.symbols[id].name
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Symbol)> {
        self.symbols.iter().enumerate()
    }

    pub fn set_defined(&mut self, id: usize, span: Span) {
        self.symbols[id].def_span = Some(span);
    }

    pub fn is_defined(&self, id: usize) -> bool {
        self.symbols[id].def_span.is_some()
    }

    pub fn set_input(&mut self, id: usize) {
        self.symbols[id].is_input = true;
    }

    pub fn is_input(&self, id: usize) -> bool {
        self.symbols[id].is_input
    }

    pub fn set_output(&mut self, id: usize) {
        self.symbols[id].is_output = true;
    }

    pub fn is_output(&self, id: usize) -> bool {
        self.symbols[id].is_output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Loc;
    use test_log::test;

    #[test]
    fn test_find_or_create() {
        let mut table = SymbolTable::new();
        let s1 = Span::point(Loc::new(1, 1));
        let s2 = Span::point(Loc::new(2, 5));
        let a = table.find_or_create("a", s1);
        let b = table.find_or_create("b", s2);
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(table.find_or_create("a", s2), a);
        assert_eq!(table.symbol(a).ref_span(), s1);
        assert_eq!(table.find("b"), Some(b));
        assert_eq!(table.find("c"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_flags() {
        let mut table = SymbolTable::new();
        let span = Span::point(Loc::new(3, 2));
        let x = table.find_or_create("x", Span::default());
        assert!(!table.is_defined(x));
        table.set_defined(x, span);
        table.set_output(x);
        assert!(table.is_defined(x));
        assert!(table.is_output(x));
        assert!(!table.is_input(x));
        assert_eq!(table.symbol(x).def_span(), Some(span));
        table.clear();
        assert!(table.is_empty());
    }
}
