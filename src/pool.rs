//! Network-owned function tables.
//!
//! Functions of at most [`MAX_ANALYZE_INPUTS`] inputs are keyed by their truth
//! table, so logically equal expressions share one id. Wider expressions are
//! always appended as new entries.

use std::collections::HashMap;

use crate::expr::Expr;
use crate::prim::MAX_ANALYZE_INPUTS;
use crate::tvfunc::TvFunc;

#[derive(Debug, Clone, Default)]
pub struct ExprPool {
    exprs: Vec<(usize, Expr)>,
    index: HashMap<TvFunc, usize>,
}

impl ExprPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn clear(&mut self) {
        self.exprs.clear();
        self.index.clear();
    }

    /// The expression stored under `id`.
    pub fn expr(&self, id: usize) -> &Expr {
        &self.exprs[id].1
    }

    /// Input count the expression was registered with.
    pub fn input_num(&self, id: usize) -> usize {
        self.exprs[id].0
    }

    /// Registers `expr` over `input_num` inputs and returns its id.
    pub fn reg(&mut self, input_num: usize, expr: Expr) -> usize {
        if input_num <= MAX_ANALYZE_INPUTS {
            let tv = expr.make_tv(input_num);
            if let Some(&id) = self.index.get(&tv) {
                return id;
            }
            let id = self.exprs.len();
            self.exprs.push((input_num, expr));
            self.index.insert(tv, id);
            id
        } else {
            let id = self.exprs.len();
            self.exprs.push((input_num, expr));
            id
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TvPool {
    funcs: Vec<TvFunc>,
    index: HashMap<TvFunc, usize>,
}

impl TvPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    pub fn clear(&mut self) {
        self.funcs.clear();
        self.index.clear();
    }

    pub fn func(&self, id: usize) -> &TvFunc {
        &self.funcs[id]
    }

    pub fn reg(&mut self, tv: TvFunc) -> usize {
        if let Some(&id) = self.index.get(&tv) {
            return id;
        }
        let id = self.funcs.len();
        self.funcs.push(tv.clone());
        self.index.insert(tv, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_expr_dedup_by_function() {
        let mut pool = ExprPool::new();
        let a = Expr::posi_literal(0);
        let b = Expr::posi_literal(1);
        let e1 = Expr::and(vec![a.clone(), Expr::or(vec![b.clone(), !b.clone()])]);
        let e2 = Expr::or(vec![
            Expr::and(vec![a.clone(), b.clone()]),
            Expr::and(vec![a.clone(), !b.clone()]),
        ]);
        let id1 = pool.reg(2, e1);
        let id2 = pool.reg(2, e2);
        assert_eq!(id1, id2);
        // Same expression over a different input count is a different function.
        let id3 = pool.reg(3, a.clone());
        assert_ne!(id1, id3);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_wide_expr_not_deduped() {
        let mut pool = ExprPool::new();
        let e = Expr::and((0..11).map(Expr::posi_literal));
        let id1 = pool.reg(11, e.clone());
        let id2 = pool.reg(11, e);
        assert_ne!(id1, id2);
        assert_eq!(pool.input_num(id2), 11);
    }

    #[test]
    fn test_tv_dedup() {
        let mut pool = TvPool::new();
        let f = TvFunc::posi_literal(3, 1);
        let id1 = pool.reg(f.clone());
        let id2 = pool.reg(f.clone());
        let id3 = pool.reg(!f);
        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(pool.len(), 2);
    }
}
