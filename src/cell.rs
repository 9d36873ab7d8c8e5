//! Minimal in-memory cell library.
//!
//! Only what network construction needs: pin names and directions, the logic
//! function of single-output combinational cells, and the attributes that make
//! a cell unsuitable for `.gate`.

use std::collections::HashMap;

use crate::expr::Expr;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PinDirection {
    Input,
    Output,
    Inout,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CellKind {
    Logic,
    FlipFlop,
    Latch,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CellPin {
    pub name: String,
    pub direction: PinDirection,
}

#[derive(Debug, Clone)]
pub struct Cell {
    name: String,
    kind: CellKind,
    pins: Vec<CellPin>,
    /// Function of the (single) output over the input pins in pin order.
    function: Option<Expr>,
    tristate: bool,
}

impl Cell {
    /// A single-output combinational cell.
    ///
    /// Input `i` of `function` refers to `inputs[i]`.
    pub fn logic(name: &str, inputs: &[&str], output: &str, function: Expr) -> Self {
        let mut pins: Vec<CellPin> = inputs
            .iter()
            .map(|&n| CellPin {
                name: n.to_string(),
                direction: PinDirection::Input,
            })
            .collect();
        pins.push(CellPin {
            name: output.to_string(),
            direction: PinDirection::Output,
        });
        Self {
            name: name.to_string(),
            kind: CellKind::Logic,
            pins,
            function: Some(function),
            tristate: false,
        }
    }

    /// A cell with explicit pins and no function.
    pub fn new(name: &str, kind: CellKind, pins: Vec<CellPin>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            pins,
            function: None,
            tristate: false,
        }
    }

    pub fn with_tristate(mut self, tristate: bool) -> Self {
        self.tristate = tristate;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn is_logic(&self) -> bool {
        self.kind == CellKind::Logic
    }

    pub fn is_tristate(&self) -> bool {
        self.tristate
    }

    pub fn pins(&self) -> &[CellPin] {
        &self.pins
    }

    pub fn function(&self) -> Option<&Expr> {
        self.function.as_ref()
    }

    fn count(&self, dir: PinDirection) -> usize {
        self.pins.iter().filter(|p| p.direction == dir).count()
    }

    pub fn input_num(&self) -> usize {
        self.count(PinDirection::Input)
    }

    pub fn output_num(&self) -> usize {
        self.count(PinDirection::Output)
    }

    pub fn inout_num(&self) -> usize {
        self.count(PinDirection::Inout)
    }

    pub fn pin_index(&self, name: &str) -> Option<usize> {
        self.pins.iter().position(|p| p.name == name)
    }

    /// Position of pin `pin` among the input pins.
    pub fn input_position(&self, pin: usize) -> Option<usize> {
        if self.pins.get(pin)?.direction != PinDirection::Input {
            return None;
        }
        Some(self.pins[..pin].iter().filter(|p| p.direction == PinDirection::Input).count())
    }

    /// Name of the `i`-th input pin.
    pub fn input_name(&self, i: usize) -> Option<&str> {
        self.pins
            .iter()
            .filter(|p| p.direction == PinDirection::Input)
            .nth(i)
            .map(|p| p.name.as_str())
    }

    /// Name of the first output pin.
    pub fn output_name(&self) -> Option<&str> {
        self.pins
            .iter()
            .find(|p| p.direction == PinDirection::Output)
            .map(|p| p.name.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CellLibrary {
    name: String,
    cells: Vec<Cell>,
    index: HashMap<String, usize>,
}

impl CellLibrary {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a cell and returns its id. A later cell with the same name
    /// shadows the earlier one in lookups.
    pub fn add_cell(&mut self, cell: Cell) -> usize {
        let id = self.cells.len();
        self.index.insert(cell.name.clone(), id);
        self.cells.push(cell);
        id
    }

    pub fn cell(&self, id: usize) -> &Cell {
        &self.cells[id]
    }

    pub fn cell_id(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_logic_cell() {
        let nand = Cell::logic("NAND2", &["A", "B"], "Y", !Expr::and(vec![Expr::posi_literal(0), Expr::posi_literal(1)]));
        assert!(nand.is_logic());
        assert_eq!(nand.input_num(), 2);
        assert_eq!(nand.output_num(), 1);
        assert_eq!(nand.pin_index("B"), Some(1));
        assert_eq!(nand.input_position(1), Some(1));
        assert_eq!(nand.input_position(2), None);
        assert_eq!(nand.output_name(), Some("Y"));
        assert_eq!(nand.input_name(0), Some("A"));
    }

    #[test]
    fn test_library_lookup() {
        let mut lib = CellLibrary::new("tiny");
        let inv = lib.add_cell(Cell::logic("INV", &["A"], "Y", Expr::nega_literal(0)));
        let dff = lib.add_cell(Cell::new(
            "DFF",
            CellKind::FlipFlop,
            vec![
                CellPin {
                    name: "D".into(),
                    direction: PinDirection::Input,
                },
                CellPin {
                    name: "Q".into(),
                    direction: PinDirection::Output,
                },
            ],
        ));
        assert_eq!(lib.cell_id("INV"), Some(inv));
        assert_eq!(lib.cell_id("DFF"), Some(dff));
        assert!(!lib.cell(dff).is_logic());
        assert_eq!(lib.cell_id("AND9"), None);
        assert_eq!(lib.len(), 2);
    }
}
