//! Budget model
//!
//! Everything collected during one session lives here: income, the savings
//! goal, and the expense list. Nothing is persisted.
//!
//! The savings goal is informational only. It is passed on to tip generation
//! but the chart's Savings slice is always the actual leftover
//! (`income - total expenses`, floored at zero).

use serde::{Deserialize, Serialize};

/// Label of the slice holding whatever income is left after expenses
pub const SAVINGS_LABEL: &str = "Savings";

/// A single named expense with its accumulated monthly amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub name: String,
    pub amount: f64,
}

/// Expenses in the order they were first entered
///
/// Adding a name that already exists accumulates onto the existing entry
/// instead of replacing it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expenses {
    items: Vec<Expense>,
}

impl Expenses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an amount under `name`, accumulating if the name was seen before
    ///
    /// Totals saturate at `f64::MAX` instead of overflowing to infinity.
    pub fn add(&mut self, name: &str, amount: f64) {
        match self.items.iter_mut().find(|e| e.name == name) {
            Some(existing) => existing.amount = saturating_add(existing.amount, amount),
            None => self.items.push(Expense {
                name: name.to_string(),
                amount,
            }),
        }
    }

    /// Amount recorded for `name`, if any
    pub fn get(&self, name: &str) -> Option<f64> {
        self.items.iter().find(|e| e.name == name).map(|e| e.amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Expense> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .fold(0.0, |acc, e| saturating_add(acc, e.amount))
    }
}

fn saturating_add(a: f64, b: f64) -> f64 {
    (a + b).min(f64::MAX)
}

impl<'a> IntoIterator for &'a Expenses {
    type Item = &'a Expense;
    type IntoIter = std::slice::Iter<'a, Expense>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Expenses {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        let mut expenses = Expenses::new();
        for (name, amount) in iter {
            let name: String = name.into();
            expenses.add(&name, amount);
        }
        expenses
    }
}

/// Everything the user entered for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub income: f64,
    pub savings_goal: f64,
    pub expenses: Expenses,
}

impl Budget {
    pub fn new(income: f64, savings_goal: f64, expenses: Expenses) -> Self {
        Self {
            income,
            savings_goal,
            expenses,
        }
    }

    pub fn total_expenses(&self) -> f64 {
        self.expenses.total()
    }

    /// Income minus expenses, never below zero
    pub fn leftover_savings(&self) -> f64 {
        (self.income - self.total_expenses()).max(0.0)
    }

    /// Whether expenses add up to more than the income
    pub fn exceeds_income(&self) -> bool {
        self.total_expenses() > self.income
    }

    /// Chart slices: every expense in entry order, then the leftover savings
    pub fn allocation(&self) -> Allocation {
        let mut slices: Vec<Slice> = self
            .expenses
            .iter()
            .map(|e| Slice {
                label: e.name.clone(),
                amount: e.amount,
                share: 0.0,
            })
            .collect();
        slices.push(Slice {
            label: SAVINGS_LABEL.to_string(),
            amount: self.leftover_savings(),
            share: 0.0,
        });

        let total = slices
            .iter()
            .fold(0.0, |acc, s| saturating_add(acc, s.amount));
        if total > 0.0 {
            // Scaled by the largest slice so the divisor stays finite
            let largest = slices.iter().map(|s| s.amount).fold(0.0, f64::max);
            let scaled_total: f64 = slices.iter().map(|s| s.amount / largest).sum();
            for slice in &mut slices {
                slice.share = (slice.amount / largest) / scaled_total;
            }
        }

        Allocation { slices, total }
    }
}

/// One pie slice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub amount: f64,
    /// Fraction of the whole pie (0.0-1.0)
    pub share: f64,
}

impl Slice {
    /// Percentage label, e.g. "33.3%"
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.share * 100.0)
    }
}

/// Ordered pie slices with the sum of their amounts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub slices: Vec<Slice>,
    pub total: f64,
}

impl Allocation {
    /// True when every slice is zero and there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.total <= 0.0
    }

    /// Find which slice covers a position around the pie
    ///
    /// `fraction` runs from 0.0 to 1.0 starting at the first slice.
    /// Zero-sized slices are never returned.
    pub fn slice_at(&self, fraction: f64) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let mut acc = 0.0;
        let mut last_nonzero = None;
        for (i, slice) in self.slices.iter().enumerate() {
            if slice.share <= 0.0 {
                continue;
            }
            acc += slice.share;
            last_nonzero = Some(i);
            if fraction < acc {
                return Some(i);
            }
        }
        // Rounding can leave the cumulative share a hair under 1.0
        last_nonzero
    }
}
