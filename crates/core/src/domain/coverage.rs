use serde::{Deserialize, Serialize};

use crate::domain::money::{amount, is_positive_amount};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageKind {
    Fixed,
    Dynamic,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageItem {
    pub name: String,
    pub value: String,
    pub kind: CoverageKind,
}

impl CoverageItem {
    pub fn amount(&self) -> u64 {
        amount(&self.value)
    }
}

/// Fixed slots mirror the coverage catalog one-to-one and in catalog order;
/// dynamic items keep their entry order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSelections {
    fixed: Vec<CoverageItem>,
    dynamic: Vec<CoverageItem>,
}

impl CoverageSelections {
    pub fn from_catalog<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fixed = names
            .into_iter()
            .map(|name| CoverageItem {
                name: name.into(),
                value: String::new(),
                kind: CoverageKind::Fixed,
            })
            .collect();
        Self { fixed, dynamic: Vec::new() }
    }

    pub fn fixed(&self) -> &[CoverageItem] {
        &self.fixed
    }

    pub fn dynamic(&self) -> &[CoverageItem] {
        &self.dynamic
    }

    /// Stores `value` on the fixed slot called `name`. Returns `false` when the
    /// catalog has no such coverage.
    pub fn set_fixed_value(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.fixed.iter_mut().find(|item| item.name == name) {
            Some(item) => {
                item.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn add_dynamic(&mut self, name: impl Into<String>, value: impl Into<String>) -> usize {
        self.dynamic.push(CoverageItem {
            name: name.into(),
            value: value.into(),
            kind: CoverageKind::Dynamic,
        });
        self.dynamic.len() - 1
    }

    pub fn update_dynamic(
        &mut self,
        index: usize,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> bool {
        match self.dynamic.get_mut(index) {
            Some(item) => {
                item.name = name.into();
                item.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn remove_dynamic(&mut self, index: usize) -> Option<CoverageItem> {
        (index < self.dynamic.len()).then(|| self.dynamic.remove(index))
    }

    pub fn has_fixed_selection(&self) -> bool {
        self.fixed.iter().any(|item| is_positive_amount(&item.value))
    }

    /// Coverages that make it into the exported document.
    pub fn selected(&self) -> Vec<&CoverageItem> {
        self.fixed
            .iter()
            .filter(|item| is_positive_amount(&item.value))
            .chain(self.dynamic.iter())
            .collect()
    }

    pub fn has_any_selection(&self) -> bool {
        self.has_fixed_selection() || !self.dynamic.is_empty()
    }
}
