//! Collection of the controls of one form instance

use super::control::ControlState;
use std::collections::HashMap;

/// Controls in declaration order, addressable by field name
#[derive(Debug, Clone, Default)]
pub struct Controls {
    states: Vec<ControlState>,
    index: HashMap<String, usize>,
}

impl Controls {
    pub(crate) fn from_states(states: Vec<ControlState>) -> Self {
        let index = states
            .iter()
            .enumerate()
            .map(|(position, state)| (state.name().to_string(), position))
            .collect();
        Self { states, index }
    }

    pub fn get(&self, name: &str) -> Option<&ControlState> {
        self.index.get(name).map(|&position| &self.states[position])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ControlState> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub(crate) fn at(&self, position: usize) -> &ControlState {
        &self.states[position]
    }

    pub(crate) fn at_mut(&mut self, position: usize) -> &mut ControlState {
        &mut self.states[position]
    }
}

impl<'a> IntoIterator for &'a Controls {
    type Item = &'a ControlState;
    type IntoIter = std::slice::Iter<'a, ControlState>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
