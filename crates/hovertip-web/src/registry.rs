#![forbid(unsafe_code)]

//! Element handle table shared by host implementations.
//!
//! A browser host cannot hand DOM nodes to the controller, so it mints an
//! [`ElementId`] per node and resolves it back on every geometry or
//! containment query. Resolving a handle that was never minted, or was
//! already forgotten, is a [`WebHostError::UnknownElement`].

use std::collections::HashMap;

use hovertip_core::element::ElementId;

use crate::WebHostError;

/// Handles for host elements of type `E`.
#[derive(Debug)]
pub struct ElementRegistry<E> {
    elements: HashMap<ElementId, E>,
    next: u64,
}

impl<E> Default for ElementRegistry<E> {
    fn default() -> Self {
        Self {
            elements: HashMap::new(),
            next: 1,
        }
    }
}

impl<E: PartialEq> ElementRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `element` a handle. Registering an equal element again returns
    /// the existing handle.
    pub fn register(&mut self, element: E) -> ElementId {
        if let Some(id) = self.find(&element) {
            return id;
        }
        let id = ElementId::new(self.next);
        self.next += 1;
        self.elements.insert(id, element);
        id
    }

    /// Handle of an already registered element.
    pub fn find(&self, element: &E) -> Option<ElementId> {
        self.elements
            .iter()
            .find_map(|(id, el)| (el == element).then_some(*id))
    }

    /// Resolve a handle.
    pub fn get(&self, id: ElementId) -> Result<&E, WebHostError> {
        self.elements
            .get(&id)
            .ok_or(WebHostError::UnknownElement(id.get()))
    }

    /// Drop a handle. Handles are never reused.
    pub fn forget(&mut self, id: ElementId) -> Result<E, WebHostError> {
        self.elements
            .remove(&id)
            .ok_or(WebHostError::UnknownElement(id.get()))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
