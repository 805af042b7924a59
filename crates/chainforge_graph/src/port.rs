// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port bookkeeping for node inputs/outputs.
//!
//! Every node carries a [`PortRegistry`]: one named slot per distinct input
//! pile and output pile of its bound recipe. Input ports hold any number of
//! incoming connection endpoints; output ports hold at most one. The whole
//! registry is rebuilt from scratch whenever the bound recipe changes, so
//! the port set can never drift out of sync with the recipe.

use crate::connection::ConnectionId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Visual width shared by all nodes, used for output port geometry.
pub const NODE_WIDTH: f32 = 240.0;

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// Validated port name derived from a recipe pile's material name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PortName(String);

impl PortName {
    /// Create a port name, rejecting empty or all-whitespace strings.
    pub fn new(name: impl Into<String>) -> Result<Self, PortError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(PortError::InvalidName(name));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PortName {
    type Error = PortError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PortName> for String {
    fn from(name: PortName) -> Self {
        name.0
    }
}

impl std::fmt::Display for PortName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-port layout supplied by the presentation layer's layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortLayout {
    /// Vertical offset of the port row relative to the node origin.
    pub y_offset: f32,
    /// Height of the port row.
    pub height: f32,
}

/// Connections detached because their port vanished in a registry rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct OrphanedConnection {
    /// Name of the port that no longer exists.
    pub port: PortName,
    /// Side of the node the port was on.
    pub direction: PortDirection,
    /// Endpoints that were attached when the port vanished.
    pub endpoints: Vec<ConnectionId>,
}

/// Error raised by port bookkeeping and geometry queries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    /// Port name is empty or all whitespace.
    #[error("invalid port name: {0:?}")]
    InvalidName(String),

    /// No port with this name on the queried side.
    #[error("unknown {1:?} port: {0}")]
    UnknownPort(PortName, PortDirection),

    /// Port exists but the presentation layer has not registered its layout.
    #[error("no layout registered for {1:?} port: {0}")]
    LayoutNotRegistered(PortName, PortDirection),

    /// Output port already holds its single allowed endpoint.
    #[error("output port already connected: {0}")]
    OutputOccupied(PortName),
}

/// Named input/output slots of one node, with injected layout geometry.
#[derive(Debug, Clone, Default)]
pub struct PortRegistry {
    inputs: IndexMap<PortName, Vec<ConnectionId>>,
    outputs: IndexMap<PortName, Option<ConnectionId>>,
    input_layouts: IndexMap<PortName, PortLayout>,
    output_layouts: IndexMap<PortName, PortLayout>,
}

impl PortRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the port set with the given input/output names.
    ///
    /// Duplicate names collapse to one port. Ports whose names persist keep
    /// their endpoints; endpoints on vanished ports are detached and
    /// returned. Registered layouts are dropped wholesale since the node's
    /// shape changed and the presentation layer must re-lay it out.
    pub fn rebuild(
        &mut self,
        input_names: impl IntoIterator<Item = PortName>,
        output_names: impl IntoIterator<Item = PortName>,
    ) -> Vec<OrphanedConnection> {
        let mut new_inputs: IndexMap<PortName, Vec<ConnectionId>> = IndexMap::new();
        for name in input_names {
            let endpoints = self.inputs.shift_remove(&name).unwrap_or_default();
            new_inputs.entry(name).or_insert(endpoints);
        }

        let mut new_outputs: IndexMap<PortName, Option<ConnectionId>> = IndexMap::new();
        for name in output_names {
            let endpoint = self.outputs.shift_remove(&name).unwrap_or_default();
            new_outputs.entry(name).or_insert(endpoint);
        }

        let mut orphans = Vec::new();
        for (port, endpoints) in self.inputs.drain(..) {
            if !endpoints.is_empty() {
                orphans.push(OrphanedConnection {
                    port,
                    direction: PortDirection::Input,
                    endpoints,
                });
            }
        }
        for (port, endpoint) in self.outputs.drain(..) {
            if let Some(endpoint) = endpoint {
                orphans.push(OrphanedConnection {
                    port,
                    direction: PortDirection::Output,
                    endpoints: vec![endpoint],
                });
            }
        }

        self.inputs = new_inputs;
        self.outputs = new_outputs;
        self.input_layouts.clear();
        self.output_layouts.clear();
        orphans
    }

    /// Remove all ports, detaching any remaining endpoints.
    pub fn clear(&mut self) -> Vec<OrphanedConnection> {
        self.rebuild(std::iter::empty(), std::iter::empty())
    }

    /// Attach an incoming endpoint to an input port.
    pub fn attach_input(
        &mut self,
        name: &PortName,
        endpoint: ConnectionId,
    ) -> Result<(), PortError> {
        let endpoints = self
            .inputs
            .get_mut(name)
            .ok_or_else(|| PortError::UnknownPort(name.clone(), PortDirection::Input))?;
        endpoints.push(endpoint);
        Ok(())
    }

    /// Set the single outgoing endpoint of an output port.
    pub fn set_output(
        &mut self,
        name: &PortName,
        endpoint: ConnectionId,
    ) -> Result<(), PortError> {
        let slot = self
            .outputs
            .get_mut(name)
            .ok_or_else(|| PortError::UnknownPort(name.clone(), PortDirection::Output))?;
        if slot.is_some() {
            return Err(PortError::OutputOccupied(name.clone()));
        }
        *slot = Some(endpoint);
        Ok(())
    }

    /// Detach an endpoint from whichever port holds it.
    ///
    /// Returns `true` if the endpoint was attached anywhere.
    pub fn detach(&mut self, endpoint: ConnectionId) -> bool {
        for endpoints in self.inputs.values_mut() {
            if let Some(index) = endpoints.iter().position(|e| *e == endpoint) {
                endpoints.remove(index);
                return true;
            }
        }
        for slot in self.outputs.values_mut() {
            if *slot == Some(endpoint) {
                *slot = None;
                return true;
            }
        }
        false
    }

    /// Whether an input port with this name exists.
    pub fn has_input(&self, name: &PortName) -> bool {
        self.inputs.contains_key(name)
    }

    /// Whether an output port with this name exists.
    pub fn has_output(&self, name: &PortName) -> bool {
        self.outputs.contains_key(name)
    }

    /// Endpoints attached to an input port, in attachment order.
    pub fn input_endpoints(&self, name: &PortName) -> Option<&[ConnectionId]> {
        self.inputs.get(name).map(Vec::as_slice)
    }

    /// Endpoint attached to an output port, if any.
    pub fn output_endpoint(&self, name: &PortName) -> Option<ConnectionId> {
        self.outputs.get(name).copied().flatten()
    }

    /// Input port names in display order.
    pub fn input_names(&self) -> impl Iterator<Item = &PortName> {
        self.inputs.keys()
    }

    /// Output port names in display order.
    pub fn output_names(&self) -> impl Iterator<Item = &PortName> {
        self.outputs.keys()
    }

    /// Whether the registry has no ports at all.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }

    /// Store layout for a port, injected by the presentation layout pass.
    pub fn register_layout(
        &mut self,
        name: &PortName,
        direction: PortDirection,
        y_offset: f32,
        height: f32,
    ) -> Result<(), PortError> {
        let exists = match direction {
            PortDirection::Input => self.inputs.contains_key(name),
            PortDirection::Output => self.outputs.contains_key(name),
        };
        if !exists {
            return Err(PortError::UnknownPort(name.clone(), direction));
        }
        let layouts = match direction {
            PortDirection::Input => &mut self.input_layouts,
            PortDirection::Output => &mut self.output_layouts,
        };
        layouts.insert(name.clone(), PortLayout { y_offset, height });
        Ok(())
    }

    /// Canvas position where connections attach to a port.
    ///
    /// `position` is the owning node's origin. Inputs anchor on the left
    /// edge, outputs on the right edge at [`NODE_WIDTH`]. Fails if the port
    /// does not exist or its layout was never registered; a position is
    /// never fabricated.
    pub fn anchor(
        &self,
        position: [f32; 2],
        name: &PortName,
        direction: PortDirection,
    ) -> Result<[f32; 2], PortError> {
        let (exists, layouts) = match direction {
            PortDirection::Input => (self.inputs.contains_key(name), &self.input_layouts),
            PortDirection::Output => (self.outputs.contains_key(name), &self.output_layouts),
        };
        if !exists {
            return Err(PortError::UnknownPort(name.clone(), direction));
        }
        let layout = layouts
            .get(name)
            .ok_or_else(|| PortError::LayoutNotRegistered(name.clone(), direction))?;

        let x = match direction {
            PortDirection::Input => position[0],
            PortDirection::Output => position[0] + NODE_WIDTH,
        };
        let y = position[1] + layout.y_offset + layout.height / 2.0;
        Ok([x, y])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> PortName {
        PortName::new(s).unwrap()
    }

    #[test]
    fn test_port_name_validation() {
        assert!(PortName::new("iron").is_ok());
        assert_eq!(name("  iron ").as_str(), "iron");
        assert!(matches!(PortName::new(""), Err(PortError::InvalidName(_))));
        assert!(matches!(
            PortName::new("   "),
            Err(PortError::InvalidName(_))
        ));
    }

    #[test]
    fn test_rebuild_collapses_duplicate_names() {
        let mut registry = PortRegistry::new();
        registry.rebuild(
            vec![name("iron"), name("copper"), name("iron")],
            std::iter::empty(),
        );

        let names: Vec<&str> = registry.input_names().map(PortName::as_str).collect();
        assert_eq!(names, vec!["iron", "copper"]);
    }

    #[test]
    fn test_rebuild_keeps_endpoints_on_persisting_ports() {
        let mut registry = PortRegistry::new();
        registry.rebuild(vec![name("x"), name("y")], std::iter::empty());
        let endpoint = ConnectionId::new();
        registry.attach_input(&name("x"), endpoint).unwrap();

        let orphans = registry.rebuild(vec![name("x"), name("z")], std::iter::empty());
        assert!(orphans.is_empty());
        assert_eq!(registry.input_endpoints(&name("x")).unwrap(), &[endpoint]);
        assert!(registry.has_input(&name("z")));
        assert!(!registry.has_input(&name("y")));
    }

    #[test]
    fn test_rebuild_orphans_endpoints_on_vanished_ports() {
        let mut registry = PortRegistry::new();
        registry.rebuild(vec![name("x"), name("y")], std::iter::empty());
        let endpoint = ConnectionId::new();
        registry.attach_input(&name("x"), endpoint).unwrap();

        let orphans = registry.rebuild(vec![name("y"), name("z")], std::iter::empty());
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].port, name("x"));
        assert_eq!(orphans[0].direction, PortDirection::Input);
        assert_eq!(orphans[0].endpoints, vec![endpoint]);
        assert!(!registry.has_input(&name("x")));
    }

    #[test]
    fn test_output_holds_at_most_one_endpoint() {
        let mut registry = PortRegistry::new();
        registry.rebuild(std::iter::empty(), vec![name("out")]);

        registry.set_output(&name("out"), ConnectionId::new()).unwrap();
        let second = registry.set_output(&name("out"), ConnectionId::new());
        assert!(matches!(second, Err(PortError::OutputOccupied(_))));
    }

    #[test]
    fn test_detach_clears_either_side() {
        let mut registry = PortRegistry::new();
        registry.rebuild(vec![name("in")], vec![name("out")]);
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        registry.attach_input(&name("in"), a).unwrap();
        registry.set_output(&name("out"), b).unwrap();

        assert!(registry.detach(a));
        assert!(registry.detach(b));
        assert!(!registry.detach(a));
        assert!(registry.input_endpoints(&name("in")).unwrap().is_empty());
        assert_eq!(registry.output_endpoint(&name("out")), None);
    }

    #[test]
    fn test_attach_to_unknown_port_fails() {
        let mut registry = PortRegistry::new();
        let result = registry.attach_input(&name("ghost"), ConnectionId::new());
        assert!(matches!(result, Err(PortError::UnknownPort(_, _))));
    }

    #[test]
    fn test_anchor_geometry() {
        let mut registry = PortRegistry::new();
        registry.rebuild(vec![name("in")], vec![name("out")]);
        registry
            .register_layout(&name("in"), PortDirection::Input, 10.0, 20.0)
            .unwrap();
        registry
            .register_layout(&name("out"), PortDirection::Output, 40.0, 16.0)
            .unwrap();

        let pos = [100.0, 200.0];
        assert_eq!(
            registry.anchor(pos, &name("in"), PortDirection::Input).unwrap(),
            [100.0, 220.0]
        );
        assert_eq!(
            registry.anchor(pos, &name("out"), PortDirection::Output).unwrap(),
            [100.0 + NODE_WIDTH, 248.0]
        );
    }

    #[test]
    fn test_anchor_without_layout_fails() {
        let mut registry = PortRegistry::new();
        registry.rebuild(vec![name("in")], std::iter::empty());

        let unregistered = registry.anchor([0.0, 0.0], &name("in"), PortDirection::Input);
        assert!(matches!(
            unregistered,
            Err(PortError::LayoutNotRegistered(_, _))
        ));

        let unknown = registry.anchor([0.0, 0.0], &name("ghost"), PortDirection::Input);
        assert!(matches!(unknown, Err(PortError::UnknownPort(_, _))));
    }

    #[test]
    fn test_rebuild_drops_layouts() {
        let mut registry = PortRegistry::new();
        registry.rebuild(vec![name("in")], std::iter::empty());
        registry
            .register_layout(&name("in"), PortDirection::Input, 5.0, 10.0)
            .unwrap();

        registry.rebuild(vec![name("in")], std::iter::empty());
        let anchor = registry.anchor([0.0, 0.0], &name("in"), PortDirection::Input);
        assert!(matches!(anchor, Err(PortError::LayoutNotRegistered(_, _))));
    }
}
